//! Hooks composed around participants at construction time
//!
//! - [`Preprocess`]: rewrite the snapshot a participant is about to see
//! - [`ReplyHook`]: answer a turn before the wrapped participant gets to
//!
//! Both are plain values handed to a constructor; there is no registry and
//! nothing can be added once a participant or engine is built.

use crate::error::Result;
use crate::markers::Markers;
use crate::message::{Attachment, Message};
use crate::participant::Participant;

/// A pure transform over a conversation snapshot
pub trait Preprocess: Send + Sync {
    fn apply(&self, messages: Vec<Message>) -> Vec<Message>;
}

impl<F> Preprocess for F
where
    F: Fn(Vec<Message>) -> Vec<Message> + Send + Sync,
{
    fn apply(&self, messages: Vec<Message>) -> Vec<Message> {
        self(messages)
    }
}

/// Turns every artifact message into one carrying an image attachment
/// pointing at its last line, so vision-capable participants can see it.
#[derive(Debug, Clone, Default)]
pub struct ArtifactAttachments {
    markers: Markers,
}

impl ArtifactAttachments {
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }
}

impl Preprocess for ArtifactAttachments {
    fn apply(&self, messages: Vec<Message>) -> Vec<Message> {
        messages
            .into_iter()
            .map(|msg| {
                if !self.markers.is_artifact(&msg) {
                    return msg;
                }
                match msg.last_line().map(str::to_string) {
                    Some(url) => msg.with_attachment(Attachment::Image { url }),
                    None => msg,
                }
            })
            .collect()
    }
}

/// Applies a [`Preprocess`] hook to the snapshot of one participant only.
pub struct Preprocessed<P, H> {
    inner: P,
    hook: H,
}

impl<P, H> Preprocessed<P, H> {
    pub fn new(inner: P, hook: H) -> Self {
        Self { inner, hook }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: Participant, H: Preprocess> Participant for Preprocessed<P, H> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn reply(&self, conversation: &[Message]) -> Result<Option<Message>> {
        let view = self.hook.apply(conversation.to_vec());
        self.inner.reply(&view).await
    }
}

/// Gets the first look at a turn. Returning `Some` answers the turn;
/// `None` defers to the next hook and finally to the wrapped participant.
pub trait ReplyHook: Send + Sync {
    fn intercept(&self, conversation: &[Message]) -> Option<Message>;
}

impl<F> ReplyHook for F
where
    F: Fn(&[Message]) -> Option<Message> + Send + Sync,
{
    fn intercept(&self, conversation: &[Message]) -> Option<Message> {
        self(conversation)
    }
}

/// Asks for an artifact whenever the latest message is not one.
///
/// This is the critic's opening move: there is nothing to judge until the
/// producer has produced something.
#[derive(Debug, Clone)]
pub struct RequestArtifact {
    sender: String,
    prompt: String,
    markers: Markers,
}

impl RequestArtifact {
    pub fn new(sender: impl Into<String>, prompt: impl Into<String>, markers: Markers) -> Self {
        Self {
            sender: sender.into(),
            prompt: prompt.into(),
            markers,
        }
    }
}

impl ReplyHook for RequestArtifact {
    fn intercept(&self, conversation: &[Message]) -> Option<Message> {
        match conversation.last() {
            Some(last) if self.markers.is_artifact(last) => None,
            _ => Some(Message::assistant(&self.sender, self.prompt.as_str())),
        }
    }
}

/// Wraps a participant with reply hooks, consulted in the order given.
pub struct ReplyOverride<P> {
    inner: P,
    hooks: Vec<Box<dyn ReplyHook>>,
}

impl<P: Participant> ReplyOverride<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: impl ReplyHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: Participant> Participant for ReplyOverride<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn reply(&self, conversation: &[Message]) -> Result<Option<Message>> {
        for hook in &self.hooks {
            if let Some(message) = hook.intercept(conversation) {
                tracing::trace!(participant = self.inner.name(), "reply answered by hook");
                return Ok(Some(message));
            }
        }
        self.inner.reply(conversation).await
    }
}
