//! # Participants
//!
//! A participant produces at most one reply per turn from a read-only view
//! of the conversation so far. What happens inside (an LLM call, an image
//! service, a script) is opaque to the engine.
//!
//! ## Implementations
//! - `ScriptedParticipant`: deterministic replies, for tests and scenario files
//! - `FnParticipant`: any async closure
//! - `RemoteParticipant`: delegates to an HTTP endpoint

pub mod remote;
pub mod scripted;

pub use remote::{RemoteConfig, RemoteParticipant};
pub use scripted::{ScriptedParticipant, ScriptedReply};

use crate::error::Result;
use crate::message::Message;
use std::future::Future;

/// Reply production, the only thing the engine asks of a participant.
#[allow(async_fn_in_trait)]
pub trait Participant: Send + Sync {
    /// Identifier stamped on this participant's messages and used in logs
    fn name(&self) -> &str;

    /// Produce the next message, or `None` to decline the turn.
    ///
    /// `conversation` is a snapshot; nothing written here reaches the log
    /// except the returned message.
    async fn reply(&self, conversation: &[Message]) -> Result<Option<Message>>;
}

/// Participant backed by an async closure.
///
/// The closure receives an owned copy of the snapshot, so the returned
/// future does not borrow from the engine.
pub struct FnParticipant<F> {
    name: String,
    f: F,
}

impl<F, Fut> FnParticipant<F>
where
    F: Fn(Vec<Message>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Message>>>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F, Fut> Participant for FnParticipant<F>
where
    F: Fn(Vec<Message>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Message>>>,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn reply(&self, conversation: &[Message]) -> Result<Option<Message>> {
        (self.f)(conversation.to_vec()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_fn_participant_sees_snapshot() {
        let echo = FnParticipant::new("echo", |messages: Vec<Message>| async move {
            let last = messages.last().map(|m| m.content().to_string()).unwrap_or_default();
            let reply = Message::assistant("echo", format!("{} ({} seen)", last, messages.len()));
            Ok::<_, Error>(Some(reply))
        });

        let history = vec![Message::user("critic", "hello")];
        let reply = echo.reply(&history).await.unwrap().unwrap();

        assert_eq!(echo.name(), "echo");
        assert_eq!(reply.content(), "hello (1 seen)");
    }

    #[test]
    fn test_fn_participant_error_passes_through() {
        let broken = FnParticipant::new("broken", |_messages: Vec<Message>| async {
            Err::<Option<Message>, _>(Error::unexpected("no backend"))
        });

        let err = tokio_test::block_on(broken.reply(&[])).unwrap_err();
        assert_eq!(err.message(), "no backend");
    }
}
