//! Run states, outcomes and failures

use duet_chat::Conversation;
use duet_error::Error;
use serde::Serialize;
use std::fmt;

/// Where a run stands.
///
/// The responder answers the seed, so it plays the producer; the initiator
/// plays the critic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    AwaitingProducer,
    AwaitingCritic,
    Terminated,
    Exhausted,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Terminated | RunState::Exhausted)
    }

    /// Transition taken when the awaited participant has replied.
    pub fn after_reply(self, terminal: bool) -> RunState {
        match self {
            RunState::AwaitingProducer | RunState::AwaitingCritic if terminal => RunState::Terminated,
            RunState::AwaitingProducer => RunState::AwaitingCritic,
            RunState::AwaitingCritic => RunState::AwaitingProducer,
            done => done,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::AwaitingProducer => "AWAITING_PRODUCER",
            RunState::AwaitingCritic => "AWAITING_CRITIC",
            RunState::Terminated => "TERMINATED",
            RunState::Exhausted => "EXHAUSTED",
        };
        write!(f, "{}", s)
    }
}

/// Why the run stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// A reply carried the termination signal
    TerminationSignaled,
    /// `max_rounds` turns elapsed
    RoundLimit,
    /// A participant declined its turn
    NoReply { participant: String },
}

/// Result of a run that did not fail
#[derive(Debug, Clone)]
pub struct ConversationOutcome {
    pub state: RunState,
    pub stop_reason: StopReason,
    /// Turns taken after the seed
    pub rounds: usize,
    /// Extracted reference; present exactly when `state` is `Terminated`
    pub artifact: Option<String>,
    pub conversation: Conversation,
}

impl ConversationOutcome {
    pub fn is_terminated(&self) -> bool {
        self.state == RunState::Terminated
    }

    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }
}

/// A failed run, with the conversation as it stood when it failed.
pub struct RunError {
    error: Error,
    conversation: Conversation,
}

impl RunError {
    pub fn new(error: Error, conversation: Conversation) -> Self {
        Self {
            error,
            conversation,
        }
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn into_parts(self) -> (Error, Conversation) {
        (self.error, self.conversation)
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} messages)", self.error, self.conversation.len())
    }
}

impl fmt::Debug for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunError")
            .field("error", &self.error)
            .field("messages", &self.conversation.len())
            .finish()
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<RunError> for Error {
    fn from(err: RunError) -> Self {
        err.error
    }
}
