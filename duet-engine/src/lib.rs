//! # duet engine
//!
//! Drives a bounded conversation between two participants:
//! 1. The initiator's seed message opens the conversation
//! 2. The responder (producer) answers, then the initiator (critic), and so on
//! 3. A reply carrying the termination signal ends the run; the artifact is
//!    the last line of the most recent artifact message
//! 4. Otherwise the run is exhausted after `max_rounds` turns
//!
//! A participant failure aborts the run and hands back the conversation as it
//! stood.

mod config;
mod engine;
mod outcome;

pub use config::{EngineConfig, DEFAULT_MAX_ROUNDS};
pub use engine::ConversationEngine;
pub use outcome::{ConversationOutcome, RunError, RunState, StopReason};
