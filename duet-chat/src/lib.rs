//! # duet chat
//!
//! The vocabulary shared by everything that takes part in a two-party
//! conversation.
//!
//! ## Core Concepts
//! - **Message**: an immutable utterance with a role, a sender and a kind tag
//! - **Conversation**: the append-only log a run produces
//! - **Markers**: the termination / artifact substrings recognized in text
//! - **Participant**: trait-based reply production (scripted, remote, closures)
//! - **Hooks**: preprocessing and reply overrides composed at construction

pub mod conversation;
pub mod error;
pub mod hook;
pub mod markers;
pub mod message;
pub mod participant;

pub use conversation::Conversation;
pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use hook::{
    ArtifactAttachments, Preprocess, Preprocessed, ReplyHook, ReplyOverride, RequestArtifact,
};
pub use markers::Markers;
pub use message::{Attachment, Message, MessageKind, Role};
pub use participant::{
    FnParticipant, Participant, RemoteConfig, RemoteParticipant, ScriptedParticipant,
    ScriptedReply,
};
