//! Error kinds for duet operations

use std::fmt;

/// The kind of error that occurred.
///
/// Callers match on `ErrorKind` to decide how to react; the message and
/// context are for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid configuration
    ConfigInvalid,

    /// Invalid argument passed to a function
    InvalidArgument,

    // =========================================================================
    // Conversation errors
    // =========================================================================
    /// Termination was signaled but no message carries an artifact
    ArtifactNotFound,

    /// A participant failed to produce its reply
    ParticipantFailed,

    // =========================================================================
    // Transport errors
    // =========================================================================
    /// Network error talking to a remote participant
    NetworkFailed,

    /// Remote participant asked us to slow down
    RateLimited,

    /// Permission denied (filesystem or remote endpoint)
    PermissionDenied,

    // =========================================================================
    // IO / parse errors
    // =========================================================================
    /// IO operation failed
    IoFailed,

    /// File not found
    FileNotFound,

    /// Failed to parse input
    ParseFailed,

    /// Serialization failed
    SerializationFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::ConfigInvalid => "ConfigInvalid",
            ErrorKind::InvalidArgument => "InvalidArgument",

            ErrorKind::ArtifactNotFound => "ArtifactNotFound",
            ErrorKind::ParticipantFailed => "ParticipantFailed",

            ErrorKind::NetworkFailed => "NetworkFailed",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::PermissionDenied => "PermissionDenied",

            ErrorKind::IoFailed => "IoFailed",
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::ParseFailed => "ParseFailed",
            ErrorKind::SerializationFailed => "SerializationFailed",
        }
    }

    /// Check if this error kind is retryable by default.
    ///
    /// The engine itself never retries; this only informs callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::NetworkFailed | ErrorKind::RateLimited)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
