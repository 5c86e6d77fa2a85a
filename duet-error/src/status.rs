//! Error status - whether an operation may be attempted again

use std::fmt;

/// How a caller should treat an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    /// Retrying will not help
    Permanent,
    /// The same call may succeed later
    Temporary,
}

impl ErrorStatus {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorStatus::Temporary)
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorStatus::Permanent => "permanent",
            ErrorStatus::Temporary => "temporary",
        };
        write!(f, "{}", s)
    }
}
