//! Chat error helpers
//!
//! Re-exports duet-error and adds constructors for the transport paths
//! participants go through.

pub use duet_error::{Error, ErrorKind, ErrorStatus, Result};

/// A remote participant could not be reached
pub fn network_failed(url: impl Into<String>, reason: impl Into<String>) -> Error {
    Error::new(ErrorKind::NetworkFailed, reason).with_context("url", url)
}

/// A remote participant asked us to back off
pub fn rate_limited(url: impl Into<String>) -> Error {
    Error::new(ErrorKind::RateLimited, "remote participant is rate limiting").with_context("url", url)
}

/// A remote participant rejected our credentials
pub fn permission_denied(url: impl Into<String>, status: u16) -> Error {
    Error::new(ErrorKind::PermissionDenied, format!("remote participant answered {}", status))
        .with_context("url", url)
        .with_context("status", status.to_string())
}

/// A remote participant answered with a non-success status
pub fn remote_rejected(participant: &str, status: u16, body: impl Into<String>) -> Error {
    Error::participant_failed(participant, body).with_context("status", status.to_string())
}

pub fn serialization_failed(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::SerializationFailed, message)
}
