//! # duet-error
//!
//! Unified error handling for the duet workspace.
//!
//! ## Design
//!
//! - **ErrorKind**: what went wrong (e.g., ArtifactNotFound, ParticipantFailed)
//! - **ErrorStatus**: whether a caller may retry (Permanent, Temporary)
//! - **Context**: key-value pairs recorded where the error crossed a layer
//! - **Source**: the wrapped underlying error, never exposed as its raw type
//!
//! ## Usage
//!
//! ```rust
//! use duet_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::ArtifactNotFound, "no artifact before termination")
//!         .with_operation("engine::run")
//!         .with_context("round", "4"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All fallible functions return `Result<T, duet_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - An error is handled once; outer layers only append context

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using the duet Error
pub type Result<T> = std::result::Result<T, Error>;
