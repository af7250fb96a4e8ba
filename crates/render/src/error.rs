//! Render Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! A renderer process that actually ran is never an error at this level: its
//! outcome is a [`CommandResult`](crate::CommandResult). Errors are reserved
//! for local I/O, misuse of the single-shot trigger, and delivery.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A temporary file could not be created, written or removed.
    #[display("temporary file error: {}", _0.display())]
    TempFile(#[error(not(source))] PathBuf),
    /// A configuration key was recognised but its value could not be used.
    #[display("invalid value for setting `{_0}`")]
    InvalidSetting(#[error(not(source))] String),
    /// The renderer did not produce usable output, or could not be started.
    /// Carries the full
    /// diagnostic message (command line and captured stderr).
    #[display("{_0}")]
    RenderFailed(#[error(not(source))] String),
    /// The single-shot render trigger was pulled a second time.
    #[display("document has already been rendered")]
    AlreadyRendered,
    /// Copying the rendered output to its destination failed.
    #[display("could not save output as {}", _0.display())]
    Save(#[error(not(source))] PathBuf),
    /// Streaming the rendered output to the caller failed.
    #[display("could not send output")]
    Send,
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Rendering is never retried: fetching remote pages is not assumed to be
    /// idempotent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io | Self::Save(_) | Self::Send)
    }
}
