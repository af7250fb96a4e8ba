//! Batch Error Types

use derive_more::{Display, Error};
use htmlto_render::error::{Error as RenderError, ErrorKind as RenderErrorKind};
use std::path::PathBuf;

/// A batch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for batch operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input directory could not be read at all.
    #[display("cannot read input directory: {}", _0.display())]
    InputDir(#[error(not(source))] PathBuf),
    /// An output directory could not be created.
    #[display("cannot create output directory: {}", _0.display())]
    OutputDir(#[error(not(source))] PathBuf),
    /// Building, rendering or saving a document failed.
    #[display("render error: {_0}")]
    Render(RenderErrorKind),
}
impl ErrorKind {
    /// Convert a render error into a batch error, keeping the render crate's
    /// `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn render(err: RenderError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Render(inner))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InputDir(_) | Self::OutputDir(_) => true,
            Self::Render(kind) => kind.is_retryable(),
        }
    }
}
