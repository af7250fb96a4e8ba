//! CLI Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not read input from stdin")]
    Stdin,
    /// Standard input holds a single page.
    #[display("standard input can back only one of the cover and pages, got {_0}")]
    StdinReused(#[error(not(source))] usize),
    #[display("conversion failed")]
    Render,
    #[display("batch conversion failed")]
    Batch,
    /// Some files of a batch could not be converted.
    #[display("{_0} file(s) could not be converted")]
    Incomplete(#[error(not(source))] usize),
}
