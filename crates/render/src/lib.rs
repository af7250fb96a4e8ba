//! Builds and runs `wkhtmltopdf`/`wkhtmltoimage` command lines.
//!
//! A [`Document`] collects global options, pages, covers and tables of
//! contents, writes inline markup to temporary files, runs the renderer
//! once, and hands the output over by copying it to a path or streaming it
//! to a client.

mod args;
mod binary;
mod command;
mod document;
pub mod error;
mod input;
mod kind;
mod response;
mod settings;
#[cfg(all(test, unix))]
mod testutil;
mod tmp;

pub use crate::args::{Arg, Entry, OptionSet, Value, quote, render as render_args};
pub use crate::command::{Command, CommandResult, Status};
pub use crate::document::{Document, ObjectKind};
pub use crate::input::{Input, InputResolver, MAX_PATH_LENGTH, Markup, ResolvedInput, is_url};
pub use crate::kind::OutputKind;
pub use crate::response::Response;
pub use crate::settings::{DEFAULT_XVFB_ARGS, ProcessSettings, Settings, XvfbSettings};
pub use crate::tmp::TempFile;
