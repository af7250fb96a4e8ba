//! Classification of page inputs into URLs, files and inline markup.

use crate::error::Result;
use crate::tmp::TempFile;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z][a-z0-9+.\-]*:)?//").expect("valid URL regex"));
static XML: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*<\?xml\b").expect("valid XML regex"));
// Anything that looks like a tag: what an HTML tag stripper would remove.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[A-Za-z!/?][^>]*>").expect("valid markup regex"));

/// Strings longer than this are never looked up on the filesystem.
#[cfg(windows)]
pub const MAX_PATH_LENGTH: usize = 260;
#[cfg(not(windows))]
pub const MAX_PATH_LENGTH: usize = 4096;

/// Markup type of inline content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Markup {
    Html,
    Xml,
}
impl Markup {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Html => ".html",
            Self::Xml => ".xml",
        }
    }
}

#[derive(Debug)]
enum Source {
    Text(String),
    Path(PathBuf),
    Temp(TempFile),
}

/// Something to render: a URL, a file, or markup.
///
/// Strings are classified when the input is resolved; use
/// [`Input::html`]/[`Input::xml`] to skip detection for inline markup, or
/// pass a [`Path`] to skip it for files.
#[derive(Debug)]
pub struct Input {
    source: Source,
    hint: Option<Markup>,
}
impl Input {
    pub fn html(content: impl Into<String>) -> Self {
        Self { source: Source::Text(content.into()), hint: Some(Markup::Html) }
    }

    pub fn xml(content: impl Into<String>) -> Self {
        Self { source: Source::Text(content.into()), hint: Some(Markup::Xml) }
    }
}
impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Self { source: Source::Text(value.to_string()), hint: None }
    }
}
impl From<String> for Input {
    fn from(value: String) -> Self {
        Self { source: Source::Text(value), hint: None }
    }
}
impl From<&Path> for Input {
    fn from(value: &Path) -> Self {
        Self { source: Source::Path(value.to_path_buf()), hint: None }
    }
}
impl From<PathBuf> for Input {
    fn from(value: PathBuf) -> Self {
        Self { source: Source::Path(value), hint: None }
    }
}
impl From<TempFile> for Input {
    fn from(value: TempFile) -> Self {
        Self { source: Source::Temp(value), hint: None }
    }
}

/// The outcome of resolving an [`Input`].
#[derive(Debug)]
pub enum ResolvedInput {
    Url(String),
    FilePath(PathBuf),
    /// Inline content written to a temporary file owned by this value.
    Temp(TempFile),
}
impl ResolvedInput {
    /// The positional token handed to the renderer.
    pub fn token(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::FilePath(path) => path.to_string_lossy().into_owned(),
            Self::Temp(tmp) => tmp.path().to_string_lossy().into_owned(),
        }
    }
}

/// Classifies inputs, materialising inline markup as temporary files.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputResolver<'a> {
    tmp_dir: Option<&'a Path>,
}
impl<'a> InputResolver<'a> {
    pub fn new(tmp_dir: Option<&'a Path>) -> Self {
        Self { tmp_dir }
    }

    /// Resolves a page or cover input.
    ///
    /// Markup detection runs *before* the filesystem check, so a string that
    /// both looks like markup and names an existing file is treated as markup.
    pub fn resolve(&self, input: impl Into<Input>) -> Result<ResolvedInput> {
        let Input { source, hint } = input.into();
        let text = match source {
            Source::Temp(tmp) => return Ok(ResolvedInput::Temp(tmp)),
            Source::Path(path) => return Ok(ResolvedInput::FilePath(path)),
            Source::Text(text) => text,
        };
        if is_url(&text) {
            return Ok(ResolvedInput::Url(text));
        }
        if let Some(markup) = hint.or_else(|| detect(&text)) {
            return self.materialize(&text, markup);
        }
        if is_existing_path(&text) {
            return Ok(ResolvedInput::FilePath(PathBuf::from(text)));
        }
        tracing::debug!(length = text.len(), "Input is neither URL, markup nor existing file; rendering as HTML");
        self.materialize(&text, Markup::Html)
    }

    /// Resolves the value of an option that accepts either a location or raw
    /// content. Only values that look like markup become temp files; URLs,
    /// paths and anything else return `None` and are passed through as-is.
    pub fn resolve_option(&self, name: &str, value: &str) -> Result<Option<TempFile>> {
        if !SIDE_CHANNEL_OPTIONS.contains(&name) || is_url(value) {
            return Ok(None);
        }
        match detect(value) {
            Some(markup) => TempFile::create(value, markup.suffix(), self.tmp_dir).map(Some),
            None => Ok(None),
        }
    }

    fn materialize(&self, content: &str, markup: Markup) -> Result<ResolvedInput> {
        TempFile::create(content, markup.suffix(), self.tmp_dir).map(ResolvedInput::Temp)
    }
}

/// Options whose value may be either a location or raw content.
const SIDE_CHANNEL_OPTIONS: &[&str] = &["header-html", "footer-html", "user-style-sheet", "xsl-style-sheet"];

pub fn is_url(s: &str) -> bool {
    URL.is_match(s)
}

fn is_existing_path(s: &str) -> bool {
    s.len() <= MAX_PATH_LENGTH && !s.contains('\0') && Path::new(s).exists()
}

fn detect(s: &str) -> Option<Markup> {
    if XML.is_match(s) {
        Some(Markup::Xml)
    } else if MARKUP.is_match(s) {
        Some(Markup::Html)
    } else {
        None
    }
}
