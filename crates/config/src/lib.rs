//! Layered configuration for htmlto.
//!
//! Sources are merged in order, later ones winning:
//!
//! 1. built-in defaults (for anything not set below),
//! 2. a config file (TOML, YAML or JSON, picked by extension),
//! 3. `HTMLTO_`-prefixed environment variables, with `__` separating nested
//!    keys (`HTMLTO_SETTINGS__IGNORE_WARNINGS=true`).
//!
//! Renderer options are ordered lists of `{ name, value }` tables, because
//! wkhtmltopdf cares about argument order and maps in these formats do not
//! keep it:
//!
//! ```toml
//! [settings]
//! binary = "/usr/local/bin/wkhtmltopdf"
//! ignore_warnings = true
//!
//! [[options]]
//! name = "no-outline"
//!
//! [[options]]
//! name = "margin-top"
//! value = 0
//!
//! [[page_options]]
//! name = "allow"
//! value = ["/tmp", "/srv/assets"]
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use htmlto_render::{Document, Entry, OptionSet, OutputKind, Settings, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "HTMLTO_";
const APPLICATION: &str = "htmlto";
const DEFAULT_FILES: &[&str] = &["config.toml", "config.yaml", "config.yml", "config.json"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    /// Global renderer options.
    pub options: Vec<OptionEntry>,
    /// Defaults for every page and cover.
    pub page_options: Vec<OptionEntry>,
}

/// One renderer option. Without a value it is a bare flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<OptionValue>,
}
impl From<OptionEntry> for Entry {
    fn from(entry: OptionEntry) -> Self {
        match entry.value {
            None => Entry::Flag(entry.name),
            Some(value) => Entry::Named(entry.name, value.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
    /// Options taking two values, such as `cookie` or `custom-header`.
    Pairs(BTreeMap<String, Scalar>),
}
impl From<OptionValue> for Value {
    fn from(value: OptionValue) -> Self {
        match value {
            OptionValue::Scalar(s) => Value::Scalar(s.to_string()),
            OptionValue::List(items) => Value::List(items.iter().map(ToString::to_string).collect()),
            OptionValue::Pairs(pairs) => Value::pairs(pairs.into_iter().map(|(k, v)| (k, v.to_string()))),
        }
    }
}

/// A single option value as written in a config file or environment variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}
impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, or from the first config file
    /// found in the user's config directory when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::layered(path, Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn layered(path: Option<&Path>, env: Env) -> Result<Self> {
        // Defaults come from `#[serde(default)]`. A serialized defaults layer
        // would clash with key aliases such as `version9`.
        let mut figment = Figment::new();
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Loading config file");
            figment = match format(&file) {
                Some(FileFormat::Toml) => figment.merge(Toml::file_exact(&file)),
                Some(FileFormat::Yaml) => figment.merge(Yaml::file_exact(&file)),
                Some(FileFormat::Json) => figment.merge(Json::file_exact(&file)),
                None => exn::bail!(ErrorKind::UnsupportedFormat(file)),
            };
        }
        figment.merge(env).extract().or_raise(|| ErrorKind::Invalid)
    }

    /// The first existing config file in the platform config directory
    /// (e.g. `~/.config/htmlto/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("", "", APPLICATION)?;
        DEFAULT_FILES.iter().map(|name| dirs.config_dir().join(name)).find(|path| path.is_file())
    }

    pub fn options(&self) -> OptionSet {
        self.options.iter().cloned().map(Entry::from).collect()
    }

    pub fn page_options(&self) -> OptionSet {
        self.page_options.iter().cloned().map(Entry::from).collect()
    }

    /// A new document of `kind` with these settings and options applied.
    pub fn document(&self, kind: OutputKind) -> Result<Document> {
        let mut document = Document::with_settings(kind, self.settings.clone());
        document.set_options(self.options()).or_raise(|| ErrorKind::Apply)?;
        document.set_page_options(self.page_options()).or_raise(|| ErrorKind::Apply)?;
        Ok(document)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

fn format(path: &Path) -> Option<FileFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "toml" => Some(FileFormat::Toml),
        "yaml" | "yml" => Some(FileFormat::Yaml),
        "json" => Some(FileFormat::Json),
        _ => None,
    }
}
