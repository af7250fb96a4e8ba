//! Wrapper configuration, kept apart from the renderer's own options.
//!
//! Callers may mix configuration keys into the options they pass to
//! [`Document::set_options`](crate::Document::set_options). [`Settings::split`]
//! separates the two: recognised keys update the settings, everything else
//! is handed to the renderer untouched. None of the recognised keys is the
//! name of a wkhtmlto* option, and only named entries are intercepted: a bare
//! `--binary` flag still reaches the renderer.

use crate::args::{Entry, OptionSet, Value};
use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default fixed arguments for `xvfb-run`.
pub const DEFAULT_XVFB_ARGS: &[&str] = &["--server-args=-screen 0, 1024x768x24"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Renderer binary name or path. Defaults to the output kind's binary.
    pub binary: Option<PathBuf>,
    /// Directory for temporary files. Defaults to the system temp directory.
    pub tmp_dir: Option<PathBuf>,
    /// Accept output produced by a renderer that exited non-zero.
    pub ignore_warnings: bool,
    /// wkhtmltopdf 0.9 syntax: `--cover` and `--toc` instead of `cover`/`toc`.
    #[serde(alias = "version9")]
    pub legacy_syntax: bool,
    /// Shell-quote values in the displayed command line.
    #[serde(alias = "enable_escaping")]
    pub escaping: bool,
    pub process: ProcessSettings,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            binary: None,
            tmp_dir: None,
            ignore_warnings: false,
            legacy_syntax: false,
            escaping: true,
            process: ProcessSettings::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessSettings {
    /// Replaces the binary entirely when set.
    pub command: Option<PathBuf>,
    /// Extra environment variables for the renderer process.
    pub env: BTreeMap<String, String>,
    pub xvfb: XvfbSettings,
}

/// Virtual display wrapping for renderers built without patched Qt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XvfbSettings {
    pub enabled: bool,
    /// Launcher path. Looked up on `PATH` as `xvfb-run` when unset.
    pub binary: Option<PathBuf>,
    pub args: Vec<String>,
}
impl Default for XvfbSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            binary: None,
            args: DEFAULT_XVFB_ARGS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Settings {
    /// Splits raw options into updated settings and the remaining renderer
    /// options. Bare flags are never treated as settings.
    ///
    /// ```
    /// use htmlto_render::{OptionSet, Settings};
    ///
    /// let raw = OptionSet::new().set("binary", "/opt/wkhtmltopdf").flag("no-outline").set("ignore_warnings", "1");
    /// let (settings, options) = Settings::default().split(raw)?;
    /// assert!(settings.ignore_warnings);
    /// assert_eq!(options, OptionSet::new().flag("no-outline"));
    /// # Ok::<(), htmlto_render::error::Error>(())
    /// ```
    pub fn split(mut self, raw: OptionSet) -> Result<(Settings, OptionSet)> {
        let mut options = OptionSet::new();
        for entry in raw {
            match entry {
                Entry::Named(name, value) if is_setting(&name) => self.apply(&name, value)?,
                entry => options.push(entry),
            }
        }
        Ok((self, options))
    }

    fn apply(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "binary" => self.binary = Some(path(name, value)?),
            "tmp_dir" => self.tmp_dir = Some(path(name, value)?),
            "ignore_warnings" => self.ignore_warnings = boolean(name, value)?,
            "legacy_syntax" | "version9" => self.legacy_syntax = boolean(name, value)?,
            "enable_escaping" | "escaping" => self.escaping = boolean(name, value)?,
            "command" => self.process.command = Some(path(name, value)?),
            "env" => match value {
                Value::Pairs(pairs) => self.process.env.extend(pairs),
                _ => exn::bail!(ErrorKind::InvalidSetting(name.to_string())),
            },
            "enable_xvfb" => self.process.xvfb.enabled = boolean(name, value)?,
            "xvfb_run_binary" => self.process.xvfb.binary = Some(path(name, value)?),
            "xvfb_run_args" => {
                self.process.xvfb.args = match value {
                    Value::Scalar(arg) => vec![arg],
                    Value::List(args) => args,
                    Value::Pairs(_) => exn::bail!(ErrorKind::InvalidSetting(name.to_string())),
                }
            },
            _ => exn::bail!(ErrorKind::InvalidSetting(name.to_string())),
        }
        Ok(())
    }
}

const SETTING_KEYS: &[&str] = &[
    "binary",
    "tmp_dir",
    "ignore_warnings",
    "legacy_syntax",
    "version9",
    "enable_escaping",
    "escaping",
    "command",
    "env",
    "enable_xvfb",
    "xvfb_run_binary",
    "xvfb_run_args",
];

fn is_setting(name: &str) -> bool {
    SETTING_KEYS.contains(&name)
}

fn scalar(name: &str, value: Value) -> Result<String> {
    match value {
        Value::Scalar(s) => Ok(s),
        _ => exn::bail!(ErrorKind::InvalidSetting(name.to_string())),
    }
}

fn path(name: &str, value: Value) -> Result<PathBuf> {
    let s = scalar(name, value)?;
    if s.is_empty() {
        exn::bail!(ErrorKind::InvalidSetting(name.to_string()));
    }
    Ok(PathBuf::from(s))
}

fn boolean(name: &str, value: Value) -> Result<bool> {
    match scalar(name, value)?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => exn::bail!(ErrorKind::InvalidSetting(name.to_string())),
    }
}
