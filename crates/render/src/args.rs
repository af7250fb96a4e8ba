//! Renderer option sets and their translation into argument tokens.
//!
//! An [`OptionSet`] is an insertion-ordered list of entries. Order matters:
//! wkhtmlto* applies options (and renders objects) in the order they appear
//! on the command line, so the rendered token sequence must reproduce the
//! order in which options were added.

use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The value half of a named option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// `--name <value>`
    Scalar(String),
    /// `--name <item>`, once per item.
    List(Vec<String>),
    /// `--name <key> <value>`, once per pair (e.g. `--cookie`, `--replace`).
    Pairs(Vec<(String, String)>),
}
impl Value {
    /// Builds a [`Pairs`](Self::Pairs) value, keeping the iteration order.
    pub fn pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Returns the scalar value, if this is one.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}
impl<T: Into<String>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<String>, const N: usize> From<[T; N]> for Value {
    fn from(value: [T; N]) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}
// Numbers go through `Display`, which never applies locale formatting.
macro_rules! numeric_value {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::Scalar(value.to_string())
            }
        }
    )*};
}
numeric_value!(i32, i64, u32, u64, usize, f32, f64);

/// A single option entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// A bare flag, emitted as `--name`.
    Flag(String),
    /// A named option with a value.
    Named(String, Value),
}
impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Self::Flag(name) | Self::Named(name, _) => name,
        }
    }
}
/// Parses the `name` / `name=value` shorthand used on the command line.
impl FromStr for Entry {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start_matches("--");
        Ok(match s.split_once('=') {
            Some((name, value)) => Self::Named(name.to_string(), Value::Scalar(value.to_string())),
            None => Self::Flag(s.to_string()),
        })
    }
}

/// An insertion-ordered set of renderer options.
///
/// Named entries are unique by name: setting a name that already exists
/// replaces its value *in place*, so the original position is kept. Bare
/// flags are always appended.
///
/// ```
/// use htmlto_render::{OptionSet, render_args};
///
/// let options = OptionSet::new()
///     .flag("no-outline")
///     .set("margin-top", 0)
///     .set("allow", ["/tmp", "/test"]);
/// let args: Vec<String> = render_args(&options).iter().map(|a| a.to_string()).collect();
/// assert_eq!(args, ["--no-outline", "--margin-top", "0", "--allow", "/tmp", "--allow", "/test"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: Vec<Entry>,
}
impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bare flag.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.push(Entry::Flag(name.into()));
        self
    }

    /// Sets a named option (replacing in place if it already exists).
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds an entry, with the same replacement rules as [`insert`](Self::insert).
    pub fn push(&mut self, entry: Entry) {
        match entry {
            Entry::Flag(name) => self.entries.push(Entry::Flag(name)),
            Entry::Named(name, value) => {
                self.insert(name, value);
            },
        }
    }

    /// Sets a named option, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        for entry in &mut self.entries {
            if let Entry::Named(existing, current) = entry
                && *existing == name
            {
                return Some(std::mem::replace(current, value));
            }
        }
        self.entries.push(Entry::Named(name, value));
        None
    }

    /// Adds a scalar under `name`, turning an existing scalar into a list
    /// rather than replacing it. Used for repeatable options like `--allow`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let existing = self.entries.iter_mut().find_map(|entry| match entry {
            Entry::Named(n, v) if *n == name => Some(v),
            _ => None,
        });
        match existing {
            Some(Value::List(items)) => items.push(value),
            Some(current @ Value::Scalar(_)) => {
                let previous = std::mem::replace(current, Value::List(Vec::new()));
                if let (Value::Scalar(first), Value::List(items)) = (previous, current) {
                    items.extend([first, value]);
                }
            },
            Some(current @ Value::Pairs(_)) => *current = Value::Scalar(value),
            None => self.entries.push(Entry::Named(name, Value::Scalar(value))),
        }
    }

    /// Adds a key/value pair under `name`, for options that take two values
    /// (`--cookie <name> <value>`). A non-pair value already stored under
    /// `name` is replaced.
    pub fn append_pair(&mut self, name: impl Into<String>, key: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let pair = (key.into(), value.into());
        let existing = self.entries.iter_mut().find_map(|entry| match entry {
            Entry::Named(n, v) if *n == name => Some(v),
            _ => None,
        });
        match existing {
            Some(Value::Pairs(pairs)) => pairs.push(pair),
            Some(current) => *current = Value::Pairs(vec![pair]),
            None => self.entries.push(Entry::Named(name, Value::Pairs(vec![pair]))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Named(n, v) if n.as_str() == name => Some(v),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges `other` on top of `self`: named entries in `other` win on
    /// collision (keeping `self`'s position), everything else is appended.
    pub fn merge(&mut self, other: OptionSet) {
        for entry in other {
            self.push(entry);
        }
    }

    /// Returns `base` with `overrides` merged on top.
    pub fn merged(base: &OptionSet, overrides: OptionSet) -> OptionSet {
        let mut merged = base.clone();
        merged.merge(overrides);
        merged
    }
}
impl IntoIterator for OptionSet {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
impl FromIterator<Entry> for OptionSet {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.push(entry);
        }
        set
    }
}
impl Extend<Entry> for OptionSet {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

/// A single command-line token.
///
/// Only [`Value`](Arg::Value) tokens are shell-quoted when the command is
/// displayed; literals (flags, the binary, `cover`/`toc` markers) are shown
/// as-is. The process itself always receives the raw token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Arg {
    Literal(String),
    Value(String),
}
impl Arg {
    pub fn literal(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }

    pub fn value(s: impl Into<String>) -> Self {
        Self::Value(s.into())
    }

    /// The raw token handed to the process.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(s) | Self::Value(s) => s,
        }
    }

    /// The token as it appears in a human-readable command line.
    pub fn display(&self, escape: bool) -> Cow<'_, str> {
        match self {
            Self::Value(s) if escape => Cow::Owned(quote(s)),
            _ => Cow::Borrowed(self.as_str()),
        }
    }
}
impl Display for Arg {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Renders an option set into argument tokens, in insertion order.
pub fn render(options: &OptionSet) -> Vec<Arg> {
    let mut args = Vec::with_capacity(options.len() * 2);
    for entry in options.iter() {
        match entry {
            Entry::Flag(name) => args.push(Arg::Literal(format!("--{name}"))),
            Entry::Named(name, Value::Scalar(value)) => {
                args.push(Arg::Literal(format!("--{name}")));
                args.push(Arg::value(value));
            },
            Entry::Named(name, Value::List(items)) => {
                for item in items {
                    args.push(Arg::Literal(format!("--{name}")));
                    args.push(Arg::value(item));
                }
            },
            Entry::Named(name, Value::Pairs(pairs)) => {
                for (key, value) in pairs {
                    args.push(Arg::Literal(format!("--{name}")));
                    args.push(Arg::value(key));
                    args.push(Arg::value(value));
                }
            },
        }
    }
    args
}

/// Quotes a string so that a POSIX shell passes it through as one word.
#[cfg(not(windows))]
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Quotes a string for `cmd.exe`. Characters that cannot be escaped inside
/// double quotes are replaced with spaces.
#[cfg(windows)]
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace(['"', '%', '!'], " "))
}
