//! Command-line arguments.

use clap::{ArgGroup, Args, Parser, Subcommand};
use htmlto_render::{Entry, Input, OptionSet, Value, is_url};
use std::path::PathBuf;

/// Read the page from standard input.
pub const STDIN: &str = "-";

#[derive(Debug, Parser)]
#[command(name = "htmlto")]
#[command(about = "Convert HTML to PDF or images with wkhtmltopdf/wkhtmltoimage")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to the user config directory.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Log debug output, including the composed command line.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render pages into a single PDF with wkhtmltopdf.
    Pdf(Convert),
    /// Render a page into an image with wkhtmltoimage.
    Image(Convert),
    /// Convert every matching file in a directory tree.
    Batch(Batch),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("destination").required(true).args(["output", "send"])))]
pub struct Convert {
    /// Global renderer option; repeat a name to pass it several times.
    #[arg(short = 'O', long = "option", value_name = "NAME[=VALUE]")]
    pub options: Vec<Entry>,
    /// Default option for every page and the cover.
    #[arg(short = 'P', long = "page-option", value_name = "NAME[=VALUE]")]
    pub page_options: Vec<Entry>,
    /// Cover page: URL, file, or `-` for standard input.
    #[arg(long, value_name = "INPUT")]
    pub cover: Option<String>,
    /// Insert a table of contents after the cover.
    #[arg(long)]
    pub toc: bool,
    /// Keep output produced by a renderer that exited with an error.
    #[arg(long)]
    pub ignore_warnings: bool,
    /// Write the result to this file.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Write a CGI-style response (headers and body) to standard output.
    #[arg(long)]
    pub send: bool,
    /// Filename offered to the client.
    #[arg(long, conflicts_with = "output")]
    pub filename: Option<String>,
    /// Ask the client to display the result instead of downloading it.
    #[arg(long, conflicts_with = "output")]
    pub inline: bool,
    /// Pages: URLs, files, or `-` for standard input.
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<String>,
}
impl Convert {
    pub fn options(&self) -> OptionSet {
        let mut options = collect(&self.options);
        if self.ignore_warnings {
            options.insert("ignore_warnings", "true");
        }
        options
    }

    pub fn page_options(&self) -> OptionSet {
        collect(&self.page_options)
    }

    /// How many of the cover and pages are `-`.
    pub fn stdin_inputs(&self) -> usize {
        self.cover.iter().chain(&self.inputs).filter(|token| *token == STDIN).count()
    }
}

#[derive(Debug, Args)]
pub struct Batch {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Extension of the files to convert.
    #[arg(long, default_value = "html")]
    pub extension: String,
    /// Produce a JPEG per file.
    #[arg(long)]
    pub image: bool,
    /// Produce a PDF per file (the default when no format is chosen).
    #[arg(long)]
    pub pdf: bool,
}

/// Renderer options that take a name and a value, given as `NAME=KEY=VALUE`.
const PAIR_OPTIONS: &[&str] = &["cookie", "custom-header", "post", "post-file", "replace"];

/// Builds an option set from command-line entries. A name given more than
/// once accumulates its values into a list, or into pairs for two-value
/// options.
pub fn collect(entries: &[Entry]) -> OptionSet {
    let mut options = OptionSet::new();
    for entry in entries.iter().cloned() {
        match entry {
            Entry::Named(name, Value::Scalar(value)) if PAIR_OPTIONS.contains(&name.as_str()) && value.contains('=') => {
                let (key, value) = value.split_once('=').unwrap_or_default();
                options.append_pair(name, key, value);
            },
            Entry::Named(name, Value::Scalar(value)) if options.get(&name).is_some() => options.append(name, value),
            entry => options.push(entry),
        }
    }
    options
}

/// Interprets a command-line input. Anything that is not a URL is a file;
/// inline markup only comes from standard input.
pub fn input(token: &str, stdin: impl FnOnce() -> std::io::Result<String>) -> std::io::Result<Input> {
    if token == STDIN {
        return Ok(Input::html(stdin()?));
    }
    Ok(match is_url(token) {
        true => Input::from(token),
        false => Input::from(PathBuf::from(token)),
    })
}
