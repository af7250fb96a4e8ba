//! Converts every matching file in a directory tree.
//!
//! Each matching file `<input>/.../<dir>/<name>.<ext>` is rendered once per
//! [`Target`] to `<output>/<dir>/<name><suffix>`, where `<dir>` is the name
//! of the file's immediate parent directory. Per-file failures are collected
//! in the [`Report`] instead of stopping the run.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use htmlto_render::{Document, OptionSet, OutputKind, Settings, Status};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_EXTENSION: &str = "html";

/// One output format to produce for every input file.
#[derive(Clone, Debug, Default)]
pub struct Target {
    pub kind: OutputKind,
    pub settings: Settings,
    pub options: OptionSet,
    pub page_options: OptionSet,
}
impl Target {
    pub fn new(kind: OutputKind) -> Self {
        Self { kind, ..Self::default() }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    pub fn page_options(mut self, options: OptionSet) -> Self {
        self.page_options = options;
        self
    }
}

#[derive(Debug)]
pub struct Converted {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub status: Status,
}

#[derive(Debug)]
pub struct Failed {
    pub source: PathBuf,
    pub kind: OutputKind,
    pub error: error::Error,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct Report {
    pub converted: Vec<Converted>,
    pub failed: Vec<Failed>,
}
impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Batch {
    input: PathBuf,
    output: PathBuf,
    extension: String,
    targets: Vec<Target>,
}
impl Batch {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            targets: Vec::new(),
        }
    }

    /// Extension of the files to convert, with or without the leading dot.
    /// Matched case-insensitively.
    pub fn extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim_start_matches('.').to_ascii_lowercase();
        self
    }

    /// Adds an output format. Without any, a single default PDF target is used.
    pub fn target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    /// Matching files under the input directory, sorted. Entries that cannot
    /// be read are logged and skipped.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let root = fs::read_dir(&self.input).or_raise(|| ErrorKind::InputDir(self.input.clone()))?;
        let mut files = Vec::new();
        let mut pending = vec![root];
        while let Some(entries) = pending.pop() {
            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::warn!(error = %err, "Skipping unreadable directory entry");
                        continue;
                    },
                };
                let path = entry.path();
                match entry.file_type() {
                    Ok(t) if t.is_dir() => match fs::read_dir(&path) {
                        Ok(entries) => pending.push(entries),
                        Err(err) => tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable directory"),
                    },
                    Ok(_) if self.matches(&path) => files.push(path),
                    Ok(_) => {},
                    Err(err) => tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable entry"),
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }

    /// Where `file` is written for `kind`.
    pub fn destination(&self, file: &Path, kind: OutputKind) -> PathBuf {
        let dir = file.parent().and_then(Path::file_name).unwrap_or_default();
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        self.output.join(dir).join(format!("{stem}{}", kind.suffix()))
    }

    /// Converts every matching file for every target.
    pub fn run(&self) -> Result<Report> {
        let default = [Target::new(OutputKind::Pdf)];
        let targets = match self.targets.is_empty() {
            true => &default[..],
            false => &self.targets[..],
        };
        let files = self.files()?;
        tracing::info!(input = %self.input.display(), files = files.len(), targets = targets.len(), "Starting batch");
        let mut report = Report::default();
        for file in files {
            for target in targets {
                match self.convert(&file, target) {
                    Ok((destination, status)) => {
                        tracing::info!(source = %file.display(), destination = %destination.display(), "Converted");
                        report.converted.push(Converted { source: file.clone(), destination, status });
                    },
                    Err(error) => {
                        tracing::warn!(source = %file.display(), kind = ?target.kind, error = %*error, "Conversion failed");
                        report.failed.push(Failed { source: file.clone(), kind: target.kind, error });
                    },
                }
            }
        }
        tracing::info!(converted = report.converted.len(), failed = report.failed.len(), "Batch finished");
        Ok(report)
    }

    fn convert(&self, file: &Path, target: &Target) -> Result<(PathBuf, Status)> {
        let destination = self.destination(file, target.kind);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).or_raise(|| ErrorKind::OutputDir(parent.to_path_buf()))?;
        }
        let mut document = Document::with_settings(target.kind, target.settings.clone());
        document.set_options(target.options.clone()).map_err(ErrorKind::render)?;
        document.set_page_options(target.page_options.clone()).map_err(ErrorKind::render)?;
        document.add_page(file, OptionSet::new()).map_err(ErrorKind::render)?;
        let status = document.save_as(&destination).map_err(ErrorKind::render)?;
        document.close().map_err(ErrorKind::render)?;
        Ok((destination, status))
    }
}
