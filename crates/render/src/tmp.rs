//! Temporary files backing in-memory inputs and rendered output.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};

const PREFIX: &str = "tmp_htmlto_";

/// A file with temporary content, deleted when released or dropped.
///
/// The file exists from construction until [`release`](Self::release) is
/// called or the value is dropped, whichever comes first. Releasing twice is
/// a no-op. The path stays readable after release so that diagnostics can
/// still refer to it.
///
/// ```
/// use htmlto_render::TempFile;
///
/// let mut tmp = TempFile::create("<html><h1>Hello</h1></html>", ".html", None)?;
/// let path = tmp.path().to_path_buf();
/// assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html><h1>Hello</h1></html>");
/// tmp.release()?;
/// assert!(!path.exists());
/// # Ok::<(), htmlto_render::error::Error>(())
/// ```
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    // `TempPath` holds no open handle, so the renderer is free to write to
    // the file on platforms with mandatory locking.
    inner: Option<TempPath>,
}
impl TempFile {
    /// Writes `content` to a new, uniquely named file in `directory` (or the
    /// system temp directory) whose name ends with `suffix`.
    pub fn create(content: impl AsRef<[u8]>, suffix: &str, directory: Option<&Path>) -> Result<Self> {
        let directory = match directory {
            Some(dir) => std::path::absolute(dir).or_raise(|| ErrorKind::TempFile(dir.to_path_buf()))?,
            None => std::env::temp_dir(),
        };
        let mut file = Builder::new()
            .prefix(PREFIX)
            .suffix(suffix)
            .tempfile_in(&directory)
            .or_raise(|| ErrorKind::TempFile(directory.clone()))?;
        let path = file.path().to_path_buf();
        file.write_all(content.as_ref()).or_raise(|| ErrorKind::TempFile(path.clone()))?;
        file.flush().or_raise(|| ErrorKind::TempFile(path.clone()))?;
        tracing::debug!(path = %path.display(), bytes = content.as_ref().len(), "Created temporary file");
        Ok(Self { path, inner: Some(file.into_temp_path()) })
    }

    /// Creates an empty temporary file, e.g. as the renderer's output target.
    pub fn empty(suffix: &str, directory: Option<&Path>) -> Result<Self> {
        Self::create(b"", suffix, directory)
    }

    /// Absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }

    /// Size of the file on disk, `None` if it is missing (or released).
    pub fn size(&self) -> Option<u64> {
        fs::metadata(&self.path).ok().map(|m| m.len())
    }

    /// Deletes the file. Safe to call more than once.
    pub fn release(&mut self) -> Result<()> {
        let Some(inner) = self.inner.take() else {
            return Ok(());
        };
        match inner.close() {
            Ok(()) => {},
            // Somebody else already removed it; the goal is achieved.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
            Err(err) => return Err(err).or_raise(|| ErrorKind::TempFile(self.path.clone())),
        }
        tracing::debug!(path = %self.path.display(), "Released temporary file");
        Ok(())
    }

    /// Copies the file to `destination`, returning the number of bytes copied.
    pub fn save_as(&self, destination: impl AsRef<Path>) -> Result<u64> {
        let destination = destination.as_ref();
        fs::copy(&self.path, destination).or_raise(|| ErrorKind::Save(destination.to_path_buf()))
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).or_raise(|| ErrorKind::Io)
    }
}
