//! Stand-in renderer scripts for process-level tests.

use crate::args::quote;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A `/bin/sh` script that behaves like a renderer: it logs its arguments,
/// writes content to the last argument, prints to stderr, and exits with a
/// chosen code.
pub(crate) struct Renderer {
    dir: TempDir,
    exit_code: i32,
    stderr: String,
    content: String,
    content_env: Option<String>,
    write_output: bool,
}
impl Renderer {
    pub(crate) fn new() -> Self {
        let renderer = Self {
            dir: tempfile::tempdir().unwrap(),
            exit_code: 0,
            stderr: String::new(),
            content: "%PDF-1.4 fake".to_string(),
            content_env: None,
            write_output: true,
        };
        renderer.write();
        renderer
    }

    pub(crate) fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self.write();
        self
    }

    pub(crate) fn stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self.write();
        self
    }

    pub(crate) fn write_output(mut self, write: bool) -> Self {
        self.write_output = write;
        self.write();
        self
    }

    pub(crate) fn output_from_env(mut self, var: &str) -> Self {
        self.content_env = Some(var.to_string());
        self.write();
        self
    }

    pub(crate) fn path(&self) -> PathBuf {
        self.dir.path().join("renderer")
    }

    fn log(&self) -> PathBuf {
        self.dir.path().join("invocations.log")
    }

    /// Argument lines of every invocation so far.
    pub(crate) fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.log()).map(|s| s.lines().map(ToString::to_string).collect()).unwrap_or_default()
    }

    fn write(&self) {
        let content = match &self.content_env {
            Some(var) => format!("\"${var}\""),
            None => quote(&self.content),
        };
        let mut script = String::from("#!/bin/sh\n");
        script.push_str(&format!("printf '%s\\n' \"$*\" >> {}\n", quote(&self.log().to_string_lossy())));
        script.push_str("for last; do :; done\n");
        if self.write_output {
            script.push_str(&format!("printf '%s' {content} > \"$last\"\n"));
        }
        if !self.stderr.is_empty() {
            script.push_str(&format!("printf '%s\\n' {} >&2\n", quote(&self.stderr)));
        }
        script.push_str(&format!("exit {}\n", self.exit_code));
        write_executable(&self.path(), &script);
    }
}

/// A launcher script that records its first (fixed) argument, drops it, and
/// runs the rest of the command line.
pub(crate) struct Launcher {
    dir: TempDir,
}
impl Launcher {
    pub(crate) fn new() -> Self {
        let launcher = Self { dir: tempfile::tempdir().unwrap() };
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$1\" >> {}\nshift\nexec \"$@\"\n",
            quote(&launcher.log().to_string_lossy())
        );
        write_executable(&launcher.path(), &script);
        launcher
    }

    pub(crate) fn path(&self) -> PathBuf {
        self.dir.path().join("launcher")
    }

    fn log(&self) -> PathBuf {
        self.dir.path().join("launches.log")
    }

    pub(crate) fn launches(&self) -> Vec<String> {
        fs::read_to_string(self.log()).map(|s| s.lines().map(ToString::to_string).collect()).unwrap_or_default()
    }
}

/// Writes the script under a temporary name and renames it into place, so
/// the final path is never open for writing when it gets executed.
pub(crate) fn write_executable(path: &Path, script: &str) {
    let staging = path.with_extension("partial");
    fs::write(&staging, script).unwrap();
    fs::set_permissions(&staging, fs::Permissions::from_mode(0o755)).unwrap();
    fs::rename(&staging, path).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_replaces_existing_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renderer");
        write_executable(&path, "#!/bin/sh\nexit 1\n");
        write_executable(&path, "#!/bin/sh\nexit 0\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/bin/sh\nexit 0\n");
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o755);
        assert!(!path.with_extension("partial").exists());
        assert!(std::process::Command::new(&path).status().unwrap().success());
    }
}
