//! Renderer process execution.

use crate::args::{Arg, quote};
use crate::binary;
use crate::kind::OutputKind;
use crate::settings::Settings;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command as Process, Stdio};
use tracing::instrument;

/// How a renderer run turned out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// Exit code zero.
    Success,
    /// Non-zero exit, but usable output was produced and warnings are ignored.
    SuccessWithWarnings,
    /// No usable output, or warnings are not ignored, or the process never ran.
    Failure,
}
impl Status {
    /// Classifies a finished run. `None` means the process was terminated
    /// without an exit code (e.g. by a signal).
    pub fn classify(exit_code: Option<i32>, output: &Path, ignore_warnings: bool) -> Self {
        if exit_code == Some(0) {
            return Self::Success;
        }
        match (has_output(output), ignore_warnings) {
            (true, true) => Self::SuccessWithWarnings,
            _ => Self::Failure,
        }
    }

    /// Whether the output can be used.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure)
    }
}

fn has_output(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
}

/// The outcome of running the renderer, including everything needed to
/// explain a failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandResult {
    command: String,
    exit_code: Option<i32>,
    stderr: String,
    status: Status,
    output_produced: bool,
    spawn_error: Option<String>,
}
impl CommandResult {
    fn spawn_failure(command: String, error: String) -> Self {
        Self {
            command,
            exit_code: None,
            stderr: String::new(),
            status: Status::Failure,
            output_produced: false,
            spawn_error: Some(error),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Captured standard error of the renderer.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// The command line that was run, for diagnostics.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the process never started.
    pub fn is_spawn_failure(&self) -> bool {
        self.spawn_error.is_some()
    }

    /// Renderer diagnostics for a run that was accepted despite warnings.
    pub fn warnings(&self) -> Option<&str> {
        match self.status {
            Status::SuccessWithWarnings => Some(&self.stderr),
            _ => None,
        }
    }

    /// A full explanation of a failed run: command line plus captured stderr.
    pub fn error(&self) -> Option<String> {
        if self.status != Status::Failure {
            return None;
        }
        if let Some(error) = &self.spawn_error {
            return Some(format!("could not run command {}: {error}", self.command));
        }
        let exit = match self.exit_code {
            Some(code) => format!("exited with code {code}"),
            None => "was terminated".to_string(),
        };
        let detail = match self.output_produced {
            true => " (output was produced but warnings are not ignored)",
            false => "",
        };
        Some(format!("command {} {exit}{detail}:\n{}", self.command, self.stderr.trim_end()))
    }
}

/// A fully assembled renderer invocation.
///
/// Arguments are handed to the process as a vector, never through a shell.
/// Quoting only affects the human-readable form produced by [`Display`].
#[derive(Clone, Debug)]
pub struct Command {
    program: PathBuf,
    args: Vec<Arg>,
    launcher: Option<(PathBuf, Vec<String>)>,
    env: BTreeMap<String, String>,
    escape: bool,
}
impl Command {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            launcher: None,
            env: BTreeMap::new(),
            escape: true,
        }
    }

    /// Builds an empty command from settings: binary discovery, virtual
    /// display wrapping, environment and display escaping.
    pub fn from_settings(kind: OutputKind, settings: &Settings) -> Self {
        let mut command = Self::new(binary::discover(kind, settings));
        if let Some(launcher) = binary::discover_launcher(settings) {
            command = command.launcher(launcher, settings.process.xvfb.args.clone());
        }
        command.env = settings.process.env.clone();
        command.escape = settings.escaping;
        command
    }

    /// Prefixes the invocation with a launcher and its fixed arguments.
    pub fn launcher(mut self, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        self.launcher = Some((program.into(), args));
        self
    }

    pub fn escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn arg(&mut self, arg: Arg) -> &mut Self {
        self.args.push(arg);
        self
    }

    pub fn args(&mut self, args: impl IntoIterator<Item = Arg>) -> &mut Self {
        self.args.extend(args);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The renderer's own arguments (without program or launcher).
    pub fn arguments(&self) -> &[Arg] {
        &self.args
    }

    /// The complete argument vector, starting with the executable.
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 4);
        if let Some((launcher, fixed)) = &self.launcher {
            argv.push(launcher.clone().into_os_string());
            argv.extend(fixed.iter().map(OsString::from));
        }
        argv.push(self.program.clone().into_os_string());
        argv.extend(self.args.iter().map(|arg| OsString::from(arg.as_str())));
        argv
    }

    /// Runs the command to completion and classifies the run against the
    /// expected `output` file.
    #[instrument(skip_all, fields(program = %self.program.display()))]
    pub fn execute(&self, output: &Path, ignore_warnings: bool) -> CommandResult {
        let line = self.to_string();
        tracing::debug!(command = %line, "Running renderer");
        let mut argv = self.argv().into_iter();
        let Some(executable) = argv.next() else {
            return CommandResult::spawn_failure(line, "empty command".to_string());
        };
        let result = Process::new(executable)
            .args(argv)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();
        let finished = match result {
            Ok(finished) => finished,
            Err(err) => {
                tracing::debug!(error = %err, "Renderer could not be started");
                return CommandResult::spawn_failure(line, err.to_string());
            },
        };
        let exit_code = finished.status.code();
        let status = Status::classify(exit_code, output, ignore_warnings);
        let stderr = String::from_utf8_lossy(&finished.stderr).into_owned();
        match status {
            Status::Success => tracing::debug!("Renderer finished"),
            Status::SuccessWithWarnings => {
                tracing::warn!(code = ?exit_code, stderr = %stderr.trim_end(), "Renderer reported errors; output kept")
            },
            Status::Failure => tracing::debug!(code = ?exit_code, "Renderer failed"),
        }
        CommandResult {
            command: line,
            exit_code,
            stderr,
            status,
            output_produced: has_output(output),
            spawn_error: None,
        }
    }

    fn display_path(&self, path: &Path) -> String {
        let path = path.to_string_lossy();
        if self.escape && path.contains(|c: char| c.is_whitespace() || "'\"$`\\;&|<>()*?".contains(c)) {
            quote(&path)
        } else {
            path.into_owned()
        }
    }
}
impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if let Some((launcher, fixed)) = &self.launcher {
            write!(f, "{} ", self.display_path(launcher))?;
            for arg in fixed {
                let shown = match self.escape {
                    true => quote(arg),
                    false => arg.clone(),
                };
                write!(f, "{shown} ")?;
            }
        }
        f.write_str(&self.display_path(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", arg.display(self.escape))?;
        }
        Ok(())
    }
}
