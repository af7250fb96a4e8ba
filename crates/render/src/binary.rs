use crate::kind::OutputKind;
use crate::settings::Settings;
use std::path::{Component, Path, PathBuf};

const XVFB_RUN: &str = "xvfb-run";

/// Resolves the renderer executable for `kind`.
///
/// Bare names are looked up on `PATH`. A miss is not an error here: the bare
/// name is returned so that the failure surfaces as a spawn failure, with the
/// full command line, on first use.
pub(crate) fn discover(kind: OutputKind, settings: &Settings) -> PathBuf {
    let configured = settings
        .process
        .command
        .clone()
        .or_else(|| settings.binary.clone())
        .unwrap_or_else(|| PathBuf::from(kind.default_binary()));
    if !is_bare_name(&configured) {
        return configured;
    }
    match which::which(&configured) {
        Ok(path) => path,
        Err(_) => {
            tracing::info!(binary = %configured.display(), "Renderer not found in PATH");
            configured
        },
    }
}

/// Resolves the virtual display launcher, if wrapping is enabled and a
/// launcher can be found.
pub(crate) fn discover_launcher(settings: &Settings) -> Option<PathBuf> {
    let xvfb = &settings.process.xvfb;
    if !xvfb.enabled {
        return None;
    }
    if let Some(binary) = &xvfb.binary {
        return Some(binary.clone());
    }
    match which::which(XVFB_RUN) {
        Ok(path) => Some(path),
        Err(_) => {
            tracing::warn!("Virtual display requested but xvfb-run not found in PATH; running unwrapped");
            None
        },
    }
}

fn is_bare_name(path: &Path) -> bool {
    let mut components = path.components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}
