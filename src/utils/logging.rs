//! Diagnostic logging. The TUI owns the terminal, so events go to a file and
//! only when asked for.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LINGA_LOG";
pub const DEFAULT_FILTER: &str = "warn";
const DEFAULT_LOG_FILE: &str = "linga.log";

/// Filter directive to install: the environment's if set and non-blank.
pub fn filter_directive(env_value: Option<&str>) -> String {
    env_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Where logs go: the explicit path, else the data directory when the
/// filter variable is set, else nowhere.
pub fn resolve_log_path(explicit: Option<&Path>, env_value: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    env_value?;
    ProjectDirs::from("org", "linga", "linga")
        .map(|dirs| dirs.data_local_dir().join(DEFAULT_LOG_FILE))
}

/// Install the global subscriber. Returns the log path when one was set up.
pub fn init_tracing(
    explicit: Option<&Path>,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let env_value = std::env::var(LOG_ENV).ok();
    let Some(path) = resolve_log_path(explicit, env_value.as_deref()) else {
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_new(filter_directive(env_value.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    tracing::info!(path = %path.display(), "Diagnostic logging enabled");
    Ok(Some(path))
}
