//! Log setup.
//!
//! The terminal is owned by the UI, so logs go to a file next to the config
//! (`~/.config/sqlbridge/sqlbridge.log`). The filter comes from
//! `SQLBRIDGE_LOG` (same syntax as `RUST_LOG`) and defaults to `warn`.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config;

pub const LOG_ENV: &str = "SQLBRIDGE_LOG";

/// Filter from `SQLBRIDGE_LOG`, or `warn` when unset or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber writing to the default log file.
///
/// Returns the log path, or `None` when no config directory is known.
pub fn init() -> Result<Option<PathBuf>> {
    let Some(path) = config::log_path() else {
        return Ok(None);
    };
    init_with_path(&path)?;
    Ok(Some(path))
}

pub fn init_with_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}
