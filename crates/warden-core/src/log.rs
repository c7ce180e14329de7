//! Logging setup on top of `tracing`.
//!
//! With file logging enabled, events go to `~/.config/warden/logs/warden.log`.
//! A log that has grown past the configured size is rotated to
//! `warden.log.1` at startup (one backup kept). Otherwise only warnings
//! and errors are printed to stderr. `RUST_LOG` overrides the level.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "warden.log";
const BACKUP_SUFFIX: &str = ".1";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether file logging is enabled. Defaults to `false`.
    pub enabled: bool,
    /// Minimum log level: "trace", "debug", "info", "warn", or "error".
    pub level: String,
    /// Maximum log file size in megabytes before rotation.
    pub max_file_mb: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".into(),
            max_file_mb: 10,
        }
    }
}

/// Installs the global subscriber. Call once at startup; later calls
/// are ignored.
pub fn init(config: &LogConfig) {
    let log_dir = crate::config::config_dir().map(|d| d.join("logs"));
    if config.enabled
        && let Some(file) = log_dir.and_then(|dir| open_log_file(&dir, config.max_file_mb))
    {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter(directive(&config.level)))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_writer(io::stderr)
        .try_init();
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Normalizes a configured level name, defaulting to `info`.
fn directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn open_log_file(dir: &Path, max_file_mb: u64) -> Option<File> {
    fs::create_dir_all(dir).ok()?;
    let path = dir.join(LOG_FILE_NAME);
    let _ = rotate_if_oversized(&path, rotation_threshold(max_file_mb));
    OpenOptions::new().create(true).append(true).open(&path).ok()
}

fn rotation_threshold(max_file_mb: u64) -> u64 {
    max_file_mb.saturating_mul(1024 * 1024)
}

/// Moves `path` to its `.1` backup when it has reached `max_bytes`.
///
/// Returns whether a rotation happened. A limit of zero disables it.
fn rotate_if_oversized(path: &Path, max_bytes: u64) -> io::Result<bool> {
    let Ok(meta) = fs::metadata(path) else {
        return Ok(false);
    };
    if max_bytes == 0 || meta.len() < max_bytes {
        return Ok(false);
    }
    fs::rename(path, backup_path(path))?;
    Ok(true)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}
