use std::path::{Path, PathBuf};

use tracing::warn;

use super::Config;
use crate::{Error, Result};

/// Returns the config directory: `~/.config/warden/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("warden"))
}

/// Returns the config file path: `~/.config/warden/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Tries to load and parse `config.toml`.
pub fn try_load() -> Result<Config> {
    let path = config_path().ok_or(Error::Config("could not determine config path".into()))?;
    try_load_from(&path)
}

/// Tries to load and parse a config file, clamping values via
/// [`Config::validate`].
pub fn try_load_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    let mut config: Config =
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    config.validate();
    Ok(config)
}

/// Loads the configuration from disk, falling back to defaults.
///
/// A missing file silently yields defaults; other failures are logged.
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => Config::default(),
    }
}

/// Like [`load`], for an explicit path.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    try_load_from(path).unwrap_or_else(|e| {
        warn!("{e}");
        Config::default()
    })
}

/// Writes the configuration to `~/.config/warden/config.toml`.
pub fn save(config: &Config) -> Result<PathBuf> {
    let path = config_path().ok_or(Error::Config("could not determine config path".into()))?;
    save_to(&path, config)?;
    Ok(path)
}

/// Writes the configuration to `path`, creating parent directories.
pub fn save_to(path: &Path, config: &Config) -> Result<()> {
    let io_err = |e: std::io::Error| Error::Config(format!("{}: {e}", path.display()));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, content).map_err(io_err)
}
