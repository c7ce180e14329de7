mod loader;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::log::LogConfig;
use crate::reaction::ReactionScripts;
use crate::watchdog::{MAX_FREQUENCY_HZ, MonitoredTarget};

pub use loader::{config_dir, config_path, load, load_from, save, save_to, try_load, try_load_from};

/// Top-level configuration for warden.
///
/// Loaded from `~/.config/warden/config.toml`. Missing sections
/// fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The process the watchdog samples.
    pub monitor: MonitorConfig,
    /// Scripts run on watchdog transitions.
    pub reactions: ReactionConfig,
    /// File logging.
    pub logging: LogConfig,
}

/// Watchdog target settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Process image name, `.exe` optional (e.g. "notepad.exe").
    pub process: String,
    /// Working set limit in kilobytes.
    pub memory_limit_kb: u64,
    /// Samples per second (1–1000).
    pub frequency_hz: u32,
}

/// Reaction script locations. Relative paths resolve against the
/// config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    /// Run when a process crosses the limit.
    pub danger: PathBuf,
    /// Run when every process is back under the limit.
    pub safe: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            process: "notepad.exe".into(),
            memory_limit_kb: 1024 * 1024,
            frequency_hz: 1,
        }
    }
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            danger: "danger.txt".into(),
            safe: "safe.txt".into(),
        }
    }
}

impl ReactionConfig {
    /// Resolves both script paths against `base`.
    pub fn resolve(&self, base: &Path) -> ReactionScripts {
        ReactionScripts {
            danger: base.join(&self.danger),
            safe: base.join(&self.safe),
        }
    }
}

impl Config {
    /// Clamps values to the ranges the watchdog accepts.
    pub fn validate(&mut self) {
        self.monitor.frequency_hz = self.monitor.frequency_hz.clamp(1, MAX_FREQUENCY_HZ);
        self.monitor.process = self.monitor.process.trim().to_string();
    }

    /// Builds the watchdog target from the monitor section.
    pub fn target(&self) -> Result<MonitoredTarget> {
        MonitoredTarget::new(
            self.monitor.process.clone(),
            self.monitor.memory_limit_kb,
            self.monitor.frequency_hz,
        )
    }

    /// Copies a (possibly changed) target back into the monitor section.
    pub fn record_target(&mut self, target: &MonitoredTarget) {
        self.monitor.process = target.process_name.clone();
        self.monitor.memory_limit_kb = target.memory_limit_kb;
        self.monitor.frequency_hz = target.frequency_hz();
    }
}
