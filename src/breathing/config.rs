//! Per-mode breathing defaults and configuration loading.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::types::Mode;

/// Default timing tuple for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeDefaults {
    /// Inhale phase length in seconds.
    pub inhale_seconds: f64,
    /// Exhale phase length in seconds.
    pub exhale_seconds: f64,
    /// Hold between exhale and the next inhale, in seconds.
    pub pause_seconds: f64,
    /// Default session length in seconds.
    pub total_duration_seconds: u32,
}

/// Immutable per-mode defaults, injected into the session manager.
///
/// A user's first parameter request for a mode copies the matching entry;
/// adaptation takes over from there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingConfig {
    /// Defaults for daily practice.
    pub daily: ModeDefaults,
    /// Defaults for the quick reset protocol.
    pub reset: ModeDefaults,
    /// Defaults for silent practice.
    pub silent: ModeDefaults,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            daily: ModeDefaults {
                inhale_seconds: 4.0,
                exhale_seconds: 6.0,
                pause_seconds: 0.0,
                total_duration_seconds: 360,
            },
            reset: ModeDefaults {
                inhale_seconds: 4.0,
                exhale_seconds: 8.0,
                pause_seconds: 2.0,
                total_duration_seconds: 60,
            },
            silent: ModeDefaults {
                inhale_seconds: 4.0,
                exhale_seconds: 6.0,
                pause_seconds: 0.0,
                total_duration_seconds: 360,
            },
        }
    }
}

impl BreathingConfig {
    /// The defaults entry for a mode.
    pub fn defaults_for(&self, mode: Mode) -> ModeDefaults {
        match mode {
            Mode::Daily => self.daily,
            Mode::Reset => self.reset,
            Mode::Silent => self.silent,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "breathflow", "BreathFlow")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load breathing configuration from file, falling back to the built-in
/// defaults when no file exists.
pub fn load_config() -> Result<BreathingConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        return Ok(BreathingConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let config: BreathingConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Save breathing configuration to file.
pub fn save_config(config: &BreathingConfig) -> Result<(), ConfigError> {
    let path = get_config_path();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
