//! Narration configuration.
//!
//! Loaded from `config.toml` in the application data directory. Missing
//! sections and fields fall back to their defaults.

use crate::accessibility::clock::DEFAULT_TICK_INTERVAL;
use crate::accessibility::screen_reader::DEFAULT_LIVE_REGION_COUNT;
use crate::accessibility::utterance::{UtteranceOptions, DEFAULT_STABILITY_DELAY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Queue timing and gates
    pub queue: QueueSettings,
    /// Live-region description channel
    pub description: DescriptionSettings,
    /// Speech synthesis channel
    pub voicing: VoicingSettings,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            queue: QueueSettings::default(),
            description: DescriptionSettings::default(),
            voicing: VoicingSettings::default(),
        }
    }
}

/// Announcement queue settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Accept and deliver alerts
    pub enabled: bool,
    /// Keep aging alerts but do not forward them
    pub muted: bool,
    /// Delivery-check cadence in milliseconds
    pub tick_interval_ms: u64,
    /// Default stability delay for raw alerts in milliseconds
    pub stability_delay_ms: u64,
    /// Default maximum delay for raw alerts in milliseconds (unbounded if absent)
    pub max_delay_ms: Option<u64>,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            muted: false,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            stability_delay_ms: DEFAULT_STABILITY_DELAY.as_millis() as u64,
            max_delay_ms: None,
        }
    }
}

impl QueueSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Utterance options matching these settings.
    pub fn utterance_options(&self) -> UtteranceOptions {
        let options = UtteranceOptions::default()
            .with_stability_delay(Duration::from_millis(self.stability_delay_ms));
        match self.max_delay_ms {
            Some(ms) => options.with_max_delay(Duration::from_millis(ms)),
            None => options,
        }
    }
}

/// Description channel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionSettings {
    /// Enable live-region descriptions
    pub enabled: bool,
    /// Live regions per politeness group
    pub live_region_count: usize,
}

impl Default for DescriptionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            live_region_count: DEFAULT_LIVE_REGION_COUNT,
        }
    }
}

/// Voicing channel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicingSettings {
    /// Enable speech output
    pub enabled: bool,
    /// Speech rate multiplier (0.5 - 2.0)
    pub rate: f32,
    /// Volume (0.0 - 1.0)
    pub volume: f32,
    /// Preferred voice identifier
    pub preferred_voice: Option<String>,
}

impl Default for VoicingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 1.0,
            volume: 1.0,
            preferred_voice: None,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "utterance-queue", "UtteranceQueue")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load configuration from the default location.
pub fn load_config() -> Result<NarrationConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load configuration from `path`, returning defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<NarrationConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(NarrationConfig {
            data_dir: get_data_dir(),
            ..Default::default()
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: NarrationConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = get_data_dir();

    Ok(config)
}

/// Save configuration to the default location.
pub fn save_config(config: &NarrationConfig) -> Result<(), ConfigError> {
    save_config_to(&get_config_path(), config)
}

/// Save configuration to `path`.
pub fn save_config_to(path: &Path, config: &NarrationConfig) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

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
