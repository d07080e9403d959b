//! Engine configuration.
//!
//! Loaded from TOML, every field optional:
//!
//! ```toml
//! stale_answers = "exclude"
//!
//! [autosave]
//! enabled = true
//! debounce_ms = 1000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// What to do with answers whose question became hidden after an upstream change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleAnswerPolicy {
    /// Submit every recorded answer, visible or not.
    #[default]
    Retain,

    /// Submit only answers to questions on the current visible path.
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub enabled: bool,

    /// Trailing debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl AutosaveConfig {
    pub const DEFAULT_DEBOUNCE_MS: u64 = 1_000;

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: Self::DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub autosave: AutosaveConfig,
    pub stale_answers: StaleAnswerPolicy,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Disable autosave, keeping everything else.
    pub fn without_autosave(mut self) -> Self {
        self.autosave.enabled = false;
        self
    }
}
