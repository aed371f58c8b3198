//! Configuration for the voice controller
//!
//! Loaded from a TOML file (default `~/.config/voicectl/config.toml`).
//! A missing file falls back to defaults; a malformed file is an error.
//! The wake word and bus URL can be overridden from the CLI/environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::Result;

/// Voice controller configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Wake word that must open an utterance
    pub wake_word: String,

    /// Bus connection settings
    pub bus: BusConfig,

    /// Session loop settings
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wake_word: "robot".to_string(),
            bus: BusConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Bus connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    /// Broker WebSocket URL
    pub url: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:9750".to_string(),
        }
    }
}

/// Session loop settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// How long to wait for a follow-up command after prompting
    pub command_timeout_secs: u64,

    /// LED to light while listening for a follow-up command
    pub led_name: String,

    /// Phrases to prompt with when the wake word came alone
    pub prompts: Vec<String>,

    /// Phrases acknowledging a received command
    pub acknowledgements: Vec<String>,

    /// Spoken when the follow-up window expires
    pub timeout_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 10,
            led_name: "red".to_string(),
            prompts: vec![
                "what's up?".to_string(),
                "what can i do for you?".to_string(),
                "what is it?".to_string(),
                "what now?".to_string(),
                "what do you need?".to_string(),
            ],
            acknowledgements: vec![
                "okay".to_string(),
                "you got it".to_string(),
                "sure thing".to_string(),
                "sure".to_string(),
            ],
            timeout_message: "you took too long.".to_string(),
        }
    }
}

impl SessionConfig {
    /// Follow-up listening window as a [`Duration`]
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(default_config_path, Path::to_path_buf);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Default config file path (`~/.config/voicectl/config.toml` on Linux)
#[must_use]
pub fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "voicectl").map_or_else(
        || PathBuf::from("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}
