//! Simple configuration persistence for ducker
//!
//! Stores the ducking and silence detection parameters in a key=value file.

use ducker_analysis::SilenceDetectorConfig;
use ducker_audio::{ClipMode, DuckingConfig, EnvelopePolicy, GainMapping};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading the config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid value for {key} on line {line}: {value:?}")]
    InvalidValue {
        key: String,
        value: String,
        line: usize,
    },
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Engine parameters
    pub ducking: DuckingConfig,
    /// Native silence detector parameters
    pub silence: SilenceDetectorConfig,
}

impl AppConfig {
    /// Load config from the default location
    ///
    /// Returns the default config if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ducker")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut transition_secs: Option<f64> = None;

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            let invalid = || ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                line: idx + 1,
            };

            match key {
                "duck_amount_db" => {
                    config.ducking.duck_amount_db = value.parse().map_err(|_| invalid())?;
                }
                "envelope_policy" => {
                    config.ducking.envelope =
                        EnvelopePolicy::from_name(value).ok_or_else(invalid)?;
                }
                "transition_secs" => {
                    transition_secs = Some(value.parse().map_err(|_| invalid())?);
                }
                "chunk_length_ms" => {
                    config.ducking.chunk_length_ms = value.parse().map_err(|_| invalid())?;
                }
                "tail_secs" => {
                    config.ducking.tail_secs = value.parse().map_err(|_| invalid())?;
                }
                "gain_mapping" => {
                    config.ducking.gain_mapping =
                        GainMapping::from_name(value).ok_or_else(invalid)?;
                }
                "clip" => {
                    config.ducking.clip = ClipMode::from_name(value).ok_or_else(invalid)?;
                }
                "silence_threshold_db" => {
                    config.silence.threshold_db = value.parse().map_err(|_| invalid())?;
                }
                "min_silence_secs" => {
                    config.silence.min_silence_secs = value.parse().map_err(|_| invalid())?;
                }
                _ => tracing::debug!("Ignoring unknown config key {}", key),
            }
        }

        // Applied last so it overrides the policy's default regardless of line order
        if let Some(secs) = transition_secs {
            config.ducking.envelope = config.ducking.envelope.with_duration_secs(secs);
        }

        Ok(config)
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let d = &self.ducking;
        let lines = [
            "# ducker configuration".to_string(),
            format!("duck_amount_db={}", d.duck_amount_db),
            format!("envelope_policy={}", d.envelope.name()),
            format!("transition_secs={}", d.envelope.duration_secs()),
            format!("chunk_length_ms={}", d.chunk_length_ms),
            format!("tail_secs={}", d.tail_secs),
            format!("gain_mapping={}", d.gain_mapping.name()),
            format!("clip={}", d.clip.name()),
            format!("silence_threshold_db={}", self.silence.threshold_db),
            format!("min_silence_secs={}", self.silence.min_silence_secs),
        ];

        lines.join("\n")
    }
}
