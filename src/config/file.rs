//! Configuration file management for khel.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Rep counter backend used during recording.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CounterMode {
    /// Luma-motion heuristic fed by sampled frames
    #[default]
    Motion,
    /// Mocked counter on a randomized pace, ignoring frames
    Paced,
}

impl std::fmt::Display for CounterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Motion => write!(f, "motion"),
            Self::Paced => write!(f, "paced"),
        }
    }
}

/// Camera capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Camera device. Options:
    /// - "default" for the platform default camera
    /// - a device node like "/dev/video1" (Linux)
    /// - an avfoundation spec like "0:none" (macOS)
    pub device: String,
    /// Audio input device for the recording soundtrack, or empty to record video only
    #[serde(default = "default_audio_device")]
    pub audio_device: String,
    /// Recorded video size as WIDTHxHEIGHT
    #[serde(default = "default_video_size")]
    pub video_size: String,
    /// Recorded frame rate
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    /// Width of the downscaled frames fed to the rep counter
    #[serde(default = "default_sample_width")]
    pub sample_width: u32,
    /// Height of the downscaled frames fed to the rep counter
    #[serde(default = "default_sample_height")]
    pub sample_height: u32,
    /// Milliseconds between sampling ticks while recording
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Deadline in seconds for a single capture start/stop call
    #[serde(default = "default_op_timeout_secs")]
    pub op_timeout_secs: u64,
}

fn default_audio_device() -> String {
    "default".to_string()
}

fn default_video_size() -> String {
    "640x480".to_string()
}

fn default_framerate() -> u32 {
    30
}

fn default_sample_width() -> u32 {
    160
}

fn default_sample_height() -> u32 {
    120
}

fn default_sample_interval_ms() -> u64 {
    500
}

fn default_op_timeout_secs() -> u64 {
    10
}

/// Rep counter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Counter backend: "motion" (frame-based) or "paced" (mocked)
    #[serde(default)]
    pub mode: CounterMode,
}

/// Upload configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Assessment endpoint URL. Empty keeps videos local (archived under
    /// the data directory).
    #[serde(default)]
    pub endpoint: String,
}

/// Complete application configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct KhelConfig {
    pub capture: CaptureConfig,
    #[serde(default)]
    pub counter: CounterConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl KhelConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        let config: KhelConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }

    /// Returns default configuration values.
    #[allow(dead_code)]
    pub(crate) fn default() -> Self {
        KhelConfig {
            capture: CaptureConfig {
                device: "default".to_string(),
                audio_device: default_audio_device(),
                video_size: default_video_size(),
                framerate: default_framerate(),
                sample_width: default_sample_width(),
                sample_height: default_sample_height(),
                sample_interval_ms: default_sample_interval_ms(),
                op_timeout_secs: default_op_timeout_secs(),
            },
            counter: CounterConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

/// Retrieves the path to the config file.
///
/// Assumes the config file exists (created by setup if needed).
///
/// # Errors
/// - If the config directory cannot be determined
/// - If the config directory cannot be created
fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let config_dir = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    let config_path = config_dir.join(".config").join("khel").join("khel.toml");

    std::fs::create_dir_all(config_path.parent().unwrap())?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: KhelConfig = toml::from_str(
            r#"
            [capture]
            device = "/dev/video1"
            "#,
        )
        .unwrap();

        assert_eq!(config.capture.device, "/dev/video1");
        assert_eq!(config.capture.sample_interval_ms, 500);
        assert_eq!(config.capture.op_timeout_secs, 10);
        assert_eq!(config.counter.mode, CounterMode::Motion);
        assert!(config.upload.endpoint.is_empty());
    }

    #[test]
    fn test_counter_mode_parses_lowercase() {
        let config: KhelConfig = toml::from_str(
            r#"
            [capture]
            device = "default"

            [counter]
            mode = "paced"
            "#,
        )
        .unwrap();

        assert_eq!(config.counter.mode, CounterMode::Paced);
    }
}
