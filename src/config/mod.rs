//! Configuration management for deej-bind
//!
//! Typed, read-only view of `config.yaml`. The `slider_mapping` section is
//! owned by [`crate::binding::BindingStore`] and is ignored here, as are any
//! other keys this crate does not use.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use crate::filter::NoiseProfile;
use crate::window::StrategyKind;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub noise_reduction: NoiseProfile,
    #[serde(default)]
    pub invert_sliders: bool,
    #[serde(default)]
    pub window_resolution: WindowResolutionConfig,
}

/// Foreground window lookup settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WindowResolutionConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl Default for WindowResolutionConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl WindowResolutionConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn parse(contents: &str) -> Result<Self> {
        // An empty document means "all defaults"
        let config: AppConfig = if contents.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.window_resolution.command_timeout_ms == 0 {
            anyhow::bail!("window_resolution.command_timeout_ms must be greater than 0");
        }

        Ok(())
    }
}

fn default_command_timeout_ms() -> u64 { 2000 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.noise_reduction, NoiseProfile::Default);
        assert!(!config.invert_sliders);
        assert_eq!(config.window_resolution.strategy, StrategyKind::Pid);
        assert_eq!(config.window_resolution.command_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_full_config_ignores_unknown_keys() {
        let config = AppConfig::parse(
            r#"
slider_mapping:
  0: master
  1: [chrome.exe, 12]
invert_sliders: true
com_port: COM4
baud_rate: 9600
noise_reduction: high
window_resolution:
  strategy: class
  command_timeout_ms: 500
"#,
        )
        .unwrap();

        assert_eq!(config.noise_reduction, NoiseProfile::High);
        assert!(config.invert_sliders);
        assert_eq!(config.window_resolution.strategy, StrategyKind::Class);
        assert_eq!(config.window_resolution.command_timeout_ms, 500);
    }

    #[test]
    fn test_unknown_noise_level_falls_back() {
        let config = AppConfig::parse("noise_reduction: medium\n").unwrap();
        assert_eq!(config.noise_reduction, NoiseProfile::Default);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = AppConfig::parse("window_resolution:\n  command_timeout_ms: 0\n").unwrap_err();
        assert!(err.to_string().contains("command_timeout_ms"));
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        assert!(AppConfig::parse("window_resolution:\n  strategy: title\n").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AppConfig::load(dir.path().join("nope.yaml")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
