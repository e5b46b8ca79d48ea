//! Application path management for portable and installed modes.
//!
//! ## Mode Detection
//!
//! - **Portable mode**: If a `.portable` marker file exists next to the
//!   executable, the config lives in the same directory.
//! - **Installed mode** (default): The config lives in the user's config
//!   directory (`~/.config/deej` on Linux).

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name used in installed mode
const APP_NAME: &str = "deej";

/// Config file name in every mode
pub const CONFIG_FILE: &str = "config.yaml";

/// Application paths for config and logs.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Path to the configuration file
    pub config: PathBuf,
    /// Path to the logs directory
    pub logs_dir: PathBuf,
    /// Whether running in portable mode (config next to exe)
    pub is_portable: bool,
}

impl AppPaths {
    /// Detect the appropriate paths based on environment.
    ///
    /// **Debug mode**: If `config.yaml` exists in the current working directory
    /// (typical when running with `cargo run`), use that directory.
    ///
    /// Note: This is called before logging is initialized, so we use eprintln
    /// for early diagnostic output.
    pub fn detect() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        #[cfg(debug_assertions)]
        {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            if cwd.join(CONFIG_FILE).exists() {
                eprintln!(
                    "[paths] Running in DEV mode (config.yaml found in cwd: {})",
                    cwd.display()
                );
                return Self::portable(&cwd);
            }
        }

        if exe_dir.join(".portable").exists() {
            #[cfg(debug_assertions)]
            eprintln!("[paths] Running in PORTABLE mode (.portable marker found)");
            return Self::portable(&exe_dir);
        }

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| {
                eprintln!("[paths] WARNING: dirs::config_dir() returned None, falling back to exe dir");
                exe_dir.clone()
            })
            .join(APP_NAME);

        Self {
            config: config_dir.join(CONFIG_FILE),
            logs_dir: config_dir.join("logs"),
            is_portable: false,
        }
    }

    /// Paths rooted in a single directory
    pub fn portable(dir: &Path) -> Self {
        Self {
            config: dir.join(CONFIG_FILE),
            logs_dir: dir.join("logs"),
            is_portable: true,
        }
    }

    /// Paths for an explicitly chosen config file (`--config`)
    pub fn with_config(config: impl Into<PathBuf>) -> Self {
        let config = config.into();
        let base = config
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            logs_dir: base.join("logs"),
            config,
            is_portable: true,
        }
    }

    /// Ensure the config and logs directories exist.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(config_parent) = self.config.parent() {
            ensure_dir_exists(config_parent)?;
        }
        ensure_dir_exists(&self.logs_dir)
    }
}

fn ensure_dir_exists(path: &Path) -> anyhow::Result<()> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }

    debug!("Creating directory: {}", path.display());
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_config_uses_parent_dir() {
        let paths = AppPaths::with_config("/tmp/deej/custom.yaml");

        assert_eq!(paths.config, PathBuf::from("/tmp/deej/custom.yaml"));
        assert_eq!(paths.logs_dir, PathBuf::from("/tmp/deej/logs"));
    }

    #[test]
    fn test_ensure_directories_creates_tree() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::portable(&dir.path().join("nested"));

        paths.ensure_directories().unwrap();
        assert!(dir.path().join("nested").is_dir());
        assert!(paths.logs_dir.is_dir());

        // Second call is a no-op
        paths.ensure_directories().unwrap();
    }

    #[test]
    fn test_relative_config_has_no_parent_to_create() {
        let paths = AppPaths::with_config("config.yaml");
        assert_eq!(paths.config.parent(), Some(Path::new("")));
        assert_eq!(paths.logs_dir, PathBuf::from("logs"));
    }
}
