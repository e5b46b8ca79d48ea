//! Strategies for identifying the owner of the active window
//!
//! Each desktop environment exposes a different field that can be tied back
//! to an audio stream. New environments plug in by implementing
//! [`WindowIdentificationStrategy`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ResolutionError, WindowInfo};

/// Key used to look up the audio stream belonging to a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowKey {
    ProcessId(u32),
    Class(String),
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowKey::ProcessId(pid) => write!(f, "pid {}", pid),
            WindowKey::Class(class) => write!(f, "class '{}'", class),
        }
    }
}

pub trait WindowIdentificationStrategy: Send + Sync {
    /// Extract the identifying key from the active window metadata.
    fn identify(&self, window: &WindowInfo) -> Result<WindowKey, ResolutionError>;
}

/// Identifies windows by the `pid` field
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessIdStrategy;

impl WindowIdentificationStrategy for ProcessIdStrategy {
    fn identify(&self, window: &WindowInfo) -> Result<WindowKey, ResolutionError> {
        let raw = window
            .get("pid")
            .ok_or(ResolutionError::MissingField("pid"))?;

        raw.parse::<u32>()
            .map(WindowKey::ProcessId)
            .map_err(|_| ResolutionError::InvalidProcessId(raw.to_string()))
    }
}

/// Identifies windows by the `class` field
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowClassStrategy;

impl WindowIdentificationStrategy for WindowClassStrategy {
    fn identify(&self, window: &WindowInfo) -> Result<WindowKey, ResolutionError> {
        match window.get("class") {
            Some(class) if !class.is_empty() => Ok(WindowKey::Class(class.to_string())),
            _ => Err(ResolutionError::MissingField("class")),
        }
    }
}

/// Strategy selected in the config (`window_resolution.strategy`)
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Pid,
    Class,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn WindowIdentificationStrategy> {
        match self {
            StrategyKind::Pid => Box::new(ProcessIdStrategy),
            StrategyKind::Class => Box::new(WindowClassStrategy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_strategy() {
        let window = WindowInfo::parse("\tclass: kitty\n\tpid: 4242\n");
        assert_eq!(
            ProcessIdStrategy.identify(&window).unwrap(),
            WindowKey::ProcessId(4242)
        );
    }

    #[test]
    fn test_pid_strategy_rejects_garbage() {
        let window = WindowInfo::parse("pid: -1\n");
        assert!(matches!(
            ProcessIdStrategy.identify(&window),
            Err(ResolutionError::InvalidProcessId(ref raw)) if raw == "-1"
        ));

        let window = WindowInfo::parse("class: kitty\n");
        assert!(matches!(
            ProcessIdStrategy.identify(&window),
            Err(ResolutionError::MissingField("pid"))
        ));
    }

    #[test]
    fn test_class_strategy() {
        let window = WindowInfo::parse("class: firefox\npid: 1\n");
        assert_eq!(
            WindowClassStrategy.identify(&window).unwrap(),
            WindowKey::Class("firefox".to_string())
        );

        let window = WindowInfo::parse("class:\n");
        assert!(WindowClassStrategy.identify(&window).is_err());
    }

    #[test]
    fn test_strategy_kind_from_yaml() {
        let kind: StrategyKind = serde_yaml::from_str("class").unwrap();
        assert_eq!(kind, StrategyKind::Class);
        assert!(serde_yaml::from_str::<StrategyKind>("title").is_err());
    }
}
