//! Foreground window resolution
//!
//! Finds the window that currently has focus and maps it to the binary name
//! of the process owning its audio stream, so that a slider can be bound to
//! whatever the user is looking at.
//!
//! The chain is: compositor query -> identifying key (see [`strategy`]) ->
//! matching audio stream -> process binary.

pub mod hyprland;
pub mod pulse;
pub mod strategy;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::process::{CommandError, CommandRunner};
pub use hyprland::Hyprland;
pub use pulse::{AudioStream, PulseAudio};
pub use strategy::{StrategyKind, WindowIdentificationStrategy, WindowKey};

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("External query failed: {0}")]
    Command(#[from] CommandError),
    #[error("Compositor reported no active window")]
    NoActiveWindow,
    #[error("Active window has no '{0}' field")]
    MissingField(&'static str),
    #[error("Active window has an invalid pid: '{0}'")]
    InvalidProcessId(String),
    #[error("No audio stream belongs to window with {0}")]
    NoMatchingStream(WindowKey),
    #[error("Audio stream for window with {0} has no process binary")]
    MissingBinary(WindowKey),
}

/// Active window metadata as reported by the compositor (`key: value` lines)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowInfo {
    fields: Vec<(String, String)>,
}

impl WindowInfo {
    /// Parse `key: value` lines, splitting each on its first colon.
    pub fn parse(output: &str) -> Self {
        let fields = output
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .filter(|(key, _)| !key.is_empty())
            .collect();

        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Source of the focused window's metadata
#[async_trait]
pub trait CompositorQuery: Send + Sync {
    async fn active_window(&self) -> Result<WindowInfo, ResolutionError>;
}

/// Source of the audio server's live output streams
#[async_trait]
pub trait AudioSessionSource: Send + Sync {
    async fn streams(&self) -> Result<Vec<AudioStream>, ResolutionError>;
}

/// Result of a successful resolution. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub title: Option<String>,
    pub owners: Vec<String>,
}

pub struct WindowResolver {
    compositor: Box<dyn CompositorQuery>,
    audio: Box<dyn AudioSessionSource>,
    strategy: Box<dyn WindowIdentificationStrategy>,
}

impl WindowResolver {
    pub fn new(
        compositor: Box<dyn CompositorQuery>,
        audio: Box<dyn AudioSessionSource>,
        strategy: Box<dyn WindowIdentificationStrategy>,
    ) -> Self {
        Self {
            compositor,
            audio,
            strategy,
        }
    }

    /// Resolver for Hyprland sessions running PulseAudio (or pipewire-pulse)
    pub fn hyprland(runner: Arc<dyn CommandRunner>, strategy: StrategyKind) -> Self {
        Self::new(
            Box::new(Hyprland::new(runner.clone())),
            Box::new(PulseAudio::new(runner)),
            strategy.build(),
        )
    }

    /// Resolve the focused window to its owning process.
    pub async fn resolve(&self) -> Result<ResolvedWindow, ResolutionError> {
        let window = self.compositor.active_window().await?;
        let key = self.strategy.identify(&window)?;
        debug!("Active window identified by {}", key);

        let streams = self.audio.streams().await?;
        let stream = streams
            .iter()
            .find(|stream| stream.matches(&key))
            .ok_or_else(|| ResolutionError::NoMatchingStream(key.clone()))?;

        let binary = stream
            .process_binary()
            .ok_or(ResolutionError::MissingBinary(key))?
            .to_string();

        info!("Foreground window belongs to {}", binary);

        Ok(ResolvedWindow {
            title: window.title().map(str::to_string),
            owners: vec![binary],
        })
    }

    /// Process names owning the focused window. Contains exactly one name.
    pub async fn foreground_owner_process_names(&self) -> Result<Vec<String>, ResolutionError> {
        self.resolve().await.map(|resolved| resolved.owners)
    }
}
