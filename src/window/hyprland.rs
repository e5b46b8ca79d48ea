//! Active window query through `hyprctl`

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{CompositorQuery, ResolutionError, WindowInfo};
use crate::process::CommandRunner;

pub struct Hyprland {
    runner: Arc<dyn CommandRunner>,
}

impl Hyprland {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl CompositorQuery for Hyprland {
    async fn active_window(&self) -> Result<WindowInfo, ResolutionError> {
        let output = self.runner.output("hyprctl", &["activewindow"]).await?;
        let window = WindowInfo::parse(&output);

        // hyprctl prints "Invalid" when nothing has focus
        if window.is_empty() {
            return Err(ResolutionError::NoActiveWindow);
        }

        debug!("Active window has {} fields", window.len());
        Ok(window)
    }
}
