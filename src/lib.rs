//! deej-bind - slider noise filtering and foreground window binding
//!
//! Library side of the `deej-bind` tool: filters noisy slider readings and
//! binds the process owning the focused window to a slider in `config.yaml`.

pub mod binding;
pub mod config;
pub mod filter;
pub mod paths;
pub mod process;
pub mod slider;
pub mod window;

pub use binding::{BindingError, BindingStore};
pub use config::AppConfig;
pub use filter::{is_significant, normalize, NoiseProfile};
pub use window::{ResolutionError, WindowResolver};
