//! Persisted slider bindings
//!
//! Bindings live in the `slider_mapping` section of the config document.
//! The rest of the document is opaque and is written back untouched, in its
//! original key order.
//!
//! Every mutation is a full read-modify-write cycle, serialized through a
//! single lock per store. Share one store through `Arc` instead of creating
//! several stores for the same file.

pub mod slot;

use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub use slot::{SliderMapping, SliderSlot};

/// Top-level key holding the slider mapping
pub const MAPPING_KEY: &str = "slider_mapping";

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("Failed to {action} config file {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Unexpected shape in config file {path}: {reason}")]
    Format { path: PathBuf, reason: String },
    #[error("Failed to serialize config document: {0}")]
    Serialize(#[source] serde_yaml::Error),
    #[error("Refusing to bind an empty name")]
    EmptyName,
}

pub struct BindingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl BindingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bind `name` to slider `index`, moving it away from any other slider.
    ///
    /// `name` is stored exactly as given. Blank names are rejected.
    ///
    /// The file on disk is only replaced once the new document has been
    /// serialized, so a failure leaves the previous content in place.
    pub async fn add_binding(&self, name: &str, index: u32) -> Result<(), BindingError> {
        if name.trim().is_empty() {
            return Err(BindingError::EmptyName);
        }

        let _guard = self.lock.lock().await;

        let mut document = self.read_document().await?;
        let mut mapping = self.extract_mapping(&document)?;

        let previous = mapping.remove_everywhere(name);
        if !previous.is_empty() {
            debug!("Removed {} from sliders {:?}", name, previous);
        }
        mapping.append(index, name);

        document.insert(
            Value::String(MAPPING_KEY.to_string()),
            Value::Mapping(mapping.to_mapping()),
        );
        self.write_document(&document).await?;

        info!("Bound {} to slider {}", name, index);
        Ok(())
    }

    /// Current bindings, coerced to name lists.
    pub async fn bindings(&self) -> Result<BTreeMap<u32, Vec<String>>, BindingError> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;
        Ok(self.extract_mapping(&document)?.bindings())
    }

    async fn read_document(&self) -> Result<Mapping, BindingError> {
        let contents = fs::read_to_string(&self.path)
            .await
            .map_err(|source| BindingError::Io {
                action: "read",
                path: self.path.clone(),
                source,
            })?;

        let value: Value =
            serde_yaml::from_str(&contents).map_err(|source| BindingError::Parse {
                path: self.path.clone(),
                source,
            })?;

        match value {
            Value::Null => Ok(Mapping::new()),
            Value::Mapping(mapping) => Ok(mapping),
            _ => Err(self.format_error("top level is not a mapping")),
        }
    }

    fn extract_mapping(&self, document: &Mapping) -> Result<SliderMapping, BindingError> {
        match document.get(MAPPING_KEY) {
            None | Some(Value::Null) => Ok(SliderMapping::default()),
            Some(Value::Mapping(section)) => Ok(SliderMapping::from_mapping(section)),
            Some(_) => Err(self.format_error("slider_mapping is not a mapping")),
        }
    }

    /// Replace the file through a sibling temporary file and a rename.
    ///
    /// A symlinked config is followed so the link survives and the real file
    /// receives the change. The previous file mode is carried over.
    async fn write_document(&self, document: &Mapping) -> Result<(), BindingError> {
        let yaml = serde_yaml::to_string(document).map_err(BindingError::Serialize)?;

        let target = match fs::canonicalize(&self.path).await {
            Ok(target) => target,
            Err(e) => {
                debug!("Could not resolve {}: {}", self.path.display(), e);
                self.path.clone()
            }
        };
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config.yaml".to_string());
        let tmp_path = target.with_file_name(format!(".{}.tmp", file_name));

        let io_error = |source| BindingError::Io {
            action: "write",
            path: target.clone(),
            source,
        };

        fs::write(&tmp_path, yaml).await.map_err(io_error)?;

        let replaced = async {
            if let Ok(metadata) = fs::metadata(&target).await {
                fs::set_permissions(&tmp_path, metadata.permissions()).await?;
            }
            fs::rename(&tmp_path, &target).await
        };
        if let Err(e) = replaced.await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(io_error(e));
        }

        debug!("Config written to {}", target.display());
        Ok(())
    }

    fn format_error(&self, reason: &str) -> BindingError {
        BindingError::Format {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}
