use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Configuration for an [`crate::AnnotationStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum observer dispatch depth at which a further mutation is still
    /// accepted. `None` disables the cap.
    pub max_dispatch_depth: Option<usize>,
    /// When `true`, mutations that change nothing emit no event.
    pub skip_empty_events: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_dispatch_depth: Some(64),
            skip_empty_events: true,
        }
    }
}

impl StoreConfig {
    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_toml_file(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// No reentrancy cap.
    pub fn unbounded() -> Self {
        Self {
            max_dispatch_depth: None,
            ..Default::default()
        }
    }
}
