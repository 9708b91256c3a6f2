//! Archive configuration, loadable from TOML or JSON

use crate::error::{ArchiveError, ArchiveResult};
use serde::{Deserialize, Serialize};
use solarch_compress::CompressorConfig;
use std::path::Path;

/// Settings for an [`crate::Archiver`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Compressor and scratch directory.
    pub compressor: CompressorConfig,
    /// Object key prefix for batch files and the status manifest.
    pub store_prefix: String,
    /// Storage class requested for batch uploads.
    pub storage_class: String,
    /// Content type of uploaded objects.
    pub content_type: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compressor: CompressorConfig::default(),
            store_prefix: String::from("archive/sol"),
            storage_class: String::from("GLACIER_IR"),
            content_type: String::from("application/x-xz"),
        }
    }
}

impl ArchiveConfig {
    /// Load from a `.toml` or `.json` file; missing fields take defaults.
    pub fn from_file(path: &Path) -> ArchiveResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => toml::from_str(&contents).map_err(|e| ArchiveError::Config(e.to_string())),
            "json" => {
                serde_json::from_str(&contents).map_err(|e| ArchiveError::Config(e.to_string()))
            }
            _ => Err(ArchiveError::Config(format!(
                "Unsupported config file extension: {}",
                ext
            ))),
        }
    }
}
