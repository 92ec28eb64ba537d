//! TOML layer files
//!
//! ```toml
//! debug = true
//! tool_version = "1.14.1"
//! skip_validations = ["user"]
//!
//! [default_options]
//! create_as_user = true
//!
//! [[bind]]
//! source = "/etc"
//! destination = "/etc-binded"
//! [bind.options]
//! group = "dummy"
//! ```

use bindfs_options::{OptionSet, RawOptions};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use super::layer::{ConfigLayer, LayerError, LayerOrigin};
use super::version::ToolVersion;
use crate::validate::ValidationCheck;

/// Raw contents of a layer file, before alias resolution
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerFile {
    pub debug: Option<bool>,
    pub install_from_source: Option<bool>,

    #[serde(alias = "bindfs_version", alias = "source_version")]
    pub tool_version: Option<String>,

    #[serde(default)]
    pub skip_validations: Vec<String>,

    /// Symbolic options in document order
    pub default_options: Option<RawOptions>,

    /// Folder bindings in declaration order
    #[serde(default)]
    pub bind: Vec<BindEntry>,
}

/// One `[[bind]]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindEntry {
    pub source: String,
    pub destination: String,

    #[serde(default)]
    pub options: RawOptions,
}

/// Where a layer came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSource {
    pub origin: LayerOrigin,

    /// File path (None for layers built in memory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl LayerSource {
    pub fn in_memory(origin: LayerOrigin) -> Self {
        Self {
            origin,
            path: None,
            digest: None,
        }
    }
}

/// A parsed layer plus its provenance
#[derive(Debug, Clone)]
pub struct LoadedLayer {
    pub layer: ConfigLayer,
    pub source: LayerSource,
}

/// Layer file errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid layer {path}: {source}")]
    Layer { path: String, source: LayerError },
}

impl LayerFile {
    /// Apply every declaration in this file to a fresh layer
    pub fn into_layer(self, origin: LayerOrigin) -> Result<ConfigLayer, LayerError> {
        let mut layer = ConfigLayer::for_origin(origin);

        if let Some(debug) = self.debug {
            layer.set_debug(debug)?;
        }
        if let Some(from_source) = self.install_from_source {
            layer.set_install_from_source(from_source)?;
        }
        if let Some(version) = self.tool_version {
            layer.set_tool_version(version.parse::<ToolVersion>()?)?;
        }
        if let Some(raw) = self.default_options {
            layer.set_default_options(OptionSet::from_pairs(raw)?)?;
        }
        for name in &self.skip_validations {
            layer.skip_validation(name.parse::<ValidationCheck>()?)?;
        }
        for entry in self.bind {
            let options = OptionSet::from_pairs(entry.options)?;
            layer.bind_folder(entry.source, entry.destination, options)?;
        }

        Ok(layer)
    }
}

/// Parse a layer from TOML text. `label` names the input in errors.
pub fn parse_layer(
    contents: &str,
    origin: LayerOrigin,
    label: &str,
) -> Result<ConfigLayer, LoadError> {
    let file: LayerFile = toml::from_str(contents).map_err(|e| LoadError::Parse {
        path: label.to_string(),
        message: e.to_string(),
    })?;

    file.into_layer(origin).map_err(|source| LoadError::Layer {
        path: label.to_string(),
        source,
    })
}

/// Load a layer file, recording its digest
pub fn load_layer(path: &Path, origin: LayerOrigin) -> Result<LoadedLayer, LoadError> {
    let label = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: label.clone(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes).map_err(|e| LoadError::Parse {
        path: label.clone(),
        message: format!("Invalid UTF-8: {}", e),
    })?;

    let layer = parse_layer(&contents, origin, &label)?;
    log::debug!(
        "loaded {} layer from {} ({} folders)",
        origin,
        label,
        layer.bound_folders().len()
    );

    Ok(LoadedLayer {
        layer,
        source: LayerSource {
            origin,
            path: Some(label),
            digest: Some(digest),
        },
    })
}
