//! Bound folder declarations

use bindfs_options::OptionSet;
use serde::{Deserialize, Serialize};

use super::layer::LayerOrigin;

/// Folder declaration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FolderError {
    #[error("Bound folder {0} path cannot be empty")]
    EmptyPath(&'static str),
}

/// A single `source -> destination` binding.
///
/// The destination is the folder's identity: a layer holds at most one
/// folder per destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundFolder {
    /// Path in the guest to expose
    pub source: String,

    /// Mount point in the guest
    pub destination: String,

    /// Per-folder bindfs options, layered over the defaults at compile time
    pub options: OptionSet,

    /// Scope that declared this folder
    pub owner: LayerOrigin,
}

impl BoundFolder {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        options: OptionSet,
        owner: LayerOrigin,
    ) -> Result<Self, FolderError> {
        let source = source.into();
        let destination = destination.into();

        if source.trim().is_empty() {
            return Err(FolderError::EmptyPath("source"));
        }
        if destination.trim().is_empty() {
            return Err(FolderError::EmptyPath("destination"));
        }

        Ok(Self {
            source,
            destination,
            options,
            owner,
        })
    }

    /// Identity key within a layer
    pub fn key(&self) -> &str {
        &self.destination
    }

    /// Options this folder mounts with, given the layer defaults
    pub fn effective_options(&self, defaults: &OptionSet) -> OptionSet {
        defaults.merge(&self.options)
    }
}
