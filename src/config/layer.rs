//! Configuration layer
//!
//! A layer holds everything one scope declares. Scalars and the default
//! option set stay unset until declared, so merging can tell "declared
//! false" apart from "never mentioned". `finalize` fills the gaps.

use bindfs_options::{OptionError, OptionSet};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::defaults::LayerDefaults;
use super::folder::{BoundFolder, FolderError};
use super::state::{LayerState, TerminalState};
use super::version::{ToolVersion, VersionError};
use crate::validate::{UnknownValidation, ValidationCheck};

/// Scope a layer was declared in, lowest precedence first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerOrigin {
    /// User-wide defaults
    Global,
    /// Shipped with the base box
    Box,
    /// The project being provisioned
    #[default]
    Project,
    /// Command-line overrides
    Cli,
}

impl fmt::Display for LayerOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerOrigin::Global => "global",
            LayerOrigin::Box => "box",
            LayerOrigin::Project => "project",
            LayerOrigin::Cli => "cli",
        };
        write!(f, "{}", name)
    }
}

/// Layer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    #[error("Layer is {state:?}; declarations require a DECLARED layer (use redeclare)")]
    NotDeclared { state: LayerState },

    #[error("Layer is {state:?}; it must be finalized first")]
    NotFinalized { state: LayerState },

    #[error(transparent)]
    UnknownValidation(#[from] UnknownValidation),

    #[error(transparent)]
    Option(#[from] OptionError),

    #[error(transparent)]
    Folder(#[from] FolderError),

    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Scalar fields a scope declared itself, as opposed to values that
/// `finalize` filled in. Merging reads only declared values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Declared {
    pub(super) debug: bool,
    pub(super) install_from_source: bool,
    pub(super) tool_version: bool,
    pub(super) default_options: bool,
}

/// One scope's worth of bindfs configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub(super) origin: LayerOrigin,
    pub(super) debug: Option<bool>,
    pub(super) install_from_source: Option<bool>,
    pub(super) tool_version: Option<ToolVersion>,
    pub(super) default_options: Option<OptionSet>,
    pub(super) bound_folders: BTreeMap<String, BoundFolder>,
    pub(super) skip_validations: BTreeSet<ValidationCheck>,
    pub(super) declared: Declared,
    pub(super) state: LayerState,
}

impl ConfigLayer {
    /// Create an empty project-scoped layer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty layer for the given scope
    pub fn for_origin(origin: LayerOrigin) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    pub fn origin(&self) -> LayerOrigin {
        self.origin
    }

    pub fn state(&self) -> LayerState {
        self.state
    }

    pub fn debug(&self) -> bool {
        self.debug.unwrap_or(LayerDefaults::DEBUG)
    }

    pub fn install_from_source(&self) -> bool {
        self.install_from_source
            .unwrap_or(LayerDefaults::INSTALL_FROM_SOURCE)
    }

    pub fn tool_version(&self) -> ToolVersion {
        self.tool_version.clone().unwrap_or_default()
    }

    /// Default options, or the baseline if none were declared
    pub fn default_options(&self) -> OptionSet {
        self.default_options
            .clone()
            .unwrap_or_else(LayerDefaults::options)
    }

    /// Folders keyed by destination
    pub fn bound_folders(&self) -> &BTreeMap<String, BoundFolder> {
        &self.bound_folders
    }

    pub fn folder(&self, destination: &str) -> Option<&BoundFolder> {
        self.bound_folders.get(destination)
    }

    pub fn skip_validations(&self) -> &BTreeSet<ValidationCheck> {
        &self.skip_validations
    }

    pub fn is_skipped(&self, check: ValidationCheck) -> bool {
        self.skip_validations.contains(&check)
    }

    /// Options `folder` mounts with: defaults overlaid by the folder's own
    pub fn effective_options(&self, folder: &BoundFolder) -> OptionSet {
        folder.effective_options(&self.default_options())
    }

    pub(super) fn declared_debug(&self) -> Option<bool> {
        self.debug.filter(|_| self.declared.debug)
    }

    pub(super) fn declared_install_from_source(&self) -> Option<bool> {
        self.install_from_source
            .filter(|_| self.declared.install_from_source)
    }

    pub(super) fn declared_tool_version(&self) -> Option<&ToolVersion> {
        self.tool_version
            .as_ref()
            .filter(|_| self.declared.tool_version)
    }

    pub(super) fn declared_default_options(&self) -> Option<&OptionSet> {
        self.default_options
            .as_ref()
            .filter(|_| self.declared.default_options)
    }

    fn ensure_declared(&self) -> Result<(), LayerError> {
        if self.state.accepts_declarations() {
            Ok(())
        } else {
            Err(LayerError::NotDeclared { state: self.state })
        }
    }

    pub fn set_debug(&mut self, debug: bool) -> Result<(), LayerError> {
        self.ensure_declared()?;
        self.debug = Some(debug);
        self.declared.debug = true;
        Ok(())
    }

    pub fn set_install_from_source(&mut self, from_source: bool) -> Result<(), LayerError> {
        self.ensure_declared()?;
        self.install_from_source = Some(from_source);
        self.declared.install_from_source = true;
        Ok(())
    }

    pub fn set_tool_version(&mut self, version: ToolVersion) -> Result<(), LayerError> {
        self.ensure_declared()?;
        self.tool_version = Some(version);
        self.declared.tool_version = true;
        Ok(())
    }

    /// Replace the default options of this layer
    pub fn set_default_options(&mut self, options: OptionSet) -> Result<(), LayerError> {
        self.ensure_declared()?;
        self.default_options = Some(options);
        self.declared.default_options = true;
        Ok(())
    }

    /// Declare a folder binding; a later declaration for the same
    /// destination replaces the earlier one.
    pub fn bind_folder(
        &mut self,
        source: impl Into<String>,
        destination: impl Into<String>,
        options: OptionSet,
    ) -> Result<&BoundFolder, LayerError> {
        self.ensure_declared()?;
        let folder = BoundFolder::new(source, destination, options, self.origin)?;
        let key = folder.destination.clone();

        if let Some(previous) = self.bound_folders.insert(key.clone(), folder) {
            debug!(
                "{} layer: redeclared {} (was bound from {})",
                self.origin, key, previous.source
            );
        }

        Ok(&self.bound_folders[&key])
    }

    /// Skip a validation check; returns false if it was already skipped
    pub fn skip_validation(&mut self, check: ValidationCheck) -> Result<bool, LayerError> {
        self.ensure_declared()?;
        Ok(self.skip_validations.insert(check))
    }

    /// Fill every unset field with its default.
    ///
    /// Filled values are not marked as declared, so a later merge still
    /// treats them as unset. Idempotent: finalized and validated layers are
    /// left untouched.
    pub fn finalize(&mut self) {
        if self.state != LayerState::Declared {
            return;
        }

        self.debug.get_or_insert(LayerDefaults::DEBUG);
        self.install_from_source
            .get_or_insert(LayerDefaults::INSTALL_FROM_SOURCE);
        self.tool_version.get_or_insert_with(ToolVersion::default);
        self.default_options.get_or_insert_with(LayerDefaults::options);
        self.state = LayerState::Finalized;
    }

    /// Consuming variant of [`finalize`](Self::finalize)
    pub fn finalized(mut self) -> Self {
        self.finalize();
        self
    }

    /// Copy of this layer that accepts declarations again.
    pub fn redeclare(&self) -> Self {
        Self {
            state: LayerState::Declared,
            ..self.clone()
        }
    }

    pub(crate) fn mark_validated(&mut self) -> Result<(), LayerError> {
        if self.state.is_terminal() {
            return Ok(());
        }
        if !self.state.can_transition_to(LayerState::Validated) {
            return Err(LayerError::NotFinalized { state: self.state });
        }
        self.state = LayerState::Validated;
        Ok(())
    }
}
