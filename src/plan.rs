//! Effective mount plan
//!
//! Merges the layers, finalizes and validates the result, makes sure bindfs
//! is installed, then lists one mount specification per bound folder along
//! with where each contributing layer came from.

use bindfs_options::OptionSet;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::config::{
    merge_layers, ConfigLayer, LayerOrigin, LayerSource, LoadedLayer, ToolVersion,
};
use crate::install::{ensure_tool, InstallError, InstallSpec, InstallerGateway};
use crate::validate::{Collaborators, ValidationCheck, ValidationError, Validator};

/// Schema version for the effective plan
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "bindfs-plan/effective_plan@1";

/// Program the mount arguments are meant for
pub const BINDFS: &str = "bindfs";

/// One fully resolved bindfs mount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountSpec {
    pub source: String,
    pub destination: String,

    /// Scope that declared the folder
    pub owner: LayerOrigin,

    /// Defaults overlaid by the folder's own options
    pub options: OptionSet,

    /// `options` rendered as bindfs arguments
    pub args: Vec<String>,
}

impl MountSpec {
    /// Full command: `bindfs <args...> <source> <destination>`
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 3);
        argv.push(BINDFS.to_string());
        argv.extend(self.args.iter().cloned());
        argv.push(self.source.clone());
        argv.push(self.destination.clone());
        argv
    }
}

/// Mount specifications for every folder in `layer`, ordered by destination
pub fn mount_specs(layer: &ConfigLayer) -> Vec<MountSpec> {
    layer
        .bound_folders()
        .values()
        .map(|folder| {
            let options = layer.effective_options(folder);
            let args = options.to_tokens();
            MountSpec {
                source: folder.source.clone(),
                destination: folder.destination.clone(),
                owner: folder.owner,
                options,
                args,
            }
        })
        .collect()
}

/// Plan errors
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Install(#[from] InstallError),
}

/// The merged, validated configuration and the mounts it produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectivePlan {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this plan was computed
    pub created_at: DateTime<Utc>,

    pub debug: bool,
    pub install_from_source: bool,
    pub tool_version: ToolVersion,
    pub default_options: OptionSet,
    pub skip_validations: Vec<ValidationCheck>,

    /// Mounts in destination order
    pub mounts: Vec<MountSpec>,

    /// Contributing layers in precedence order
    pub sources: Vec<LayerSource>,

    /// What the installer was asked to do (None if not requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallSpec>,
}

impl EffectivePlan {
    /// Describe a finalized layer
    pub fn from_layer(
        layer: &ConfigLayer,
        sources: Vec<LayerSource>,
        install: Option<InstallSpec>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            debug: layer.debug(),
            install_from_source: layer.install_from_source(),
            tool_version: layer.tool_version(),
            default_options: layer.default_options(),
            skip_validations: layer.skip_validations().iter().copied().collect(),
            mounts: mount_specs(layer),
            sources,
            install,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }

    /// Mount for a destination
    pub fn mount(&self, destination: &str) -> Option<&MountSpec> {
        self.mounts.iter().find(|m| m.destination == destination)
    }

    /// Human-readable rendering
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("bindfs version: {}", self.tool_version));
        if self.install_from_source {
            out.push_str(" (from source)");
        }
        out.push('\n');
        if let Some(install) = &self.install {
            match install {
                InstallSpec::Package { name } => {
                    out.push_str(&format!("Install: package {}\n", name))
                }
                InstallSpec::Source { version } => {
                    out.push_str(&format!("Install: source build of {}\n", version))
                }
            }
        }
        out.push_str(&format!(
            "Default options: {}\n",
            self.default_options.to_tokens().join(" ")
        ));
        if !self.skip_validations.is_empty() {
            let skipped: Vec<&str> = self.skip_validations.iter().map(|c| c.as_str()).collect();
            out.push_str(&format!("Skipped checks: {}\n", skipped.join(", ")));
        }

        if self.mounts.is_empty() {
            out.push_str("No folders bound\n");
        } else {
            out.push_str(&format!("Mounts ({}):\n", self.mounts.len()));
            for mount in &self.mounts {
                out.push_str(&format!("  {} ({} layer)\n", mount.destination, mount.owner));
                out.push_str(&format!("    {}\n", mount.argv().join(" ")));
            }
        }

        out.push_str("Sources:\n");
        for source in &self.sources {
            match &source.path {
                Some(path) => out.push_str(&format!("  {}: {}\n", source.origin, path)),
                None => out.push_str(&format!("  {}\n", source.origin)),
            }
        }
        out
    }
}

/// Runs the merge → finalize → validate → install pipeline
pub struct Planner<'a> {
    probes: Collaborators<'a>,
    installer: Option<&'a dyn InstallerGateway>,
}

impl<'a> Planner<'a> {
    pub fn new(probes: Collaborators<'a>) -> Self {
        Self {
            probes,
            installer: None,
        }
    }

    /// Ensure bindfs through `installer` once the layers validate
    pub fn with_installer(mut self, installer: &'a dyn InstallerGateway) -> Self {
        self.installer = Some(installer);
        self
    }

    /// Build the plan for `layers`, lowest precedence first
    pub fn plan(&self, layers: &[LoadedLayer]) -> Result<EffectivePlan, PlanError> {
        let merged = merge_layers(layers.iter().map(|loaded| &loaded.layer)).finalized();
        debug!(
            "merged {} layer(s): {} folder(s), debug={}",
            layers.len(),
            merged.bound_folders().len(),
            merged.debug()
        );

        let layer = Validator::new(self.probes).validate_into(merged)?;

        let install = match self.installer {
            Some(gateway) => Some(ensure_tool(&layer, gateway)?),
            None => None,
        };

        let sources = layers.iter().map(|loaded| loaded.source.clone()).collect();
        let plan = EffectivePlan::from_layer(&layer, sources, install);
        info!("planned {} bindfs mount(s)", plan.mounts.len());
        Ok(plan)
    }
}
