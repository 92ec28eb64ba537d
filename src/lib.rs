//! bindfs-plan - layered bindfs folder configuration
//!
//! Folders to bind into a virtual machine are declared in several scopes
//! (global, box, project, command line). This crate merges those layers,
//! validates the result and compiles each folder's options into the exact
//! bindfs arguments needed to mount it.

pub mod config;
pub mod install;
pub mod logging;
pub mod plan;
pub mod validate;

pub use bindfs_options::{OptionError, OptionSet, OptionValue};
pub use config::{
    merge, merge_layers, BoundFolder, ConfigLayer, LayerOrigin, LayerState, ToolVersion,
};
pub use install::{ensure_tool, InstallError, InstallSpec, InstallerGateway};
pub use plan::{mount_specs, EffectivePlan, MountSpec, PlanError, Planner};
pub use validate::{validate, Collaborators, ValidationCheck, ValidationReport, Validator};
