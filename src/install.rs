//! bindfs installation gateway
//!
//! The guest-side work (package managers, compiling sources) belongs to the
//! gateway implementation. This module only decides what to ask for.

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigLayer, ToolVersion};

/// What the gateway is asked to install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum InstallSpec {
    /// A package the guest's package manager provides
    Package { name: String },
    /// Build the given version from source
    Source { version: ToolVersion },
}

/// Errors reported by a gateway
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstallError {
    #[error("Failed to install package {package}: {message}")]
    PackageInstallFailed { package: String, message: String },

    #[error("Failed to build bindfs {version} from source: {message}")]
    SourceBuildFailed { version: ToolVersion, message: String },

    #[error("Guest does not support installing bindfs: {0}")]
    Unsupported(String),
}

/// Ensures bindfs is present in the guest
pub trait InstallerGateway: Send + Sync {
    /// Resolve `version` to an installable package name, if the guest has one
    fn search_version(&self, version: &ToolVersion) -> Option<String>;

    /// Install according to `spec`
    fn ensure_installed(&self, spec: &InstallSpec) -> Result<(), InstallError>;
}

/// Choose an install method for a finalized layer and run it.
///
/// Packages are preferred unless `install_from_source` is set; when no
/// package matches the requested version bindfs is built from source.
/// Gateway errors are returned as-is.
pub fn ensure_tool(
    layer: &ConfigLayer,
    gateway: &dyn InstallerGateway,
) -> Result<InstallSpec, InstallError> {
    let version = layer.tool_version();

    let spec = if layer.install_from_source() {
        InstallSpec::Source { version }
    } else {
        match gateway.search_version(&version) {
            Some(name) => InstallSpec::Package { name },
            None => {
                info!("no bindfs package matches {}, building from source", version);
                InstallSpec::Source { version }
            }
        }
    };

    match &spec {
        InstallSpec::Package { name } => info!("installing bindfs package {}", name),
        InstallSpec::Source { version } => info!("installing bindfs {} from source", version),
    }
    gateway.ensure_installed(&spec)?;
    Ok(spec)
}

/// Gateway that only logs what it would install
#[derive(Debug, Clone, Default)]
pub struct DryRunInstaller {
    /// Package name reported by `search_version`; None means no package
    pub package: Option<String>,
}

impl InstallerGateway for DryRunInstaller {
    fn search_version(&self, version: &ToolVersion) -> Option<String> {
        self.package.as_ref().map(|name| match version {
            ToolVersion::Latest => name.clone(),
            ToolVersion::Exact(v) => format!("{}-{}", name, v),
        })
    }

    fn ensure_installed(&self, spec: &InstallSpec) -> Result<(), InstallError> {
        info!("dry run: would install {:?}", spec);
        Ok(())
    }
}
