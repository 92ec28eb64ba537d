//! Shared test fixtures
//!
//! - Layer files under `tests/fixtures/layers`
//! - passwd/group files under `tests/fixtures/accounts`
//! - In-memory probes and a recording installer

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bindfs_plan::config::ToolVersion;
use bindfs_plan::install::{InstallError, InstallSpec, InstallerGateway};
use bindfs_plan::validate::{FilesystemProbe, IdentityProbe};

/// Path to a layer fixture
pub fn layer_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/layers")
        .join(name)
}

/// Path to an account database fixture
pub fn accounts_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/accounts")
        .join(name)
}

/// Filesystem probe answering from a fixed list
pub struct StaticFilesystem(BTreeSet<String>);

impl StaticFilesystem {
    pub fn with(paths: &[&str]) -> Self {
        Self(paths.iter().map(|p| p.to_string()).collect())
    }
}

impl FilesystemProbe for StaticFilesystem {
    fn exists(&self, path: &str) -> bool {
        self.0.contains(path)
    }
}

/// Identity probe answering from a fixed list
pub struct StaticIdentities(BTreeSet<String>);

impl StaticIdentities {
    pub fn with(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl IdentityProbe for StaticIdentities {
    fn resolves(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// Installer that records every call
pub struct RecordingInstaller {
    pub package: Option<String>,
    pub failure: Option<InstallError>,
    pub searches: Mutex<Vec<ToolVersion>>,
    pub installs: Mutex<Vec<InstallSpec>>,
}

impl RecordingInstaller {
    pub fn new(package: Option<&str>) -> Self {
        Self {
            package: package.map(String::from),
            failure: None,
            searches: Mutex::new(Vec::new()),
            installs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: InstallError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(None)
        }
    }
}

impl InstallerGateway for RecordingInstaller {
    fn search_version(&self, version: &ToolVersion) -> Option<String> {
        self.searches.lock().unwrap().push(version.clone());
        self.package.clone()
    }

    fn ensure_installed(&self, spec: &InstallSpec) -> Result<(), InstallError> {
        self.installs.lock().unwrap().push(spec.clone());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_files_exist() {
        for name in ["global.toml", "box.toml", "project.toml"] {
            assert!(layer_path(name).exists(), "missing {}", name);
        }
        assert!(accounts_path("passwd").exists());
        assert!(accounts_path("group").exists());
    }
}
