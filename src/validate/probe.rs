//! Probes the validator consults
//!
//! The validator never touches the guest itself; callers inject these.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

/// Answers whether a path exists where the folder will be bound
pub trait FilesystemProbe: Send + Sync {
    fn exists(&self, path: &str) -> bool;
}

/// Answers whether a user or group name resolves
pub trait IdentityProbe: Send + Sync {
    fn resolves(&self, name: &str) -> bool;
}

/// Checks paths on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl FilesystemProbe for LocalFilesystem {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

/// Names from a passwd- or group-formatted file (`name:x:...`).
///
/// Numeric ids always resolve; bindfs accepts them as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDatabase {
    names: BTreeSet<String>,
}

impl AccountDatabase {
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let names = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split(':').next())
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl IdentityProbe for AccountDatabase {
    fn resolves(&self, name: &str) -> bool {
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
        self.names.contains(name)
    }
}
