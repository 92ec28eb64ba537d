//! bindfs version specifier

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Sentinel accepted in place of a version number.
pub const LATEST: &str = "latest";

/// Requested bindfs version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ToolVersion {
    /// Whatever the installer considers newest
    #[default]
    Latest,
    /// Exact dotted version (e.g., "1.14.1")
    Exact(String),
}

/// Version parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid bindfs version '{0}' (expected 'latest' or a dotted version like 1.14.1)")]
    InvalidVersion(String),
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(\.\d+)*$").expect("static pattern"))
}

impl ToolVersion {
    pub fn is_latest(&self) -> bool {
        matches!(self, ToolVersion::Latest)
    }
}

impl FromStr for ToolVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == LATEST {
            return Ok(ToolVersion::Latest);
        }
        if version_pattern().is_match(trimmed) {
            Ok(ToolVersion::Exact(trimmed.to_string()))
        } else {
            Err(VersionError::InvalidVersion(s.to_string()))
        }
    }
}

impl TryFrom<String> for ToolVersion {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ToolVersion> for String {
    fn from(version: ToolVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolVersion::Latest => write!(f, "{}", LATEST),
            ToolVersion::Exact(v) => write!(f, "{}", v),
        }
    }
}
