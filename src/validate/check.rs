//! Validation check identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validation check that can be skipped per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCheck {
    /// Every folder's source exists
    SourcePath,
    /// Referenced user names resolve
    User,
    /// Referenced group names resolve
    Group,
    /// File creation ownership options do not contradict each other
    Ownership,
}

impl ValidationCheck {
    /// Every check, in execution order
    pub const ALL: [ValidationCheck; 4] = [
        ValidationCheck::SourcePath,
        ValidationCheck::User,
        ValidationCheck::Group,
        ValidationCheck::Ownership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCheck::SourcePath => "source_path",
            ValidationCheck::User => "user",
            ValidationCheck::Group => "group",
            ValidationCheck::Ownership => "ownership",
        }
    }
}

impl fmt::Display for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raised when a skip list names a check that does not exist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown validation check '{0}' (expected one of: source_path, user, group, ownership)")]
pub struct UnknownValidation(pub String);

impl FromStr for ValidationCheck {
    type Err = UnknownValidation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidationCheck::ALL
            .into_iter()
            .find(|check| check.as_str() == s.trim())
            .ok_or_else(|| UnknownValidation(s.to_string()))
    }
}
