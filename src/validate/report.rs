//! Validation report types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::check::ValidationCheck;
use crate::config::LayerOrigin;

/// Machine-readable finding kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingKind {
    MissingSourcePath,
    UnknownIdentity,
    ConflictingOwnershipOptions,
}

/// One problem found by a check
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Finding {
    /// Folder the finding is about; None for the default options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    pub kind: FindingKind,

    /// Scope that declared the folder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<LayerOrigin>,

    pub message: String,
}

/// Findings grouped by check. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    findings: BTreeMap<ValidationCheck, Vec<Finding>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding, keeping each check's list sorted
    pub fn push(&mut self, check: ValidationCheck, finding: Finding) {
        let list = self.findings.entry(check).or_default();
        let pos = list.partition_point(|existing| existing <= &finding);
        list.insert(pos, finding);
    }

    /// Fold another report into this one; the result does not depend on
    /// which report arrived first.
    pub fn extend(&mut self, other: ValidationReport) {
        for (check, findings) in other.findings {
            for finding in findings {
                self.push(check, finding);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.findings.values().all(Vec::is_empty)
    }

    /// Total number of findings across all checks
    pub fn len(&self) -> usize {
        self.findings.values().map(Vec::len).sum()
    }

    pub fn get(&self, check: ValidationCheck) -> &[Finding] {
        self.findings.get(&check).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Checks that produced findings
    pub fn checks(&self) -> impl Iterator<Item = ValidationCheck> + '_ {
        self.findings
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(check, _)| *check)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ValidationCheck, &Finding)> {
        self.findings
            .iter()
            .flat_map(|(check, list)| list.iter().map(move |f| (*check, f)))
    }

    /// Flat `check -> messages` view
    pub fn messages(&self) -> BTreeMap<String, Vec<String>> {
        self.findings
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(check, list)| {
                (
                    check.to_string(),
                    list.iter().map(|f| f.message.clone()).collect(),
                )
            })
            .collect()
    }

    /// Human-readable rendering
    pub fn to_human(&self) -> String {
        if self.is_empty() {
            return "Validation passed".to_string();
        }

        let mut out = format!("Validation failed ({} finding(s)):\n", self.len());
        for (check, finding) in self.iter() {
            let target = finding.destination.as_deref().unwrap_or("default options");
            match finding.owner {
                Some(owner) => out.push_str(&format!(
                    "  [{}] {} ({} layer): {}\n",
                    check, target, owner, finding.message
                )),
                None => out.push_str(&format!("  [{}] {}: {}\n", check, target, finding.message)),
            }
        }
        out
    }
}
