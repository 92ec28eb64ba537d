//! Layer validation
//!
//! Runs every check not listed in the layer's `skip_validations` and
//! collects all findings into one report. Checks never stop at the first
//! failure and never modify the layer.

mod check;
mod probe;
mod report;

pub use check::{UnknownValidation, ValidationCheck};
pub use probe::{AccountDatabase, FilesystemProbe, IdentityProbe, LocalFilesystem};
pub use report::{Finding, FindingKind, ValidationReport};

use bindfs_options::OptionSet;
use log::{debug, warn};
use std::collections::BTreeMap;

use crate::config::{BoundFolder, ConfigLayer, LayerError, LayerState};

/// Options naming a user
const USER_OPTIONS: &[&str] = &["force-user", "create-for-user"];

/// Options naming a group
const GROUP_OPTIONS: &[&str] = &["force-group", "create-for-group"];

/// Options deciding who owns newly created files
const OWNERSHIP_OPTIONS: &[&str] = &[
    "create-as-user",
    "create-as-mounter",
    "create-for-user",
    "create-for-group",
];

/// Validation outcome errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error("{}", .0.to_human())]
    Invalid(ValidationReport),
}

/// External predicates the checks rely on
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub filesystem: &'a dyn FilesystemProbe,
    pub users: &'a dyn IdentityProbe,
    pub groups: &'a dyn IdentityProbe,
}

/// Validator for finalized layers
pub struct Validator<'a> {
    probes: Collaborators<'a>,
}

impl<'a> Validator<'a> {
    pub fn new(probes: Collaborators<'a>) -> Self {
        Self { probes }
    }

    /// Produce the full report for `layer`.
    pub fn validate(&self, layer: &ConfigLayer) -> Result<ValidationReport, LayerError> {
        if layer.state() == LayerState::Declared {
            return Err(LayerError::NotFinalized {
                state: layer.state(),
            });
        }

        let mut report = ValidationReport::new();
        for check in ValidationCheck::ALL {
            if layer.is_skipped(check) {
                debug!("skipping {} check", check);
                continue;
            }
            debug!("running {} check", check);
            match check {
                ValidationCheck::SourcePath => self.check_source_paths(layer, &mut report),
                ValidationCheck::User => self.check_identities(
                    layer,
                    check,
                    USER_OPTIONS,
                    self.probes.users,
                    "User",
                    &mut report,
                ),
                ValidationCheck::Group => self.check_identities(
                    layer,
                    check,
                    GROUP_OPTIONS,
                    self.probes.groups,
                    "Group",
                    &mut report,
                ),
                ValidationCheck::Ownership => self.check_ownership(layer, &mut report),
            }
        }

        for (check, finding) in report.iter() {
            warn!(
                "[{}] {}: {}",
                check,
                finding.destination.as_deref().unwrap_or("default options"),
                finding.message
            );
        }

        Ok(report)
    }

    /// Validate and, if clean, return the layer in VALIDATED state.
    pub fn validate_into(&self, mut layer: ConfigLayer) -> Result<ConfigLayer, ValidationError> {
        let report = self.validate(&layer)?;
        if !report.is_empty() {
            return Err(ValidationError::Invalid(report));
        }
        layer.mark_validated()?;
        Ok(layer)
    }

    fn check_source_paths(&self, layer: &ConfigLayer, report: &mut ValidationReport) {
        for folder in layer.bound_folders().values() {
            if !self.probes.filesystem.exists(&folder.source) {
                report.push(
                    ValidationCheck::SourcePath,
                    folder_finding(
                        folder,
                        FindingKind::MissingSourcePath,
                        format!("Source path '{}' does not exist", folder.source),
                    ),
                );
            }
        }
    }

    fn check_identities(
        &self,
        layer: &ConfigLayer,
        check: ValidationCheck,
        keys: &[&str],
        probe: &dyn IdentityProbe,
        label: &str,
        report: &mut ValidationReport,
    ) {
        // Probes may be remote calls; ask once per name.
        let mut resolved: BTreeMap<String, bool> = BTreeMap::new();
        let mut lookup = |name: &str| {
            *resolved
                .entry(name.to_string())
                .or_insert_with(|| probe.resolves(name))
        };

        let defaults = layer.default_options();
        for name in referenced_names(&defaults, keys) {
            if !lookup(&name) {
                report.push(
                    check,
                    Finding {
                        destination: None,
                        kind: FindingKind::UnknownIdentity,
                        owner: None,
                        message: format!("{} '{}' does not exist", label, name),
                    },
                );
            }
        }

        // Names inherited from the defaults were checked above.
        for folder in layer.bound_folders().values() {
            for name in referenced_names(&folder.options, keys) {
                if !lookup(&name) {
                    report.push(
                        check,
                        folder_finding(
                            folder,
                            FindingKind::UnknownIdentity,
                            format!("{} '{}' does not exist", label, name),
                        ),
                    );
                }
            }
        }
    }

    fn check_ownership(&self, layer: &ConfigLayer, report: &mut ValidationReport) {
        let defaults = layer.default_options();
        if let Some(message) = ownership_conflict(&defaults) {
            report.push(
                ValidationCheck::Ownership,
                Finding {
                    destination: None,
                    kind: FindingKind::ConflictingOwnershipOptions,
                    owner: None,
                    message,
                },
            );
        }

        for folder in layer.bound_folders().values() {
            // Folders that don't touch ownership inherit the defaults' verdict.
            if !OWNERSHIP_OPTIONS
                .iter()
                .any(|key| folder.options.contains_key(key))
            {
                continue;
            }
            if let Some(message) = ownership_conflict(&layer.effective_options(folder)) {
                report.push(
                    ValidationCheck::Ownership,
                    folder_finding(folder, FindingKind::ConflictingOwnershipOptions, message),
                );
            }
        }
    }
}

/// Validate `layer` against `probes`.
pub fn validate(
    layer: &ConfigLayer,
    probes: Collaborators<'_>,
) -> Result<ValidationReport, LayerError> {
    Validator::new(probes).validate(layer)
}

fn folder_finding(folder: &BoundFolder, kind: FindingKind, message: String) -> Finding {
    Finding {
        destination: Some(folder.destination.clone()),
        kind,
        owner: Some(folder.owner),
        message,
    }
}

fn referenced_names(options: &OptionSet, keys: &[&str]) -> Vec<String> {
    let mut names: Vec<String> = keys.iter().filter_map(|key| options.value_of(key)).collect();
    names.sort();
    names.dedup();
    names
}

/// `create-as-user` against anything else deciding file ownership
fn ownership_conflict(options: &OptionSet) -> Option<String> {
    if !options.is_enabled("create-as-user") {
        return None;
    }

    let mut conflicts = Vec::new();
    if options.is_enabled("create-as-mounter") {
        conflicts.push("create-as-mounter");
    }
    if options.value_of("create-for-user").is_some() {
        conflicts.push("create-for-user");
    }
    if options.value_of("create-for-group").is_some() {
        conflicts.push("create-for-group");
    }

    if conflicts.is_empty() {
        None
    } else {
        Some(format!(
            "create-as-user cannot be combined with {}",
            conflicts.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayerOrigin;
    use std::collections::BTreeSet;

    struct Paths(BTreeSet<&'static str>);

    impl FilesystemProbe for Paths {
        fn exists(&self, path: &str) -> bool {
            self.0.contains(path)
        }
    }

    struct Names(BTreeSet<&'static str>);

    impl IdentityProbe for Names {
        fn resolves(&self, name: &str) -> bool {
            self.0.contains(name)
        }
    }

    fn paths(list: &[&'static str]) -> Paths {
        Paths(list.iter().copied().collect())
    }

    fn names(list: &[&'static str]) -> Names {
        Names(list.iter().copied().collect())
    }

    fn opts(pairs: Vec<(&str, bindfs_options::OptionValue)>) -> OptionSet {
        OptionSet::from_pairs(pairs).unwrap()
    }

    #[test]
    fn test_valid_layer() {
        let mut layer = ConfigLayer::new();
        layer.bind_folder("/etc", "/etc-binded", OptionSet::new()).unwrap();
        let layer = layer.finalized();

        let fs = paths(&["/etc"]);
        let users = names(&["vagrant"]);
        let groups = names(&["vagrant"]);
        let report = validate(
            &layer,
            Collaborators {
                filesystem: &fs,
                users: &users,
                groups: &groups,
            },
        )
        .unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_requires_finalized_layer() {
        let fs = paths(&[]);
        let ids = names(&[]);
        let probes = Collaborators {
            filesystem: &fs,
            users: &ids,
            groups: &ids,
        };
        assert!(matches!(
            validate(&ConfigLayer::new(), probes),
            Err(LayerError::NotFinalized { .. })
        ));
    }

    #[test]
    fn test_findings_accumulate() {
        let mut layer = ConfigLayer::for_origin(LayerOrigin::Box);
        layer
            .bind_folder("/missing", "/a", opts(vec![("user", "ghost".into())]))
            .unwrap();
        layer
            .bind_folder(
                "/also-missing",
                "/b",
                opts(vec![
                    ("group", "phantom".into()),
                    ("create_as_user", true.into()),
                    ("create_as_mounter", true.into()),
                ]),
            )
            .unwrap();
        let layer = layer.finalized();

        let fs = paths(&[]);
        let users = names(&["vagrant"]);
        let groups = names(&["vagrant"]);
        let report = validate(
            &layer,
            Collaborators {
                filesystem: &fs,
                users: &users,
                groups: &groups,
            },
        )
        .unwrap();

        assert_eq!(report.get(ValidationCheck::SourcePath).len(), 2);
        assert_eq!(report.get(ValidationCheck::User).len(), 1);
        assert_eq!(report.get(ValidationCheck::Group).len(), 1);
        assert_eq!(report.get(ValidationCheck::Ownership).len(), 1);

        let user = &report.get(ValidationCheck::User)[0];
        assert_eq!(user.kind, FindingKind::UnknownIdentity);
        assert_eq!(user.destination.as_deref(), Some("/a"));
        assert_eq!(user.owner, Some(LayerOrigin::Box));
        assert!(user.message.contains("ghost"));

        let ownership = &report.get(ValidationCheck::Ownership)[0];
        assert_eq!(ownership.kind, FindingKind::ConflictingOwnershipOptions);
        assert!(ownership.message.contains("create-as-mounter"));
    }

    #[test]
    fn test_skipped_checks_do_not_run() {
        let mut layer = ConfigLayer::new();
        layer
            .bind_folder("/missing", "/a", opts(vec![("user", "ghost".into())]))
            .unwrap();
        layer.skip_validation(ValidationCheck::User).unwrap();
        layer.skip_validation(ValidationCheck::SourcePath).unwrap();
        let layer = layer.finalized();

        let fs = paths(&[]);
        let ids = names(&["vagrant"]);
        let report = validate(
            &layer,
            Collaborators {
                filesystem: &fs,
                users: &ids,
                groups: &ids,
            },
        )
        .unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_default_identity_reported_once() {
        let mut layer = ConfigLayer::new();
        layer
            .set_default_options(opts(vec![("user", "ghost".into())]))
            .unwrap();
        layer.bind_folder("/x", "/1", OptionSet::new()).unwrap();
        layer.bind_folder("/y", "/2", OptionSet::new()).unwrap();
        let layer = layer.finalized();

        let fs = paths(&["/x", "/y"]);
        let ids = names(&[]);
        let report = validate(
            &layer,
            Collaborators {
                filesystem: &fs,
                users: &ids,
                groups: &ids,
            },
        )
        .unwrap();

        let user = report.get(ValidationCheck::User);
        assert_eq!(user.len(), 1);
        assert!(user[0].destination.is_none());
    }

    #[test]
    fn test_folder_can_resolve_default_conflict() {
        let mut layer = ConfigLayer::new();
        layer
            .set_default_options(opts(vec![
                ("create_as_user", true.into()),
                ("create_for_user", "vagrant".into()),
            ]))
            .unwrap();
        layer
            .bind_folder("/x", "/1", opts(vec![("create_as_user", false.into())]))
            .unwrap();
        let layer = layer.finalized();

        let fs = paths(&["/x"]);
        let ids = names(&["vagrant"]);
        let report = validate(
            &layer,
            Collaborators {
                filesystem: &fs,
                users: &ids,
                groups: &ids,
            },
        )
        .unwrap();

        // Only the defaults conflict; the folder disables create-as-user.
        let ownership = report.get(ValidationCheck::Ownership);
        assert_eq!(ownership.len(), 1);
        assert!(ownership[0].destination.is_none());
    }

    #[test]
    fn test_ownership_conflict_partners() {
        let conflict = |extra: (&str, bindfs_options::OptionValue)| {
            ownership_conflict(&opts(vec![("create_as_user", true.into()), extra]))
        };

        let message = conflict(("create_for_user", "vagrant".into())).unwrap();
        assert!(message.contains("create-for-user"));

        let message = conflict(("create_for_group", "vagrant".into())).unwrap();
        assert!(message.contains("create-for-group"));

        let message = conflict(("create_as_mounter", true.into())).unwrap();
        assert!(message.contains("create-as-mounter"));

        // disabled partners don't count
        assert!(conflict(("create_as_mounter", false.into())).is_none());
        assert!(conflict(("create_for_group", false.into())).is_none());
    }

    #[test]
    fn test_ownership_conflict_needs_create_as_user() {
        let options = opts(vec![
            ("create_as_user", false.into()),
            ("create_as_mounter", true.into()),
            ("create_for_user", "vagrant".into()),
            ("create_for_group", "vagrant".into()),
        ]);
        assert!(ownership_conflict(&options).is_none());

        let options = opts(vec![
            ("create_as_user", true.into()),
            ("create_for_user", "vagrant".into()),
            ("create_for_group", "vagrant".into()),
        ]);
        let message = ownership_conflict(&options).unwrap();
        assert!(message.ends_with("create-for-user, create-for-group"));
    }

    #[test]
    fn test_folder_adds_conflict_over_clean_defaults() {
        let mut layer = ConfigLayer::for_origin(LayerOrigin::Project);
        layer
            .bind_folder(
                "/x",
                "/1",
                opts(vec![
                    ("create_as_user", true.into()),
                    ("create_for_group", "vagrant".into()),
                ]),
            )
            .unwrap();
        layer.bind_folder("/y", "/2", OptionSet::new()).unwrap();
        let layer = layer.finalized();

        let fs = paths(&["/x", "/y"]);
        let ids = names(&["vagrant"]);
        let report = validate(
            &layer,
            Collaborators {
                filesystem: &fs,
                users: &ids,
                groups: &ids,
            },
        )
        .unwrap();

        assert_eq!(report.len(), 1);
        let ownership = report.get(ValidationCheck::Ownership);
        assert_eq!(ownership.len(), 1);
        assert_eq!(ownership[0].destination.as_deref(), Some("/1"));
        assert_eq!(ownership[0].owner, Some(LayerOrigin::Project));
        assert!(ownership[0].message.contains("create-for-group"));
    }

    #[test]
    fn test_validate_into() {
        let fs = paths(&["/etc"]);
        let ids = names(&["vagrant"]);
        let validator = Validator::new(Collaborators {
            filesystem: &fs,
            users: &ids,
            groups: &ids,
        });

        let mut good = ConfigLayer::new();
        good.bind_folder("/etc", "/etc-binded", OptionSet::new()).unwrap();
        let validated = validator.validate_into(good.finalized()).unwrap();
        assert_eq!(validated.state(), LayerState::Validated);

        let mut bad = ConfigLayer::new();
        bad.bind_folder("/nope", "/nope-binded", OptionSet::new()).unwrap();
        match validator.validate_into(bad.finalized()) {
            Err(ValidationError::Invalid(report)) => assert_eq!(report.len(), 1),
            other => panic!("expected invalid report, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let mut layer = ConfigLayer::new();
        layer.bind_folder("/nope", "/n", OptionSet::new()).unwrap();
        let layer = layer.finalized();
        let before = layer.clone();

        let fs = paths(&[]);
        let ids = names(&[]);
        let probes = Collaborators {
            filesystem: &fs,
            users: &ids,
            groups: &ids,
        };
        let first = validate(&layer, probes).unwrap();
        let second = validate(&layer, probes).unwrap();
        assert_eq!(layer, before);
        assert_eq!(first, second);
    }
}
