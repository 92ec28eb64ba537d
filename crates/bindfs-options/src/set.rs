//! The option set and its token rendering.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{resolve, OptionKind};
use crate::error::OptionError;
use crate::raw::RawOptions;
use crate::value::OptionValue;

/// Canonical bindfs options and their values.
///
/// Keys are always canonical bindfs names; the map is sorted so iteration and
/// rendering are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "RawOptions",
    into = "BTreeMap<String, OptionValue>"
)]
pub struct OptionSet {
    entries: BTreeMap<String, OptionValue>,
}

impl OptionSet {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from symbolic key/value pairs, resolving aliases in order.
    ///
    /// When two keys resolve to the same option the later pair wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<OptionValue>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            set.set(key.as_ref(), value)?;
        }
        Ok(set)
    }

    /// Resolve `key` and store `value` under its canonical name.
    ///
    /// Returns the canonical name that was written.
    pub fn set(
        &mut self,
        key: &str,
        value: impl Into<OptionValue>,
    ) -> Result<&'static str, OptionError> {
        let def = resolve(key).ok_or_else(|| OptionError::UnknownOption(key.to_string()))?;
        let value = value.into();

        let accepted = match def.kind {
            OptionKind::Flag => matches!(value, OptionValue::Bool(_)),
            OptionKind::Value => !value.is_true(),
        };
        if !accepted {
            return Err(OptionError::InvalidValue {
                option: def.name.to_string(),
                kind: def.kind,
                value: value.to_string(),
            });
        }

        self.entries.insert(def.name.to_string(), value);
        Ok(def.name)
    }

    pub(crate) fn insert_canonical(&mut self, name: &str, value: OptionValue) {
        self.entries.insert(name.to_string(), value);
    }

    /// Get a value by canonical name or any alias
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        let def = resolve(key)?;
        self.entries.get(def.name)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether a flag is present and set to `true`
    pub fn is_enabled(&self, key: &str) -> bool {
        self.get(key).is_some_and(OptionValue::is_true)
    }

    /// String form of a valued option, if it is set and not disabled
    pub fn value_of(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            OptionValue::Bool(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Canonical names, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge `other` over `self`.
    ///
    /// Keys are the union of both sets; `other` wins where both define a key.
    pub fn merge(&self, other: &OptionSet) -> OptionSet {
        let mut entries = self.entries.clone();
        for (key, value) in &other.entries {
            entries.insert(key.clone(), value.clone());
        }
        OptionSet { entries }
    }

    /// Render as bindfs arguments, sorted by option name.
    ///
    /// - `true` renders as `--name`
    /// - `false` is omitted
    /// - strings and integers render as `--name=value`
    pub fn to_tokens(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|(name, value)| match value {
                OptionValue::Bool(true) => Some(format!("--{}", name)),
                OptionValue::Bool(false) => None,
                other => Some(format!("--{}={}", name, other)),
            })
            .collect()
    }
}

impl TryFrom<RawOptions> for OptionSet {
    type Error = OptionError;

    fn try_from(raw: RawOptions) -> Result<Self, Self::Error> {
        Self::from_pairs(raw)
    }
}

impl From<OptionSet> for BTreeMap<String, OptionValue> {
    fn from(set: OptionSet) -> Self {
        set.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_resolves_aliases() {
        let mut set = OptionSet::new();
        assert_eq!(set.set("create_as_user", true).unwrap(), "create-as-user");
        assert_eq!(set.set("user", "dummy").unwrap(), "force-user");

        let keys: Vec<&str> = set.keys().collect();
        assert_eq!(keys, vec!["create-as-user", "force-user"]);
    }

    #[test]
    fn test_set_unknown_option() {
        let mut set = OptionSet::new();
        let err = set.set("not_an_option", true).unwrap_err();
        assert_eq!(err, OptionError::UnknownOption("not_an_option".to_string()));
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_rejects_mistyped_values() {
        let mut set = OptionSet::new();
        assert!(matches!(
            set.set("create_as_user", "yes"),
            Err(OptionError::InvalidValue { .. })
        ));
        assert!(matches!(
            set.set("perms", true),
            Err(OptionError::InvalidValue { .. })
        ));
        // false disables a valued option
        assert!(set.set("perms", false).is_ok());
        assert!(set.set("uid-offset", 1000).is_ok());
    }

    #[test]
    fn test_aliases_last_write_wins() {
        let set = OptionSet::from_pairs(vec![("user", "alice"), ("owner", "bob"), ("u", "carol")])
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.value_of("force-user").as_deref(), Some("carol"));
    }

    #[test]
    fn test_get_by_alias() {
        let set = OptionSet::from_pairs(vec![("group", "dummy")]).unwrap();
        assert_eq!(set.get("force-group"), Some(&OptionValue::from("dummy")));
        assert_eq!(set.get("g"), Some(&OptionValue::from("dummy")));
        assert!(set.get("force-user").is_none());
        assert!(set.get("bogus").is_none());
    }

    #[test]
    fn test_merge_right_biased_union() {
        let base = OptionSet::from_pairs(vec![
            ("user", OptionValue::from("vagrant")),
            ("create_as_user", OptionValue::from(true)),
        ])
        .unwrap();
        let overlay = OptionSet::from_pairs(vec![
            ("user", OptionValue::from("dummy")),
            ("create_as_mounter", OptionValue::from(true)),
        ])
        .unwrap();

        let merged = base.merge(&overlay);
        let keys: Vec<&str> = merged.keys().collect();
        assert_eq!(keys, vec!["create-as-mounter", "create-as-user", "force-user"]);
        assert_eq!(merged.value_of("force-user").as_deref(), Some("dummy"));

        // Inputs untouched
        assert_eq!(base.value_of("force-user").as_deref(), Some("vagrant"));
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let set = OptionSet::from_pairs(vec![("perms", "a+rX")]).unwrap();
        assert_eq!(set.merge(&OptionSet::new()), set);
        assert_eq!(OptionSet::new().merge(&set), set);
    }

    #[test]
    fn test_to_tokens() {
        let set = OptionSet::from_pairs(vec![
            ("perms", OptionValue::from("u=rwX:g=rD:o=rD")),
            ("create_as_user", OptionValue::from(true)),
            ("chown_ignore", OptionValue::from(false)),
            ("uid_offset", OptionValue::from(1000)),
            ("user", OptionValue::from("vagrant")),
        ])
        .unwrap();

        assert_eq!(
            set.to_tokens(),
            vec![
                "--create-as-user",
                "--force-user=vagrant",
                "--perms=u=rwX:g=rD:o=rD",
                "--uid-offset=1000",
            ]
        );
        assert_eq!(set.to_tokens(), set.to_tokens());
    }

    #[test]
    fn test_is_enabled_and_value_of() {
        let set = OptionSet::from_pairs(vec![
            ("create_as_user", OptionValue::from(false)),
            ("create_as_mounter", OptionValue::from(true)),
            ("create_for_user", OptionValue::from(false)),
        ])
        .unwrap();

        assert!(!set.is_enabled("create-as-user"));
        assert!(set.is_enabled("create-as-mounter"));
        assert!(set.value_of("create-for-user").is_none());
    }

    #[test]
    fn test_deserialize_resolves_aliases() {
        let set: OptionSet = toml::from_str(
            r#"
            user = "dummy"
            create_as_user = true
            uid_offset = 10
            "#,
        )
        .unwrap();

        let keys: Vec<&str> = set.keys().collect();
        assert_eq!(keys, vec!["create-as-user", "force-user", "uid-offset"]);
    }

    #[test]
    fn test_deserialize_later_alias_wins() {
        let set: OptionSet = toml::from_str(
            r#"
            user = "alice"
            owner = "bob"
            "#,
        )
        .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.value_of("force-user").as_deref(), Some("bob"));

        let set: OptionSet = serde_json::from_str(r#"{"owner": "bob", "u": "alice"}"#).unwrap();
        assert_eq!(set.value_of("force-user").as_deref(), Some("alice"));
    }

    #[test]
    fn test_deserialize_unknown_key_fails() {
        let result: Result<OptionSet, _> = serde_json::from_str(r#"{"bogus": true}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Unknown bindfs option 'bogus'"));
    }

    #[test]
    fn test_serialize_canonical_keys() {
        let set = OptionSet::from_pairs(vec![("group", "dummy")]).unwrap();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!({"force-group": "dummy"}));
    }
}
