//! Symbolic option pairs in declaration order.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::value::OptionValue;

/// Unresolved `key = value` pairs, kept in the order the input lists them.
///
/// Deserializing into a map type would sort or dedupe the symbolic keys
/// before alias resolution, so `user` and `owner` in one table would lose
/// their relative order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions(pub Vec<(String, OptionValue)>);

impl IntoIterator for RawOptions {
    type Item = (String, OptionValue);
    type IntoIter = std::vec::IntoIter<(String, OptionValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

struct RawOptionsVisitor;

impl<'de> Visitor<'de> for RawOptionsVisitor {
    type Value = RawOptions;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a table of bindfs options")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, OptionValue>()? {
            pairs.push((key, value));
        }
        Ok(RawOptions(pairs))
    }
}

impl<'de> Deserialize<'de> for RawOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RawOptionsVisitor)
    }
}
