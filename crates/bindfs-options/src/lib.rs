//! Alias-aware option sets for bindfs.
//!
//! An [`OptionSet`] maps canonical bindfs option names to values. Symbolic
//! keys (`create_as_user`, `user`, `g`) are resolved against a static catalog
//! when they are inserted, so everything stored is a name bindfs accepts.
//! The set renders itself as the exact argument tokens handed to bindfs.

mod catalog;
mod error;
mod raw;
mod set;
mod value;

pub use catalog::{definitions, lookup, resolve, OptionDefinition, OptionKind};
pub use error::OptionError;
pub use raw::RawOptions;
pub use set::OptionSet;
pub use value::OptionValue;

/// Baseline owner applied to every bound folder unless overridden.
pub const DEFAULT_USER: &str = "vagrant";

/// Baseline group applied to every bound folder unless overridden.
pub const DEFAULT_GROUP: &str = "vagrant";

/// Baseline permission mapping applied to every bound folder unless overridden.
pub const DEFAULT_PERMS: &str = "u=rwX:g=rD:o=rD";

/// The option set every configuration falls back to when none is declared.
pub fn baseline() -> OptionSet {
    let mut set = OptionSet::new();
    set.insert_canonical("force-user", OptionValue::from(DEFAULT_USER));
    set.insert_canonical("force-group", OptionValue::from(DEFAULT_GROUP));
    set.insert_canonical("perms", OptionValue::from(DEFAULT_PERMS));
    set
}
