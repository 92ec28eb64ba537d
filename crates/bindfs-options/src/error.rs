//! Option resolution errors.

use crate::catalog::OptionKind;

/// Errors raised while inserting into an [`OptionSet`](crate::OptionSet).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("Unknown bindfs option '{0}'")]
    UnknownOption(String),

    #[error("Invalid value '{value}' for option '{option}' (expected {})", expected_for(.kind))]
    InvalidValue {
        option: String,
        kind: OptionKind,
        value: String,
    },
}

fn expected_for(kind: &OptionKind) -> &'static str {
    match kind {
        OptionKind::Flag => "a boolean",
        OptionKind::Value => "a string, an integer or false",
    }
}
