//! Layer lifecycle state machine
//!
//! DECLARED → FINALIZED → VALIDATED

use serde::{Deserialize, Serialize};

/// Check if a state is terminal (no further transitions possible)
pub trait TerminalState {
    fn is_terminal(&self) -> bool;
}

/// Lifecycle of a configuration layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerState {
    /// Accepting declarations
    #[default]
    Declared,
    /// Defaults materialized
    Finalized,
    /// Passed validation; snapshot is frozen
    Validated,
}

impl TerminalState for LayerState {
    fn is_terminal(&self) -> bool {
        matches!(self, LayerState::Validated)
    }
}

impl LayerState {
    /// Check if transition from this state to target is valid
    pub fn can_transition_to(&self, target: LayerState) -> bool {
        matches!(
            (self, target),
            (LayerState::Declared, LayerState::Finalized)
                | (LayerState::Finalized, LayerState::Validated)
        )
    }

    pub fn accepts_declarations(&self) -> bool {
        matches!(self, LayerState::Declared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(LayerState::Declared.can_transition_to(LayerState::Finalized));
        assert!(LayerState::Finalized.can_transition_to(LayerState::Validated));

        assert!(!LayerState::Declared.can_transition_to(LayerState::Validated));
        assert!(!LayerState::Finalized.can_transition_to(LayerState::Declared));
        assert!(!LayerState::Validated.can_transition_to(LayerState::Declared));
        assert!(!LayerState::Validated.can_transition_to(LayerState::Finalized));
    }

    #[test]
    fn test_terminal() {
        assert!(!LayerState::Declared.is_terminal());
        assert!(!LayerState::Finalized.is_terminal());
        assert!(LayerState::Validated.is_terminal());
    }

    #[test]
    fn test_only_declared_accepts_declarations() {
        assert!(LayerState::Declared.accepts_declarations());
        assert!(!LayerState::Finalized.accepts_declarations());
        assert!(!LayerState::Validated.accepts_declarations());
    }
}
