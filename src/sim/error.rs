//! Errors for commands fed into the simulation from outside

use thiserror::Error;

use super::state::GamePhase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Difficulty selector outside 1..=3
    #[error("difficulty {0} is not supported (expected 1, 2 or 3)")]
    InvalidDifficulty(u8),

    /// Command issued in a phase that does not accept it
    #[error("cannot {action} while in {phase:?} phase")]
    InvalidPhase {
        action: &'static str,
        phase: GamePhase,
    },
}
