//! Keyboard bindings
//!
//! Maps a DOM key name to a shell action for the current phase. Keys that
//! mean nothing in the phase map to `None`.

use crate::sim::GamePhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Digit key on the menu; the level is validated by the sim
    StartRound(u8),
    ReturnToMenu,
    ToggleFps,
    ToggleContrast,
    ToggleIdle,
}

pub fn key_action(key: &str, phase: GamePhase) -> Option<KeyAction> {
    match key {
        "Enter" | "Escape" if phase == GamePhase::GameOver => Some(KeyAction::ReturnToMenu),
        "f" | "F" => Some(KeyAction::ToggleFps),
        "h" | "H" => Some(KeyAction::ToggleContrast),
        "i" | "I" => Some(KeyAction::ToggleIdle),
        digit if phase == GamePhase::Start => digit.parse().ok().map(KeyAction::StartRound),
        _ => None,
    }
}
