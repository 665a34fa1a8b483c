//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Wall-clock time enters only through `TickInput::now_ms`
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod error;
pub mod state;
pub mod tick;

pub use autopilot::autopilot_target;
pub use collision::Aabb;
pub use error::SimError;
pub use state::{
    ActiveEffects, Ball, Block, BlockColor, Difficulty, GamePhase, GameState, Item, ItemKind,
    Paddle, RoundOutcome, generate_blocks,
};
pub use tick::{GameEvent, TickInput, tick};
