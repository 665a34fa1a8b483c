//! Block Breaker - a browser breakout game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball motion, collisions, scoring, power-ups)
//! - `renderer`: Draw list construction and WebGPU rasterization
//! - `settings`: Player preferences
//! - `input`: Keyboard bindings

pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (60 Hz, velocities are in units per step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Arena dimensions (y grows downward)
    pub const ARENA_WIDTH: f32 = 480.0;
    pub const ARENA_HEIGHT: f32 = 640.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 75.0;
    pub const PADDLE_HEIGHT: f32 = 10.0;
    pub const PADDLE_Y: f32 = 620.0;
    /// Maximum |dx| produced by an edge hit on the paddle
    pub const PADDLE_STEER: f32 = 5.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 5.0;
    pub const BALL_SPAWN: Vec2 = Vec2::new(240.0, 600.0);
    /// Launch dx is drawn from [-BALL_SPAWN_DX, BALL_SPAWN_DX)
    pub const BALL_SPAWN_DX: f32 = 2.0;
    /// Launch speed upward is BALL_BASE_SPEED + difficulty
    pub const BALL_BASE_SPEED: f32 = 3.0;

    /// Block grid
    pub const BLOCK_WIDTH: f32 = 48.0;
    pub const BLOCK_HEIGHT: f32 = 20.0;
    pub const BLOCK_SPACING: f32 = 5.0;
    pub const BLOCK_COLS: usize = 9;
    /// Rows are BASE_BLOCK_ROWS + difficulty
    pub const BASE_BLOCK_ROWS: usize = 5;
    /// Score per destroyed block, multiplied by difficulty
    pub const POINTS_PER_BLOCK: u64 = 10;

    /// Power-ups
    pub const ITEM_SIZE: f32 = 20.0;
    pub const ITEM_FALL_SPEED: f32 = 2.0;
    pub const ITEM_DROP_CHANCE: f64 = 0.2;
    pub const EXPAND_FACTOR: f32 = 1.5;
    pub const EXPAND_DURATION_MS: f64 = 10_000.0;
}
