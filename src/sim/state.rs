//! Game state and core simulation types
//!
//! Everything the simulation reads or writes lives in [`GameState`]. The
//! shell only mutates it through the round commands and [`super::tick`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::error::SimError;
use crate::consts::*;

/// Current phase of the game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Menu, waiting for a difficulty choice
    Start,
    /// Active round
    Playing,
    /// Round ended (cleared or lost), waiting for return to menu
    GameOver,
}

/// Why the last round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// Every block destroyed
    Cleared,
    /// A ball fell past the bottom boundary
    BallLost,
}

/// Difficulty chosen at round start
///
/// Scales initial ball speed, block row count and points per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Numeric level (1-3)
    pub fn level(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
        }
    }

    pub fn block_rows(self) -> usize {
        BASE_BLOCK_ROWS + self.level() as usize
    }

    pub fn launch_speed(self) -> f32 {
        BALL_BASE_SPEED + self.level() as f32
    }

    pub fn points_per_block(self) -> u64 {
        POINTS_PER_BLOCK * self.level() as u64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = SimError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Normal),
            3 => Ok(Difficulty::Hard),
            other => Err(SimError::InvalidDifficulty(other)),
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Center
    pub pos: Vec2,
    /// Displacement per step
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            radius: BALL_RADIUS,
        }
    }

    /// Bounding square used for block tests
    pub fn bounds(&self) -> Aabb {
        Aabb::around_circle(self.pos, self.radius)
    }

    /// Copy travelling in the mirrored horizontal direction (multiball)
    pub fn mirrored(&self) -> Self {
        Self {
            vel: Vec2::new(-self.vel.x, self.vel.y),
            ..self.clone()
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge (fixed)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            x: ARENA_WIDTH / 2.0 - PADDLE_WIDTH / 2.0,
            y: PADDLE_Y,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }
}

impl Paddle {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height))
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Largest legal left edge for the current width
    pub fn max_x(&self) -> f32 {
        (ARENA_WIDTH - self.width).max(0.0)
    }

    /// Place the left edge, clamped to the arena
    pub fn set_x(&mut self, x: f32) {
        self.x = x.clamp(0.0, self.max_x());
    }

    /// Center the paddle on a pointer position (arena units)
    pub fn track_pointer(&mut self, pointer_x: f32) {
        self.set_x(pointer_x - self.width / 2.0);
    }

    /// Change width, keeping the paddle inside the arena
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.set_x(self.x);
    }
}

/// Block colors, cycled by row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockColor {
    Red,
    Orange,
    Yellow,
    Green,
    Purple,
}

impl BlockColor {
    pub const CYCLE: [BlockColor; 5] = [
        BlockColor::Red,
        BlockColor::Orange,
        BlockColor::Yellow,
        BlockColor::Green,
        BlockColor::Purple,
    ];

    pub fn for_row(row: usize) -> Self {
        Self::CYCLE[row % Self::CYCLE.len()]
    }
}

/// A block entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub color: BlockColor,
    /// Cleared on first hit, never set again within a round
    pub visible: bool,
}

impl Block {
    /// Block at grid cell (row, col)
    pub fn at_cell(row: usize, col: usize) -> Self {
        let x = col as f32 * (BLOCK_WIDTH + BLOCK_SPACING) + BLOCK_SPACING;
        let y = row as f32 * (BLOCK_HEIGHT + BLOCK_SPACING) + BLOCK_SPACING;
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(BLOCK_WIDTH, BLOCK_HEIGHT),
            color: BlockColor::for_row(row),
            visible: true,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Paddle 1.5x wider for a fixed duration
    Expand,
    /// Every ball in play is duplicated
    MultiBall,
}

/// A falling power-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: ItemKind,
}

impl Item {
    /// Item dropped from a destroyed block: centered on its midpoint, hanging
    /// from its bottom edge
    pub fn dropped_from(block: &Block, kind: ItemKind) -> Self {
        let x = block.pos.x + block.size.x / 2.0 - ITEM_SIZE / 2.0;
        let y = block.pos.y + block.size.y;
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::splat(ITEM_SIZE),
            kind,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

/// Timed power-up effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// Wall-clock times (ms) at which the paddle width snaps back to default,
    /// one per expand pickup. Not cleared between rounds.
    pub pending_width_reverts: Vec<f64>,
}

/// Complete game state (deterministic given seed and inputs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    /// Set when a round ends, cleared when the next one begins
    pub outcome: Option<RoundOutcome>,
    pub difficulty: Difficulty,
    pub score: u64,
    /// Playing steps taken this round
    pub time_ticks: u64,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub blocks: Vec<Block>,
    pub items: Vec<Item>,
    pub effects: ActiveEffects,
}

impl GameState {
    /// Create a new game state in the menu phase
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            outcome: None,
            difficulty: Difficulty::default(),
            score: 0,
            time_ticks: 0,
            paddle: Paddle::default(),
            balls: Vec::new(),
            blocks: Vec::new(),
            items: Vec::new(),
            effects: ActiveEffects::default(),
        }
    }

    /// Start a round at the given difficulty (menu only)
    pub fn begin_round(&mut self, difficulty: Difficulty) -> Result<(), SimError> {
        if self.phase != GamePhase::Start {
            return Err(SimError::InvalidPhase {
                action: "begin a round",
                phase: self.phase,
            });
        }

        self.difficulty = difficulty;
        self.score = 0;
        self.time_ticks = 0;
        self.outcome = None;
        self.paddle = Paddle::default();
        self.items.clear();
        self.blocks = generate_blocks(difficulty);

        let dx = self.rng.random_range(-BALL_SPAWN_DX..BALL_SPAWN_DX);
        let dy = -difficulty.launch_speed();
        self.balls = vec![Ball::new(BALL_SPAWN, Vec2::new(dx, dy))];

        self.phase = GamePhase::Playing;
        log::info!(
            "Round started: difficulty={}, blocks={}, ball dx={:.2} dy={:.2}",
            difficulty.as_str(),
            self.blocks.len(),
            dx,
            dy
        );
        Ok(())
    }

    /// Start a round from an untrusted difficulty level
    pub fn begin_round_at_level(&mut self, level: u8) -> Result<(), SimError> {
        let difficulty = Difficulty::try_from(level)?;
        self.begin_round(difficulty)
    }

    /// Leave the game-over screen for the menu
    pub fn return_to_menu(&mut self) -> Result<(), SimError> {
        if self.phase != GamePhase::GameOver {
            return Err(SimError::InvalidPhase {
                action: "return to menu",
                phase: self.phase,
            });
        }
        self.balls.clear();
        self.items.clear();
        self.phase = GamePhase::Start;
        log::info!("Returned to menu");
        Ok(())
    }

    /// Move the paddle under the pointer (playing only)
    pub fn apply_pointer(&mut self, pointer_x: f32) {
        if self.phase == GamePhase::Playing && pointer_x.is_finite() {
            self.paddle.track_pointer(pointer_x);
        }
    }

    pub fn visible_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.visible).count()
    }

    pub fn destroyed_blocks(&self) -> usize {
        self.blocks.len() - self.visible_blocks()
    }

    /// End the round
    pub(crate) fn finish(&mut self, outcome: RoundOutcome) {
        self.phase = GamePhase::GameOver;
        self.outcome = Some(outcome);
        log::info!(
            "Round over ({:?}): score={}, blocks left={}, steps={}",
            outcome,
            self.score,
            self.visible_blocks(),
            self.time_ticks
        );
    }
}

/// Generate the block grid for a difficulty, row-major from the top
pub fn generate_blocks(difficulty: Difficulty) -> Vec<Block> {
    let rows = difficulty.block_rows();
    let mut blocks = Vec::with_capacity(rows * BLOCK_COLS);
    for row in 0..rows {
        for col in 0..BLOCK_COLS {
            blocks.push(Block::at_cell(row, col));
        }
    }
    blocks
}
