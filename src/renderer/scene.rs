//! Frame construction
//!
//! A [`Frame`] is the complete, ordered draw list for one state snapshot.
//! Nothing is carried over between frames: every frame starts with a clear.

use glam::Vec2;

use crate::sim::{BlockColor, GameState, ItemKind};

pub type Color = [f32; 4];

/// `0xRRGGBB` to an opaque color
pub const fn rgb(hex: u32) -> Color {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Colors for game elements
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub ball: Color,
    pub paddle: Color,
    pub text: Color,
    pub expand: Color,
    pub multiball: Color,
    /// Indexed in [`BlockColor::CYCLE`] order
    pub blocks: [Color; 5],
}

impl Palette {
    pub fn classic() -> Self {
        Self {
            background: rgb(0x111827),
            ball: rgb(0xffffff),
            paddle: rgb(0x4d89ff),
            text: rgb(0xffffff),
            expand: rgb(0x00ff00),
            multiball: rgb(0xff00ff),
            blocks: [
                rgb(0xff4d4d),
                rgb(0xff8c1a),
                rgb(0xffd11a),
                rgb(0x4dff4d),
                rgb(0xbf4dff),
            ],
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            background: rgb(0x000000),
            ball: rgb(0xffffff),
            paddle: rgb(0x00e5ff),
            text: rgb(0xffffff),
            expand: rgb(0x00ff00),
            multiball: rgb(0xff00ff),
            blocks: [
                rgb(0xff0000),
                rgb(0xff8000),
                rgb(0xffff00),
                rgb(0x00ff00),
                rgb(0xc000ff),
            ],
        }
    }

    pub fn block(&self, color: BlockColor) -> Color {
        match color {
            BlockColor::Red => self.blocks[0],
            BlockColor::Orange => self.blocks[1],
            BlockColor::Yellow => self.blocks[2],
            BlockColor::Green => self.blocks[3],
            BlockColor::Purple => self.blocks[4],
        }
    }

    pub fn item(&self, kind: ItemKind) -> Color {
        match kind {
            ItemKind::Expand => self.expand,
            ItemKind::MultiBall => self.multiball,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

/// A single drawing operation in arena coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    Disc {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Rect {
        /// Top-left corner
        min: Vec2,
        size: Vec2,
        color: Color,
    },
    Text {
        text: String,
        /// Baseline start
        pos: Vec2,
        size_px: f32,
        color: Color,
    },
}

/// Score overlay placement
const SCORE_POS: Vec2 = Vec2::new(10.0, 30.0);
const SCORE_SIZE_PX: f32 = 20.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    /// Full redraw of `state`: clear, balls, paddle, visible blocks, items, score
    pub fn build(state: &GameState, palette: &Palette) -> Self {
        let mut commands = Vec::with_capacity(
            3 + state.balls.len() + state.blocks.len() + state.items.len(),
        );

        commands.push(DrawCommand::Clear {
            color: palette.background,
        });

        for ball in &state.balls {
            commands.push(DrawCommand::Disc {
                center: ball.pos,
                radius: ball.radius,
                color: palette.ball,
            });
        }

        let paddle = &state.paddle;
        commands.push(DrawCommand::Rect {
            min: Vec2::new(paddle.x, paddle.y),
            size: Vec2::new(paddle.width, paddle.height),
            color: palette.paddle,
        });

        for block in state.blocks.iter().filter(|b| b.visible) {
            commands.push(DrawCommand::Rect {
                min: block.pos,
                size: block.size,
                color: palette.block(block.color),
            });
        }

        for item in &state.items {
            commands.push(DrawCommand::Rect {
                min: item.pos,
                size: item.size,
                color: palette.item(item.kind),
            });
        }

        commands.push(DrawCommand::Text {
            text: format!("Score: {}", state.score),
            pos: SCORE_POS,
            size_px: SCORE_SIZE_PX,
            color: palette.text,
        });

        Self { commands }
    }

    /// Background color of the frame
    pub fn clear_color(&self) -> Option<Color> {
        self.commands.iter().find_map(|c| match c {
            DrawCommand::Clear { color } => Some(*color),
            _ => None,
        })
    }

    /// Text overlays, in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
