//! Mapping between arena units, canvas pixels and clip space
//!
//! The 480x640 arena is scaled uniformly to fit the canvas and centered,
//! leaving bars on the longer axis.

use glam::Vec2;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pixels per arena unit
    pub fn scale(&self) -> f32 {
        (self.width / ARENA_WIDTH).min(self.height / ARENA_HEIGHT)
    }

    /// Top-left of the arena inside the viewport, in pixels
    pub fn origin(&self) -> Vec2 {
        let scale = self.scale();
        Vec2::new(
            (self.width - ARENA_WIDTH * scale) / 2.0,
            (self.height - ARENA_HEIGHT * scale) / 2.0,
        )
    }

    /// Arena point to normalized device coordinates (y up)
    pub fn arena_to_ndc(&self, p: Vec2) -> [f32; 2] {
        let px = self.origin() + p * self.scale();
        [
            px.x / self.width * 2.0 - 1.0,
            1.0 - px.y / self.height * 2.0,
        ]
    }

    /// Horizontal client pixel (e.g. a mouse offset) to arena x
    pub fn client_to_arena_x(&self, client_x: f32) -> f32 {
        (client_x - self.origin().x) / self.scale()
    }
}
