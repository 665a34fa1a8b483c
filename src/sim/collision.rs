//! Collision detection for axis-aligned geometry
//!
//! Everything in the arena is a rectangle except the ball, which is tested
//! as its bounding square. All overlap tests are strict: touching edges do
//! not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// Axis-aligned bounding box (`min` top-left, `max` bottom-right; y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from a top-left corner and a size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Bounding square of a circle (side `2 * radius`)
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self {
            min: center - Vec2::splat(radius),
            max: center + Vec2::splat(radius),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Strict overlap test
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }
}

/// Ball edge is past the left or right arena wall
#[inline]
pub fn crosses_side_wall(center: Vec2, radius: f32) -> bool {
    center.x + radius > ARENA_WIDTH || center.x - radius < 0.0
}

/// Ball edge is past the top arena wall
#[inline]
pub fn crosses_top_wall(center: Vec2, radius: f32) -> bool {
    center.y - radius < 0.0
}

/// Ball leading edge is past the bottom boundary (round lost)
#[inline]
pub fn crosses_bottom(center: Vec2, radius: f32) -> bool {
    center.y + radius > ARENA_HEIGHT
}

/// Horizontal deflection for a paddle strike
///
/// Linear in the offset from the paddle center: 0 at the center, `±steer`
/// at the edges.
#[inline]
pub fn paddle_deflection(ball_x: f32, paddle_x: f32, paddle_width: f32, steer: f32) -> f32 {
    let half = paddle_width / 2.0;
    (ball_x - (paddle_x + half)) / half * steer
}
