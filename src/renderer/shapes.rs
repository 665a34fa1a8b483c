//! Shape generation for 2D primitives
//!
//! Output vertices are in arena coordinates; the pipeline maps them to clip
//! space.

use glam::Vec2;
use std::f32::consts::PI;

use super::scene::{DrawCommand, Frame};
use super::vertex::Vertex;

/// Triangle fan resolution for balls
const DISC_SEGMENTS: u32 = 24;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a filled axis-aligned rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let max = min + size;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Triangles for every filled shape in the frame, in draw order
///
/// Clear and text commands produce no geometry.
pub fn tessellate(frame: &Frame) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    for command in &frame.commands {
        match command {
            DrawCommand::Disc {
                center,
                radius,
                color,
            } => vertices.extend(circle(*center, *radius, *color, DISC_SEGMENTS)),
            DrawCommand::Rect { min, size, color } => {
                vertices.extend(rect(*min, *size, *color))
            }
            DrawCommand::Clear { .. } | DrawCommand::Text { .. } => {}
        }
    }
    vertices
}
