//! Idle/demo mode: a pointer source that plays the game
//!
//! Produces a pointer x like the player would; it never touches state.

use super::state::{GamePhase, GameState, ItemKind};
use crate::consts::PADDLE_Y;

/// Pointer x the autopilot would use this step
///
/// Tracks the most urgent falling ball (the lowest one moving down). When
/// nothing is falling it goes after the lowest expand item, else follows the
/// first ball. `offset` shifts the strike point off center to vary angles.
pub fn autopilot_target(state: &GameState, offset: f32) -> Option<f32> {
    if state.phase != GamePhase::Playing {
        return None;
    }

    let falling = state
        .balls
        .iter()
        .filter(|b| b.vel.y > 0.0 && b.pos.y < PADDLE_Y)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    if let Some(ball) = falling {
        // Lead the ball to where it will cross the paddle line
        let steps = (PADDLE_Y - ball.pos.y) / ball.vel.y;
        return Some(ball.pos.x + ball.vel.x * steps.min(30.0) + offset);
    }

    let item = state
        .items
        .iter()
        .filter(|i| i.kind == ItemKind::Expand)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    if let Some(item) = item {
        return Some(item.pos.x + item.size.x / 2.0);
    }

    state.balls.first().map(|b| b.pos.x + offset)
}
