//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One call is
//! one step; velocities are in arena units per step.

use rand::Rng;

use super::collision::{crosses_bottom, crosses_side_wall, crosses_top_wall, paddle_deflection};
use super::state::{GamePhase, GameState, Item, ItemKind, RoundOutcome};
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Latest pointer x in arena units (paddle centers on it)
    pub pointer_x: Option<f32>,
    /// Wall-clock time in milliseconds, used for timed power-ups
    pub now_ms: f64,
}

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Ball (by index) bounced off the paddle
    PaddleHit { ball: usize },
    /// Block (by index) destroyed
    BlockDestroyed { block: usize, points: u64 },
    ItemSpawned { kind: ItemKind },
    ItemCollected { kind: ItemKind },
    /// An expand reversion came due
    PaddleRestored,
    RoundLost,
    RoundCleared,
}

/// Advance the game state by one fixed step
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Reversions are wall-clock driven and apply in every phase
    expire_effects(state, input.now_ms, &mut events);

    if state.phase != GamePhase::Playing {
        return events;
    }

    if let Some(x) = input.pointer_x {
        state.apply_pointer(x);
    }

    state.time_ticks += 1;

    if integrate_balls(state, &mut events) {
        state.finish(RoundOutcome::BallLost);
        events.push(GameEvent::RoundLost);
        return events;
    }

    collide_blocks(state, &mut events);
    update_items(state, input.now_ms, &mut events);

    if state.visible_blocks() == 0 {
        state.finish(RoundOutcome::Cleared);
        events.push(GameEvent::RoundCleared);
    }

    events
}

/// Snap the paddle back to default width for every reversion that is due
fn expire_effects(state: &mut GameState, now_ms: f64, events: &mut Vec<GameEvent>) {
    let pending = &mut state.effects.pending_width_reverts;
    let before = pending.len();
    pending.retain(|&at| at > now_ms);

    if pending.len() < before {
        state.paddle.set_width(PADDLE_WIDTH);
        events.push(GameEvent::PaddleRestored);
        log::debug!("Paddle width restored");
    }
}

/// Move every ball, bounce it off walls and paddle.
///
/// Returns true if any ball ended up past the bottom boundary.
fn integrate_balls(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let paddle = &state.paddle;
    let mut lost = false;

    for (idx, ball) in state.balls.iter_mut().enumerate() {
        ball.pos += ball.vel;

        if crosses_side_wall(ball.pos, ball.radius) {
            ball.vel.x = -ball.vel.x;
        }
        if crosses_top_wall(ball.pos, ball.radius) {
            ball.vel.y = -ball.vel.y;
        }

        let over_paddle = ball.pos.x > paddle.x && ball.pos.x < paddle.x + paddle.width;
        if over_paddle && ball.pos.y + ball.radius > paddle.y {
            ball.vel.y = -ball.vel.y.abs();
            ball.vel.x = paddle_deflection(ball.pos.x, paddle.x, paddle.width, PADDLE_STEER);
            events.push(GameEvent::PaddleHit { ball: idx });
        }

        if crosses_bottom(ball.pos, ball.radius) {
            lost = true;
        }
    }

    lost
}

/// Destroy every visible block each ball overlaps.
///
/// No early exit: a ball straddling two blocks destroys both and has its
/// vertical velocity reflected once per block.
fn collide_blocks(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let points = state.difficulty.points_per_block();

    for ball in state.balls.iter_mut() {
        let bounds = ball.bounds();

        for (idx, block) in state.blocks.iter_mut().enumerate() {
            if !block.visible || !bounds.overlaps(&block.bounds()) {
                continue;
            }

            ball.vel.y = -ball.vel.y;
            block.visible = false;
            state.score += points;
            events.push(GameEvent::BlockDestroyed { block: idx, points });

            if state.rng.random_bool(ITEM_DROP_CHANCE) {
                let kind = if state.rng.random_bool(0.5) {
                    ItemKind::Expand
                } else {
                    ItemKind::MultiBall
                };
                state.items.push(Item::dropped_from(block, kind));
                events.push(GameEvent::ItemSpawned { kind });
            }
        }
    }
}

/// Drop items, collect the ones touching the paddle, discard the ones that
/// left the arena
fn update_items(state: &mut GameState, now_ms: f64, events: &mut Vec<GameEvent>) {
    let paddle_bounds = state.paddle.bounds();
    let mut collected = Vec::new();

    state.items.retain_mut(|item| {
        item.pos.y += ITEM_FALL_SPEED;
        if item.bounds().overlaps(&paddle_bounds) {
            collected.push(item.kind);
            return false;
        }
        item.pos.y <= ARENA_HEIGHT
    });

    for kind in collected {
        apply_item(state, kind, now_ms);
        events.push(GameEvent::ItemCollected { kind });
    }
}

fn apply_item(state: &mut GameState, kind: ItemKind, now_ms: f64) {
    match kind {
        ItemKind::Expand => {
            let width = state.paddle.width * EXPAND_FACTOR;
            state.paddle.set_width(width);
            state
                .effects
                .pending_width_reverts
                .push(now_ms + EXPAND_DURATION_MS);
            log::debug!("Expand collected: paddle width {:.1}", width);
        }
        ItemKind::MultiBall => {
            let copies: Vec<_> = state.balls.iter().map(|b| b.mirrored()).collect();
            state.balls.extend(copies);
            log::debug!("Multiball collected: {} balls", state.balls.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Ball, Block, Difficulty, Paddle};
    use glam::Vec2;
    use proptest::prelude::*;

    /// Round in progress with a single far-away block (so it can't clear)
    /// and the given balls
    fn playing_with(balls: Vec<Ball>) -> GameState {
        let mut state = GameState::new(12345);
        state.begin_round(Difficulty::Easy).unwrap();
        state.blocks = vec![Block::at_cell(0, 8)];
        state.balls = balls;
        state
    }

    fn item_above_paddle(kind: ItemKind) -> Item {
        Item {
            pos: Vec2::new(230.0, 605.0),
            size: Vec2::splat(ITEM_SIZE),
            kind,
        }
    }

    fn idle_ball() -> Ball {
        Ball::new(Vec2::new(50.0, 300.0), Vec2::new(0.0, -1.0))
    }

    #[test]
    fn test_tick_idle_outside_playing() {
        let mut state = GameState::new(1);
        let events = tick(&mut state, &TickInput::default());
        assert!(events.is_empty());
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_ball_moves_by_velocity() {
        let mut state = playing_with(vec![Ball::new(Vec2::new(100.0, 300.0), Vec2::new(1.5, -2.0))]);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.balls[0].pos, Vec2::new(101.5, 298.0));
        assert_eq!(state.balls[0].vel, Vec2::new(1.5, -2.0));
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_left_wall_reflection() {
        let mut state = playing_with(vec![Ball::new(Vec2::new(10.0, 100.0), Vec2::new(-3.0, 2.0))]);

        // x = 7: edge still inside
        tick(&mut state, &TickInput::default());
        assert_eq!(state.balls[0].vel.x, -3.0);

        // x = 4: edge past the wall, dx flips
        tick(&mut state, &TickInput::default());
        assert_eq!(state.balls[0].pos.x, 4.0);
        assert_eq!(state.balls[0].vel.x, 3.0);
        assert_eq!(state.balls[0].vel.y, 2.0);
    }

    #[test]
    fn test_right_and_top_wall_reflection() {
        let mut state = playing_with(vec![
            Ball::new(Vec2::new(474.0, 300.0), Vec2::new(2.0, 0.5)),
            Ball::new(Vec2::new(100.0, 6.0), Vec2::new(0.0, -2.0)),
        ]);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.balls[0].vel.x, -2.0);
        assert_eq!(state.balls[1].vel.y, 2.0);
    }

    #[test]
    fn test_paddle_dead_center_hit() {
        // Lands on x = 240, the default paddle center
        let mut state = playing_with(vec![Ball::new(Vec2::new(238.0, 611.0), Vec2::new(2.0, 5.0))]);
        let events = tick(&mut state, &TickInput::default());

        assert_eq!(state.balls[0].vel.x, 0.0);
        assert_eq!(state.balls[0].vel.y, -5.0);
        assert!(events.contains(&GameEvent::PaddleHit { ball: 0 }));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_paddle_edge_hit_steers() {
        // Three quarters across: offset 18.75 of half-width 37.5
        let mut state = playing_with(vec![Ball::new(Vec2::new(258.75, 611.0), Vec2::new(0.0, 5.0))]);
        tick(&mut state, &TickInput::default());
        assert!((state.balls[0].vel.x - 2.5).abs() < 1e-5);
        assert!(state.balls[0].vel.y < 0.0);
    }

    #[test]
    fn test_paddle_hit_forces_upward_even_if_rising() {
        let mut state = playing_with(vec![Ball::new(Vec2::new(240.0, 620.0), Vec2::new(0.0, -1.0))]);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.balls[0].vel.y, -1.0);
    }

    #[test]
    fn test_ball_past_bottom_ends_round() {
        let mut state = playing_with(vec![
            Ball::new(Vec2::new(100.0, 633.0), Vec2::new(0.0, 3.0)),
            idle_ball(),
        ]);
        state.items.push(item_above_paddle(ItemKind::Expand));

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.outcome, Some(RoundOutcome::BallLost));
        assert!(events.contains(&GameEvent::RoundLost));
        // Rest of the step skipped
        assert_eq!(state.items[0].pos.y, 605.0);
        assert_eq!(state.visible_blocks(), 1);

        // Terminal until explicit reset
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.balls[1].pos, Vec2::new(50.0, 299.0));
    }

    #[test]
    fn test_block_hit_scores_and_reflects() {
        let mut state = GameState::new(3);
        state.begin_round(Difficulty::Normal).unwrap();
        state.blocks = vec![Block::at_cell(0, 0), Block::at_cell(5, 8)];
        // Block (0,0) spans x 5..53, y 5..25
        state.balls = vec![Ball::new(Vec2::new(30.0, 40.0), Vec2::new(0.0, -12.0))];

        let events = tick(&mut state, &TickInput::default());
        assert!(!state.blocks[0].visible);
        assert!(state.blocks[1].visible);
        assert_eq!(state.balls[0].vel.y, 12.0);
        assert_eq!(state.score, 20);
        assert!(events.contains(&GameEvent::BlockDestroyed { block: 0, points: 20 }));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_destroyed_block_drops_items() {
        let rounds = 5000;
        let mut spawned = 0;
        let mut expands = 0;

        for seed in 0..rounds {
            let mut state = GameState::new(seed);
            state.begin_round(Difficulty::Normal).unwrap();
            state.blocks = vec![Block::at_cell(0, 0), Block::at_cell(5, 8)];
            state.balls = vec![Ball::new(Vec2::new(30.0, 40.0), Vec2::new(0.0, -12.0))];

            let events = tick(&mut state, &TickInput::default());
            assert!(!state.blocks[0].visible);

            let kinds: Vec<_> = events
                .iter()
                .filter_map(|e| match e {
                    GameEvent::ItemSpawned { kind } => Some(*kind),
                    _ => None,
                })
                .collect();
            assert!(kinds.len() <= 1);
            assert_eq!(state.items.len(), kinds.len());

            if let Some(&kind) = kinds.first() {
                // Drop point under the block center, already fallen once
                assert_eq!(state.items[0].pos, Vec2::new(19.0, 27.0));
                assert_eq!(state.items[0].kind, kind);
                spawned += 1;
                if kind == ItemKind::Expand {
                    expands += 1;
                }
            }
        }

        let rate = spawned as f64 / rounds as f64;
        assert!((0.17..0.23).contains(&rate), "drop rate {}", rate);
        assert!(expands > 0 && expands < spawned);
        let expand_share = expands as f64 / spawned as f64;
        assert!((0.4..0.6).contains(&expand_share), "expand share {}", expand_share);
    }

    #[test]
    fn test_ball_straddling_two_blocks_destroys_both() {
        let mut state = playing_with(vec![Ball::new(Vec2::new(55.5, 40.0), Vec2::new(0.0, -12.0))]);
        state.blocks = vec![Block::at_cell(0, 0), Block::at_cell(0, 1), Block::at_cell(5, 8)];

        tick(&mut state, &TickInput::default());
        assert!(!state.blocks[0].visible);
        assert!(!state.blocks[1].visible);
        assert_eq!(state.score, 20);
        // Reflected once per block: net direction unchanged
        assert_eq!(state.balls[0].vel.y, -12.0);
    }

    #[test]
    fn test_destroyed_block_is_not_hit_again() {
        let mut state = playing_with(vec![
            Ball::new(Vec2::new(30.0, 40.0), Vec2::new(0.0, -12.0)),
            Ball::new(Vec2::new(30.0, 40.0), Vec2::new(0.0, -12.0)),
        ]);
        state.blocks = vec![Block::at_cell(0, 0), Block::at_cell(5, 8)];

        tick(&mut state, &TickInput::default());
        assert_eq!(state.score, 10);
        // Second ball found nothing to bounce off
        assert_eq!(state.balls[0].vel.y, 12.0);
        assert_eq!(state.balls[1].vel.y, -12.0);
    }

    #[test]
    fn test_last_block_clears_round() {
        // Block (0,8) spans x 429..477, y 5..25
        let mut state = playing_with(vec![
            Ball::new(Vec2::new(450.0, 37.0), Vec2::new(0.0, -10.0)),
            idle_ball(),
        ]);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.visible_blocks(), 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.outcome, Some(RoundOutcome::Cleared));
        assert!(events.contains(&GameEvent::RoundCleared));
        assert_eq!(state.balls.len(), 2);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_items_fall_and_leave_arena() {
        let mut state = playing_with(vec![idle_ball()]);
        state.items = vec![
            Item {
                pos: Vec2::new(10.0, 100.0),
                size: Vec2::splat(ITEM_SIZE),
                kind: ItemKind::MultiBall,
            },
            Item {
                pos: Vec2::new(10.0, 639.0),
                size: Vec2::splat(ITEM_SIZE),
                kind: ItemKind::Expand,
            },
        ];

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].pos.y, 102.0);
        assert!(events.iter().all(|e| !matches!(e, GameEvent::ItemCollected { .. })));
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.paddle.width, PADDLE_WIDTH);
    }

    #[test]
    fn test_expand_widens_then_reverts() {
        let mut state = playing_with(vec![idle_ball()]);
        state.items.push(item_above_paddle(ItemKind::Expand));

        let events = tick(&mut state, &TickInput { pointer_x: None, now_ms: 1_000.0 });
        assert!(events.contains(&GameEvent::ItemCollected { kind: ItemKind::Expand }));
        assert!(state.items.is_empty());
        assert_eq!(state.paddle.width, PADDLE_WIDTH * 1.5);

        tick(&mut state, &TickInput { pointer_x: None, now_ms: 10_999.0 });
        assert_eq!(state.paddle.width, PADDLE_WIDTH * 1.5);

        let events = tick(&mut state, &TickInput { pointer_x: None, now_ms: 11_000.0 });
        assert!(events.contains(&GameEvent::PaddleRestored));
        assert_eq!(state.paddle.width, PADDLE_WIDTH);
        assert!(state.effects.pending_width_reverts.is_empty());
    }

    #[test]
    fn test_expand_reverts_after_round_is_over() {
        let mut state = playing_with(vec![idle_ball()]);
        state.items.push(item_above_paddle(ItemKind::Expand));
        tick(&mut state, &TickInput { pointer_x: None, now_ms: 0.0 });
        state.finish(RoundOutcome::BallLost);

        tick(&mut state, &TickInput { pointer_x: None, now_ms: 10_000.0 });
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.paddle.width, PADDLE_WIDTH);
    }

    #[test]
    fn test_stale_expand_reversion_carries_into_next_round() {
        let mut state = playing_with(vec![idle_ball()]);
        state.items.push(item_above_paddle(ItemKind::Expand));
        tick(&mut state, &TickInput { pointer_x: None, now_ms: 0.0 });

        state.finish(RoundOutcome::BallLost);
        state.return_to_menu().unwrap();
        state.begin_round(Difficulty::Easy).unwrap();
        state.blocks = vec![Block::at_cell(0, 8)];
        state.balls = vec![idle_ball()];
        assert_eq!(state.paddle.width, PADDLE_WIDTH);

        // Fresh expand in the new round
        state.items.push(item_above_paddle(ItemKind::Expand));
        tick(&mut state, &TickInput { pointer_x: None, now_ms: 8_000.0 });
        assert_eq!(state.paddle.width, PADDLE_WIDTH * 1.5);

        // Previous round's reversion cuts it short
        tick(&mut state, &TickInput { pointer_x: None, now_ms: 10_000.0 });
        assert_eq!(state.paddle.width, PADDLE_WIDTH);
        assert_eq!(state.effects.pending_width_reverts, vec![18_000.0]);
    }

    #[test]
    fn test_expand_near_wall_stays_in_arena() {
        let mut state = playing_with(vec![idle_ball()]);
        let mut item = item_above_paddle(ItemKind::Expand);
        item.pos.x = 440.0;
        state.items.push(item);

        tick(&mut state, &TickInput { pointer_x: Some(470.0), now_ms: 0.0 });
        assert_eq!(state.paddle.width, PADDLE_WIDTH * 1.5);
        assert_eq!(state.paddle.x, ARENA_WIDTH - PADDLE_WIDTH * 1.5);
    }

    #[test]
    fn test_multiball_duplicates_each_ball() {
        let a = Ball::new(Vec2::new(100.0, 300.0), Vec2::new(1.5, -2.0));
        let b = Ball::new(Vec2::new(300.0, 300.0), Vec2::new(-0.5, 1.0));
        let mut state = playing_with(vec![a, b]);
        state.items.push(item_above_paddle(ItemKind::MultiBall));

        tick(&mut state, &TickInput::default());
        assert_eq!(state.balls.len(), 4);
        assert_eq!(state.balls[2].vel.x, -1.5);
        assert_eq!(state.balls[3].vel.x, 0.5);
        assert_eq!(state.balls[2].pos, state.balls[0].pos);
        assert_eq!(state.balls[3].vel.y, state.balls[1].vel.y);
    }

    #[test]
    fn test_multiball_compounds() {
        let mut state = playing_with(vec![idle_ball()]);
        state.items.push(item_above_paddle(ItemKind::MultiBall));
        state.items.push(item_above_paddle(ItemKind::MultiBall));

        tick(&mut state, &TickInput::default());
        assert_eq!(state.balls.len(), 4);
    }

    #[test]
    fn test_pointer_input_applied_before_step() {
        let mut state = playing_with(vec![idle_ball()]);
        tick(&mut state, &TickInput { pointer_x: Some(100.0), now_ms: 0.0 });
        assert_eq!(state.paddle.x, 62.5);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        state1.begin_round(Difficulty::Hard).unwrap();
        state2.begin_round(Difficulty::Hard).unwrap();

        for step in 0..600 {
            let input = TickInput {
                pointer_x: state1.balls.first().map(|b| b.pos.x),
                now_ms: step as f64 * 16.0,
            };
            tick(&mut state1, &input);
            tick(&mut state2, &input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.balls, state2.balls);
        assert_eq!(state1.items, state2.items);
        assert_eq!(state1.phase, state2.phase);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_pointer_keeps_paddle_in_arena(xs in prop::collection::vec(-1000.0f32..1500.0, 1..64)) {
            let mut state = playing_with(vec![idle_ball()]);
            for x in xs {
                state.apply_pointer(x);
                prop_assert!(state.paddle.x >= 0.0);
                prop_assert!(state.paddle.x <= state.paddle.max_x());
            }
        }

        #[test]
        fn prop_round_invariants(seed in any::<u64>(), level in 1u8..=3, aim in -40.0f32..40.0) {
            let mut state = GameState::new(seed);
            state.begin_round_at_level(level).unwrap();
            let points = state.difficulty.points_per_block();
            let mut visible: Vec<bool> = state.blocks.iter().map(|b| b.visible).collect();

            for step in 0..3000u32 {
                if state.phase != GamePhase::Playing {
                    break;
                }
                prop_assert!(!state.balls.is_empty());

                let input = TickInput {
                    pointer_x: Some(state.balls[0].pos.x + aim),
                    now_ms: step as f64 * 1000.0 / 60.0,
                };
                tick(&mut state, &input);

                prop_assert!(state.paddle.x >= 0.0);
                prop_assert!(state.paddle.x <= state.paddle.max_x());
                for (was, block) in visible.iter().zip(&state.blocks) {
                    prop_assert!(*was || !block.visible);
                }
                prop_assert_eq!(state.score, points * state.destroyed_blocks() as u64);
                visible = state.blocks.iter().map(|b| b.visible).collect();
            }

            if state.phase == GamePhase::GameOver && state.outcome == Some(RoundOutcome::Cleared) {
                prop_assert_eq!(state.visible_blocks(), 0);
            }
        }
    }

    #[test]
    fn test_paddle_default_matches_layout() {
        let paddle = Paddle::default();
        assert_eq!(paddle.center_x(), ARENA_WIDTH / 2.0);
        assert_eq!(paddle.y, PADDLE_Y);
    }
}
