//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation by one display frame.

use rand::Rng;

use super::ai;
use super::collision::{ball_exit_side, ball_paddle_collision, ball_wall_collision};
use super::powerup::{PowerUpKind, Target};
use super::state::{Ball, GameEvent, GameState, Paddle, Side};
use crate::consts::*;
use crate::velocity_from_angle;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired player paddle center (from pointer/touch/keys)
    pub player_y: Option<f32>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }

    if input.pause {
        state.toggle_pause();
    }
    if let Some(y) = input.player_y {
        state.set_player_target(y);
    }

    state.now_ms += dt as f64 * 1000.0;
    state.fire_pending_reset();

    if !state.match_state.is_running() {
        return;
    }
    let now = state.now_ms;

    // Power-up bookkeeping
    state.powerups.sweep_expired(now);
    if let Some(id) = state
        .powerups
        .spawn(state.width, state.height, now, &mut state.rng)
    {
        if let Some(pickup) = state.powerups.spawned().iter().find(|p| p.id == id) {
            state.events.push(GameEvent::PowerUpSpawned {
                id,
                kind: pickup.kind,
            });
        }
    }
    maintain_multi_ball(state);

    let effects = state.multipliers();
    let player_height = state.player.effective_height(effects.player_paddle);
    let computer_height = state.computer.effective_height(effects.computer_paddle);
    // Re-clamp: a paddle that just grew may poke past the edge
    state.player.y = Paddle::clamp_y(state.player.y, player_height, state.height);

    if let Some(main) = state.balls.iter().find(|b| b.is_main) {
        ai::update_computer_paddle(
            &mut state.computer,
            &mut state.ai,
            main,
            main.vel * effects.ball_speed,
            &state.match_state.difficulty,
            computer_height,
            state.height,
            now,
            dt,
            &mut state.rng,
        );
    }

    // Ball physics
    let center = state.center();
    let (width, height) = (state.width, state.height);
    let mut lost_main: Option<Side> = None;
    let mut discarded: Vec<u32> = Vec::new();

    for ball in state.balls.iter_mut() {
        if ball.is_frozen() {
            continue;
        }
        let prev_x = ball.pos.x;
        ball.pos += ball.vel * effects.ball_speed * dt;

        if !ball.pos.is_finite() || !ball.vel.is_finite() {
            log::warn!("Ball {} left the numeric domain, removing", ball.id);
            if ball.is_main {
                ball.freeze_at(center);
                state.pending_reset_at_ms = Some(now + BALL_RESET_DELAY_MS);
            } else {
                discarded.push(ball.id);
            }
            continue;
        }

        if ball_wall_collision(ball, height) && ball.is_main {
            state.events.push(GameEvent::WallHit);
        }

        for (paddle, paddle_height) in [
            (&state.player, player_height),
            (&state.computer, computer_height),
        ] {
            let contact = ball_paddle_collision(
                ball,
                prev_x,
                paddle,
                paddle_height,
                BALL_SPEED_INCREMENT,
                state.max_ball_speed,
            );
            if contact.is_some() {
                if ball.is_main {
                    state.events.push(GameEvent::PaddleHit { side: paddle.side });
                }
                break;
            }
        }

        if let Some(loser) = ball_exit_side(ball, width) {
            if ball.is_main {
                lost_main = Some(loser);
            } else {
                discarded.push(ball.id);
            }
        }
    }

    // Pickups are credited to whoever sent the ball that way
    for ball in &state.balls {
        if ball.vel.x == 0.0 || discarded.contains(&ball.id) {
            continue;
        }
        if let Some(id) = state.powerups.find_overlap(ball.pos, ball.radius) {
            if let Some(effect) = state.powerups.collect(id, ball.vel.x > 0.0, now) {
                state.events.push(GameEvent::PowerUpCollected {
                    kind: effect.kind,
                    target: effect.target,
                });
            }
        }
    }

    if !discarded.is_empty() {
        state.balls.retain(|b| !discarded.contains(&b.id));
    }

    if let Some(loser) = lost_main {
        state.score_point(loser.opponent());
    }
}

/// Keep the extra-ball count in line with the multi-ball effect
fn maintain_multi_ball(state: &mut GameState) {
    if !state.powerups.is_active(PowerUpKind::MultiBall, Target::Game) {
        if state.balls.iter().any(|b| !b.is_main) {
            state.balls.retain(|b| b.is_main);
        }
        return;
    }

    let extras = state.balls.iter().filter(|b| !b.is_main).count();
    for _ in extras..MULTI_BALL_EXTRA {
        let angle = state
            .rng
            .random_range(-MAX_BOUNCE_ANGLE..=MAX_BOUNCE_ANGLE);
        let dir = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let id = state.next_entity_id();
        let center = state.center();
        state.balls.push(Ball::new(
            id,
            center,
            velocity_from_angle(BALL_START_SPEED, angle, dir),
            false,
        ));
    }
}

/// Accumulates real frame time and runs fixed `SIM_DT` steps
#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    accumulator: f32,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many fixed steps as `frame_dt` seconds cover (capped at
    /// `MAX_SUBSTEPS`). Returns the number of steps run.
    ///
    /// One-shot input (pause, paddle position) is consumed by the first step.
    /// A frame too short to run a step leaves it queued for the next frame.
    pub fn advance(&mut self, state: &mut GameState, input: &mut TickInput, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.min(0.1);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT);
            self.accumulator -= SIM_DT;
            steps += 1;

            // Clear one-shot inputs after processing
            input.pause = false;
            input.player_y = None;
        }
        if steps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }
}
