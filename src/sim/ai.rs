//! Computer paddle AI
//!
//! Aims at a linear projection of the main ball, scaled by prediction
//! accuracy, plus a periodically resampled offset so the opponent stays
//! beatable.

use glam::Vec2;
use rand::Rng;

use super::difficulty::Difficulty;
use super::state::{Ball, Paddle};
use crate::consts::*;

/// Persistent aim state between frames
#[derive(Debug, Clone, PartialEq)]
pub struct AiState {
    /// Last computed aim point (held when projection is impossible)
    pub target_y: f32,
    /// Current random aim offset
    pub jitter: f32,
    pub next_jitter_at_ms: f64,
}

impl AiState {
    pub fn new(y: f32) -> Self {
        Self {
            target_y: y,
            jitter: 0.0,
            next_jitter_at_ms: 0.0,
        }
    }

    /// Forget the aim and force a fresh offset next frame
    pub fn reset(&mut self, y: f32) {
        *self = Self::new(y);
    }
}

/// Where the ball will cross `plane_x`, blended toward its current height by
/// `accuracy` (0 = current height, 1 = full projection).
///
/// Returns `None` when the ball is not moving horizontally enough to project.
pub fn project_intercept(ball_pos: Vec2, vel: Vec2, plane_x: f32, accuracy: f32) -> Option<f32> {
    if !vel.is_finite() || !ball_pos.is_finite() || vel.x.abs() < AI_MIN_HORIZONTAL_SPEED {
        return None;
    }
    let time = ((plane_x - ball_pos.x) / vel.x).max(0.0);
    let projected = ball_pos.y + vel.y * time;
    Some(ball_pos.y + (projected - ball_pos.y) * accuracy.clamp(0.0, 1.0))
}

/// Advance the computer paddle one frame.
///
/// `ball_vel` is the main ball's effective velocity this frame.
#[allow(clippy::too_many_arguments)]
pub fn update_computer_paddle<R: Rng + ?Sized>(
    paddle: &mut Paddle,
    ai: &mut AiState,
    ball: &Ball,
    ball_vel: Vec2,
    difficulty: &Difficulty,
    effective_height: f32,
    field_height: f32,
    now_ms: f64,
    dt: f32,
    rng: &mut R,
) {
    if now_ms >= ai.next_jitter_at_ms {
        let amplitude = difficulty.jitter_amplitude();
        ai.jitter = if amplitude > 0.0 {
            rng.random_range(-amplitude..=amplitude)
        } else {
            0.0
        };
        ai.next_jitter_at_ms = now_ms + difficulty.jitter_interval_ms();
    }

    let max_step = difficulty.paddle_speed() * dt;
    let approaching = ball_vel.x > 0.0;

    let (target, step) = if approaching {
        let plane_x = paddle.face_x() - ball.radius;
        if let Some(y) =
            project_intercept(ball.pos, ball_vel, plane_x, difficulty.prediction_accuracy)
        {
            ai.target_y = y + ai.jitter;
        }
        (ai.target_y, max_step)
    } else {
        // Drift back to the middle while the player has the ball
        (field_height / 2.0, max_step * 0.5)
    };

    let target = Paddle::clamp_y(target, effective_height, field_height);
    if (target - paddle.y).abs() > AI_DEADZONE {
        paddle.move_toward(target, step);
    }
    paddle.y = Paddle::clamp_y(paddle.y, effective_height, field_height);
}
