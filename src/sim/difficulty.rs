//! Computer opponent difficulty
//!
//! A level maps to two AI knobs: how fast the computer paddle moves and how
//! much of the ball's projected trajectory it aims for.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Preset (speed multiplier, prediction accuracy) per level, index 0 = level 1
const PRESETS: [(f32, f32); MAX_LEVEL as usize] = [
    (0.6, 0.3),
    (0.75, 0.45),
    (0.9, 0.6),
    (1.05, 0.75),
    (1.2, 0.9),
];

/// Jitter band used at level 1 so beginners get a forgiving opponent
const BEGINNER_JITTER: f32 = 70.0;
const BEGINNER_JITTER_INTERVAL_MS: f64 = 900.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// 1..=MAX_LEVEL
    pub level: u8,
    /// Scales `COMPUTER_PADDLE_SPEED`
    pub speed_multiplier: f32,
    /// 0 = ignore trajectory, 1 = perfect projection
    pub prediction_accuracy: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::preset(MIN_LEVEL)
    }
}

impl Difficulty {
    /// Preset for a manually selected level (clamped to the valid range)
    pub fn preset(level: u8) -> Self {
        let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
        let (speed_multiplier, prediction_accuracy) = PRESETS[(level - MIN_LEVEL) as usize];
        Self {
            level,
            speed_multiplier,
            prediction_accuracy,
        }
    }

    pub fn is_max(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    /// Step up one level. Returns false when already at the top.
    pub fn level_up(&mut self) -> bool {
        if self.is_max() {
            return false;
        }
        self.level += 1;
        self.speed_multiplier += LEVEL_SPEED_STEP;
        self.prediction_accuracy =
            (self.prediction_accuracy + LEVEL_ACCURACY_STEP).min(MAX_PREDICTION_ACCURACY);
        true
    }

    /// Maximum computer paddle speed in pixels/s
    pub fn paddle_speed(&self) -> f32 {
        COMPUTER_PADDLE_SPEED * self.speed_multiplier
    }

    /// Half-width of the random aim offset band (pixels)
    pub fn jitter_amplitude(&self) -> f32 {
        if self.level <= MIN_LEVEL {
            BEGINNER_JITTER
        } else {
            (1.0 - self.prediction_accuracy).max(0.0) * 60.0
        }
    }

    /// How long a sampled aim offset is held before resampling
    pub fn jitter_interval_ms(&self) -> f64 {
        if self.level <= MIN_LEVEL {
            BEGINNER_JITTER_INTERVAL_MS
        } else {
            200.0 + 700.0 * (1.0 - self.prediction_accuracy).max(0.0) as f64
        }
    }
}
