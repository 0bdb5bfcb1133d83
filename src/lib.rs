//! Ping-Pong Arena - browser ping-pong against a computer paddle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, AI, power-ups, match flow)
//! - `audio`: Sound cues triggered by simulation events
//! - `settings`: Persisted player preferences
//! - `stats`: End-of-match statistics

pub mod audio;
pub mod settings;
pub mod sim;
pub mod stats;

pub use settings::Settings;
pub use stats::PlayerStats;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one display frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Field dimensions (pixels, y grows downward)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 12.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    /// Gap between the field edge and the back of each paddle
    pub const PADDLE_MARGIN: f32 = 20.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Launch speed (pixels/s)
    pub const BALL_START_SPEED: f32 = 360.0;
    /// Added to scalar speed on every paddle contact (pixels/s)
    pub const BALL_SPEED_INCREMENT: f32 = 18.0;
    /// Maximum bounce angle off a paddle edge (45 degrees)
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_4;
    /// Serve angle spread either side of horizontal (22.5 degrees)
    pub const LAUNCH_ANGLE_SPREAD: f32 = std::f32::consts::FRAC_PI_8;
    /// Visual pause between a point and the next serve
    pub const BALL_RESET_DELAY_MS: f64 = 1000.0;

    /// Computer paddle base speed (pixels/s) before the difficulty multiplier
    pub const COMPUTER_PADDLE_SPEED: f32 = 300.0;
    /// Computer paddle holds still when this close to its target
    pub const AI_DEADZONE: f32 = 4.0;
    /// Below this horizontal speed the trajectory projection is skipped
    pub const AI_MIN_HORIZONTAL_SPEED: f32 = 1.0;

    /// Difficulty progression
    pub const MIN_LEVEL: u8 = 1;
    pub const MAX_LEVEL: u8 = 5;
    /// Player points between automatic level-ups
    pub const LEVEL_UP_EVERY: u32 = 3;
    pub const LEVEL_SPEED_STEP: f32 = 0.15;
    pub const LEVEL_ACCURACY_STEP: f32 = 0.15;
    pub const MAX_PREDICTION_ACCURACY: f32 = 0.95;

    /// Default match length
    pub const DEFAULT_POINTS_TO_WIN: u32 = 11;

    /// Power-up pickups
    pub const POWERUP_RADIUS: f32 = 15.0;
    pub const POWERUP_SPAWN_INTERVAL_MS: f64 = 8000.0;
    pub const MAX_POWERUPS_ON_FIELD: usize = 2;
    /// Inset from the field edges for pickup placement
    pub const POWERUP_SPAWN_MARGIN: f32 = 80.0;
    /// No pickups within this distance of the serve point
    pub const POWERUP_CENTER_EXCLUSION: f32 = 100.0;
    pub const POWERUP_PLACEMENT_ATTEMPTS: u32 = 32;
    /// Extra balls kept alive while multi-ball is active
    pub const MULTI_BALL_EXTRA: usize = 2;
}

/// Center of a field of the given size
#[inline]
pub fn field_center(width: f32, height: f32) -> Vec2 {
    Vec2::new(width / 2.0, height / 2.0)
}

/// Velocity for a scalar speed along `angle` from horizontal, heading
/// right when `dir_x` is positive and left otherwise.
///
/// Positive angles point down the screen.
#[inline]
pub fn velocity_from_angle(speed: f32, angle: f32, dir_x: f32) -> Vec2 {
    let sign = if dir_x < 0.0 { -1.0 } else { 1.0 };
    Vec2::new(sign * speed * angle.cos(), speed * angle.sin())
}
