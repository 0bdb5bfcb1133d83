//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Driven only by `tick` and the lifecycle methods on `GameState`
//! - Virtual clock only, no wall time
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod difficulty;
pub mod lifecycle;
pub mod powerup;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use ai::AiState;
pub use collision::{PaddleContact, ball_exit_side, ball_paddle_collision, ball_wall_collision, circles_overlap};
pub use difficulty::Difficulty;
pub use powerup::{
    ActivePowerUp, EffectMultipliers, POWERUP_CONFIGS, PowerUpConfig, PowerUpEngine, PowerUpKind,
    PowerUpTuning, SpawnedPowerUp, Target,
};
pub use snapshot::Snapshot;
pub use state::{Ball, GameEvent, GamePhase, GameState, MatchState, Paddle, Side};
pub use tick::{FrameDriver, TickInput, tick};
