//! Game state and core simulation types
//!
//! Everything the frame loop mutates lives in [`GameState`], owned by the
//! application shell and passed by reference into `tick` and the lifecycle
//! methods.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::AiState;
use super::difficulty::Difficulty;
use super::powerup::{EffectMultipliers, PowerUpEngine, PowerUpKind, Target};
use crate::consts::*;
use crate::settings::Settings;

/// Which paddle. The player defends the left edge, the computer the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Computer,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Computer,
            Side::Computer => Side::Player,
        }
    }
}

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start
    Ready,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Someone reached the points-to-win threshold
    Over,
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    /// Nominal velocity (pixels/s); power-ups scale it at integration time
    pub vel: Vec2,
    pub radius: f32,
    /// Only the main ball scores and steers the computer paddle
    pub is_main: bool,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, is_main: bool) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: BALL_RADIUS,
            is_main,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Parked at the serve point waiting for a reset
    pub fn is_frozen(&self) -> bool {
        self.vel == Vec2::ZERO
    }

    pub fn freeze_at(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
    }
}

/// A paddle. Height here is nominal; use `effective_height` for gameplay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    /// Left edge x
    pub x: f32,
    /// Vertical center
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    pub fn new(side: Side, field_width: f32, field_height: f32) -> Self {
        let x = match side {
            Side::Player => PADDLE_MARGIN,
            Side::Computer => field_width - PADDLE_MARGIN - PADDLE_WIDTH,
        };
        Self {
            side,
            x,
            y: field_height / 2.0,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }

    /// X of the face the ball bounces off
    pub fn face_x(&self) -> f32 {
        match self.side {
            Side::Player => self.x + self.width,
            Side::Computer => self.x,
        }
    }

    /// Horizontal direction a ball leaves this paddle in
    pub fn away_dir(&self) -> f32 {
        match self.side {
            Side::Player => 1.0,
            Side::Computer => -1.0,
        }
    }

    pub fn effective_height(&self, multiplier: f32) -> f32 {
        self.height * multiplier
    }

    /// Clamp a center position so the whole paddle stays on the field
    pub fn clamp_y(y: f32, effective_height: f32, field_height: f32) -> f32 {
        let half = effective_height / 2.0;
        if half * 2.0 >= field_height {
            return field_height / 2.0;
        }
        if !y.is_finite() {
            return field_height / 2.0;
        }
        y.clamp(half, field_height - half)
    }

    /// Move toward `target_y` by at most `max_step`
    pub fn move_toward(&mut self, target_y: f32, max_step: f32) {
        let delta = target_y - self.y;
        self.y += delta.clamp(-max_step, max_step);
    }
}

/// Scores, phase and difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub player_score: u32,
    pub computer_score: u32,
    pub phase: GamePhase,
    pub winner: Option<Side>,
    pub points_to_win: u32,
    pub difficulty: Difficulty,
}

impl MatchState {
    pub fn new(points_to_win: u32, difficulty: Difficulty) -> Self {
        Self {
            player_score: 0,
            computer_score: 0,
            phase: GamePhase::Ready,
            winner: None,
            points_to_win: points_to_win.max(1),
            difficulty,
        }
    }

    pub fn is_started(&self) -> bool {
        self.phase != GamePhase::Ready
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }
}

/// Events raised during a tick or lifecycle call, drained by the shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Main ball bounced off the top or bottom wall
    WallHit,
    /// Main ball bounced off a paddle
    PaddleHit { side: Side },
    PointScored { side: Side },
    LevelUp { level: u8 },
    PowerUpSpawned { id: u32, kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind, target: Target },
    MatchOver {
        winner: Side,
        player_score: u32,
        computer_score: u32,
    },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    /// Virtual clock, advanced only by `tick`
    pub now_ms: f64,
    pub width: f32,
    pub height: f32,
    /// Active balls; exactly one has `is_main` set
    pub balls: Vec<Ball>,
    pub player: Paddle,
    pub computer: Paddle,
    pub match_state: MatchState,
    pub powerups: PowerUpEngine,
    pub ai: AiState,
    /// When the frozen main ball should be served again
    pub pending_reset_at_ms: Option<f64>,
    pub events: Vec<GameEvent>,
    /// Level restored on restart
    pub starting_level: u8,
    pub powerups_enabled: bool,
    /// Optional ceiling on ball speed after paddle hits
    pub max_ball_speed: Option<f32>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and default settings
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, &Settings::default())
    }

    pub fn with_settings(seed: u64, settings: &Settings) -> Self {
        let width = FIELD_WIDTH;
        let height = FIELD_HEIGHT;
        let difficulty = Difficulty::preset(settings.starting_level);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            now_ms: 0.0,
            width,
            height,
            balls: Vec::new(),
            player: Paddle::new(Side::Player, width, height),
            computer: Paddle::new(Side::Computer, width, height),
            match_state: MatchState::new(settings.points_to_win, difficulty),
            powerups: PowerUpEngine::default(),
            ai: AiState::new(height / 2.0),
            pending_reset_at_ms: None,
            events: Vec::new(),
            starting_level: difficulty.level,
            powerups_enabled: settings.powerups_enabled,
            max_ball_speed: settings.max_ball_speed,
            next_id: 1,
        };

        let id = state.next_entity_id();
        let center = state.center();
        state.balls.push(Ball::new(id, center, Vec2::ZERO, true));

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn center(&self) -> Vec2 {
        crate::field_center(self.width, self.height)
    }

    pub fn main_ball(&self) -> Option<&Ball> {
        self.balls.iter().find(|b| b.is_main)
    }

    pub fn main_ball_mut(&mut self) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.is_main)
    }

    pub fn multipliers(&self) -> EffectMultipliers {
        self.powerups.multipliers()
    }

    /// Set the player paddle center, clamped to the field
    pub fn set_player_target(&mut self, y: f32) {
        let height = self.player.effective_height(self.multipliers().player_paddle);
        self.player.y = Paddle::clamp_y(y, height, self.height);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_one_frozen_main_ball() {
        let state = GameState::new(1);
        assert_eq!(state.balls.len(), 1);
        assert!(state.balls[0].is_main);
        assert!(state.balls[0].is_frozen());
        assert_eq!(state.match_state.phase, GamePhase::Ready);
    }

    #[test]
    fn test_paddle_faces() {
        let player = Paddle::new(Side::Player, FIELD_WIDTH, FIELD_HEIGHT);
        let computer = Paddle::new(Side::Computer, FIELD_WIDTH, FIELD_HEIGHT);
        assert_eq!(player.face_x(), PADDLE_MARGIN + PADDLE_WIDTH);
        assert_eq!(computer.face_x(), FIELD_WIDTH - PADDLE_MARGIN - PADDLE_WIDTH);
        assert_eq!(player.away_dir(), 1.0);
        assert_eq!(computer.away_dir(), -1.0);
    }

    #[test]
    fn test_clamp_y() {
        assert_eq!(Paddle::clamp_y(-50.0, 100.0, 500.0), 50.0);
        assert_eq!(Paddle::clamp_y(1000.0, 100.0, 500.0), 450.0);
        assert_eq!(Paddle::clamp_y(200.0, 100.0, 500.0), 200.0);
        assert_eq!(Paddle::clamp_y(f32::NAN, 100.0, 500.0), 250.0);
        // Taller than the field: pinned to center
        assert_eq!(Paddle::clamp_y(10.0, 600.0, 500.0), 250.0);
    }

    #[test]
    fn test_set_player_target_clamps() {
        let mut state = GameState::new(1);
        state.set_player_target(-100.0);
        assert_eq!(state.player.y, PADDLE_HEIGHT / 2.0);
        state.set_player_target(10_000.0);
        assert_eq!(state.player.y, FIELD_HEIGHT - PADDLE_HEIGHT / 2.0);
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(1);
        state.events.push(GameEvent::WallHit);
        assert_eq!(state.drain_events(), vec![GameEvent::WallHit]);
        assert!(state.events.is_empty());
    }
}
