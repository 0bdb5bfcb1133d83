//! Read-only view of the game for rendering
//!
//! Effective sizes and opacity are resolved here so the renderer never needs
//! to know about power-up internals.

use serde::Serialize;

use super::powerup::{PowerUpKind, SpawnedPowerUp, Target};
use super::state::{GamePhase, GameState, Paddle, Side};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub opacity: f32,
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaddleView {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Height after power-up modifiers
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveView {
    pub kind: PowerUpKind,
    pub name: &'static str,
    pub target: Target,
    pub remaining_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub width: f32,
    pub height: f32,
    pub phase: GamePhase,
    pub player_score: u32,
    pub computer_score: u32,
    pub points_to_win: u32,
    pub winner: Option<Side>,
    pub level: u8,
    pub balls: Vec<BallView>,
    pub player: PaddleView,
    pub computer: PaddleView,
    pub active_powerups: Vec<ActiveView>,
    pub spawned_powerups: Vec<SpawnedPowerUp>,
}

fn paddle_view(paddle: &Paddle, multiplier: f32) -> PaddleView {
    PaddleView {
        side: paddle.side,
        x: paddle.x,
        y: paddle.y,
        width: paddle.width,
        height: paddle.effective_height(multiplier),
    }
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        let effects = self.multipliers();
        let m = &self.match_state;
        Snapshot {
            width: self.width,
            height: self.height,
            phase: m.phase,
            player_score: m.player_score,
            computer_score: m.computer_score,
            points_to_win: m.points_to_win,
            winner: m.winner,
            level: m.difficulty.level,
            balls: self
                .balls
                .iter()
                .map(|b| BallView {
                    id: b.id,
                    x: b.pos.x,
                    y: b.pos.y,
                    radius: b.radius,
                    opacity: effects.ball_opacity,
                    is_main: b.is_main,
                })
                .collect(),
            player: paddle_view(&self.player, effects.paddle(Side::Player)),
            computer: paddle_view(&self.computer, effects.paddle(Side::Computer)),
            active_powerups: self
                .powerups
                .active()
                .iter()
                .map(|a| ActiveView {
                    kind: a.kind,
                    name: a.kind.config().name,
                    target: a.target,
                    remaining_ms: a.remaining_ms(self.now_ms),
                })
                .collect(),
            spawned_powerups: self.powerups.spawned().to_vec(),
        }
    }

    /// Snapshot as JSON for a JavaScript renderer
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }
}
