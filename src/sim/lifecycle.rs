//! Match flow: start, pause, scoring, difficulty and game over
//!
//! Transitions: `Ready -> Running <-> Paused`, `Running -> Over`,
//! `Over -> Running` through a restart.

use glam::Vec2;
use rand::Rng;

use super::difficulty::Difficulty;
use super::state::{Ball, GameEvent, GamePhase, GameState, Side};
use crate::consts::*;
use crate::velocity_from_angle;

impl GameState {
    /// Begin play from `Ready` or `Over`. Returns false in any other phase.
    pub fn start(&mut self) -> bool {
        match self.match_state.phase {
            GamePhase::Ready => {}
            GamePhase::Over => self.reset_match(),
            GamePhase::Running | GamePhase::Paused => return false,
        }

        self.balls.retain(|b| b.is_main);
        self.serve();
        self.match_state.phase = GamePhase::Running;
        if self.powerups_enabled {
            self.powerups.enable(self.now_ms);
        }
        log::info!(
            "Match started (first to {}, level {})",
            self.match_state.points_to_win,
            self.match_state.difficulty.level
        );
        true
    }

    /// Reset scores, difficulty and power-ups, then start a fresh match
    pub fn restart(&mut self) {
        self.reset_match();
        self.match_state.phase = GamePhase::Ready;
        self.start();
    }

    fn reset_match(&mut self) {
        self.match_state.player_score = 0;
        self.match_state.computer_score = 0;
        self.match_state.winner = None;
        self.match_state.difficulty = Difficulty::preset(self.starting_level);
        self.powerups.disable();
        self.balls.retain(|b| b.is_main);
        let center_y = self.height / 2.0;
        self.ai.reset(center_y);
        self.computer.y = center_y;
    }

    /// Flip between `Running` and `Paused`; ignored in other phases
    pub fn toggle_pause(&mut self) {
        self.match_state.phase = match self.match_state.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Running,
            other => other,
        };
    }

    /// Credit a point. Ignored once the match is over.
    pub fn score_point(&mut self, side: Side) {
        if self.match_state.is_over() {
            return;
        }

        let score = match side {
            Side::Player => {
                self.match_state.player_score += 1;
                self.match_state.player_score
            }
            Side::Computer => {
                self.match_state.computer_score += 1;
                self.match_state.computer_score
            }
        };
        self.events.push(GameEvent::PointScored { side });
        log::debug!(
            "Point to {:?}: {} - {}",
            side,
            self.match_state.player_score,
            self.match_state.computer_score
        );

        if side == Side::Player && score > 0 && score % LEVEL_UP_EVERY == 0 {
            self.level_up();
        }

        let center = self.center();
        if score >= self.match_state.points_to_win {
            self.match_state.phase = GamePhase::Over;
            self.match_state.winner = Some(side);
            self.powerups.disable();
            self.pending_reset_at_ms = None;
            self.balls.retain(|b| b.is_main);
            if let Some(ball) = self.main_ball_mut() {
                ball.freeze_at(center);
            }
            self.events.push(GameEvent::MatchOver {
                winner: side,
                player_score: self.match_state.player_score,
                computer_score: self.match_state.computer_score,
            });
            log::info!(
                "Match over, {:?} wins {} - {}",
                side,
                self.match_state.player_score,
                self.match_state.computer_score
            );
        } else {
            // Park the ball so it cannot score again before the serve
            if let Some(ball) = self.main_ball_mut() {
                ball.freeze_at(center);
            }
            self.pending_reset_at_ms = Some(self.now_ms + BALL_RESET_DELAY_MS);
        }
    }

    /// Raise difficulty one level (no-op at the top level)
    pub fn level_up(&mut self) {
        if self.match_state.difficulty.level_up() {
            let level = self.match_state.difficulty.level;
            self.events.push(GameEvent::LevelUp { level });
            log::info!("Difficulty up to level {}", level);
        }
    }

    /// Jump straight to a preset level
    pub fn set_difficulty_level(&mut self, level: u8) {
        self.match_state.difficulty = Difficulty::preset(level);
        self.ai.next_jitter_at_ms = self.now_ms;
        log::info!("Difficulty set to level {}", self.match_state.difficulty.level);
    }

    /// Serve the main ball if a scheduled reset is due.
    ///
    /// A reset that fires after a restart finds the ball already in play and
    /// leaves it alone.
    pub(crate) fn fire_pending_reset(&mut self) {
        let Some(at) = self.pending_reset_at_ms else {
            return;
        };
        if self.now_ms < at {
            return;
        }
        self.pending_reset_at_ms = None;

        let in_play = matches!(
            self.match_state.phase,
            GamePhase::Running | GamePhase::Paused
        );
        if in_play && self.main_ball().is_some_and(|b| b.is_frozen()) {
            self.serve();
        }
    }

    /// Put the main ball at center with a random launch within the serve spread
    fn serve(&mut self) {
        let angle = self
            .rng
            .random_range(-LAUNCH_ANGLE_SPREAD..=LAUNCH_ANGLE_SPREAD);
        let dir = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let center = self.center();

        if self.main_ball().is_none() {
            let id = self.next_entity_id();
            self.balls.push(Ball::new(id, center, Vec2::ZERO, true));
        }
        if let Some(ball) = self.main_ball_mut() {
            ball.pos = center;
            ball.vel = velocity_from_angle(BALL_START_SPEED, angle, dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn running(points_to_win: u32) -> GameState {
        let settings = Settings {
            points_to_win,
            ..Default::default()
        };
        let mut state = GameState::with_settings(7, &settings);
        assert!(state.start());
        state
    }

    #[test]
    fn test_start_launches_within_spread() {
        let state = running(11);
        let ball = state.main_ball().unwrap();
        assert_eq!(state.match_state.phase, GamePhase::Running);
        assert!((ball.speed() - BALL_START_SPEED).abs() < 1e-3);
        let angle = (ball.vel.y / ball.vel.x.abs()).atan();
        assert!(angle.abs() <= LAUNCH_ANGLE_SPREAD + 1e-5);
        assert!(state.powerups.is_enabled());
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut state = running(11);
        assert!(!state.start());
    }

    #[test]
    fn test_toggle_pause() {
        let mut state = GameState::new(1);
        state.toggle_pause();
        assert_eq!(state.match_state.phase, GamePhase::Ready);

        state.start();
        state.toggle_pause();
        assert_eq!(state.match_state.phase, GamePhase::Paused);
        state.toggle_pause();
        assert_eq!(state.match_state.phase, GamePhase::Running);
    }

    #[test]
    fn test_player_wins_at_threshold() {
        let mut state = running(5);
        for _ in 0..5 {
            state.score_point(Side::Player);
        }
        assert!(state.match_state.is_over());
        assert_eq!(state.match_state.winner, Some(Side::Player));
        assert!(!state.powerups.is_enabled());
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::MatchOver { winner: Side::Player, .. })));
    }

    #[test]
    fn test_scoring_freezes_ball_and_schedules_reset() {
        let mut state = running(11);
        state.score_point(Side::Computer);
        let ball = state.main_ball().unwrap();
        assert!(ball.is_frozen());
        assert_eq!(ball.pos, state.center());
        assert_eq!(state.pending_reset_at_ms, Some(BALL_RESET_DELAY_MS));
    }

    #[test]
    fn test_level_up_every_three_player_points() {
        let mut state = running(20);
        let mut levels = Vec::new();
        for _ in 0..9 {
            state.score_point(Side::Player);
            levels.push(state.match_state.difficulty.level);
        }
        assert_eq!(levels, vec![1, 1, 2, 2, 2, 3, 3, 3, 4]);
        for _ in 0..9 {
            state.score_point(Side::Player);
        }
        assert_eq!(state.match_state.difficulty.level, MAX_LEVEL);
    }

    #[test]
    fn test_computer_points_do_not_level_up() {
        let mut state = running(20);
        for _ in 0..6 {
            state.score_point(Side::Computer);
        }
        assert_eq!(state.match_state.difficulty.level, 1);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = running(5);
        for _ in 0..5 {
            state.score_point(Side::Player);
        }
        state.restart();
        assert_eq!(state.match_state.player_score, 0);
        assert_eq!(state.match_state.computer_score, 0);
        assert_eq!(state.match_state.difficulty.level, 1);
        assert_eq!(state.match_state.winner, None);
        assert!(state.powerups.active().is_empty());
        assert!(state.powerups.spawned().is_empty());
        assert_eq!(state.match_state.phase, GamePhase::Running);
    }

    #[test]
    fn test_start_from_over_resets_match() {
        let mut state = running(1);
        state.score_point(Side::Computer);
        assert!(state.match_state.is_over());
        assert!(state.start());
        assert_eq!(state.match_state.computer_score, 0);
        assert_eq!(state.match_state.winner, None);
    }

    #[test]
    fn test_points_after_game_over_are_ignored() {
        let mut state = running(1);
        state.score_point(Side::Player);
        state.score_point(Side::Computer);
        assert_eq!(state.match_state.computer_score, 0);
    }

    #[test]
    fn test_set_difficulty_level() {
        let mut state = GameState::new(1);
        state.set_difficulty_level(4);
        assert_eq!(state.match_state.difficulty, Difficulty::preset(4));
        state.set_difficulty_level(200);
        assert_eq!(state.match_state.difficulty.level, MAX_LEVEL);
    }

    #[test]
    fn test_stale_reset_after_restart_is_noop() {
        let mut state = running(11);
        state.score_point(Side::Player);
        state.restart();
        let vel = state.main_ball().unwrap().vel;
        state.now_ms += BALL_RESET_DELAY_MS;
        state.fire_pending_reset();
        assert_eq!(state.main_ball().unwrap().vel, vel);
        assert!(state.pending_reset_at_ms.is_none());
    }
}
