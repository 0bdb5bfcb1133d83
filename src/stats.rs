//! Player statistics
//!
//! Persisted to LocalStorage, updated once per finished match.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, Side};

/// Outcome of a finished match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: Side,
    pub player_score: u32,
    pub computer_score: u32,
    /// Unix timestamp (ms) when the match ended
    pub finished_at: f64,
}

impl MatchResult {
    /// Build a result from a `MatchOver` event
    pub fn from_event(event: &GameEvent, finished_at: f64) -> Option<Self> {
        match *event {
            GameEvent::MatchOver {
                winner,
                player_score,
                computer_score,
            } => Some(Self {
                winner,
                player_score,
                computer_score,
                finished_at,
            }),
            _ => None,
        }
    }
}

/// Somewhere finished matches get reported to
pub trait StatsSink {
    fn record(&mut self, result: &MatchResult);
}

/// Lifetime totals for the local player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    /// Best player score in a single match
    pub high_score: u32,
    /// Unix timestamp (ms) of the last finished match
    pub last_played: Option<f64>,
}

impl PlayerStats {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ping_pong_arena_stats";

    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished match into the totals.
    /// Returns true if it set a new high score.
    pub fn record_match(&mut self, result: &MatchResult) -> bool {
        self.games_played = self.games_played.saturating_add(1);
        if result.winner == Side::Player {
            self.games_won = self.games_won.saturating_add(1);
        }
        if result.finished_at.is_finite() {
            self.last_played = Some(result.finished_at);
        }

        let new_best = result.player_score > self.high_score;
        if new_best {
            self.high_score = result.player_score;
        }
        new_best
    }

    /// Fraction of games won (0.0 with no games)
    pub fn win_rate(&self) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            self.games_won as f32 / self.games_played as f32
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load stats from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(stats) = Self::from_json(&json) {
                    log::info!("Loaded stats ({} games played)", stats.games_played);
                    return stats;
                }
            }
        }

        log::info!("No stats found, starting fresh");
        Self::new()
    }

    /// Save stats to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Stats saved ({} games)", self.games_played);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl StatsSink for PlayerStats {
    fn record(&mut self, result: &MatchResult) {
        if self.record_match(result) {
            log::info!("New high score: {}", self.high_score);
        }
        self.save();
    }
}
