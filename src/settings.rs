//! Match settings and preferences
//!
//! Persisted in LocalStorage on the web; native builds can read them from a
//! JSON file.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_POINTS_TO_WIN, MAX_LEVEL, MIN_LEVEL};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Match ===
    /// Points needed to win a match
    pub points_to_win: u32,
    /// Difficulty level a fresh match starts at (1-5)
    pub starting_level: u8,
    /// Spawn power-ups during play
    pub powerups_enabled: bool,
    /// Upper bound on ball speed from paddle hits, px/s (None = uncapped)
    pub max_ball_speed: Option<f32>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            points_to_win: DEFAULT_POINTS_TO_WIN,
            starting_level: MIN_LEVEL,
            powerups_enabled: true,
            max_ball_speed: None,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Pull every field back into its valid range
    pub fn sanitize(&mut self) {
        self.points_to_win = self.points_to_win.max(1);
        self.starting_level = self.starting_level.clamp(MIN_LEVEL, MAX_LEVEL);
        self.max_ball_speed = self
            .max_ball_speed
            .filter(|cap| cap.is_finite() && *cap > 0.0);
        self.master_volume = clamp_volume(self.master_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume);
    }

    /// Parse settings, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ping_pong_arena_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

fn clamp_volume(vol: f32) -> f32 {
    if vol.is_finite() {
        vol.clamp(0.0, 1.0)
    } else {
        1.0
    }
}
