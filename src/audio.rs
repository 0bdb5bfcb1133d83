//! Audio cues
//!
//! The simulation raises [`GameEvent`]s; the shell turns the ones that make
//! noise into [`SoundCue`]s and hands them to an [`AudioSink`]. Playback is
//! fire-and-forget: a sink must swallow its own failures.
//!
//! On the web, cues are procedurally generated with the Web Audio API - no
//! external files needed!

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::{GameEvent, Side};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Ball hits a paddle or wall
    Hit,
    /// Player scores or wins
    Success,
    /// Power-up collected
    PowerUp,
}

/// Anything that can play a cue
pub trait AudioSink {
    fn play(&self, cue: SoundCue);
}

/// Cue for an event, if it has one
pub fn cue_for(event: &GameEvent) -> Option<SoundCue> {
    match event {
        GameEvent::WallHit | GameEvent::PaddleHit { .. } => Some(SoundCue::Hit),
        GameEvent::PointScored { side: Side::Player } => Some(SoundCue::Success),
        GameEvent::MatchOver {
            winner: Side::Player,
            ..
        } => Some(SoundCue::Success),
        GameEvent::PowerUpCollected { .. } => Some(SoundCue::PowerUp),
        _ => None,
    }
}

/// Play the cue for every event that has one
pub fn dispatch_events(events: &[GameEvent], sink: &dyn AudioSink) {
    for cue in events.iter().filter_map(cue_for) {
        sink.play(cue);
    }
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            #[cfg(target_arch = "wasm32")]
            ctx: Self::create_context(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut audio = Self::new();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    #[cfg(target_arch = "wasm32")]
    fn create_context() -> Option<AudioContext> {
        // May fail if not in secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        ctx
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn emit(&self, cue: SoundCue, vol: f32) {
        log::trace!("Cue {:?} at volume {:.2}", cue, vol);
    }

    #[cfg(target_arch = "wasm32")]
    fn emit(&self, cue: SoundCue, vol: f32) {
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Hit => self.play_hit(ctx, vol),
            SoundCue::Success => self.play_success(ctx, vol),
            SoundCue::PowerUp => self.play_powerup(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    #[cfg(target_arch = "wasm32")]
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Hit - short square blip
    #[cfg(target_arch = "wasm32")]
    fn play_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 440.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Success - rising two-note chime
    #[cfg(target_arch = "wasm32")]
    fn play_success(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [660.0, 880.0].iter().enumerate() {
            let delay = i as f64 * 0.1;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }

    /// Power-up - happy ding
    #[cfg(target_arch = "wasm32")]
    fn play_powerup(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
            let delay = i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }
}

impl AudioSink for AudioManager {
    fn play(&self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.emit(cue, vol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{PowerUpKind, Target};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        played: RefCell<Vec<SoundCue>>,
    }

    impl AudioSink for RecordingSink {
        fn play(&self, cue: SoundCue) {
            self.played.borrow_mut().push(cue);
        }
    }

    #[test]
    fn test_dispatch_maps_events() {
        let sink = RecordingSink::default();
        let events = vec![
            GameEvent::WallHit,
            GameEvent::PaddleHit { side: Side::Computer },
            GameEvent::PointScored { side: Side::Computer },
            GameEvent::PointScored { side: Side::Player },
            GameEvent::LevelUp { level: 2 },
            GameEvent::PowerUpCollected {
                kind: PowerUpKind::SlowMotion,
                target: Target::Ball,
            },
        ];
        dispatch_events(&events, &sink);
        assert_eq!(
            *sink.played.borrow(),
            vec![SoundCue::Hit, SoundCue::Hit, SoundCue::Success, SoundCue::PowerUp]
        );
    }

    #[test]
    fn test_computer_win_is_silent() {
        let event = GameEvent::MatchOver {
            winner: Side::Computer,
            player_score: 3,
            computer_score: 11,
        };
        assert_eq!(cue_for(&event), None);
    }

    #[test]
    fn test_volume_from_settings() {
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 2.0,
            ..Default::default()
        };
        let audio = AudioManager::from_settings(&settings);
        assert_eq!(audio.effective_volume(), 0.5);

        let muted = AudioManager::from_settings(&Settings {
            muted: true,
            ..Default::default()
        });
        assert_eq!(muted.effective_volume(), 0.0);
        // Muted playback is a silent no-op
        muted.play(SoundCue::Hit);
    }
}
