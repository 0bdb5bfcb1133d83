//! Power-up pickups and timed effects
//!
//! Pickups appear on the field on a fixed schedule and are collected by
//! balls flying through them. A collected pickup installs a timed effect for
//! a target (a paddle side, the ball, or the whole game). Gameplay reads the
//! combined effects through [`EffectMultipliers`].

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;
use super::state::Side;
use crate::consts::*;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    SlowMotion,
    BigPaddle,
    ShrinkPaddle,
    InvisibleBall,
    MultiBall,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::SpeedBoost,
        PowerUpKind::SlowMotion,
        PowerUpKind::BigPaddle,
        PowerUpKind::ShrinkPaddle,
        PowerUpKind::InvisibleBall,
        PowerUpKind::MultiBall,
    ];

    pub fn config(self) -> &'static PowerUpConfig {
        &POWERUP_CONFIGS[self as usize]
    }

    /// Which gameplay quantity this kind modifies
    pub fn channel(self) -> EffectChannel {
        match self {
            PowerUpKind::SpeedBoost | PowerUpKind::SlowMotion => EffectChannel::BallSpeed,
            PowerUpKind::BigPaddle | PowerUpKind::ShrinkPaddle => EffectChannel::PaddleHeight,
            PowerUpKind::InvisibleBall => EffectChannel::BallOpacity,
            PowerUpKind::MultiBall => EffectChannel::ExtraBalls,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectChannel {
    BallSpeed,
    PaddleHeight,
    BallOpacity,
    ExtraBalls,
}

/// What an active effect applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Player,
    Computer,
    Ball,
    Game,
}

impl Target {
    /// Side-directed effects flip when the computer is the collector.
    /// Configured targets assume the player picked the item up.
    pub fn resolve(self, collected_by_player: bool) -> Target {
        match (self, collected_by_player) {
            (Target::Player, false) => Target::Computer,
            (Target::Computer, false) => Target::Player,
            (other, _) => other,
        }
    }
}

/// Static description of a power-up type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerUpConfig {
    pub kind: PowerUpKind,
    pub name: &'static str,
    /// RGB for the renderer
    pub color: u32,
    pub duration_ms: f64,
    /// Relative spawn probability
    pub spawn_weight: f32,
    /// Nominal target when the player collects it
    pub target: Target,
    /// Multiplier (speed, height) or opacity applied while active
    pub magnitude: f32,
}

/// Indexed by `PowerUpKind as usize`
pub static POWERUP_CONFIGS: [PowerUpConfig; 6] = [
    PowerUpConfig {
        kind: PowerUpKind::SpeedBoost,
        name: "Speed Boost",
        color: 0xff5533,
        duration_ms: 6000.0,
        spawn_weight: 0.2,
        target: Target::Ball,
        magnitude: 1.2,
    },
    PowerUpConfig {
        kind: PowerUpKind::SlowMotion,
        name: "Slow Motion",
        color: 0x33aaff,
        duration_ms: 6000.0,
        spawn_weight: 0.2,
        target: Target::Ball,
        magnitude: 0.8,
    },
    PowerUpConfig {
        kind: PowerUpKind::BigPaddle,
        name: "Big Paddle",
        color: 0x44dd66,
        duration_ms: 8000.0,
        spawn_weight: 0.2,
        target: Target::Player,
        magnitude: 1.5,
    },
    PowerUpConfig {
        kind: PowerUpKind::ShrinkPaddle,
        name: "Shrink Paddle",
        color: 0xdd44aa,
        duration_ms: 8000.0,
        spawn_weight: 0.15,
        target: Target::Computer,
        magnitude: 0.6,
    },
    PowerUpConfig {
        kind: PowerUpKind::InvisibleBall,
        name: "Invisible Ball",
        color: 0x9999aa,
        duration_ms: 4000.0,
        spawn_weight: 0.1,
        target: Target::Ball,
        magnitude: 0.15,
    },
    PowerUpConfig {
        kind: PowerUpKind::MultiBall,
        name: "Multi Ball",
        color: 0xffcc00,
        duration_ms: 7000.0,
        spawn_weight: 0.15,
        target: Target::Game,
        magnitude: 1.0,
    },
];

/// A pickup sitting on the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnedPowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
}

/// A timed effect currently influencing play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub target: Target,
    pub expires_at_ms: f64,
}

impl ActivePowerUp {
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.expires_at_ms - now_ms).max(0.0)
    }
}

/// Combined effect of everything active, read once per frame by the physics step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectMultipliers {
    pub ball_speed: f32,
    pub player_paddle: f32,
    pub computer_paddle: f32,
    pub ball_opacity: f32,
}

impl Default for EffectMultipliers {
    fn default() -> Self {
        Self {
            ball_speed: 1.0,
            player_paddle: 1.0,
            computer_paddle: 1.0,
            ball_opacity: 1.0,
        }
    }
}

impl EffectMultipliers {
    /// Height multiplier for one side's paddle
    pub fn paddle(&self, side: Side) -> f32 {
        match side {
            Side::Player => self.player_paddle,
            Side::Computer => self.computer_paddle,
        }
    }
}

/// Spawn tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTuning {
    pub spawn_interval_ms: f64,
    pub max_on_field: usize,
    pub margin: f32,
    pub center_exclusion: f32,
    pub radius: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: POWERUP_SPAWN_INTERVAL_MS,
            max_on_field: MAX_POWERUPS_ON_FIELD,
            margin: POWERUP_SPAWN_MARGIN,
            center_exclusion: POWERUP_CENTER_EXCLUSION,
            radius: POWERUP_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PowerUpEngine {
    pub tuning: PowerUpTuning,
    enabled: bool,
    spawned: Vec<SpawnedPowerUp>,
    active: Vec<ActivePowerUp>,
    next_spawn_at_ms: f64,
    next_id: u32,
}

impl PowerUpEngine {
    pub fn new(tuning: PowerUpTuning) -> Self {
        Self {
            tuning,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start spawning; the first pickup appears one interval from `now_ms`
    pub fn enable(&mut self, now_ms: f64) {
        self.enabled = true;
        self.next_spawn_at_ms = now_ms + self.tuning.spawn_interval_ms;
    }

    /// Stop spawning and drop every pickup and effect
    pub fn disable(&mut self) {
        self.enabled = false;
        self.spawned.clear();
        self.active.clear();
    }

    pub fn spawned(&self) -> &[SpawnedPowerUp] {
        &self.spawned
    }

    pub fn active(&self) -> &[ActivePowerUp] {
        &self.active
    }

    /// Spawn a pickup if one is due. Returns the new pickup's id.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        width: f32,
        height: f32,
        now_ms: f64,
        rng: &mut R,
    ) -> Option<u32> {
        if !self.enabled
            || self.spawned.len() >= self.tuning.max_on_field
            || now_ms < self.next_spawn_at_ms
        {
            return None;
        }
        self.next_spawn_at_ms = now_ms + self.tuning.spawn_interval_ms;

        let kind = pick_weighted_kind(rng)?;
        let pos = self.pick_position(width, height, rng)?;
        let id = self.place(kind, pos)?;
        log::debug!("Spawned {:?} #{} at ({:.0}, {:.0})", kind, id, pos.x, pos.y);
        Some(id)
    }

    /// Put a pickup at an exact position, bypassing the schedule but not the
    /// field capacity
    pub fn place(&mut self, kind: PowerUpKind, pos: Vec2) -> Option<u32> {
        if self.spawned.len() >= self.tuning.max_on_field {
            return None;
        }
        self.next_id += 1;
        let id = self.next_id;
        self.spawned.push(SpawnedPowerUp {
            id,
            kind,
            pos,
            radius: self.tuning.radius,
        });
        Some(id)
    }

    /// Uniform point in the inset rectangle, outside the center exclusion zone
    fn pick_position<R: Rng + ?Sized>(&self, width: f32, height: f32, rng: &mut R) -> Option<Vec2> {
        let margin = self.tuning.margin;
        if width - margin <= margin || height - margin <= margin {
            return None;
        }
        let center = crate::field_center(width, height);
        for _ in 0..POWERUP_PLACEMENT_ATTEMPTS {
            let pos = Vec2::new(
                rng.random_range(margin..width - margin),
                rng.random_range(margin..height - margin),
            );
            if pos.distance(center) > self.tuning.center_exclusion {
                return Some(pos);
            }
        }
        log::debug!("No pickup placement found outside the center zone");
        None
    }

    /// First pickup overlapping a ball at `pos`
    pub fn find_overlap(&self, pos: Vec2, radius: f32) -> Option<u32> {
        self.spawned
            .iter()
            .find(|p| circles_overlap(pos, radius, p.pos, p.radius))
            .map(|p| p.id)
    }

    /// Remove a pickup and install its effect for the effective target.
    /// Collecting a (kind, target) that is already active refreshes it.
    pub fn collect(&mut self, id: u32, collected_by_player: bool, now_ms: f64) -> Option<ActivePowerUp> {
        let index = self.spawned.iter().position(|p| p.id == id)?;
        let pickup = self.spawned.remove(index);
        let config = pickup.kind.config();
        let effect = ActivePowerUp {
            kind: pickup.kind,
            target: config.target.resolve(collected_by_player),
            expires_at_ms: now_ms + config.duration_ms,
        };

        match self
            .active
            .iter_mut()
            .find(|a| a.kind == effect.kind && a.target == effect.target)
        {
            Some(existing) => *existing = effect,
            None => self.active.push(effect),
        }
        log::debug!(
            "Collected {:?} by {} -> {:?}",
            effect.kind,
            if collected_by_player { "player" } else { "computer" },
            effect.target
        );
        Some(effect)
    }

    /// Drop effects whose expiry has passed. Returns how many were removed.
    pub fn sweep_expired(&mut self, now_ms: f64) -> usize {
        let before = self.active.len();
        self.active.retain(|a| a.expires_at_ms > now_ms);
        let removed = before - self.active.len();
        if removed > 0 {
            log::debug!("{} power-up effect(s) expired", removed);
        }
        removed
    }

    pub fn is_active(&self, kind: PowerUpKind, target: Target) -> bool {
        self.active.iter().any(|a| a.kind == kind && a.target == target)
    }

    /// Milliseconds left on an effect, if active
    pub fn remaining_ms(&self, kind: PowerUpKind, target: Target, now_ms: f64) -> Option<f64> {
        self.active
            .iter()
            .find(|a| a.kind == kind && a.target == target)
            .map(|a| a.remaining_ms(now_ms))
    }

    pub fn multipliers(&self) -> EffectMultipliers {
        let mut m = EffectMultipliers::default();
        for effect in &self.active {
            let magnitude = effect.kind.config().magnitude;
            match (effect.kind.channel(), effect.target) {
                (EffectChannel::BallSpeed, Target::Ball) => m.ball_speed *= magnitude,
                (EffectChannel::PaddleHeight, Target::Player) => m.player_paddle *= magnitude,
                (EffectChannel::PaddleHeight, Target::Computer) => m.computer_paddle *= magnitude,
                (EffectChannel::BallOpacity, Target::Ball) => {
                    m.ball_opacity = m.ball_opacity.min(magnitude)
                }
                _ => {}
            }
        }
        m
    }
}

/// Cumulative-sum draw over the configured spawn weights
fn pick_weighted_kind<R: Rng + ?Sized>(rng: &mut R) -> Option<PowerUpKind> {
    let total: f32 = POWERUP_CONFIGS.iter().map(|c| c.spawn_weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.random::<f32>() * total;
    let mut cumulative = 0.0;
    for config in &POWERUP_CONFIGS {
        cumulative += config.spawn_weight.max(0.0);
        if roll < cumulative {
            return Some(config.kind);
        }
    }
    POWERUP_CONFIGS.last().map(|c| c.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn engine_with_pickup(kind: PowerUpKind) -> (PowerUpEngine, u32) {
        let mut engine = PowerUpEngine::default();
        engine.enable(0.0);
        engine.next_id = 7;
        engine.spawned.push(SpawnedPowerUp {
            id: 7,
            kind,
            pos: Vec2::new(200.0, 100.0),
            radius: POWERUP_RADIUS,
        });
        (engine, 7)
    }

    #[test]
    fn test_configs_indexed_by_kind() {
        for kind in PowerUpKind::ALL {
            assert_eq!(kind.config().kind, kind);
        }
    }

    #[test]
    fn test_spawn_respects_schedule_and_capacity() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut engine = PowerUpEngine::default();
        engine.enable(0.0);

        // Not due yet
        assert!(engine.spawn(FIELD_WIDTH, FIELD_HEIGHT, 100.0, &mut rng).is_none());

        let mut now = 0.0;
        for _ in 0..10 {
            now += POWERUP_SPAWN_INTERVAL_MS;
            engine.spawn(FIELD_WIDTH, FIELD_HEIGHT, now, &mut rng);
        }
        assert_eq!(engine.spawned().len(), MAX_POWERUPS_ON_FIELD);
    }

    #[test]
    fn test_spawn_disabled_is_noop() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut engine = PowerUpEngine::default();
        assert!(engine.spawn(FIELD_WIDTH, FIELD_HEIGHT, 1e9, &mut rng).is_none());
        assert!(engine.spawned().is_empty());
    }

    #[test]
    fn test_spawn_avoids_center_and_margins() {
        let mut rng = Pcg32::seed_from_u64(42);
        let center = crate::field_center(FIELD_WIDTH, FIELD_HEIGHT);
        for _ in 0..50 {
            let mut engine = PowerUpEngine::default();
            engine.enable(0.0);
            engine.spawn(FIELD_WIDTH, FIELD_HEIGHT, POWERUP_SPAWN_INTERVAL_MS, &mut rng);
            for p in engine.spawned() {
                assert!(p.pos.distance(center) > POWERUP_CENTER_EXCLUSION);
                assert!(p.pos.x >= POWERUP_SPAWN_MARGIN && p.pos.x <= FIELD_WIDTH - POWERUP_SPAWN_MARGIN);
                assert!(p.pos.y >= POWERUP_SPAWN_MARGIN && p.pos.y <= FIELD_HEIGHT - POWERUP_SPAWN_MARGIN);
            }
        }
    }

    #[test]
    fn test_spawn_on_tiny_field_does_not_loop() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut engine = PowerUpEngine::default();
        engine.enable(0.0);
        assert!(engine.spawn(100.0, 100.0, POWERUP_SPAWN_INTERVAL_MS, &mut rng).is_none());
    }

    #[test]
    fn test_weighted_kind_covers_all_types() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2000 {
            if let Some(kind) = pick_weighted_kind(&mut rng) {
                seen.insert(kind);
            }
        }
        assert_eq!(seen.len(), PowerUpKind::ALL.len());
    }

    #[test]
    fn test_weighted_kind_tracks_spawn_weights() {
        const DRAWS: usize = 20_000;
        let mut rng = Pcg32::seed_from_u64(31);
        let mut counts = [0usize; 6];
        for _ in 0..DRAWS {
            let kind = pick_weighted_kind(&mut rng).unwrap();
            counts[kind as usize] += 1;
        }

        let total: f32 = POWERUP_CONFIGS.iter().map(|c| c.spawn_weight).sum();
        for config in &POWERUP_CONFIGS {
            let observed = counts[config.kind as usize] as f32 / DRAWS as f32;
            let expected = config.spawn_weight / total;
            assert!(
                (observed - expected).abs() < 0.02,
                "{:?}: observed {observed:.3}, expected {expected:.3}",
                config.kind
            );
        }
        // Twice the weight, roughly twice the draws
        let speed = counts[PowerUpKind::SpeedBoost as usize] as f32;
        let invisible = counts[PowerUpKind::InvisibleBall as usize] as f32;
        assert!(speed > invisible * 1.6);
    }

    #[test]
    fn test_collect_unknown_id() {
        let mut engine = PowerUpEngine::default();
        assert!(engine.collect(99, true, 0.0).is_none());
    }

    #[test]
    fn test_collect_by_computer_flips_player_target() {
        let (mut engine, id) = engine_with_pickup(PowerUpKind::BigPaddle);
        let effect = engine.collect(id, false, 0.0).unwrap();
        assert_eq!(effect.target, Target::Computer);
        assert!(engine.is_active(PowerUpKind::BigPaddle, Target::Computer));
        assert!(engine.spawned().is_empty());
    }

    #[test]
    fn test_collect_by_computer_flips_computer_target() {
        let (mut engine, id) = engine_with_pickup(PowerUpKind::ShrinkPaddle);
        let effect = engine.collect(id, false, 0.0).unwrap();
        assert_eq!(effect.target, Target::Player);
    }

    #[test]
    fn test_ball_target_ignores_collector() {
        let (mut engine, id) = engine_with_pickup(PowerUpKind::SpeedBoost);
        let effect = engine.collect(id, false, 0.0).unwrap();
        assert_eq!(effect.target, Target::Ball);
    }

    #[test]
    fn test_recollect_replaces_entry() {
        let (mut engine, id) = engine_with_pickup(PowerUpKind::SlowMotion);
        engine.collect(id, true, 0.0);
        engine.spawned.push(SpawnedPowerUp {
            id: 8,
            kind: PowerUpKind::SlowMotion,
            pos: Vec2::new(300.0, 100.0),
            radius: POWERUP_RADIUS,
        });
        engine.collect(8, true, 1000.0);
        assert_eq!(engine.active().len(), 1);
        assert_eq!(engine.active()[0].expires_at_ms, 1000.0 + 6000.0);
    }

    #[test]
    fn test_sweep_expired_is_idempotent() {
        let (mut engine, id) = engine_with_pickup(PowerUpKind::SpeedBoost);
        engine.collect(id, true, 0.0);
        assert_eq!(engine.sweep_expired(5999.0), 0);
        assert_eq!(engine.sweep_expired(6000.0), 1);
        assert_eq!(engine.sweep_expired(6000.0), 0);
        assert!(engine.active().is_empty());
    }

    #[test]
    fn test_multipliers_combine() {
        let mut engine = PowerUpEngine::default();
        engine.active.push(ActivePowerUp {
            kind: PowerUpKind::SpeedBoost,
            target: Target::Ball,
            expires_at_ms: 1.0,
        });
        engine.active.push(ActivePowerUp {
            kind: PowerUpKind::SlowMotion,
            target: Target::Ball,
            expires_at_ms: 1.0,
        });
        engine.active.push(ActivePowerUp {
            kind: PowerUpKind::BigPaddle,
            target: Target::Player,
            expires_at_ms: 1.0,
        });
        engine.active.push(ActivePowerUp {
            kind: PowerUpKind::ShrinkPaddle,
            target: Target::Player,
            expires_at_ms: 1.0,
        });
        engine.active.push(ActivePowerUp {
            kind: PowerUpKind::InvisibleBall,
            target: Target::Ball,
            expires_at_ms: 1.0,
        });
        let m = engine.multipliers();
        assert!((m.ball_speed - 0.96).abs() < 1e-5);
        assert!((m.player_paddle - 0.9).abs() < 1e-5);
        assert_eq!(m.computer_paddle, 1.0);
        assert_eq!(m.ball_opacity, 0.15);
    }

    #[test]
    fn test_disable_clears_everything() {
        let (mut engine, id) = engine_with_pickup(PowerUpKind::MultiBall);
        engine.spawned.push(SpawnedPowerUp {
            id: 8,
            kind: PowerUpKind::SpeedBoost,
            pos: Vec2::ZERO,
            radius: 1.0,
        });
        engine.collect(id, true, 0.0);
        engine.disable();
        assert!(!engine.is_enabled());
        assert!(engine.spawned().is_empty());
        assert!(engine.active().is_empty());
    }

    #[test]
    fn test_remaining_ms() {
        let (mut engine, id) = engine_with_pickup(PowerUpKind::InvisibleBall);
        engine.collect(id, true, 100.0);
        assert_eq!(engine.remaining_ms(PowerUpKind::InvisibleBall, Target::Ball, 1100.0), Some(3000.0));
        assert_eq!(engine.remaining_ms(PowerUpKind::MultiBall, Target::Game, 0.0), None);
    }
}
