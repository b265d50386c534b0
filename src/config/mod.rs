//! Game tuning: every constant the simulation reads, in one resource.
//!
//! `GameConfig::default()` is the shipped tuning. A RON document can
//! override it at startup (see `load_or_default`); `config/default.ron`
//! is the same tuning written out.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::*;

/// Environment variable naming a RON override file.
pub const CONFIG_ENV_VAR: &str = "BEATFARM_CONFIG";

/// Fastest tempo the beat spawner is asked to keep up with.
pub const MAX_BPM: f32 = 1000.0;
/// Longest single timer a config may ask for.
pub const MAX_DURATION_SECS: f32 = 3600.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Score threshold → island that becomes playable once score reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRule {
    pub score: u32,
    pub island: Coord,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Rhythm ──────────────────────────────────────────────────────────
    pub bpm: f32,
    pub sequence: Vec<BeatSpec>,
    /// Lead-in distance, in beat slots, between spawn point and hit zone.
    pub delay_beats: u32,
    /// Pixels a beat travels per half-beat.
    pub beat_spacing: f32,
    /// How far past the hit zone a beat scrolls before it is retired.
    pub retire_distance: f32,
    pub big_tolerance: f32,
    pub small_tolerance: f32,
    pub pool_capacity: usize,

    // ── Farming ─────────────────────────────────────────────────────────
    pub plots_per_side: i32,
    pub mature_age: u8,
    pub growth_step_secs: f32,
    pub reap_rise_secs: f32,
    pub reap_hold_secs: f32,
    pub reap_fade_secs: f32,

    // ── Avatar ──────────────────────────────────────────────────────────
    pub move_secs: f32,
    pub action_secs: f32,
    /// Commit point for plow/water inside the action animation.
    pub commit_delay_secs: f32,

    // ── Session ─────────────────────────────────────────────────────────
    pub start_island: Coord,
    pub start_local: Coord,
    pub unlocks: Vec<UnlockRule>,
    pub win_score: u32,

    // ── Input ───────────────────────────────────────────────────────────
    pub input_repeat_secs: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        use ActionType::*;
        let bar = |action| {
            [
                BeatSpec::big(action),
                BeatSpec::small(),
                BeatSpec::small(),
                BeatSpec::small(),
            ]
        };
        let sequence = [bar(Plow), bar(Water), bar(Sow), bar(Reap)]
            .into_iter()
            .flatten()
            .collect();

        Self {
            bpm: 120.0,
            sequence,
            delay_beats: 8,
            beat_spacing: 48.0,
            retire_distance: SCREEN_WIDTH * 0.5,
            big_tolerance: 32.0,
            small_tolerance: 16.0,
            pool_capacity: 40,

            plots_per_side: 3,
            mature_age: 5,
            growth_step_secs: 6.0,
            reap_rise_secs: 0.08,
            reap_hold_secs: 0.4,
            reap_fade_secs: 0.08,

            move_secs: 0.15,
            action_secs: 0.2,
            commit_delay_secs: 0.12,

            start_island: Coord::ZERO,
            start_local: Coord::new(1, 1),
            unlocks: vec![
                UnlockRule { score: 2, island: Coord::new(1, 0) },
                UnlockRule { score: 4, island: Coord::new(-1, 0) },
                UnlockRule { score: 6, island: Coord::new(0, 1) },
                UnlockRule { score: 8, island: Coord::new(0, -1) },
            ],
            win_score: 10,

            input_repeat_secs: 0.5,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// Reads the file named by `BEATFARM_CONFIG`, falling back to the
    /// built-in tuning when the variable is unset or the file is bad.
    pub fn load_or_default() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        match Self::from_path(&path) {
            Ok(config) => {
                info!("[Config] Loaded tuning from {}", path);
                config
            }
            Err(err) => {
                warn!("[Config] {} ({}); using built-in tuning", err, path);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bpm > 0.0 && self.bpm <= MAX_BPM) {
            return Err(ConfigError::Invalid(format!(
                "bpm must lie in (0, {}], got {}",
                MAX_BPM, self.bpm
            )));
        }
        if self.sequence.is_empty() {
            return Err(ConfigError::Invalid("beat sequence is empty".into()));
        }
        for (i, spec) in self.sequence.iter().enumerate() {
            match (spec.beat_type, spec.action) {
                (BeatType::Big, None) => {
                    return Err(ConfigError::Invalid(format!("big beat #{} has no action", i)));
                }
                (BeatType::Small, Some(_)) => {
                    return Err(ConfigError::Invalid(format!("small beat #{} carries an action", i)));
                }
                _ => {}
            }
        }
        for (name, value) in [
            ("beat spacing", self.beat_spacing),
            ("big tolerance", self.big_tolerance),
            ("small tolerance", self.small_tolerance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !(self.retire_distance.is_finite() && self.retire_distance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "retire distance must not be negative, got {}",
                self.retire_distance
            )));
        }
        if self.pool_capacity == 0 {
            return Err(ConfigError::Invalid("beat pool capacity must be non-zero".into()));
        }
        if self.plots_per_side <= 0 {
            return Err(ConfigError::Invalid("plots per side must be positive".into()));
        }
        let side = self.plots_per_side;
        if !(0..side).contains(&self.start_local.x) || !(0..side).contains(&self.start_local.y) {
            return Err(ConfigError::Invalid(format!(
                "start plot {} lies outside a {}x{} island",
                self.start_local, side, side
            )));
        }
        if self.mature_age == 0 || self.mature_age == u8::MAX {
            return Err(ConfigError::Invalid(format!(
                "mature age must lie in 1..{}, got {}",
                u8::MAX,
                self.mature_age
            )));
        }
        // Timers that repeat need a non-zero period.
        for (name, secs) in [
            ("growth_step_secs", self.growth_step_secs),
            ("input_repeat_secs", self.input_repeat_secs),
        ] {
            check_secs(name, secs)?;
            if secs == 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        for (name, secs) in [
            ("move_secs", self.move_secs),
            ("action_secs", self.action_secs),
            ("commit_delay_secs", self.commit_delay_secs),
            ("reap_rise_secs", self.reap_rise_secs),
            ("reap_hold_secs", self.reap_hold_secs),
            ("reap_fade_secs", self.reap_fade_secs),
        ] {
            check_secs(name, secs)?;
        }
        if self.unlocks.windows(2).any(|w| w[0].score >= w[1].score) {
            return Err(ConfigError::Invalid("unlock scores must be strictly increasing".into()));
        }
        if let Some(last) = self.unlocks.last() {
            if self.win_score <= last.score {
                return Err(ConfigError::Invalid(format!(
                    "win score {} must exceed the last unlock score {}",
                    self.win_score, last.score
                )));
            }
        }
        if self.win_score == 0 {
            return Err(ConfigError::Invalid("win score must be at least 1".into()));
        }
        Ok(())
    }

    /// Length of one half-beat: the spawn cadence of the rhythm track.
    pub fn unit_time(&self) -> Duration {
        Duration::from_secs_f32(60.0 / self.bpm * 0.5)
    }
}

/// A duration field must be a finite, non-negative number of seconds that
/// `Duration` can hold.
fn check_secs(name: &str, secs: f32) -> Result<(), ConfigError> {
    if secs.is_finite() && (0.0..=MAX_DURATION_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must lie in 0..={} seconds, got {}",
            name, MAX_DURATION_SECS, secs
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn bundled_ron_matches_defaults() {
        let parsed = GameConfig::from_ron_str(include_str!("../../config/default.ron"))
            .expect("bundled config parses");
        assert_eq!(parsed, GameConfig::default());
    }

    #[test]
    fn partial_ron_keeps_remaining_defaults() {
        let parsed = GameConfig::from_ron_str("(bpm: 90.0, win_score: 12)").unwrap();
        assert_eq!(parsed.bpm, 90.0);
        assert_eq!(parsed.win_score, 12);
        assert_eq!(parsed.plots_per_side, 3);
        assert_eq!(parsed.sequence, GameConfig::default().sequence);
    }

    #[test]
    fn unit_time_is_half_a_beat() {
        let config = GameConfig { bpm: 120.0, ..default() };
        assert_eq!(config.unit_time(), Duration::from_millis(250));
        let config = GameConfig { bpm: 60.0, ..default() };
        assert_eq!(config.unit_time(), Duration::from_millis(500));
    }

    #[test]
    fn rejects_non_positive_bpm() {
        let config = GameConfig { bpm: 0.0, ..default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_big_beat_without_action() {
        let config = GameConfig {
            sequence: vec![BeatSpec { beat_type: BeatType::Big, action: None }],
            ..default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_small_beat_with_action() {
        let config = GameConfig {
            sequence: vec![BeatSpec { beat_type: BeatType::Small, action: Some(ActionType::Plow) }],
            ..default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unordered_unlocks() {
        let mut config = GameConfig::default();
        config.unlocks.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_win_score_below_last_unlock() {
        let config = GameConfig { win_score: 8, ..default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_start_plot_off_island() {
        let config = GameConfig { start_local: Coord::new(3, 0), ..default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_infinite_bpm() {
        let config = GameConfig { bpm: f32::INFINITY, ..default() };
        assert!(config.validate().is_err());
        let config = GameConfig { bpm: f32::NAN, ..default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_durations() {
        let cases: [fn(&mut GameConfig, f32); 8] = [
            |c, v| c.growth_step_secs = v,
            |c, v| c.input_repeat_secs = v,
            |c, v| c.move_secs = v,
            |c, v| c.action_secs = v,
            |c, v| c.commit_delay_secs = v,
            |c, v| c.reap_rise_secs = v,
            |c, v| c.reap_hold_secs = v,
            |c, v| c.reap_fade_secs = v,
        ];
        for (i, set) in cases.iter().enumerate() {
            for bad in [-0.1, f32::NAN, f32::INFINITY, 1.0e30] {
                let mut config = GameConfig::default();
                set(&mut config, bad);
                assert!(config.validate().is_err(), "field #{} accepted {}", i, bad);
            }
        }
    }

    #[test]
    fn rejects_zero_repeat_periods() {
        let config = GameConfig { growth_step_secs: 0.0, ..default() };
        assert!(config.validate().is_err());
        let config = GameConfig { input_repeat_secs: 0.0, ..default() };
        assert!(config.validate().is_err());
        // One-shot animations may be instant.
        let config = GameConfig { reap_hold_secs: 0.0, ..default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_mature_age_without_harvest_headroom() {
        let config = GameConfig { mature_age: u8::MAX, ..default() };
        assert!(config.validate().is_err());
        let config = GameConfig { mature_age: u8::MAX - 1, ..default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_negative_retire_distance() {
        let config = GameConfig { retire_distance: -1.0, ..default() };
        assert!(config.validate().is_err());
        let config = GameConfig { retire_distance: 0.0, ..default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_tolerances() {
        let config = GameConfig { big_tolerance: 0.0, ..default() };
        assert!(config.validate().is_err());
        let config = GameConfig { small_tolerance: f32::NAN, ..default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_error_is_reported() {
        let err = GameConfig::from_ron_str("(bpm: \"fast\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
