//! Data-driven game balance
//!
//! Hand thresholds, recovery delays and scoring constants live here so that
//! tuning and tests target one place. Every field has a serde default, so a
//! partial JSON file only overrides what it names.

use std::fmt;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Default tuning file looked up by the native driver
pub const TUNING_FILE: &str = "config/tuning.json";

fn default_toss_threshold_y() -> f32 {
    0.5
}
fn default_reload_threshold_y() -> f32 {
    -1.0
}
fn default_pickup_threshold_y() -> f32 {
    -2.0
}
fn default_hand_detect_y() -> f32 {
    -2.9
}
fn default_floor_y() -> f32 {
    -6.0
}
fn default_wall_x() -> f32 {
    5.0
}
fn default_wall_restitution() -> f32 {
    0.6
}
fn default_hold_offset() -> Vec3 {
    Vec3::new(0.0, 0.6, 0.2)
}
fn default_caught_hold() -> f32 {
    0.2
}
fn default_retry_delay() -> f32 {
    1.0
}
fn default_restart_delay() -> f32 {
    1.5
}
fn default_level_advance_delay() -> f32 {
    2.5
}
fn default_max_frame_dt() -> f32 {
    0.1
}
fn default_cycle_points() -> u64 {
    10
}
fn default_perfect_bonus() -> u64 {
    5
}
fn default_level_bonus() -> u64 {
    50
}
fn default_perfect_fraction() -> f32 {
    0.8
}
fn default_combo_tiers() -> Vec<ComboTier> {
    vec![
        ComboTier { min_combo: 5, multiplier: 1.5 },
        ComboTier { min_combo: 10, multiplier: 2.0 },
        ComboTier { min_combo: 20, multiplier: 3.0 },
    ]
}

/// Combo count at which a multiplier kicks in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboTier {
    pub min_combo: u32,
    pub multiplier: f32,
}

/// Score constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringTuning {
    #[serde(default = "default_cycle_points")]
    pub cycle_points: u64,
    #[serde(default = "default_perfect_bonus")]
    pub perfect_bonus: u64,
    #[serde(default = "default_level_bonus")]
    pub level_bonus: u64,
    /// Fraction of the air window a perfect cycle must finish within
    #[serde(default = "default_perfect_fraction")]
    pub perfect_fraction: f32,
    /// Ascending by `min_combo`
    #[serde(default = "default_combo_tiers")]
    pub combo_tiers: Vec<ComboTier>,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            cycle_points: default_cycle_points(),
            perfect_bonus: default_perfect_bonus(),
            level_bonus: default_level_bonus(),
            perfect_fraction: default_perfect_fraction(),
            combo_tiers: default_combo_tiers(),
        }
    }
}

/// Global tuning shared by every level and difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Hand above this while idle tosses the mother stone
    #[serde(default = "default_toss_threshold_y")]
    pub toss_threshold_y: f32,
    /// Hand below this while idle re-arms the auto toss
    #[serde(default = "default_reload_threshold_y")]
    pub reload_threshold_y: f32,
    /// Hand below this performs the stage action
    #[serde(default = "default_pickup_threshold_y")]
    pub pickup_threshold_y: f32,
    /// Hand above this counts as detected (ends the scan prompt)
    #[serde(default = "default_hand_detect_y")]
    pub hand_detect_y: f32,
    /// Stone below this is dropped
    #[serde(default = "default_floor_y")]
    pub floor_y: f32,
    /// Side walls at +/- this x
    #[serde(default = "default_wall_x")]
    pub wall_x: f32,
    #[serde(default = "default_wall_restitution")]
    pub wall_restitution: f32,
    /// Where a held stone sits relative to the hand
    #[serde(default = "default_hold_offset")]
    pub hold_offset: Vec3,

    /// Seconds spent in `Caught` before returning to `Idle`
    #[serde(default = "default_caught_hold")]
    pub caught_hold: f32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: f32,
    #[serde(default = "default_restart_delay")]
    pub restart_delay: f32,
    /// Pause between a completed level and the next one
    #[serde(default = "default_level_advance_delay")]
    pub level_advance_delay: f32,
    /// Frame deltas are clamped to this (tab switches, debugger stops)
    #[serde(default = "default_max_frame_dt")]
    pub max_frame_dt: f32,

    #[serde(default)]
    pub scoring: ScoringTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            toss_threshold_y: default_toss_threshold_y(),
            reload_threshold_y: default_reload_threshold_y(),
            pickup_threshold_y: default_pickup_threshold_y(),
            hand_detect_y: default_hand_detect_y(),
            floor_y: default_floor_y(),
            wall_x: default_wall_x(),
            wall_restitution: default_wall_restitution(),
            hold_offset: default_hold_offset(),
            caught_hold: default_caught_hold(),
            retry_delay: default_retry_delay(),
            restart_delay: default_restart_delay(),
            level_advance_delay: default_level_advance_delay(),
            max_frame_dt: default_max_frame_dt(),
            scoring: ScoringTuning::default(),
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json).map_err(TuningError::Parse)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        serde_json::to_string_pretty(self).map_err(TuningError::Parse)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(TuningError::Io)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load from a file, falling back to defaults when it is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(tuning) => tuning,
            Err(TuningError::Io(_)) => {
                log::info!("No tuning file at {}, using defaults", path.as_ref().display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring tuning file {}: {}", path.as_ref().display(), err);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.pickup_threshold_y < self.reload_threshold_y
            && self.reload_threshold_y < self.toss_threshold_y)
        {
            return Err(TuningError::Invalid(
                "thresholds must satisfy pickup < reload < toss".into(),
            ));
        }
        if self.floor_y >= self.pickup_threshold_y {
            return Err(TuningError::Invalid("floor must sit below the pickup threshold".into()));
        }
        if self.wall_x <= 0.0 || !(0.0..=1.0).contains(&self.wall_restitution) {
            return Err(TuningError::Invalid("walls need a positive x and restitution in [0, 1]".into()));
        }
        let delays = [
            self.caught_hold,
            self.retry_delay,
            self.restart_delay,
            self.level_advance_delay,
            self.max_frame_dt,
        ];
        if delays.iter().any(|d| d.is_nan() || *d <= 0.0) {
            return Err(TuningError::Invalid("delays must be positive".into()));
        }
        let fraction = self.scoring.perfect_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(TuningError::Invalid("perfect_fraction must be in (0, 1]".into()));
        }
        let ascending = self
            .scoring
            .combo_tiers
            .windows(2)
            .all(|w| w[0].min_combo < w[1].min_combo);
        if !ascending || self.scoring.combo_tiers.iter().any(|t| t.multiplier < 1.0) {
            return Err(TuningError::Invalid(
                "combo tiers must ascend and never shrink the score".into(),
            ));
        }
        Ok(())
    }
}

/// Failure to load a tuning file
#[derive(Debug)]
pub enum TuningError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Io(err) => write!(f, "cannot read tuning file: {err}"),
            TuningError::Parse(err) => write!(f, "malformed tuning JSON: {err}"),
            TuningError::Invalid(msg) => write!(f, "invalid tuning: {msg}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Io(err) => Some(err),
            TuningError::Parse(err) => Some(err),
            TuningError::Invalid(_) => None,
        }
    }
}
