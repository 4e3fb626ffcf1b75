//! Difficulty tiers and the gameplay parameters they select
//!
//! A profile is chosen once per run from the difficulty menu and never
//! changes until the player starts a new run.

use serde::{Deserialize, Serialize};

use crate::levels::LevelDefinition;

/// Difficulty tier picked by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DifficultyTier {
    Beginner,
    #[default]
    Normal,
    Master,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Beginner,
        DifficultyTier::Normal,
        DifficultyTier::Master,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "Beginner",
            DifficultyTier::Normal => "Normal",
            DifficultyTier::Master => "Master",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beginner" | "easy" => Some(DifficultyTier::Beginner),
            "normal" => Some(DifficultyTier::Normal),
            "master" | "hard" => Some(DifficultyTier::Master),
            _ => None,
        }
    }
}

/// What happens to the run when a cycle fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Hand the mother stone back and retry the same stage
    RetryCycle,
    /// Throw away the level's progress and start it again
    RestartLevel,
    /// Terminal: the run is over
    EndRun,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::RetryCycle => "retry-cycle",
            FailurePolicy::RestartLevel => "restart-level",
            FailurePolicy::EndRun => "end-run",
        }
    }
}

/// Numeric and behavioral parameters for one difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub tier: DifficultyTier,
    /// Seconds the mother stone should stay in the air per toss
    pub air_window: f32,
    /// Vertical acceleration (negative = down), before the level's scale
    pub gravity: f32,
    pub failure_policy: FailurePolicy,
    /// Presentation hint: draw the toss guide line
    pub show_guide_line: bool,
    /// Perfect cycles build a combo
    pub combo_enabled: bool,
    /// A non-perfect success breaks the combo
    pub combo_requires_perfect: bool,
    /// Multiplier on the level's catch radius
    pub catch_radius_scale: f32,
    /// Presentation hint: show the slow-motion replay while a retry is pending
    pub slow_motion_on_retry: bool,
}

impl DifficultyProfile {
    pub fn for_tier(tier: DifficultyTier) -> Self {
        match tier {
            DifficultyTier::Beginner => Self {
                tier,
                air_window: 2.5,
                gravity: -10.0,
                failure_policy: FailurePolicy::RetryCycle,
                show_guide_line: true,
                combo_enabled: false,
                combo_requires_perfect: false,
                catch_radius_scale: 1.2,
                slow_motion_on_retry: true,
            },
            DifficultyTier::Normal => Self {
                tier,
                air_window: 1.6,
                gravity: -15.0,
                failure_policy: FailurePolicy::RestartLevel,
                show_guide_line: false,
                combo_enabled: false,
                combo_requires_perfect: false,
                catch_radius_scale: 1.0,
                slow_motion_on_retry: false,
            },
            DifficultyTier::Master => Self {
                tier,
                air_window: 1.1,
                gravity: -20.0,
                failure_policy: FailurePolicy::EndRun,
                show_guide_line: false,
                combo_enabled: true,
                combo_requires_perfect: true,
                catch_radius_scale: 0.85,
                slow_motion_on_retry: false,
            },
        }
    }

    /// Gravity for a level, including the level's ramp
    pub fn effective_gravity(&self, level: &LevelDefinition) -> f32 {
        self.gravity * level.gravity_scale
    }

    /// Catch radius for a level, scaled by this tier's tolerance
    pub fn catch_radius(&self, level: &LevelDefinition) -> f32 {
        level.catch_radius * self.catch_radius_scale
    }

    /// Initial upward speed whose ballistic round trip lasts `air_window`
    pub fn toss_velocity(&self, gravity_scale: f32) -> f32 {
        (self.gravity * gravity_scale).abs() * self.air_window / 2.0
    }

    /// Perfect cycles must finish within this many seconds
    pub fn perfect_cutoff(&self, perfect_fraction: f32) -> f32 {
        self.air_window * perfect_fraction
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::for_tier(DifficultyTier::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_round_trip_names() {
        for tier in DifficultyTier::ALL {
            assert_eq!(DifficultyTier::from_str(tier.as_str()), Some(tier));
        }
        assert_eq!(DifficultyTier::from_str("HARD"), Some(DifficultyTier::Master));
        assert_eq!(DifficultyTier::from_str("legendary"), None);
    }

    #[test]
    fn test_policies_per_tier() {
        use FailurePolicy::*;
        let policy = |t| DifficultyProfile::for_tier(t).failure_policy;
        assert_eq!(policy(DifficultyTier::Beginner), RetryCycle);
        assert_eq!(policy(DifficultyTier::Normal), RestartLevel);
        assert_eq!(policy(DifficultyTier::Master), EndRun);
    }

    #[test]
    fn test_toss_velocity_round_trip_matches_air_window() {
        for tier in DifficultyTier::ALL {
            let profile = DifficultyProfile::for_tier(tier);
            let v0 = profile.toss_velocity(1.0);
            let round_trip = 2.0 * v0 / profile.gravity.abs();
            assert!((round_trip - profile.air_window).abs() < 1e-5, "{:?}", tier);
        }
    }

    #[test]
    fn test_normal_toss_velocity() {
        let profile = DifficultyProfile::for_tier(DifficultyTier::Normal);
        assert!((profile.toss_velocity(1.0) - 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_only_master_builds_combo() {
        assert!(!DifficultyProfile::for_tier(DifficultyTier::Beginner).combo_enabled);
        assert!(!DifficultyProfile::for_tier(DifficultyTier::Normal).combo_enabled);
        let master = DifficultyProfile::for_tier(DifficultyTier::Master);
        assert!(master.combo_enabled && master.combo_requires_perfect);
    }
}
