//! Score accumulator
//!
//! Folds cycle outcomes into the run's running score. Failures only touch
//! the failure counter; the total never goes down within a run.

use serde::{Deserialize, Serialize};

use crate::tuning::{ComboTier, ScoringTuning};

/// Result of one successful catch, as seen by the scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleOutcome {
    pub perfect: bool,
    /// Combo count after this cycle was folded in
    pub combo: u32,
}

/// Running score for one run (all levels of one difficulty attempt)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub base_score: u64,
    pub perfect_bonus: u64,
    /// Multiplier applied to the most recent cycle
    pub combo_multiplier: f32,
    pub total_score: u64,
    pub failures: u32,
    pub perfect_cycles: u32,
    pub max_combo: u32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            base_score: 0,
            perfect_bonus: 0,
            combo_multiplier: 1.0,
            total_score: 0,
            failures: 0,
            perfect_cycles: 0,
            max_combo: 0,
        }
    }
}

/// Step function over the combo tiers; 1.0 below the first tier
pub fn combo_multiplier(combo: u32, tiers: &[ComboTier]) -> f32 {
    tiers
        .iter()
        .rev()
        .find(|tier| combo >= tier.min_combo)
        .map(|tier| tier.multiplier)
        .unwrap_or(1.0)
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a successful catch; returns the points awarded
    pub fn record_cycle(&mut self, outcome: CycleOutcome, tuning: &ScoringTuning) -> u64 {
        let bonus = if outcome.perfect { tuning.perfect_bonus } else { 0 };
        let multiplier = combo_multiplier(outcome.combo, &tuning.combo_tiers);
        let points = ((tuning.cycle_points + bonus) as f64 * multiplier as f64).round() as u64;

        self.base_score += tuning.cycle_points;
        self.perfect_bonus += bonus;
        self.combo_multiplier = multiplier;
        self.total_score = self.total_score.saturating_add(points);
        if outcome.perfect {
            self.perfect_cycles += 1;
        }
        self.max_combo = self.max_combo.max(outcome.combo);
        points
    }

    /// Bonus for clearing a level's final stage
    pub fn record_level_complete(&mut self, tuning: &ScoringTuning) -> u64 {
        self.total_score = self.total_score.saturating_add(tuning.level_bonus);
        tuning.level_bonus
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
        self.combo_multiplier = 1.0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
