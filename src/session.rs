//! Run orchestration
//!
//! A session is one difficulty attempt: it owns the tier's level list, the
//! per-level `GameState`, and advances to the next level a moment after the
//! current one completes.

use serde::{Deserialize, Serialize};

use crate::difficulty::{DifficultyProfile, DifficultyTier};
use crate::levels::{self, CatalogError, LevelDefinition};
use crate::scoring::ScoreState;
use crate::sim::{
    GameEvent, GameState, Phase, Prompt, Scheduler, Snapshot, TickInput, tick, try_toss,
};
use crate::tuning::Tuning;

/// Where the run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Playing,
    /// Level cleared, next one is about to start
    Advancing,
    /// Every level cleared
    Champion,
    /// A failure ended the run
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum RunTransition {
    NextLevel,
}

/// Events surfaced to the level-progression UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    Game(GameEvent),
    LevelStarted { index: usize, level_id: u32 },
    RunComplete { score: ScoreState },
    RunOver { score: ScoreState },
}

#[derive(Debug)]
pub struct Session {
    profile: DifficultyProfile,
    tuning: Tuning,
    levels: Vec<LevelDefinition>,
    level_index: usize,
    game: GameState,
    phase: RunPhase,
    scheduler: Scheduler<RunTransition>,
    clock: f64,
}

impl Session {
    /// Start a run on the built-in catalog for `tier`
    pub fn new(tier: DifficultyTier, tuning: Tuning) -> Result<Self, CatalogError> {
        Self::with_levels(DifficultyProfile::for_tier(tier), levels::catalog(tier), tuning)
    }

    /// Start a run on a custom level list
    pub fn with_levels(
        profile: DifficultyProfile,
        levels: Vec<LevelDefinition>,
        tuning: Tuning,
    ) -> Result<Self, CatalogError> {
        levels::validate_catalog(&levels)?;
        let game = GameState::new(levels[0].clone(), profile, tuning.clone());
        log::info!(
            "Starting {} run with {} levels",
            profile.tier.as_str(),
            levels.len()
        );
        Ok(Self {
            profile,
            tuning,
            levels,
            level_index: 0,
            game,
            phase: RunPhase::Playing,
            scheduler: Scheduler::new(),
            clock: 0.0,
        })
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn score(&self) -> &ScoreState {
        &self.game.score
    }

    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Vec<RunEvent> {
        let mut out = Vec::new();
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.tuning.max_frame_dt)
        } else {
            0.0
        };
        self.clock += dt as f64;

        let generation = self.scheduler.generation();
        for transition in self.scheduler.take_due(self.clock) {
            if self.scheduler.generation() != generation {
                break;
            }
            match transition {
                RunTransition::NextLevel => self.start_next_level(&mut out),
            }
        }

        if self.phase != RunPhase::Playing {
            return out;
        }

        for event in tick(&mut self.game, input, dt) {
            out.push(RunEvent::Game(event.clone()));
            match event {
                GameEvent::LevelComplete { .. } => self.on_level_complete(&mut out),
                GameEvent::RunOver { score } => {
                    self.phase = RunPhase::Over;
                    out.push(RunEvent::RunOver { score });
                }
                _ => {}
            }
        }
        out
    }

    /// Manual toss button outside the frame loop. Returns the toss events,
    /// empty when no toss was possible.
    pub fn toss(&mut self) -> Vec<RunEvent> {
        if self.phase != RunPhase::Playing {
            return Vec::new();
        }
        let mut events = Vec::new();
        try_toss(&mut self.game, &mut events);
        events.into_iter().map(RunEvent::Game).collect()
    }

    /// New run on the same difficulty: fresh score, back to the first level
    pub fn play_again(&mut self) {
        log::info!("Replaying {} run", self.profile.tier.as_str());
        self.scheduler.invalidate();
        self.enter_level(0, ScoreState::default(), 0);
        self.phase = RunPhase::Playing;
    }

    /// Jump to a level (practice), keeping the run's score
    pub fn select_level(&mut self, index: usize) -> bool {
        if index >= self.levels.len() || self.phase == RunPhase::Over {
            return false;
        }
        self.scheduler.invalidate();
        let score = self.game.score.clone();
        let combo = self.game.cycle.combo;
        self.enter_level(index, score, combo);
        self.phase = RunPhase::Playing;
        true
    }

    fn on_level_complete(&mut self, out: &mut Vec<RunEvent>) {
        if self.level_index + 1 < self.levels.len() {
            self.phase = RunPhase::Advancing;
            self.scheduler
                .schedule(self.clock, self.tuning.level_advance_delay, RunTransition::NextLevel);
        } else {
            self.phase = RunPhase::Champion;
            log::info!("Run complete with {} points", self.game.score.total_score);
            out.push(RunEvent::RunComplete {
                score: self.game.score.clone(),
            });
        }
    }

    fn start_next_level(&mut self, out: &mut Vec<RunEvent>) {
        if self.phase != RunPhase::Advancing || self.game.cycle.phase != Phase::LevelComplete {
            return;
        }
        let score = self.game.score.clone();
        let combo = self.game.cycle.combo;
        self.enter_level(self.level_index + 1, score, combo);
        self.phase = RunPhase::Playing;
        out.push(RunEvent::LevelStarted {
            index: self.level_index,
            level_id: self.game.level.id,
        });
    }

    fn enter_level(&mut self, index: usize, score: ScoreState, combo: u32) {
        let hand = self.game.hand;
        let detected = self.game.hand_detected;
        self.level_index = index;
        self.game = GameState::new(self.levels[index].clone(), self.profile, self.tuning.clone())
            .with_score(score, combo);
        // The camera keeps tracking across levels
        self.game.hand = hand;
        if detected {
            self.game.hand_detected = true;
            self.game.prompt = Prompt::Stage(0);
        }
        self.game.hold_stone();
        log::info!("Entered level {} ({})", self.game.level.id, self.game.level.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::StageDefinition;

    #[test]
    fn test_new_session_starts_first_level() {
        let session = Session::new(DifficultyTier::Beginner, Tuning::default()).unwrap();
        assert_eq!(session.phase(), RunPhase::Playing);
        assert_eq!(session.level_index(), 0);
        assert_eq!(session.level_count(), 3);
        assert_eq!(session.game().level.name, "LEARN PICK 1");
    }

    #[test]
    fn test_malformed_catalog_rejected() {
        let mut levels = levels::classic_levels();
        levels[0].stages.push(StageDefinition::pick(3));
        let result = Session::with_levels(DifficultyProfile::default(), levels, Tuning::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_select_level_bounds() {
        let mut session = Session::new(DifficultyTier::Normal, Tuning::default()).unwrap();
        assert!(session.select_level(7));
        assert_eq!(session.game().level.name, "BUAH LAPAN");
        assert!(!session.select_level(8));
    }

    #[test]
    fn test_non_finite_dt_keeps_advance_timer() {
        let mut session = Session::new(DifficultyTier::Normal, Tuning::default()).unwrap();
        session.phase = RunPhase::Advancing;
        session.game.cycle.phase = Phase::LevelComplete;
        session
            .scheduler
            .schedule(session.clock, 0.5, RunTransition::NextLevel);

        let idle = TickInput::default();
        for dt in [f32::NAN, f32::INFINITY] {
            session.tick(&idle, dt);
            assert_eq!(session.clock, 0.0);
        }
        let mut started = false;
        for _ in 0..40 {
            started |= session
                .tick(&idle, 1.0 / 60.0)
                .iter()
                .any(|e| matches!(e, RunEvent::LevelStarted { index: 1, .. }));
        }
        assert!(started);
        assert_eq!(session.level_index(), 1);
    }

    #[test]
    fn test_snapshot_and_events_serialize() {
        let mut session = Session::new(DifficultyTier::Normal, Tuning::default()).unwrap();
        let events = session.toss();
        let json = serde_json::to_string(&events).unwrap();
        assert!(json.contains("TossStarted"));
        let json = serde_json::to_string(&session.snapshot()).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session.snapshot());
    }

    #[test]
    fn test_manual_toss_through_session() {
        let mut session = Session::new(DifficultyTier::Normal, Tuning::default()).unwrap();
        let events = session.toss();
        assert_eq!(
            events,
            vec![RunEvent::Game(GameEvent::TossStarted { stage_index: 0 })]
        );
        assert_eq!(session.game().cycle.phase, Phase::Tossing);
        assert!(session.toss().is_empty());
    }
}
