//! Game state and core simulation types
//!
//! `CycleState` is the mutable heart of one level attempt; `GameState` wraps
//! it with the immutable level/profile/tuning it runs against, the run's
//! score, the simulation clock and the deferred-transition queue.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::schedule::Scheduler;
use crate::consts::{STONE_SPIN_X, STONE_SPIN_Y};
use crate::difficulty::{DifficultyProfile, FailurePolicy};
use crate::hand::HandInput;
use crate::levels::{LevelDefinition, StageAction};
use crate::scoring::ScoreState;
use crate::tuning::Tuning;

/// Phase of the current toss cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Mother stone held, waiting for a toss
    Idle,
    /// Mother stone rising
    Tossing,
    /// Mother stone falling: the one chance to act and then catch
    ActionWindow,
    /// Caught; returns to `Idle` after a short hold
    Caught,
    /// Cycle failed; waiting for the recovery transition
    Dropped,
    /// Every stage cleared (terminal for this level)
    LevelComplete,
    /// Run over (terminal until a new run starts)
    GameOver,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::LevelComplete | Phase::GameOver)
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self, Phase::Tossing | Phase::ActionWindow)
    }

    /// Phases a toss may start from
    pub fn is_holding(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Caught)
    }
}

/// The mother stone's kinematic state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TossedStone {
    pub pos: Vec3,
    pub vel: Vec3,
    /// Euler rotation for presentation only
    pub spin: Vec3,
    /// Out of the hand (in flight, or lying where it fell)
    pub airborne: bool,
}

impl Default for TossedStone {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            spin: Vec3::ZERO,
            airborne: false,
        }
    }
}

impl TossedStone {
    /// Snap to the hand
    pub fn hold(&mut self, hand: Vec3, offset: Vec3) {
        self.pos = hand + offset;
        self.vel = Vec3::ZERO;
        self.airborne = false;
    }

    pub fn launch(&mut self, upward_speed: f32) {
        self.vel = Vec3::new(0.0, upward_speed, 0.0);
        self.airborne = true;
    }

    /// Semi-implicit Euler step with side-wall reflection. There is no
    /// floor: falling past it is how a drop is detected.
    pub fn integrate(&mut self, gravity: f32, dt: f32, wall_x: f32, restitution: f32) {
        self.vel.y += gravity * dt;
        self.pos += self.vel * dt;

        if self.pos.x > wall_x {
            self.pos.x = wall_x;
            self.vel.x *= -restitution;
        } else if self.pos.x < -wall_x {
            self.pos.x = -wall_x;
            self.vel.x *= -restitution;
        }

        self.spin.x += dt * STONE_SPIN_X;
        self.spin.y += dt * STONE_SPIN_Y;
    }
}

/// Stone counts and exchange marks at the start of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleCheckpoint {
    /// Mother stone included
    pub hand: u8,
    pub ground: u8,
    pub exchanged: usize,
}

/// Mutable state of one level attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleState {
    pub stage_index: usize,
    pub stones_in_hand: u8,
    pub stones_on_ground: u8,
    pub phase: Phase,
    pub stone: TossedStone,
    pub action_performed: bool,
    /// At most one action evaluation per cycle
    pub action_attempted: bool,
    pub combo: u32,
    /// Simulation clock at the toss
    pub cycle_started_at: f64,
    /// Auto-toss gate; re-armed by lowering the hand while idle
    pub can_toss: bool,
    /// False only before the direct pickup of an empty-handed level
    pub mother_acquired: bool,
    /// The current stage already failed once (no perfect on retry)
    pub stage_failed: bool,
    /// Ground slots swapped so far, in order
    pub exchanged_slots: Vec<u8>,
    pub checkpoint: CycleCheckpoint,
}

impl CycleState {
    pub fn new(level: &LevelDefinition) -> Self {
        Self {
            stage_index: 0,
            stones_in_hand: level.initial_hand,
            stones_on_ground: level.initial_ground,
            phase: Phase::Idle,
            stone: TossedStone::default(),
            action_performed: false,
            action_attempted: false,
            combo: 0,
            cycle_started_at: 0.0,
            can_toss: true,
            mother_acquired: !level.requires_mother_pickup(),
            stage_failed: false,
            exchanged_slots: Vec::new(),
            checkpoint: CycleCheckpoint {
                hand: level.initial_hand,
                ground: level.initial_ground,
                exchanged: 0,
            },
        }
    }

    /// Hand + ground + the mother stone when it is out of the hand
    pub fn stones_in_play(&self) -> u8 {
        self.stones_in_hand + self.stones_on_ground + u8::from(self.stone.airborne)
    }

    pub fn checkpoint_now(&mut self) {
        self.checkpoint = CycleCheckpoint {
            hand: self.stones_in_hand,
            ground: self.stones_on_ground,
            exchanged: self.exchanged_slots.len(),
        };
    }

    /// Undo everything since the last checkpoint, mother stone back in hand
    pub fn rollback(&mut self) {
        self.stones_in_hand = self.checkpoint.hand;
        self.stones_on_ground = self.checkpoint.ground;
        self.exchanged_slots.truncate(self.checkpoint.exchanged);
        self.stone.airborne = false;
        self.action_performed = false;
        self.action_attempted = false;
    }
}

/// What the player is told; resolved to a translation key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prompt {
    /// No hand seen yet
    Scan,
    /// Goal of the given stage
    Stage(usize),
    Missed,
    Dropped,
    Retry,
    LevelComplete,
    GameOver,
}

impl Prompt {
    pub fn message_key<'a>(&self, level: &'a LevelDefinition) -> &'a str {
        match self {
            Prompt::Scan => "game_scan",
            Prompt::Stage(i) => level
                .stage(*i)
                .map(|s| s.message_key.as_str())
                .unwrap_or("game_level_complete"),
            Prompt::Missed => "game_missed",
            Prompt::Dropped => "game_dropped",
            Prompt::Retry => "game_retry",
            Prompt::LevelComplete => "game_level_complete",
            Prompt::GameOver => "game_over",
        }
    }
}

/// Why a cycle failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Caught without doing the stage's action
    MissedAction,
    /// Reached the floor uncaught
    Dropped,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TossStarted { stage_index: usize },
    MotherPicked,
    ActionPerformed { action: StageAction, count: u8 },
    /// Level data asked for stones that are not there
    InvalidAction { action: StageAction, needed: u8, available: u8 },
    CycleCaught { perfect: bool, combo: u32, points: u64 },
    StageAdvanced { stage_index: usize },
    CycleFailed { reason: FailureReason },
    Recovered { policy: FailurePolicy },
    LevelComplete { level_id: u32, bonus: u64 },
    RunOver { score: ScoreState },
}

/// Complete per-level simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub level: LevelDefinition,
    pub profile: DifficultyProfile,
    pub tuning: Tuning,
    pub cycle: CycleState,
    /// Lives for the whole run; carried across levels
    pub score: ScoreState,
    /// Simulation seconds since the level was entered
    pub clock: f64,
    pub scheduler: Scheduler<Deferred>,
    pub prompt: Prompt,
    /// Most recent hand reading
    pub hand: HandInput,
    pub hand_detected: bool,
    /// Presentation hint while a beginner retry is pending
    pub slow_motion: bool,
}

/// Transitions that fire after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deferred {
    CaughtToIdle,
    RetryCycle,
    RestartLevel,
}

impl GameState {
    pub fn new(level: LevelDefinition, profile: DifficultyProfile, tuning: Tuning) -> Self {
        let cycle = CycleState::new(&level);
        let mut state = Self {
            level,
            profile,
            tuning,
            cycle,
            score: ScoreState::default(),
            clock: 0.0,
            scheduler: Scheduler::new(),
            prompt: Prompt::Scan,
            hand: HandInput::default(),
            hand_detected: false,
            slow_motion: false,
        };
        state.hold_stone();
        state
    }

    /// Carry an existing run score into this level
    pub fn with_score(mut self, score: ScoreState, combo: u32) -> Self {
        self.score = score;
        self.cycle.combo = combo;
        self
    }

    /// Discard the level's progress and any pending transition
    pub fn restart_level(&mut self) {
        let combo = self.cycle.combo;
        self.scheduler.invalidate();
        self.cycle = CycleState::new(&self.level);
        self.cycle.combo = combo;
        self.slow_motion = false;
        self.prompt = if self.hand_detected {
            Prompt::Stage(0)
        } else {
            Prompt::Scan
        };
        self.hold_stone();
        log::debug!("Level {} restarted", self.level.id);
    }

    pub fn hold_stone(&mut self) {
        let hand = self.hand.position;
        self.cycle.stone.hold(hand, self.tuning.hold_offset);
    }

    pub fn message_key(&self) -> &str {
        self.prompt.message_key(&self.level)
    }

    /// Seconds the mother stone has been in the air this cycle
    pub fn air_time(&self) -> f32 {
        if self.cycle.phase.is_airborne() {
            (self.clock - self.cycle.cycle_started_at) as f32
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let cycle = &self.cycle;
        Snapshot {
            level_id: self.level.id,
            level_name: self.level.name.clone(),
            phase: cycle.phase,
            stone_position: cycle.stone.pos,
            stone_rotation: cycle.stone.spin,
            stone_visible: cycle.phase != Phase::Dropped
                && (cycle.stone.airborne || cycle.stones_in_hand > 0),
            hand_position: self.hand.position,
            grabbing: self.hand.grabbing,
            stones_in_hand: cycle.stones_in_hand,
            stones_on_ground: cycle.stones_on_ground,
            stage_index: cycle.stage_index,
            stage_count: self.level.stages.len(),
            message_key: self.message_key().to_string(),
            combo: cycle.combo,
            air_time: self.air_time(),
            air_window: self.profile.air_window,
            can_toss: cycle.can_toss,
            action_performed: cycle.action_performed,
            show_guide_line: self.profile.show_guide_line,
            slow_motion: self.slow_motion,
            exchange_level: self.level.exchange_level,
            exchanged_slots: cycle.exchanged_slots.clone(),
            score: self.score.clone(),
        }
    }
}

/// Read-only view handed to the presentation layer each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub level_id: u32,
    pub level_name: String,
    pub phase: Phase,
    pub stone_position: Vec3,
    pub stone_rotation: Vec3,
    pub stone_visible: bool,
    pub hand_position: Vec3,
    pub grabbing: bool,
    pub stones_in_hand: u8,
    pub stones_on_ground: u8,
    pub stage_index: usize,
    pub stage_count: usize,
    pub message_key: String,
    pub combo: u32,
    /// For the on-screen countdown
    pub air_time: f32,
    pub air_window: f32,
    pub can_toss: bool,
    pub action_performed: bool,
    pub show_guide_line: bool,
    pub slow_motion: bool,
    pub exchange_level: bool,
    pub exchanged_slots: Vec<u8>,
    pub score: ScoreState,
}
