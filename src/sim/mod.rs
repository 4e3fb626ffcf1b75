//! Frame-driven toss-cycle simulation
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only advances through the `dt` handed to `tick`
//! - Delays are scheduled against the simulation clock, never wall time
//! - No rendering, camera or platform dependencies

pub mod action;
pub mod recovery;
pub mod schedule;
pub mod state;
pub mod tick;

pub use action::{ActionApplied, ActionError, apply_stage_action};
pub use schedule::{Scheduled, Scheduler};
pub use state::{
    CycleCheckpoint, CycleState, Deferred, FailureReason, GameEvent, GameState, Phase, Prompt,
    Snapshot, TossedStone,
};
pub use tick::{TickInput, advance, tick, try_toss};
