//! Batu Seremban - gameplay core for a hand-tracked AR trainer
//!
//! Core modules:
//! - `sim`: Frame-driven toss-cycle state machine (pure, no rendering)
//! - `levels`: Static level catalog per difficulty tier
//! - `difficulty`: Difficulty profiles and failure policies
//! - `scoring`: Score accumulator with combo multiplier
//! - `hand`: Hand-input contract and landmark adapter shim
//! - `session`: Run orchestration across levels
//! - `tuning`: Data-driven thresholds, delays and scoring constants

pub mod difficulty;
pub mod hand;
pub mod levels;
pub mod scoring;
pub mod session;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use difficulty::{DifficultyProfile, DifficultyTier, FailurePolicy};
pub use hand::{HandInput, HandTracker};
pub use levels::{CatalogError, LevelDefinition, StageAction, StageDefinition};
pub use scoring::ScoreState;
pub use session::{RunEvent, RunPhase, Session};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Nominal display refresh step, used by the demo driver and tests
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Spin applied to the tossed stone (radians/s per axis), cosmetic only
    pub const STONE_SPIN_X: f32 = 5.0;
    pub const STONE_SPIN_Y: f32 = 3.0;
}
