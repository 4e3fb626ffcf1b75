//! Failure handling and deferred recovery
//!
//! A failure is always recorded (message, failure counter, combo) before the
//! difficulty's policy decides what happens next. Recovery for the
//! non-terminal policies runs later through the scheduler.

use super::state::{Deferred, FailureReason, GameEvent, GameState, Phase, Prompt};
use crate::difficulty::FailurePolicy;

pub fn fail_cycle(state: &mut GameState, reason: FailureReason, events: &mut Vec<GameEvent>) {
    let policy = state.profile.failure_policy;
    log::warn!(
        "Level {} stage {} failed: {:?} (policy {})",
        state.level.id,
        state.cycle.stage_index,
        reason,
        policy.as_str()
    );

    state.score.record_failure();
    if state.profile.combo_enabled {
        state.cycle.combo = 0;
    }
    state.cycle.stage_failed = true;
    state.cycle.phase = Phase::Dropped;
    state.prompt = match reason {
        FailureReason::MissedAction => Prompt::Missed,
        FailureReason::Dropped => Prompt::Dropped,
    };
    events.push(GameEvent::CycleFailed { reason });

    let now = state.clock;
    match policy {
        FailurePolicy::RetryCycle => {
            state.slow_motion = state.profile.slow_motion_on_retry;
            state
                .scheduler
                .schedule(now, state.tuning.retry_delay, Deferred::RetryCycle);
        }
        FailurePolicy::RestartLevel => {
            state
                .scheduler
                .schedule(now, state.tuning.restart_delay, Deferred::RestartLevel);
        }
        FailurePolicy::EndRun => {
            state.scheduler.invalidate();
            state.cycle.phase = Phase::GameOver;
            state.prompt = Prompt::GameOver;
            log::info!("Run over with {} points", state.score.total_score);
            events.push(GameEvent::RunOver {
                score: state.score.clone(),
            });
        }
    }
}

/// Fire every due transition of the current generation
pub fn run_due(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let generation = state.scheduler.generation();
    for deferred in state.scheduler.take_due(state.clock) {
        // A restart earlier in this batch invalidates the rest
        if state.scheduler.generation() != generation {
            break;
        }
        apply_deferred(state, deferred, events);
    }
}

fn apply_deferred(state: &mut GameState, deferred: Deferred, events: &mut Vec<GameEvent>) {
    match deferred {
        Deferred::CaughtToIdle => {
            if state.cycle.phase == Phase::Caught {
                state.cycle.phase = Phase::Idle;
            }
        }
        Deferred::RetryCycle => {
            if state.cycle.phase != Phase::Dropped {
                return;
            }
            state.cycle.rollback();
            state.cycle.phase = Phase::Idle;
            state.cycle.can_toss = true;
            state.slow_motion = false;
            state.prompt = Prompt::Retry;
            state.hold_stone();
            log::debug!("Retrying stage {}", state.cycle.stage_index);
            events.push(GameEvent::Recovered {
                policy: FailurePolicy::RetryCycle,
            });
        }
        Deferred::RestartLevel => {
            if state.cycle.phase != Phase::Dropped {
                return;
            }
            state.restart_level();
            events.push(GameEvent::Recovered {
                policy: FailurePolicy::RestartLevel,
            });
        }
    }
}
