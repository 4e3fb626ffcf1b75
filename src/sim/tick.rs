//! Per-frame simulation step
//!
//! Advances the toss cycle once per rendered frame. The presentation layer
//! only reads the resulting state; its single input besides the hand is the
//! manual toss command.

use super::action::{ActionError, apply_stage_action};
use super::recovery::{fail_cycle, run_due};
use super::state::{Deferred, FailureReason, GameEvent, GameState, Phase, Prompt};
use crate::hand::HandInput;
use crate::scoring::CycleOutcome;

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub hand: HandInput,
    /// Manual toss (button press), one-shot
    pub toss: bool,
}

impl TickInput {
    pub fn hand(hand: HandInput) -> Self {
        Self { hand, toss: false }
    }

    pub fn toss(hand: HandInput) -> Self {
        Self { hand, toss: true }
    }
}

/// Advance the game by one frame, returning what happened
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if state.cycle.phase.is_terminal() {
        return events;
    }

    // A NaN step would poison the clock for good
    let dt = if dt.is_finite() {
        dt.clamp(0.0, state.tuning.max_frame_dt)
    } else {
        0.0
    };
    state.clock += dt as f64;
    state.hand = input.hand;

    run_due(state, &mut events);
    if state.cycle.phase.is_terminal() {
        return events;
    }

    let hand_y = state.hand.y();
    let tuning = &state.tuning;

    if !state.hand_detected && hand_y > tuning.hand_detect_y {
        state.hand_detected = true;
        if state.prompt == Prompt::Scan {
            state.prompt = Prompt::Stage(state.cycle.stage_index);
        }
    }

    // Re-arm the auto toss once the hand comes back down
    if !state.cycle.can_toss && state.cycle.phase == Phase::Idle && hand_y < tuning.reload_threshold_y {
        state.cycle.can_toss = true;
    }

    if !state.cycle.mother_acquired {
        if state.cycle.phase == Phase::Idle && hand_y < tuning.pickup_threshold_y {
            pick_up_mother(state, &mut events);
        }
        state.hold_stone();
        return events;
    }

    let auto_toss = state.cycle.can_toss
        && state.cycle.phase == Phase::Idle
        && hand_y > state.tuning.toss_threshold_y;
    if (input.toss || auto_toss) && try_toss(state, &mut events) {
        return events;
    }

    match state.cycle.phase {
        Phase::Idle | Phase::Caught => state.hold_stone(),
        Phase::Tossing | Phase::ActionWindow => step_flight(state, dt, &mut events),
        Phase::Dropped | Phase::LevelComplete | Phase::GameOver => {}
    }

    events
}

/// Pure form of [`tick`]: returns the next state alongside the events
pub fn advance(state: &GameState, input: &TickInput, dt: f32) -> (GameState, Vec<GameEvent>) {
    let mut next = state.clone();
    let events = tick(&mut next, input, dt);
    (next, events)
}

/// Start a toss if the cycle allows it. Returns whether one started.
pub fn try_toss(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let cycle = &mut state.cycle;
    if !cycle.phase.is_holding() || cycle.stones_in_hand == 0 || !cycle.mother_acquired {
        return false;
    }

    state.scheduler.cancel(Deferred::CaughtToIdle);
    cycle.checkpoint_now();
    cycle.stones_in_hand -= 1;
    cycle.phase = Phase::Tossing;
    cycle.action_performed = false;
    cycle.action_attempted = false;
    cycle.can_toss = false;
    cycle.cycle_started_at = state.clock;

    let speed = state.profile.toss_velocity(state.level.gravity_scale);
    cycle.stone.hold(state.hand.position, state.tuning.hold_offset);
    cycle.stone.launch(speed);

    state.prompt = Prompt::Stage(cycle.stage_index);
    log::debug!("Toss at {:.2}s, stage {}, v0 {:.2}", state.clock, cycle.stage_index, speed);
    events.push(GameEvent::TossStarted {
        stage_index: cycle.stage_index,
    });
    true
}

/// Direct pickup of the mother stone on levels that start empty-handed
fn pick_up_mother(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let cycle = &mut state.cycle;
    if cycle.stones_on_ground == 0 {
        log::error!("Level {} has no stone on the ground for the mother pickup", state.level.id);
        return;
    }
    cycle.stones_on_ground -= 1;
    cycle.stones_in_hand += 1;
    cycle.mother_acquired = true;
    cycle.stage_index = 1;
    cycle.can_toss = false;
    cycle.action_performed = false;
    state.prompt = Prompt::Stage(1);
    log::debug!("Mother stone picked up on level {}", state.level.id);
    events.push(GameEvent::MotherPicked);
    events.push(GameEvent::StageAdvanced { stage_index: 1 });
}

fn step_flight(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let gravity = state.profile.effective_gravity(&state.level);
    let tuning = &state.tuning;
    state
        .cycle
        .stone
        .integrate(gravity, dt, tuning.wall_x, tuning.wall_restitution);

    if state.cycle.phase == Phase::Tossing && state.cycle.stone.vel.y < 0.0 {
        state.cycle.phase = Phase::ActionWindow;
    }

    if state.cycle.phase == Phase::ActionWindow {
        if !state.cycle.action_attempted && state.hand.y() < state.tuning.pickup_threshold_y {
            attempt_action(state, events);
        }

        let radius = state.profile.catch_radius(&state.level);
        if state.cycle.stone.pos.distance(state.hand.position) < radius {
            resolve_catch(state, events);
            return;
        }
    }

    if state.cycle.stone.pos.y < state.tuning.floor_y {
        fail_cycle(state, FailureReason::Dropped, events);
    }
}

fn attempt_action(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.cycle.action_attempted = true;
    let Some(stage) = state.level.stage(state.cycle.stage_index) else {
        return;
    };
    match apply_stage_action(&mut state.cycle, stage) {
        Ok(applied) => {
            log::debug!("{} {} performed", applied.action, applied.count);
            events.push(GameEvent::ActionPerformed {
                action: applied.action,
                count: applied.count,
            });
        }
        Err(err @ ActionError::Insufficient { action, needed, available }) => {
            log::error!(
                "Level {} stage {}: {}",
                state.level.id,
                state.cycle.stage_index,
                err
            );
            events.push(GameEvent::InvalidAction {
                action,
                needed,
                available,
            });
        }
    }
}

fn resolve_catch(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.cycle.action_performed {
        fail_cycle(state, FailureReason::MissedAction, events);
        return;
    }

    let cycle = &mut state.cycle;
    cycle.stones_in_hand += 1;
    cycle.stone.airborne = false;

    let duration = (state.clock - cycle.cycle_started_at) as f32;
    let cutoff = state
        .profile
        .perfect_cutoff(state.tuning.scoring.perfect_fraction);
    let perfect = !cycle.stage_failed && duration <= cutoff;

    if state.profile.combo_enabled {
        if perfect {
            cycle.combo += 1;
        } else if state.profile.combo_requires_perfect {
            cycle.combo = 0;
        }
    }

    let outcome = CycleOutcome {
        perfect,
        combo: cycle.combo,
    };
    let points = state.score.record_cycle(outcome, &state.tuning.scoring);
    log::debug!(
        "Caught after {:.2}s (perfect: {}, combo: {}, +{})",
        duration,
        perfect,
        cycle.combo,
        points
    );
    events.push(GameEvent::CycleCaught {
        perfect,
        combo: cycle.combo,
        points,
    });

    cycle.stage_index += 1;
    cycle.stage_failed = false;
    cycle.action_performed = false;
    cycle.action_attempted = false;

    if cycle.stage_index >= state.level.stages.len() {
        cycle.phase = Phase::LevelComplete;
        state.scheduler.invalidate();
        state.prompt = Prompt::LevelComplete;
        let bonus = state.score.record_level_complete(&state.tuning.scoring);
        log::info!(
            "Level {} ({}) complete, total {}",
            state.level.id,
            state.level.name,
            state.score.total_score
        );
        events.push(GameEvent::LevelComplete {
            level_id: state.level.id,
            bonus,
        });
    } else {
        cycle.phase = Phase::Caught;
        state.prompt = Prompt::Stage(cycle.stage_index);
        events.push(GameEvent::StageAdvanced {
            stage_index: cycle.stage_index,
        });
        state
            .scheduler
            .schedule(state.clock, state.tuning.caught_hold, Deferred::CaughtToIdle);
    }

    state.hold_stone();
}
