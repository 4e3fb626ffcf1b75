#![allow(dead_code)]

use batu_seremban::consts::FRAME_DT;
use batu_seremban::sim::{GameEvent, GameState, Phase, TickInput, tick};
use batu_seremban::{
    DifficultyProfile, DifficultyTier, HandInput, LevelDefinition, RunEvent, Session,
    StageDefinition, Tuning,
};

pub const DT: f32 = FRAME_DT;
pub const MAX_FRAMES: usize = 60 * 30;

/// Above the toss threshold, near where the stone comes down
pub const HIGH: f32 = 1.0;
/// Below the reload threshold, above the pickup threshold
pub const REARM: f32 = -1.5;
/// Below the pickup threshold
pub const DIP: f32 = -2.5;
/// Between the reload and toss thresholds: neither arms nor tosses
pub const REST: f32 = 0.0;

pub fn game(level: LevelDefinition, tier: DifficultyTier) -> GameState {
    GameState::new(level, DifficultyProfile::for_tier(tier), Tuning::default())
}

pub fn level(id: u32, stages: Vec<StageDefinition>, hand: u8, ground: u8) -> LevelDefinition {
    LevelDefinition {
        id,
        name: format!("DRILL {id}"),
        stages,
        initial_hand: hand,
        initial_ground: ground,
        exchange_level: false,
        catch_radius: 3.8,
        gravity_scale: 1.0,
    }
}

/// Tosses when armed, dips once the stone starts falling, rises to catch
/// and lowers again to re-arm
pub fn skilled_hand(s: &GameState) -> HandInput {
    let cycle = &s.cycle;
    let y = match cycle.phase {
        Phase::Idle if !cycle.mother_acquired => DIP,
        Phase::Idle if cycle.can_toss => HIGH,
        Phase::Idle | Phase::Caught => REARM,
        Phase::Tossing | Phase::ActionWindow if !cycle.action_performed => DIP,
        _ => HIGH,
    };
    HandInput::at(0.0, y)
}

/// Never dips: every catch misses the action
pub fn lazy_hand(_: &GameState) -> HandInput {
    HandInput::at(0.0, HIGH)
}

/// Does the action but stays low, catching the stone late
pub fn slow_hand(s: &GameState) -> HandInput {
    let y = match s.cycle.phase {
        Phase::Idle if s.cycle.can_toss => HIGH,
        Phase::Idle | Phase::Caught => REARM,
        _ => DIP,
    };
    HandInput::at(0.0, y)
}

pub fn resting_hand(_: &GameState) -> HandInput {
    HandInput::at(0.0, REST)
}

/// Tick until `done` holds, collecting every event on the way
pub fn run_until(
    s: &mut GameState,
    mut hand: impl FnMut(&GameState) -> HandInput,
    done: impl Fn(&GameState) -> bool,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..MAX_FRAMES {
        if done(s) {
            return events;
        }
        let input = TickInput::hand(hand(s));
        events.extend(tick(s, &input, DT));
    }
    panic!(
        "condition not reached within {MAX_FRAMES} frames (phase {:?}, stage {})",
        s.cycle.phase, s.cycle.stage_index
    );
}

pub fn run_session_until(
    session: &mut Session,
    mut hand: impl FnMut(&GameState) -> HandInput,
    done: impl Fn(&Session) -> bool,
) -> Vec<RunEvent> {
    let mut events = Vec::new();
    for _ in 0..MAX_FRAMES * 8 {
        if done(session) {
            return events;
        }
        let input = TickInput::hand(hand(session.game()));
        events.extend(session.tick(&input, DT));
    }
    panic!("session condition not reached (phase {:?})", session.phase());
}
