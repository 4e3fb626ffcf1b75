//! Stage action evaluation
//!
//! Applied at most once per cycle, while the mother stone is falling.

use std::fmt;

use super::state::CycleState;
use crate::levels::{StageAction, StageDefinition};

/// A successfully applied action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionApplied {
    pub action: StageAction,
    pub count: u8,
    /// Ground slot swapped by an exchange
    pub exchanged_slot: Option<u8>,
}

/// The counts cannot satisfy the stage. Well-formed levels never get here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    Insufficient {
        action: StageAction,
        needed: u8,
        available: u8,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Insufficient {
                action,
                needed,
                available,
            } => write!(f, "{action} needs {needed} stone(s) but only {available} available"),
        }
    }
}

impl std::error::Error for ActionError {}

pub fn apply_stage_action(
    cycle: &mut CycleState,
    stage: &StageDefinition,
) -> Result<ActionApplied, ActionError> {
    let count = stage.count;
    let applied = |exchanged_slot| ActionApplied {
        action: stage.action,
        count,
        exchanged_slot,
    };

    match stage.action {
        StageAction::Pick => {
            if cycle.stones_on_ground < count {
                return Err(ActionError::Insufficient {
                    action: stage.action,
                    needed: count,
                    available: cycle.stones_on_ground,
                });
            }
            cycle.stones_on_ground -= count;
            cycle.stones_in_hand += count;
        }
        StageAction::Place => {
            if cycle.stones_in_hand < count {
                return Err(ActionError::Insufficient {
                    action: stage.action,
                    needed: count,
                    available: cycle.stones_in_hand,
                });
            }
            cycle.stones_in_hand -= count;
            cycle.stones_on_ground += count;
        }
        StageAction::Exchange => {
            let slot = next_exchange_slot(cycle);
            if let Some(slot) = slot {
                cycle.exchanged_slots.push(slot);
            }
            cycle.action_performed = true;
            return Ok(applied(slot));
        }
    }

    cycle.action_performed = true;
    Ok(applied(None))
}

/// Ground slots are swapped left to right; wraps once every slot is used
fn next_exchange_slot(cycle: &CycleState) -> Option<u8> {
    if cycle.stones_on_ground == 0 {
        return None;
    }
    let used = cycle.exchanged_slots.len() as u8;
    Some(used % cycle.stones_on_ground)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::classic_levels;

    fn airborne_cycle(level_index: usize) -> CycleState {
        let mut cycle = CycleState::new(&classic_levels()[level_index]);
        cycle.stones_in_hand -= 1;
        cycle.stone.airborne = true;
        cycle
    }

    #[test]
    fn test_pick_moves_ground_to_hand() {
        let mut cycle = airborne_cycle(3);
        let applied = apply_stage_action(&mut cycle, &StageDefinition::pick(4)).unwrap();
        assert_eq!(applied.count, 4);
        assert_eq!(cycle.stones_in_hand, 4);
        assert_eq!(cycle.stones_on_ground, 0);
        assert!(cycle.action_performed);
    }

    #[test]
    fn test_place_moves_hand_to_ground() {
        let mut cycle = airborne_cycle(4);
        apply_stage_action(&mut cycle, &StageDefinition::place(4)).unwrap();
        assert_eq!(cycle.stones_in_hand, 0);
        assert_eq!(cycle.stones_on_ground, 4);
    }

    #[test]
    fn test_insufficient_pick_leaves_counts() {
        let mut cycle = airborne_cycle(3);
        let err = apply_stage_action(&mut cycle, &StageDefinition::pick(5)).unwrap_err();
        assert_eq!(
            err,
            ActionError::Insufficient {
                action: StageAction::Pick,
                needed: 5,
                available: 4
            }
        );
        assert_eq!(cycle.stones_on_ground, 4);
        assert!(!cycle.action_performed);
    }

    #[test]
    fn test_exchange_keeps_counts_and_marks_slots() {
        let mut cycle = airborne_cycle(5);
        let before = (cycle.stones_in_hand, cycle.stones_on_ground);
        for expected in 0..3u8 {
            cycle.action_performed = false;
            let applied = apply_stage_action(&mut cycle, &StageDefinition::exchange()).unwrap();
            assert_eq!(applied.exchanged_slot, Some(expected));
        }
        assert_eq!((cycle.stones_in_hand, cycle.stones_on_ground), before);
        assert_eq!(cycle.exchanged_slots, vec![0, 1, 2]);
    }

    #[test]
    fn test_exchange_with_empty_ground_still_succeeds() {
        let mut cycle = airborne_cycle(4);
        let applied = apply_stage_action(&mut cycle, &StageDefinition::exchange()).unwrap();
        assert_eq!(applied.exchanged_slot, None);
        assert!(cycle.action_performed);
    }
}
