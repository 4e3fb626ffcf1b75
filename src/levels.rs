//! Level catalog
//!
//! Static level tables per difficulty tier. Each level is an ordered list of
//! stages; a stage is one toss cycle with one required action. Levels are
//! loaded once and never mutated; `validate` rejects tables that could ask
//! for stones that are not in play.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;

/// The action a stage requires while the mother stone is airborne
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageAction {
    /// Move stones from the ground into the hand
    Pick,
    /// Move stones from the hand onto the ground
    Place,
    /// Swap a held stone for a ground stone (counts unchanged)
    Exchange,
}

impl StageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageAction::Pick => "pick",
            StageAction::Place => "place",
            StageAction::Exchange => "exchange",
        }
    }
}

impl fmt::Display for StageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sub-goal within a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub action: StageAction,
    pub count: u8,
    /// Translation key for the goal prompt
    pub message_key: String,
}

impl StageDefinition {
    pub fn new(action: StageAction, count: u8, message_key: &str) -> Self {
        Self {
            action,
            count,
            message_key: message_key.to_string(),
        }
    }

    pub fn pick(count: u8) -> Self {
        Self::new(StageAction::Pick, count, &format!("msg_pick_{count}"))
    }

    pub fn place(count: u8) -> Self {
        Self::new(StageAction::Place, count, &format!("msg_place_{count}"))
    }

    pub fn exchange() -> Self {
        Self::new(StageAction::Exchange, 1, "msg_exchange")
    }
}

/// A playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub id: u32,
    pub name: String,
    pub stages: Vec<StageDefinition>,
    /// Stones in hand at level start, mother stone included
    pub initial_hand: u8,
    pub initial_ground: u8,
    /// Stones are swapped rather than gathered (presentation tints them)
    #[serde(default)]
    pub exchange_level: bool,
    /// Base catch radius before the difficulty scale
    pub catch_radius: f32,
    /// Multiplier on the profile's gravity; later levels fall faster
    pub gravity_scale: f32,
}

impl LevelDefinition {
    pub fn total_stones(&self) -> u8 {
        self.initial_hand + self.initial_ground
    }

    /// Levels starting with an empty hand open with a direct mother pickup
    pub fn requires_mother_pickup(&self) -> bool {
        self.initial_hand == 0
    }

    pub fn stage(&self, index: usize) -> Option<&StageDefinition> {
        self.stages.get(index)
    }

    /// Dry-run the stage list against the initial counts
    pub fn validate(&self) -> Result<(), CatalogError> {
        let level = self.id;
        if self.stages.is_empty() {
            return Err(CatalogError::NoStages { level });
        }
        if self.total_stones() == 0 {
            return Err(CatalogError::NoStones { level });
        }
        if !(self.catch_radius > 0.0 && self.gravity_scale > 0.0) {
            return Err(CatalogError::InvalidGeometry { level });
        }
        if let Some(stage) = self.stages.iter().position(|s| s.count == 0) {
            return Err(CatalogError::ZeroCount { level, stage });
        }

        let mut hand = self.initial_hand;
        let mut ground = self.initial_ground;
        let mut placed = 0u8;
        let mut picked = 0u8;

        for (index, stage) in self.stages.iter().enumerate() {
            if index == 0 && self.requires_mother_pickup() {
                if stage.action != StageAction::Pick || stage.count != 1 || ground == 0 {
                    return Err(CatalogError::MotherPickupMismatch { level });
                }
                ground -= 1;
                hand += 1;
                picked += 1;
                continue;
            }

            // Mother stone leaves the hand for the toss
            if hand == 0 {
                return Err(CatalogError::NoMotherStone { level, stage: index });
            }
            hand -= 1;

            let insufficient = |available: u8, needed: u8| CatalogError::InsufficientStones {
                level,
                stage: index,
                action: stage.action,
                needed,
                available,
            };
            match stage.action {
                StageAction::Pick => {
                    if ground < stage.count {
                        return Err(insufficient(ground, stage.count));
                    }
                    ground -= stage.count;
                    hand += stage.count;
                    picked += stage.count;
                }
                StageAction::Place => {
                    if hand < stage.count {
                        return Err(insufficient(hand, stage.count));
                    }
                    hand -= stage.count;
                    ground += stage.count;
                    placed += stage.count;
                }
                StageAction::Exchange => {
                    if hand == 0 {
                        return Err(insufficient(hand, 1));
                    }
                    if ground == 0 {
                        return Err(insufficient(ground, 1));
                    }
                }
            }

            hand += 1;
        }

        if !self.exchange_level {
            let gathered = self.initial_hand + picked - placed;
            if gathered != self.total_stones() {
                return Err(CatalogError::StonesLeftOnGround {
                    level,
                    remaining: self.total_stones() - gathered,
                });
            }
        }

        Ok(())
    }
}

/// Check a whole tier's level list
pub fn validate_catalog(levels: &[LevelDefinition]) -> Result<(), CatalogError> {
    if levels.is_empty() {
        return Err(CatalogError::EmptyCatalog);
    }
    let mut seen = HashSet::new();
    for level in levels {
        if !seen.insert(level.id) {
            return Err(CatalogError::DuplicateLevelId(level.id));
        }
        level.validate()?;
    }
    Ok(())
}

/// Malformed level data. Never recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    EmptyCatalog,
    DuplicateLevelId(u32),
    NoStages { level: u32 },
    NoStones { level: u32 },
    InvalidGeometry { level: u32 },
    ZeroCount { level: u32, stage: usize },
    MotherPickupMismatch { level: u32 },
    NoMotherStone { level: u32, stage: usize },
    InsufficientStones {
        level: u32,
        stage: usize,
        action: StageAction,
        needed: u8,
        available: u8,
    },
    StonesLeftOnGround { level: u32, remaining: u8 },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::EmptyCatalog => write!(f, "level catalog is empty"),
            CatalogError::DuplicateLevelId(id) => write!(f, "duplicate level id {id}"),
            CatalogError::NoStages { level } => write!(f, "level {level} has no stages"),
            CatalogError::NoStones { level } => write!(f, "level {level} has no stones"),
            CatalogError::InvalidGeometry { level } => {
                write!(f, "level {level} needs a positive catch radius and gravity scale")
            }
            CatalogError::ZeroCount { level, stage } => {
                write!(f, "level {level} stage {stage} moves zero stones")
            }
            CatalogError::MotherPickupMismatch { level } => write!(
                f,
                "level {level} starts with an empty hand but stage 0 is not a single pick"
            ),
            CatalogError::NoMotherStone { level, stage } => {
                write!(f, "level {level} stage {stage} has no stone left to toss")
            }
            CatalogError::InsufficientStones {
                level,
                stage,
                action,
                needed,
                available,
            } => write!(
                f,
                "level {level} stage {stage}: {action} needs {needed} stone(s), {available} available"
            ),
            CatalogError::StonesLeftOnGround { level, remaining } => {
                write!(f, "level {level} ends with {remaining} stone(s) on the ground")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

fn level(
    id: u32,
    name: &str,
    stages: Vec<StageDefinition>,
    initial_hand: u8,
    initial_ground: u8,
    catch_radius: f32,
    gravity_scale: f32,
) -> LevelDefinition {
    LevelDefinition {
        id,
        name: name.to_string(),
        stages,
        initial_hand,
        initial_ground,
        exchange_level: false,
        catch_radius,
        gravity_scale,
    }
}

/// The eight classic levels, shared by Normal and Master
pub fn classic_levels() -> Vec<LevelDefinition> {
    use StageDefinition as S;

    let mut tukar = level(6, "TUKAR", vec![S::exchange(), S::exchange(), S::exchange()], 2, 3, 3.5, 1.05);
    tukar.exchange_level = true;
    let mut tujuh = level(7, "BUAH TUJUH", vec![S::exchange(), S::pick(3)], 2, 3, 3.2, 1.2);
    tujuh.exchange_level = true;

    vec![
        level(1, "BUAH SATU", vec![S::pick(1), S::pick(1), S::pick(1), S::pick(1)], 1, 4, 5.0, 0.65),
        level(2, "BUAH DUA", vec![S::pick(2), S::pick(2)], 1, 4, 4.5, 0.8),
        level(3, "BUAH TIGA", vec![S::pick(1), S::pick(3)], 1, 4, 4.0, 0.95),
        level(4, "BUAH EMPAT", vec![S::pick(4)], 1, 4, 3.8, 1.0),
        level(5, "BUAH LIMA", vec![S::place(4), S::pick(4)], 5, 0, 3.8, 1.0),
        tukar,
        tujuh,
        level(8, "BUAH LAPAN", vec![S::pick(1), S::pick(4)], 0, 5, 3.0, 1.35),
    ]
}

/// Three gentle teaching levels for beginners
pub fn beginner_levels() -> Vec<LevelDefinition> {
    use StageDefinition as S;

    vec![
        level(1, "LEARN PICK 1", vec![S::pick(1), S::pick(1), S::pick(1), S::pick(1)], 1, 4, 6.0, 0.8),
        level(2, "LEARN PICK 2", vec![S::pick(2), S::pick(2)], 1, 4, 5.5, 0.9),
        level(3, "LEARN PICK 4", vec![S::pick(4)], 1, 4, 5.0, 1.0),
    ]
}

/// Ordered level list for a tier
pub fn catalog(tier: DifficultyTier) -> Vec<LevelDefinition> {
    match tier {
        DifficultyTier::Beginner => beginner_levels(),
        DifficultyTier::Normal | DifficultyTier::Master => classic_levels(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picked_plus_initial(level: &LevelDefinition) -> u32 {
        let picked: u32 = level
            .stages
            .iter()
            .filter(|s| s.action == StageAction::Pick)
            .map(|s| s.count as u32)
            .sum();
        picked + level.initial_hand as u32
    }

    #[test]
    fn test_shipped_catalogs_validate() {
        for tier in DifficultyTier::ALL {
            let levels = catalog(tier);
            assert_eq!(validate_catalog(&levels), Ok(()), "{:?}", tier);
        }
    }

    #[test]
    fn test_pick_levels_conserve_stones() {
        for level in classic_levels().iter().chain(beginner_levels().iter()) {
            let has_place = level.stages.iter().any(|s| s.action == StageAction::Place);
            if level.exchange_level || has_place {
                continue;
            }
            assert_eq!(
                picked_plus_initial(level),
                level.total_stones() as u32,
                "{}",
                level.name
            );
        }
    }

    #[test]
    fn test_buah_lapan_needs_mother_pickup() {
        let levels = classic_levels();
        let lapan = levels.iter().find(|l| l.name == "BUAH LAPAN").unwrap();
        assert!(lapan.requires_mother_pickup());
        assert_eq!(lapan.stages[0].action, StageAction::Pick);
        assert_eq!(lapan.stages[0].count, 1);
        assert!(levels.iter().filter(|l| l.requires_mother_pickup()).count() == 1);
    }

    #[test]
    fn test_pick_more_than_ground_rejected() {
        let mut bad = classic_levels()[3].clone();
        bad.stages = vec![StageDefinition::pick(5)];
        assert!(matches!(
            bad.validate(),
            Err(CatalogError::InsufficientStones {
                action: StageAction::Pick,
                needed: 5,
                available: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_place_cannot_use_mother_stone() {
        let mut bad = classic_levels()[4].clone();
        bad.stages = vec![StageDefinition::place(5), StageDefinition::pick(5)];
        assert!(matches!(
            bad.validate(),
            Err(CatalogError::InsufficientStones {
                action: StageAction::Place,
                needed: 5,
                available: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_unfinished_pick_level_rejected() {
        let mut bad = classic_levels()[0].clone();
        bad.stages.pop();
        assert_eq!(
            bad.validate(),
            Err(CatalogError::StonesLeftOnGround { level: 1, remaining: 1 })
        );
    }

    #[test]
    fn test_mother_pickup_must_be_single_pick() {
        let mut bad = classic_levels()[7].clone();
        bad.stages[0] = StageDefinition::pick(2);
        assert_eq!(bad.validate(), Err(CatalogError::MotherPickupMismatch { level: 8 }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut levels = beginner_levels();
        levels[1].id = levels[0].id;
        assert_eq!(validate_catalog(&levels), Err(CatalogError::DuplicateLevelId(1)));
        assert_eq!(validate_catalog(&[]), Err(CatalogError::EmptyCatalog));
    }

    #[test]
    fn test_error_messages_name_the_level() {
        let err = CatalogError::ZeroCount { level: 3, stage: 1 };
        assert_eq!(err.to_string(), "level 3 stage 1 moves zero stones");
    }
}
