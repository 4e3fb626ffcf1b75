mod common;

use batu_seremban::levels::{beginner_levels, classic_levels};
use batu_seremban::scoring::combo_multiplier;
use batu_seremban::sim::{Phase, Scheduler, TickInput, tick};
use batu_seremban::tuning::ScoringTuning;
use batu_seremban::{DifficultyTier, HandInput};
use common::*;
use proptest::prelude::*;

fn tier_strategy() -> impl Strategy<Value = DifficultyTier> {
    prop_oneof![
        Just(DifficultyTier::Beginner),
        Just(DifficultyTier::Normal),
        Just(DifficultyTier::Master),
    ]
}

fn frame_strategy() -> impl Strategy<Value = (f32, f32, bool, f32)> {
    (-6.0f32..6.0, -4.0f32..3.0, prop::bool::weighted(0.05), 0.0f32..0.2)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn stones_are_conserved(
        level_index in 0usize..8,
        tier in tier_strategy(),
        frames in prop::collection::vec(frame_strategy(), 1..600),
    ) {
        let level = classic_levels()[level_index].clone();
        let total = level.total_stones();
        let stages = level.stages.len();
        let mut s = game(level, tier);

        for (x, y, toss, dt) in frames {
            let input = TickInput { hand: HandInput::at(x, y), toss };
            tick(&mut s, &input, dt);
            prop_assert_eq!(s.cycle.stones_in_play(), total);
            prop_assert!(s.cycle.stage_index <= stages);
            if s.cycle.phase == Phase::LevelComplete {
                prop_assert_eq!(s.cycle.stage_index, stages);
            }
        }
    }

    #[test]
    fn retry_never_loses_progress(
        level_index in 0usize..3,
        frames in prop::collection::vec(frame_strategy(), 1..600),
    ) {
        let mut s = game(beginner_levels()[level_index].clone(), DifficultyTier::Beginner);
        let mut highest = 0;
        for (x, y, toss, dt) in frames {
            let input = TickInput { hand: HandInput::at(x, y), toss };
            tick(&mut s, &input, dt);
            prop_assert!(s.cycle.stage_index >= highest);
            highest = s.cycle.stage_index;
            prop_assert_ne!(s.cycle.phase, Phase::GameOver);
        }
    }

    #[test]
    fn clock_never_outruns_clamp(
        dts in prop::collection::vec(
            prop_oneof![
                8 => -1.0f32..5.0,
                1 => Just(f32::NAN),
                1 => Just(f32::INFINITY),
                1 => Just(f32::NEG_INFINITY),
            ],
            1..100,
        )
    ) {
        let mut s = game(classic_levels()[0].clone(), DifficultyTier::Normal);
        let max = s.tuning.max_frame_dt as f64;
        let mut previous = s.clock;
        for dt in dts {
            tick(&mut s, &TickInput::hand(HandInput::at(0.0, REST)), dt);
            prop_assert!(s.clock.is_finite());
            prop_assert!(s.clock >= previous);
            prop_assert!(s.clock - previous <= max + 1e-9);
            previous = s.clock;
        }
    }

    #[test]
    fn multiplier_is_monotonic(a in 0u32..100, b in 0u32..100) {
        let tiers = ScoringTuning::default().combo_tiers;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(combo_multiplier(lo, &tiers) <= combo_multiplier(hi, &tiers));
        prop_assert!(combo_multiplier(lo, &tiers) >= 1.0);
    }

    #[test]
    fn scheduler_fires_in_order(delays in prop::collection::vec(0.0f32..3.0, 1..20)) {
        let mut scheduler = Scheduler::new();
        for (i, delay) in delays.iter().enumerate() {
            scheduler.schedule(0.0, *delay, i);
        }
        let fired = scheduler.take_due(10.0);
        prop_assert_eq!(fired.len(), delays.len());
        for pair in fired.windows(2) {
            prop_assert!(delays[pair[0]] <= delays[pair[1]]);
        }
        prop_assert!(scheduler.is_empty());
    }
}
