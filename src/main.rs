//! Batu Seremban entry point
//!
//! Natively this runs a headless demo: a scripted hand plays one full run
//! so the state machine can be watched through the logs
//! (`RUST_LOG=debug batu-seremban master`). The browser build drives the
//! library through `batu_seremban::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use batu_seremban::consts::FRAME_DT;
    use batu_seremban::sim::{Phase, TickInput};
    use batu_seremban::tuning::TUNING_FILE;
    use batu_seremban::{DifficultyTier, HandInput, RunEvent, RunPhase, Session, Tuning};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    /// A hand that tosses, dips to act, and comes back up to catch
    struct BotHand {
        rng: Pcg32,
        /// Chance per cycle to skip the dip (forces a missed action)
        sloppiness: f64,
        skip_action: bool,
        dip_delay: f32,
        dip_timer: f32,
    }

    impl BotHand {
        fn new(seed: u64, sloppiness: f64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                sloppiness,
                skip_action: false,
                dip_delay: 0.0,
                dip_timer: 0.0,
            }
        }

        fn next(&mut self, session: &Session, dt: f32) -> HandInput {
            let game = session.game();
            let tuning = &game.tuning;
            let jitter = self.rng.random_range(-0.05..0.05);
            let y = match game.cycle.phase {
                Phase::Idle if !game.cycle.mother_acquired => tuning.pickup_threshold_y - 0.5,
                Phase::Idle if !game.cycle.can_toss => tuning.reload_threshold_y - 0.5,
                Phase::Idle => {
                    self.skip_action = self.rng.random_bool(self.sloppiness);
                    self.dip_delay = self.rng.random_range(0.0..0.1);
                    self.dip_timer = 0.0;
                    tuning.toss_threshold_y + 0.5
                }
                Phase::ActionWindow if !game.cycle.action_performed && !self.skip_action => {
                    self.dip_timer += dt;
                    if self.dip_timer >= self.dip_delay {
                        tuning.pickup_threshold_y - 0.5
                    } else {
                        tuning.toss_threshold_y + 0.5
                    }
                }
                _ => tuning.toss_threshold_y + 0.5,
            };
            HandInput::at(jitter, y + jitter)
        }
    }

    pub fn run() {
        env_logger::init();

        let mut args = std::env::args().skip(1);
        let tier = args
            .next()
            .and_then(|s| DifficultyTier::from_str(&s))
            .unwrap_or_default();
        let tuning = match args.next() {
            Some(path) => Tuning::load_or_default(path),
            None => Tuning::load_or_default(TUNING_FILE),
        };

        let mut session = match Session::new(tier, tuning) {
            Ok(session) => session,
            Err(err) => {
                log::error!("Level catalog rejected: {}", err);
                std::process::exit(1);
            }
        };

        log::info!("Batu Seremban demo ({}) starting...", tier.as_str());
        let mut bot = BotHand::new(0x5e4e_b0a7, 0.1);
        for _ in 0..MAX_FRAMES {
            let hand = bot.next(&session, FRAME_DT);
            for event in session.tick(&TickInput::hand(hand), FRAME_DT) {
                match event {
                    RunEvent::Game(event) => log::debug!("{:?}", event),
                    RunEvent::LevelStarted { index, level_id } => {
                        log::info!("Level {} started (#{})", level_id, index + 1)
                    }
                    RunEvent::RunComplete { .. } => log::info!("Champion!"),
                    RunEvent::RunOver { .. } => log::info!("Game over"),
                }
            }
            if matches!(session.phase(), RunPhase::Champion | RunPhase::Over) {
                break;
            }
        }

        match serde_json::to_string_pretty(session.score()) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("Cannot serialize score: {}", err),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `batu_seremban::web::init`, this is just to satisfy the compiler
}
