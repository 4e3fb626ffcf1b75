//! Browser binding
//!
//! The 3D scene, webcam and landmark model live in JavaScript. Each animation
//! frame the page pushes the latest landmarks (or an already-mapped hand
//! position) and reads back a JSON snapshot to render.

use glam::{Vec2, Vec3};
use wasm_bindgen::prelude::*;

use crate::difficulty::DifficultyTier;
use crate::hand::{CameraFacing, HandInput, HandTracker};
use crate::session::{RunEvent, Session};
use crate::sim::TickInput;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        wasm_bindgen::throw_str(&format!("Failed to init logger: {err}"));
    }
}

#[wasm_bindgen]
pub struct WebSession {
    session: Session,
    tracker: HandTracker,
    pending_toss: bool,
    last_events: Vec<RunEvent>,
}

#[wasm_bindgen]
impl WebSession {
    /// `tier` is "beginner", "normal" or "master"
    #[wasm_bindgen(constructor)]
    pub fn new(tier: &str) -> Result<WebSession, JsValue> {
        Self::with_tuning(tier, "")
    }

    /// Same as `new` with a tuning JSON document; empty means defaults
    pub fn with_tuning(tier: &str, tuning_json: &str) -> Result<WebSession, JsValue> {
        let tier = DifficultyTier::from_str(tier)
            .ok_or_else(|| JsValue::from_str(&format!("unknown difficulty '{tier}'")))?;
        let tuning = if tuning_json.trim().is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let session = Session::new(tier, tuning).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WebSession {
            session,
            tracker: HandTracker::default(),
            pending_toss: false,
            last_events: Vec::new(),
        })
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.tracker.set_viewport(Vec2::new(width, height));
    }

    pub fn set_front_camera(&mut self, front: bool) {
        self.tracker.set_facing(if front {
            CameraFacing::User
        } else {
            CameraFacing::Environment
        });
    }

    /// Flat `x, y, z` landmark buffer (21 points); empty when no hand
    pub fn push_landmarks(&mut self, flat: &[f32]) {
        self.tracker.update_flat(flat);
    }

    /// Manual toss button
    pub fn toss(&mut self) {
        self.pending_toss = true;
    }

    /// Advance one frame using the landmarks pushed so far
    pub fn tick_tracked(&mut self, dt: f32) {
        let hand = self.tracker.current();
        self.step(hand, dt);
    }

    /// Advance one frame with a hand position already in world space
    pub fn tick(&mut self, x: f32, y: f32, z: f32, grabbing: bool, dt: f32) {
        let hand = HandInput {
            position: Vec3::new(x, y, z),
            grabbing,
        };
        self.step(hand, dt);
    }

    pub fn play_again(&mut self) {
        self.session.play_again();
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        to_json(&self.session.snapshot())
    }

    /// Events from the most recent frame
    pub fn events_json(&self) -> Result<String, JsValue> {
        to_json(&self.last_events)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|err| {
        log::error!("Cannot serialize for JS: {}", err);
        JsValue::from_str(&err.to_string())
    })
}

impl WebSession {
    fn step(&mut self, hand: HandInput, dt: f32) {
        let input = TickInput {
            hand,
            toss: std::mem::take(&mut self.pending_toss),
        };
        self.last_events = self.session.tick(&input, dt);
    }
}
