//! Hand input contract and landmark adapter
//!
//! The state machine only ever sees a [`HandInput`]: a smoothed world-space
//! hand position and a pinch flag, once per frame. [`HandTracker`] produces
//! it from the 21 normalized landmarks of an external hand-landmark model.
//! Detection itself happens outside this crate.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const LANDMARK_COUNT: usize = 21;

/// Mapping gain from normalized image space to the viewport
pub const SENSITIVITY: f32 = 2.5;
/// Image-space point that maps to the world origin
pub const IMAGE_CENTER: Vec2 = Vec2::new(0.5, 0.55);
/// Kept clear of the viewport edges
pub const EDGE_MARGIN: f32 = 0.5;
/// Weight of the newest sample in the exponential smoothing
pub const SMOOTHING: f32 = 0.8;
/// Thumb-to-index distance (normalized) below which the hand is pinching
pub const PINCH_DISTANCE: f32 = 0.08;
/// Where the hand rests before anything has been detected
pub const REST_POSITION: Vec3 = Vec3::new(0.0, -3.0, 0.0);

/// Per-frame hand signal consumed by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandInput {
    pub position: Vec3,
    pub grabbing: bool,
}

impl HandInput {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec3::new(x, y, 0.0),
            grabbing: false,
        }
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }
}

impl Default for HandInput {
    fn default() -> Self {
        Self {
            position: REST_POSITION,
            grabbing: false,
        }
    }
}

/// Which way the camera faces; the selfie camera is mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraFacing {
    #[default]
    User,
    Environment,
}

/// Turns raw landmarks into a smoothed [`HandInput`]
#[derive(Debug, Clone)]
pub struct HandTracker {
    /// World-space size of the visible viewport
    viewport: Vec2,
    facing: CameraFacing,
    current: HandInput,
}

impl HandTracker {
    pub fn new(viewport: Vec2, facing: CameraFacing) -> Self {
        Self {
            viewport,
            facing,
            current: HandInput::default(),
        }
    }

    pub fn set_facing(&mut self, facing: CameraFacing) {
        self.facing = facing;
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn current(&self) -> HandInput {
        self.current
    }

    /// Feed one detection result. An empty or malformed frame keeps the
    /// previous (stale) reading.
    pub fn update(&mut self, landmarks: &[Vec3]) -> HandInput {
        if landmarks.len() < LANDMARK_COUNT {
            return self.current;
        }
        let tip = landmarks[INDEX_TIP];
        let thumb = landmarks[THUMB_TIP];
        if !tip.is_finite() || !thumb.is_finite() {
            log::debug!("Ignoring non-finite landmark frame");
            return self.current;
        }

        let target = self.to_world(tip.truncate());
        self.current.position = self.current.position.lerp(target, SMOOTHING);
        self.current.grabbing = thumb.truncate().distance(tip.truncate()) < PINCH_DISTANCE;
        self.current
    }

    /// Same as [`update`](Self::update) for a flat `x, y, z` buffer
    pub fn update_flat(&mut self, flat: &[f32]) -> HandInput {
        if flat.len() < LANDMARK_COUNT * 3 {
            return self.current;
        }
        let landmarks: Vec<Vec3> = flat
            .chunks_exact(3)
            .take(LANDMARK_COUNT)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();
        self.update(&landmarks)
    }

    fn to_world(&self, image: Vec2) -> Vec3 {
        let gain = self.viewport * SENSITIVITY;
        let dx = (image.x - IMAGE_CENTER.x) * gain.x;
        let x = match self.facing {
            CameraFacing::User => -dx,
            CameraFacing::Environment => dx,
        };
        // Image y grows downward
        let y = -(image.y - IMAGE_CENTER.y) * gain.y;

        let half = self.viewport / 2.0 - Vec2::splat(EDGE_MARGIN);
        let half = half.max(Vec2::ZERO);
        Vec3::new(x.clamp(-half.x, half.x), y.clamp(-half.y, half.y), 0.0)
    }
}

impl Default for HandTracker {
    fn default() -> Self {
        Self::new(Vec2::new(12.0, 8.0), CameraFacing::User)
    }
}
