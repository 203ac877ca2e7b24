//! Orange Tree - slingshot turn controller
//!
//! Core modules:
//! - `sim`: Pure gameplay logic (aim clamping, path prediction, turn and reposition state)
//! - `host`: Traits the host engine implements (scene graph, physics, camera, levels)
//! - `controller`: The scene controller driven by touch events and frame ticks
//! - `headless`: In-memory host used by tests and the demo binary
//! - `replay`: Scripted input streams for deterministic playback
//! - `tuning`: Data-driven gameplay constants

pub mod controller;
pub mod headless;
pub mod host;
pub mod replay;
pub mod sim;
pub mod tuning;

pub use controller::{SceneEvent, TurnShotController};
pub use host::{CameraRig, Contact, Host, LevelLoader, NodeId, PhysicsWorld, SceneGraph};
pub use tuning::Tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Maximum aim drag distance from the touch-down point
    pub const MAX_DRAG_DISTANCE: f32 = 150.0;

    /// Path prediction dots
    pub const PATH_POINTS: usize = 6;
    /// Simulated seconds between path dots
    pub const PATH_TIME_STEP: f32 = 0.3;
    /// Drag-to-velocity factor for the path preview
    pub const PATH_VELOCITY_SCALE: f32 = 0.5;
    /// Drag-to-impulse factor for the actual launch
    pub const LAUNCH_IMPULSE_SCALE: f32 = 0.4;

    /// Seconds at exactly zero velocity before a shot counts as settled
    pub const REST_THRESHOLD: f64 = 0.2;
    /// Seconds a press must be held before the piece can be moved
    pub const LONG_PRESS_THRESHOLD: f64 = 3.0;
    /// Slack for timer comparisons on absolute f64 timestamps
    pub const TIME_EPSILON: f64 = 1e-9;
    /// Duration of the camera swap after a shot settles
    pub const CAMERA_MOVE_DURATION: f64 = 0.5;

    /// Contact impulse needed to knock a skull out of the scene
    pub const SKULL_IMPULSE_THRESHOLD: f32 = 15.0;

    /// Number of `Level-N` scenes the sun can pick from
    pub const NUM_LEVELS: u32 = 6;
    /// Reposition budget at scene start
    pub const INITIAL_MOVE_TOKENS: i32 = 1;
    /// Piece opacity while it is ready to move
    pub const REPOSITION_ALPHA: f32 = 0.5;

    /// Scene node names
    pub const TREE_NODE: &str = "tree";
    pub const SUN_NODE: &str = "sun";
    pub const CANCEL_NODE: &str = "cancelIcon";
    pub const SKULL_NODE: &str = "skull";
}

/// Axis-aligned rectangle in scene coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Rectangle of `size` centered on `center`
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Inclusive on all edges
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Clamp `value` to `[lower, upper]`.
///
/// Unlike `f32::clamp` this never panics when the bounds cross (a body
/// wider than the playfield); `upper` wins in that case.
#[inline]
pub fn clamp_scalar(value: f32, lower: f32, upper: f32) -> f32 {
    value.max(lower).min(upper)
}

/// Keep a body of `size` centered at `pos` fully inside a `bounds`-sized field
/// anchored at the origin
pub fn clamp_inside(pos: Vec2, size: Vec2, bounds: Vec2) -> Vec2 {
    let half = size / 2.0;
    Vec2::new(
        clamp_scalar(pos.x, half.x, bounds.x - half.x),
        clamp_scalar(pos.y, half.y, bounds.y - half.y),
    )
}
