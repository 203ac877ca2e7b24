//! Host engine abstraction
//!
//! The controller never owns rendering or physics. It talks to the engine
//! through these traits, so a real scene graph and the in-memory
//! `headless::HeadlessScene` are interchangeable.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;

/// Handle to a node in the host scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// A physics contact reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub a: NodeId,
    pub b: NodeId,
    /// Collision impulse magnitude (engine units)
    pub impulse: f32,
}

/// Named-node scene graph
pub trait SceneGraph {
    /// Playfield size; the field spans `(0,0)..size`
    fn size(&self) -> Vec2;

    /// Topmost node under `point`
    fn node_at(&self, point: Vec2) -> Option<NodeId>;

    /// Every node under `point`, topmost first
    fn nodes_at(&self, point: Vec2) -> Vec<NodeId>;

    fn find(&self, name: &str) -> Option<NodeId>;

    fn name(&self, node: NodeId) -> Option<&str>;

    /// World-space frame of a node
    fn frame(&self, node: NodeId) -> Option<Rect>;

    fn position(&self, node: NodeId) -> Option<Vec2>;

    fn set_position(&mut self, node: NodeId, pos: Vec2);

    fn set_alpha(&mut self, node: NodeId, alpha: f32);

    fn set_hidden(&mut self, node: NodeId, hidden: bool);

    /// Add a new projectile at `pos`, kinematic until launched
    fn spawn_projectile(&mut self, pos: Vec2) -> NodeId;

    fn remove(&mut self, node: NodeId);

    /// Aim line from touch-down to the clamped drag point (`None` clears it)
    fn set_aim_line(&mut self, line: Option<(Vec2, Vec2)>);

    /// Replace the predicted path dots (empty clears them)
    fn set_path_dots(&mut self, dots: &[Vec2]);
}

/// 2D rigid-body world
pub trait PhysicsWorld {
    fn gravity(&self) -> Vec2;

    fn velocity(&self, node: NodeId) -> Option<Vec2>;

    fn set_dynamic(&mut self, node: NodeId, dynamic: bool);

    fn apply_impulse(&mut self, node: NodeId, impulse: Vec2);

    /// Advance the world by `dt` seconds. Engines that run their own loop
    /// leave this as a no-op.
    fn step(&mut self, _dt: f32) {}
}

/// Scene camera
pub trait CameraRig {
    fn camera_position(&self) -> Vec2;

    fn set_camera_position(&mut self, pos: Vec2);
}

/// Level presentation keyed by level number
pub trait LevelLoader {
    fn present_level(&mut self, level: u32) -> Result<(), crate::sim::LevelError>;
}

/// Everything the controller needs from the engine
pub trait Host: SceneGraph + PhysicsWorld + CameraRig + LevelLoader {}

impl<T: SceneGraph + PhysicsWorld + CameraRig + LevelLoader> Host for T {}
