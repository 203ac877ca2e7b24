//! In-memory host
//!
//! A minimal scene graph, camera and level catalogue with just enough
//! kinematics (gravity, floor friction, walls) for a launched projectile to
//! come to rest. Used by tests and the native demo.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CANCEL_NODE, SKULL_NODE, SUN_NODE, TREE_NODE};
use crate::host::{CameraRig, LevelLoader, NodeId, PhysicsWorld, SceneGraph};
use crate::sim::LevelError;
use crate::Rect;

/// Scene points per physics meter
pub const POINTS_PER_METER: f32 = 150.0;
/// Below this speed (points/s) a grounded body snaps to rest
pub const REST_SPEED: f32 = 5.0;
/// Horizontal velocity kept per step while touching the floor
pub const FLOOR_FRICTION: f32 = 0.9;
pub const PROJECTILE_SIZE: Vec2 = Vec2::new(40.0, 40.0);
pub const PROJECTILE_MASS: f32 = 0.1;

/// A node in the headless scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessNode {
    pub name: String,
    pub pos: Vec2,
    pub size: Vec2,
    pub alpha: f32,
    pub hidden: bool,
    pub vel: Vec2,
    pub dynamic: bool,
    pub mass: f32,
}

impl HeadlessNode {
    pub fn new(name: &str, pos: Vec2, size: Vec2) -> Self {
        Self {
            name: name.to_string(),
            pos,
            size,
            alpha: 1.0,
            hidden: false,
            vel: Vec2::ZERO,
            dynamic: false,
            mass: 1.0,
        }
    }

    pub fn frame(&self) -> Rect {
        Rect::from_center_size(self.pos, self.size)
    }
}

/// Headless scene, physics world and camera in one
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    pub size: Vec2,
    /// Gravity in meters/s², as an engine would report it
    pub gravity: Vec2,
    /// Nodes by id; ids grow with insertion, so higher ids draw on top
    pub nodes: BTreeMap<NodeId, HeadlessNode>,
    pub camera: Vec2,
    pub aim_line: Option<(Vec2, Vec2)>,
    pub path_dots: Vec<Vec2>,
    /// Levels that exist on "disk"
    pub available_levels: BTreeSet<u32>,
    pub presented_level: Option<u32>,
    next_id: u32,
}

impl HeadlessScene {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            gravity: Vec2::new(0.0, -9.8),
            nodes: BTreeMap::new(),
            camera: size / 2.0,
            aim_line: None,
            path_dots: Vec::new(),
            available_levels: BTreeSet::new(),
            presented_level: None,
            next_id: 1,
        }
    }

    /// The stock layout: tree on the left, sun top-right, hidden cancel
    /// icon in the middle, a couple of skulls on the right.
    pub fn demo(size: Vec2) -> Self {
        let mut scene = Self::new(size);
        scene.add_node(HeadlessNode::new(TREE_NODE, Vec2::new(200.0, 180.0), Vec2::new(120.0, 200.0)));
        let sun_size = Vec2::new(80.0, 80.0);
        scene.add_node(HeadlessNode::new(SUN_NODE, size - sun_size * 0.75, sun_size));
        let mut cancel = HeadlessNode::new(CANCEL_NODE, size / 2.0, Vec2::new(64.0, 64.0));
        cancel.hidden = true;
        scene.add_node(cancel);
        scene.add_node(HeadlessNode::new(SKULL_NODE, Vec2::new(size.x - 200.0, 40.0), Vec2::new(48.0, 48.0)));
        scene.add_node(HeadlessNode::new(SKULL_NODE, Vec2::new(size.x - 140.0, 40.0), Vec2::new(48.0, 48.0)));
        scene.available_levels = (1..=6).collect();
        scene
    }

    pub fn add_node(&mut self, node: HeadlessNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&HeadlessNode> {
        self.nodes.get(&id)
    }

    /// Force a body's velocity (tests stand in for a real solver this way)
    pub fn set_velocity(&mut self, id: NodeId, vel: Vec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.vel = vel;
        }
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.nodes.values().filter(|n| n.name == name).count()
    }

    fn integrate(node: &mut HeadlessNode, gravity: Vec2, bounds: Vec2, dt: f32) {
        node.vel += gravity * POINTS_PER_METER * dt;
        node.pos += node.vel * dt;

        let half = node.size / 2.0;
        let mut grounded = false;
        if node.pos.y <= half.y {
            node.pos.y = half.y;
            node.vel.y = 0.0;
            node.vel.x *= FLOOR_FRICTION;
            grounded = true;
        }
        if node.pos.x <= half.x || node.pos.x >= bounds.x - half.x {
            node.pos.x = crate::clamp_scalar(node.pos.x, half.x, bounds.x - half.x);
            node.vel.x = 0.0;
        }
        if grounded && node.vel.length() < REST_SPEED {
            node.vel = Vec2::ZERO;
        }
    }
}

impl SceneGraph for HeadlessScene {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn node_at(&self, point: Vec2) -> Option<NodeId> {
        self.nodes_at(point).into_iter().next()
    }

    fn nodes_at(&self, point: Vec2) -> Vec<NodeId> {
        self.nodes
            .iter()
            .rev()
            .filter(|(_, node)| !node.hidden && node.frame().contains(point))
            .map(|(id, _)| *id)
            .collect()
    }

    fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|(_, n)| n.name == name).map(|(id, _)| *id)
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.name.as_str())
    }

    fn frame(&self, node: NodeId) -> Option<Rect> {
        self.nodes.get(&node).map(HeadlessNode::frame)
    }

    fn position(&self, node: NodeId) -> Option<Vec2> {
        self.nodes.get(&node).map(|n| n.pos)
    }

    fn set_position(&mut self, node: NodeId, pos: Vec2) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.pos = pos;
        }
    }

    fn set_alpha(&mut self, node: NodeId, alpha: f32) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.alpha = alpha;
        }
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.hidden = hidden;
        }
    }

    fn spawn_projectile(&mut self, pos: Vec2) -> NodeId {
        let mut orange = HeadlessNode::new("orange", pos, PROJECTILE_SIZE);
        orange.mass = PROJECTILE_MASS;
        self.add_node(orange)
    }

    fn remove(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }

    fn set_aim_line(&mut self, line: Option<(Vec2, Vec2)>) {
        self.aim_line = line;
    }

    fn set_path_dots(&mut self, dots: &[Vec2]) {
        self.path_dots = dots.to_vec();
    }
}

impl PhysicsWorld for HeadlessScene {
    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn velocity(&self, node: NodeId) -> Option<Vec2> {
        self.nodes.get(&node).map(|n| n.vel)
    }

    fn set_dynamic(&mut self, node: NodeId, dynamic: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.dynamic = dynamic;
        }
    }

    fn apply_impulse(&mut self, node: NodeId, impulse: Vec2) {
        if let Some(n) = self.nodes.get_mut(&node) {
            if n.dynamic {
                n.vel += impulse / n.mass;
            }
        }
    }

    fn step(&mut self, dt: f32) {
        let gravity = self.gravity;
        let bounds = self.size;
        for node in self.nodes.values_mut().filter(|n| n.dynamic) {
            Self::integrate(node, gravity, bounds, dt);
        }
    }
}

impl CameraRig for HeadlessScene {
    fn camera_position(&self) -> Vec2 {
        self.camera
    }

    fn set_camera_position(&mut self, pos: Vec2) {
        self.camera = pos;
    }
}

impl LevelLoader for HeadlessScene {
    fn present_level(&mut self, level: u32) -> Result<(), LevelError> {
        if !self.available_levels.contains(&level) {
            return Err(LevelError::Missing(level));
        }
        self.presented_level = Some(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_testing_prefers_topmost_and_skips_hidden() {
        let mut scene = HeadlessScene::new(Vec2::new(400.0, 300.0));
        let back = scene.add_node(HeadlessNode::new("back", Vec2::new(100.0, 100.0), Vec2::new(50.0, 50.0)));
        let front = scene.add_node(HeadlessNode::new("front", Vec2::new(100.0, 100.0), Vec2::new(20.0, 20.0)));
        assert_eq!(scene.node_at(Vec2::new(100.0, 100.0)), Some(front));
        assert_eq!(scene.nodes_at(Vec2::new(100.0, 100.0)), vec![front, back]);

        scene.set_hidden(front, true);
        assert_eq!(scene.node_at(Vec2::new(100.0, 100.0)), Some(back));
    }

    #[test]
    fn test_kinematic_bodies_ignore_impulse_and_gravity() {
        let mut scene = HeadlessScene::new(Vec2::new(400.0, 300.0));
        let orange = scene.spawn_projectile(Vec2::new(100.0, 200.0));
        scene.apply_impulse(orange, Vec2::new(10.0, 10.0));
        scene.step(1.0 / 60.0);
        assert_eq!(scene.position(orange), Some(Vec2::new(100.0, 200.0)));
        assert_eq!(scene.velocity(orange), Some(Vec2::ZERO));
    }

    #[test]
    fn test_launched_body_comes_to_rest() {
        let mut scene = HeadlessScene::new(Vec2::new(1024.0, 768.0));
        let orange = scene.spawn_projectile(Vec2::new(100.0, 200.0));
        scene.set_dynamic(orange, true);
        scene.apply_impulse(orange, Vec2::new(20.0, 20.0));
        assert_ne!(scene.velocity(orange), Some(Vec2::ZERO));

        for _ in 0..600 {
            scene.step(1.0 / 60.0);
        }
        assert_eq!(scene.velocity(orange), Some(Vec2::ZERO));
        let pos = scene.position(orange).unwrap();
        assert_eq!(pos.y, PROJECTILE_SIZE.y / 2.0);
        assert!(pos.x > 100.0);
    }

    #[test]
    fn test_missing_level_is_an_error() {
        let mut scene = HeadlessScene::demo(Vec2::new(1024.0, 768.0));
        assert_eq!(scene.present_level(3), Ok(()));
        assert_eq!(scene.present_level(9), Err(LevelError::Missing(9)));
        assert_eq!(scene.presented_level, Some(3));
    }
}
