//! Turn and shot state
//!
//! One shot per turn: aim, fly, settle, then the camera swaps sides and the
//! next player may shoot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TIME_EPSILON;

/// Current phase of the shot cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShotPhase {
    /// Waiting for a touch on the tree
    #[default]
    Idle,
    /// Projectile spawned and following the drag
    Aiming,
    /// Launched and moving
    Flying,
    /// At rest (or returning the camera) and about to be cleaned up
    Settling,
}

/// Whose turn it is and whether a shot may start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    /// Turn counter, starts at 1
    pub turn: u32,
    pub phase: ShotPhase,
    /// A launched projectile has not yet been cleaned up
    pub shot_in_flight: bool,
    /// Cleared on launch, restored after the camera swap
    pub can_shoot: bool,
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            turn: 1,
            phase: ShotPhase::Idle,
            shot_in_flight: false,
            can_shoot: true,
        }
    }

    /// Enter Aiming. Returns false when shooting is disabled or a shot is
    /// already underway.
    pub fn begin_aim(&mut self) -> bool {
        if !self.can_shoot || self.phase != ShotPhase::Idle {
            return false;
        }
        self.phase = ShotPhase::Aiming;
        self.shot_in_flight = false;
        true
    }

    /// Drop an aim without launching
    pub fn cancel_aim(&mut self) {
        if self.phase == ShotPhase::Aiming {
            self.phase = ShotPhase::Idle;
        }
    }

    /// Release: advance the turn and lock shooting. Returns the new turn.
    pub fn launch(&mut self) -> u32 {
        self.turn = self.turn.wrapping_add(1);
        self.shot_in_flight = true;
        self.can_shoot = false;
        self.phase = ShotPhase::Flying;
        self.turn
    }

    /// Projectile removed after the camera swap
    pub fn finish_shot(&mut self) {
        self.shot_in_flight = false;
        self.can_shoot = true;
        self.phase = ShotPhase::Idle;
    }
}

/// The two camera resting spots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraAnchors {
    /// Left quarter of the field
    pub initial: Vec2,
    /// Right quarter of the field
    pub opponent: Vec2,
}

impl CameraAnchors {
    pub fn for_scene(size: Vec2) -> Self {
        Self {
            initial: Vec2::new(size.x / 4.0, size.y / 2.0),
            opponent: Vec2::new(3.0 * size.x / 4.0, size.y / 2.0),
        }
    }

    /// Even turns look at the opponent's side
    pub fn for_turn(&self, turn: u32) -> Vec2 {
        if turn % 2 == 0 { self.opponent } else { self.initial }
    }
}

/// Polls a body's velocity until it has been exactly zero long enough
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestDetector {
    /// First tick of the current zero-velocity run
    pub stopped_since: Option<f64>,
    pub threshold: f64,
}

impl RestDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            stopped_since: None,
            threshold,
        }
    }

    /// Feed one velocity sample. Returns true once the body has read exactly
    /// zero for at least `threshold` seconds.
    pub fn observe(&mut self, velocity: Vec2, now: f64) -> bool {
        if velocity != Vec2::ZERO {
            self.stopped_since = None;
            return false;
        }
        match self.stopped_since {
            None => {
                self.stopped_since = Some(now);
                self.threshold <= 0.0
            }
            Some(since) => now - since + TIME_EPSILON >= self.threshold,
        }
    }

    pub fn is_timing(&self) -> bool {
        self.stopped_since.is_some()
    }
}

/// Linear camera tween with a completion point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraMove {
    pub from: Vec2,
    pub to: Vec2,
    pub started_at: f64,
    pub duration: f64,
}

impl CameraMove {
    pub fn new(from: Vec2, to: Vec2, started_at: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
        }
    }

    /// Fraction complete in `[0, 1]`
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0) as f32
    }

    pub fn position(&self, now: f64) -> Vec2 {
        let t = self.progress(now);
        if t >= 1.0 { self.to } else { self.from.lerp(self.to, t) }
    }

    pub fn is_finished(&self, now: f64) -> bool {
        now - self.started_at + TIME_EPSILON >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_cycle() {
        let mut state = TurnState::new();
        assert_eq!(state.turn, 1);
        assert!(state.begin_aim());
        assert_eq!(state.phase, ShotPhase::Aiming);

        assert_eq!(state.launch(), 2);
        assert!(state.shot_in_flight);
        assert!(!state.can_shoot);
        assert!(!state.begin_aim());

        state.finish_shot();
        assert_eq!(state.phase, ShotPhase::Idle);
        assert!(state.can_shoot);
        assert!(state.begin_aim());
    }

    #[test]
    fn test_cancel_aim_keeps_turn() {
        let mut state = TurnState::new();
        state.begin_aim();
        state.cancel_aim();
        assert_eq!(state.phase, ShotPhase::Idle);
        assert_eq!(state.turn, 1);
    }

    #[test]
    fn test_anchor_follows_parity() {
        let anchors = CameraAnchors::for_scene(Vec2::new(1000.0, 600.0));
        assert_eq!(anchors.initial, Vec2::new(250.0, 300.0));
        assert_eq!(anchors.opponent, Vec2::new(750.0, 300.0));
        assert_eq!(anchors.for_turn(2), anchors.opponent);
        assert_eq!(anchors.for_turn(3), anchors.initial);
        assert_eq!(anchors.for_turn(10), anchors.opponent);
    }

    #[test]
    fn test_rest_needs_continuous_zero() {
        let mut rest = RestDetector::new(0.2);
        assert!(!rest.observe(Vec2::ZERO, 10.0));
        assert!(!rest.observe(Vec2::ZERO, 10.125));
        // One moving sample resets the run
        assert!(!rest.observe(Vec2::new(0.0, 0.001), 10.25));
        assert!(!rest.is_timing());
        assert!(!rest.observe(Vec2::ZERO, 10.5));
        assert!(!rest.observe(Vec2::ZERO, 10.625));
        assert!(rest.observe(Vec2::ZERO, 10.75));
    }

    #[test]
    fn test_rest_boundary_is_inclusive() {
        let mut rest = RestDetector::new(0.25);
        rest.observe(Vec2::ZERO, 1.0);
        assert!(rest.observe(Vec2::ZERO, 1.25));
    }

    #[test]
    fn test_rest_fires_on_inexact_boundary() {
        // 1.2 - 1.0 is just under 0.2 in f64
        let mut rest = RestDetector::new(0.2);
        rest.observe(Vec2::ZERO, 1.0);
        assert!(rest.observe(Vec2::ZERO, 1.2));

        for i in 0..100 {
            let start = i as f64 * 0.1;
            let mut rest = RestDetector::new(0.2);
            rest.observe(Vec2::ZERO, start);
            assert!(rest.observe(Vec2::ZERO, start + 0.2), "stopped at {start}");
        }
    }

    #[test]
    fn test_launch_wraps_turn_counter() {
        let mut state = TurnState::new();
        state.turn = u32::MAX;
        assert_eq!(state.launch(), 0);
        assert_eq!(state.phase, ShotPhase::Flying);
    }

    #[test]
    fn test_camera_move_finishes_on_inexact_boundary() {
        let mv = CameraMove::new(Vec2::ZERO, Vec2::new(100.0, 0.0), 1.1, 0.5);
        assert!(mv.is_finished(1.6));
        assert!(!mv.is_finished(1.59));
    }

    #[test]
    fn test_camera_move_interpolates_then_lands() {
        let mv = CameraMove::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 2.0, 0.5);
        assert_eq!(mv.position(2.0), Vec2::ZERO);
        assert!((mv.position(2.25).x - 50.0).abs() < 1e-3);
        assert!(!mv.is_finished(2.25));
        assert!(mv.is_finished(2.5));
        assert_eq!(mv.position(9.0), Vec2::new(100.0, 0.0));
    }
}
