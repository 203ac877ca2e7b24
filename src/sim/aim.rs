//! Slingshot aim gesture
//!
//! The drag from touch-down to the current touch point, capped to a maximum
//! pull length without changing its direction.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::path::PathPrediction;
use crate::tuning::Tuning;

/// An aim drag in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimGesture {
    /// Touch-down point (launch origin)
    pub start: Vec2,
    /// Clamped drag point; always within `max_drag_distance` of `start`
    pub end: Vec2,
    pub max_drag_distance: f32,
}

impl AimGesture {
    pub fn new(start: Vec2, max_drag_distance: f32) -> Self {
        Self {
            start,
            end: start,
            max_drag_distance,
        }
    }

    /// Move the drag point, returning the clamped end
    pub fn drag_to(&mut self, point: Vec2) -> Vec2 {
        self.end = clamp_drag(self.start, point, self.max_drag_distance);
        self.end
    }

    /// Effective pull length
    #[inline]
    pub fn distance(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Impulse handed to the physics world on release
    #[inline]
    pub fn launch_impulse(&self, scale: f32) -> Vec2 {
        (self.start - self.end) * scale
    }

    /// Fresh path preview for the current drag
    pub fn predict_path(&self, gravity_y: f32, tuning: &Tuning) -> PathPrediction {
        PathPrediction::new(
            self.start,
            self.end,
            gravity_y,
            tuning.path_points,
            tuning.path_time_step,
            tuning.path_velocity_scale,
        )
    }
}

/// Cap `point` to `max_distance` from `start` along the drag angle.
///
/// Points already inside the cap are returned unchanged.
pub fn clamp_drag(start: Vec2, point: Vec2, max_distance: f32) -> Vec2 {
    let delta = point - start;
    if delta.length() > max_distance {
        let angle = delta.y.atan2(delta.x);
        start + Vec2::new(angle.cos(), angle.sin()) * max_distance
    } else {
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_drag_inside_cap_is_untouched() {
        let mut aim = AimGesture::new(Vec2::new(100.0, 100.0), 150.0);
        assert_eq!(aim.drag_to(Vec2::new(100.0, 200.0)), Vec2::new(100.0, 200.0));
        assert!((aim.distance() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_drag_beyond_cap_scales_not_axis_clamps() {
        let mut aim = AimGesture::new(Vec2::ZERO, 150.0);
        // 3-4-5 triangle, length 500
        let end = aim.drag_to(Vec2::new(300.0, 400.0));
        assert!((end.x - 90.0).abs() < 1e-3);
        assert!((end.y - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_launch_impulse_straight_down_drag() {
        let mut aim = AimGesture::new(Vec2::new(100.0, 100.0), 150.0);
        aim.drag_to(Vec2::new(100.0, 200.0));
        let impulse = aim.launch_impulse(0.4);
        assert!(impulse.x.abs() < 1e-5);
        assert!((impulse.y - -40.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_drag_gives_zero_impulse() {
        let aim = AimGesture::new(Vec2::new(10.0, 10.0), 150.0);
        assert_eq!(aim.launch_impulse(0.4), Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_drag_never_exceeds_cap(
            sx in -500.0f32..500.0, sy in -500.0f32..500.0,
            px in -2000.0f32..2000.0, py in -2000.0f32..2000.0,
            cap in 1.0f32..300.0,
        ) {
            let start = Vec2::new(sx, sy);
            let end = clamp_drag(start, Vec2::new(px, py), cap);
            prop_assert!(start.distance(end) <= cap * (1.0 + 1e-4));
        }

        #[test]
        fn prop_clamp_preserves_angle(
            px in -2000.0f32..2000.0, py in -2000.0f32..2000.0,
        ) {
            let raw = Vec2::new(px, py);
            prop_assume!(raw.length() > 200.0);
            let end = clamp_drag(Vec2::ZERO, raw, 150.0);
            let raw_angle = raw.y.atan2(raw.x);
            let end_angle = end.y.atan2(end.x);
            prop_assert!((raw_angle - end_angle).abs() < 1e-3);
        }
    }
}
