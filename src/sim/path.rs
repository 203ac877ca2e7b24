//! Predicted projectile path
//!
//! Closed-form constant-gravity kinematics sampled at a fixed time step.
//! The preview velocity is half the reverse drag, which is deliberately not
//! the launch impulse scale.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{PATH_POINTS, PATH_TIME_STEP, PATH_VELOCITY_SCALE};

/// A parabolic path preview.
///
/// Holds only the launch parameters; points are produced lazily by `iter`,
/// which can be called any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPrediction {
    pub start: Vec2,
    pub velocity: Vec2,
    pub gravity_y: f32,
    pub num_points: usize,
    pub time_step: f32,
}

impl PathPrediction {
    pub fn new(
        start: Vec2,
        end: Vec2,
        gravity_y: f32,
        num_points: usize,
        time_step: f32,
        velocity_scale: f32,
    ) -> Self {
        Self {
            start,
            velocity: (start - end) * velocity_scale,
            gravity_y,
            num_points,
            time_step,
        }
    }

    /// Position after `t` simulated seconds
    pub fn point_at(&self, t: f32) -> Vec2 {
        Vec2::new(
            self.start.x + self.velocity.x * t,
            self.start.y + self.velocity.y * t + 0.5 * self.gravity_y * t * t,
        )
    }

    pub fn iter(&self) -> PathIter {
        PathIter {
            path: *self,
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.num_points
    }

    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }
}

impl IntoIterator for &PathPrediction {
    type Item = Vec2;
    type IntoIter = PathIter;

    fn into_iter(self) -> PathIter {
        self.iter()
    }
}

/// Iterator over the sample points of a `PathPrediction`
#[derive(Debug, Clone)]
pub struct PathIter {
    path: PathPrediction,
    index: usize,
}

impl Iterator for PathIter {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.index >= self.path.num_points {
            return None;
        }
        let t = self.path.time_step * self.index as f32;
        self.index += 1;
        Some(self.path.point_at(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.path.num_points.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PathIter {}

/// Path preview with the default point count, step and velocity scale
pub fn predict(start: Vec2, end: Vec2, gravity_y: f32) -> PathPrediction {
    PathPrediction::new(
        start,
        end,
        gravity_y,
        PATH_POINTS,
        PATH_TIME_STEP,
        PATH_VELOCITY_SCALE,
    )
}
