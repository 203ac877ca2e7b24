//! Data-driven gameplay constants
//!
//! Defaults come from `crate::consts`; a level designer can override any of
//! them with a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Failure to read or parse a tuning file
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Aim ===
    /// Aim drag cap (scene units)
    pub max_drag_distance: f32,
    /// Dots in the predicted path
    pub path_points: usize,
    /// Simulated seconds between dots
    pub path_time_step: f32,
    /// Drag-to-velocity factor for the preview
    pub path_velocity_scale: f32,
    /// Drag-to-impulse factor for the launch
    pub launch_impulse_scale: f32,

    // === Turn flow ===
    /// Seconds at rest before the shot settles
    pub rest_threshold: f64,
    /// Camera swap duration
    pub camera_move_duration: f64,
    /// Impulse needed to remove a skull
    pub skull_impulse_threshold: f32,

    // === Reposition ===
    /// Long-press duration before a piece can move
    pub long_press_threshold: f64,
    /// Reposition budget
    pub initial_move_tokens: i32,
    /// Opacity of a piece that is ready to move
    pub reposition_alpha: f32,

    // === Levels ===
    pub num_levels: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_drag_distance: MAX_DRAG_DISTANCE,
            path_points: PATH_POINTS,
            path_time_step: PATH_TIME_STEP,
            path_velocity_scale: PATH_VELOCITY_SCALE,
            launch_impulse_scale: LAUNCH_IMPULSE_SCALE,

            rest_threshold: REST_THRESHOLD,
            camera_move_duration: CAMERA_MOVE_DURATION,
            skull_impulse_threshold: SKULL_IMPULSE_THRESHOLD,

            long_press_threshold: LONG_PRESS_THRESHOLD,
            initial_move_tokens: INITIAL_MOVE_TOKENS,
            reposition_alpha: REPOSITION_ALPHA,

            num_levels: NUM_LEVELS,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load tuning, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("Using default tuning: {err}");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
