//! Pure gameplay logic
//!
//! Everything here is deterministic given its inputs:
//! - Timestamps are passed in, never read from a clock
//! - Seeded RNG only
//! - No host engine dependencies beyond `NodeId` handles

pub mod aim;
pub mod level;
pub mod path;
pub mod reposition;
pub mod turn;

pub use aim::{AimGesture, clamp_drag};
pub use level::{LevelError, LevelPicker, RngState};
pub use path::{PathIter, PathPrediction, predict};
pub use reposition::{DragResponse, ReleaseKind, RepositionPhase, RepositionState};
pub use turn::{CameraAnchors, CameraMove, RestDetector, ShotPhase, TurnState};
