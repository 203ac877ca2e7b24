//! Long-press reposition of a game piece
//!
//! Holding a press on the piece long enough (with budget left) makes it
//! movable along x. Releasing over the cancel icon puts it back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TIME_EPSILON;
use crate::host::NodeId;

/// Where the reposition gesture currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepositionPhase {
    Unselected,
    /// Touch is down on the piece, long-press timer running (or aborted)
    Pressed,
    /// Threshold reached, piece not moved yet
    ReadyToMove,
    /// Piece has followed the touch at least once
    Dragging,
}

/// What a drag update means for the reposition gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragResponse {
    /// No piece, or no budget
    Ignored,
    /// Still pressed on the piece
    Held,
    /// Left the piece before the threshold; long press abandoned
    Aborted,
    /// Ready: the piece should follow the touch x
    Follow,
}

/// How a reposition gesture ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReleaseKind {
    /// Released over the cancel icon; piece goes back to `original`
    Cancelled { original: Vec2 },
    /// Moved piece accepted
    Committed { position: Vec2 },
    /// Plain release; nothing to do beyond restoring opacity
    Released,
}

/// Reposition state for the touch sequence in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositionState {
    /// Piece under the press (not owned)
    pub piece: Option<NodeId>,
    /// Press start; `None` once aborted or outside a press
    pub press_started: Option<f64>,
    pub ready: bool,
    /// Piece position at touch-down
    pub original_position: Vec2,
    /// Piece has followed the touch since becoming ready
    pub moved: bool,
    /// Reposition budget
    pub tokens: i32,
    pub long_press_threshold: f64,
}

impl RepositionState {
    pub fn new(tokens: i32, long_press_threshold: f64) -> Self {
        Self {
            piece: None,
            press_started: None,
            ready: false,
            original_position: Vec2::ZERO,
            moved: false,
            tokens,
            long_press_threshold,
        }
    }

    pub fn phase(&self) -> RepositionPhase {
        match (self.piece, self.ready, self.moved) {
            (None, _, _) => RepositionPhase::Unselected,
            (Some(_), false, _) => RepositionPhase::Pressed,
            (Some(_), true, false) => RepositionPhase::ReadyToMove,
            (Some(_), true, true) => RepositionPhase::Dragging,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Touch-down on `piece`
    pub fn press(&mut self, piece: NodeId, position: Vec2, now: f64) {
        self.piece = Some(piece);
        self.press_started = Some(now);
        self.ready = false;
        self.moved = false;
        self.original_position = position;
    }

    /// Per-tick long-press check. Returns true on the tick the piece becomes
    /// ready.
    pub fn poll(&mut self, now: f64) -> bool {
        let (Some(_), Some(started)) = (self.piece, self.press_started) else {
            return false;
        };
        if self.ready || self.tokens <= 0 {
            return false;
        }
        if now - started + TIME_EPSILON >= self.long_press_threshold {
            self.ready = true;
            return true;
        }
        false
    }

    /// Drag update; `over_piece` is whether the touch is still on the piece
    pub fn pointer_moved(&mut self, over_piece: bool) -> DragResponse {
        if self.piece.is_none() || self.tokens <= 0 {
            return DragResponse::Ignored;
        }
        if self.ready {
            self.moved = true;
            return DragResponse::Follow;
        }
        if over_piece {
            DragResponse::Held
        } else {
            self.press_started = None;
            DragResponse::Aborted
        }
    }

    /// Touch-up. `current_position` is where the piece ended up.
    ///
    /// Always resets the gesture; returns the piece and outcome when a piece
    /// was selected.
    pub fn release(&mut self, over_cancel: bool, current_position: Vec2) -> Option<(NodeId, ReleaseKind)> {
        let piece = self.piece?;
        let kind = if self.ready && over_cancel {
            ReleaseKind::Cancelled {
                original: self.original_position,
            }
        } else if self.ready && current_position != self.original_position && self.tokens > 0 {
            // Accepting a move does not spend a token yet
            ReleaseKind::Committed {
                position: current_position,
            }
        } else {
            ReleaseKind::Released
        };
        self.reset();
        Some((piece, kind))
    }

    /// Forget the gesture; the token budget is kept
    pub fn reset(&mut self) {
        self.piece = None;
        self.press_started = None;
        self.ready = false;
        self.moved = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIECE: NodeId = NodeId(7);

    fn pressed_at(now: f64) -> RepositionState {
        let mut state = RepositionState::new(1, 3.0);
        state.press(PIECE, Vec2::new(120.0, 80.0), now);
        state
    }

    #[test]
    fn test_long_press_boundary() {
        let mut state = pressed_at(0.0);
        assert!(!state.poll(2.99));
        assert_eq!(state.phase(), RepositionPhase::Pressed);
        assert!(state.poll(3.0));
        assert_eq!(state.phase(), RepositionPhase::ReadyToMove);
        // Only reported once
        assert!(!state.poll(3.5));
    }

    #[test]
    fn test_long_press_inexact_boundary() {
        let mut state = pressed_at(1.1);
        assert!(!state.poll(4.09));
        assert!(state.poll(4.1));

        for i in 0..100 {
            let start = i as f64 * 0.1;
            let mut state = pressed_at(start);
            assert!(state.poll(start + 3.0), "pressed at {start}");
        }
    }

    #[test]
    fn test_no_tokens_never_ready() {
        let mut state = RepositionState::new(0, 3.0);
        state.press(PIECE, Vec2::ZERO, 0.0);
        assert!(!state.poll(10.0));
        assert_eq!(state.pointer_moved(false), DragResponse::Ignored);
    }

    #[test]
    fn test_leaving_piece_aborts_before_ready() {
        let mut state = pressed_at(0.0);
        assert_eq!(state.pointer_moved(true), DragResponse::Held);
        assert_eq!(state.pointer_moved(false), DragResponse::Aborted);
        assert!(!state.poll(5.0));
        assert!(!state.is_ready());
    }

    #[test]
    fn test_leaving_piece_after_ready_keeps_following() {
        let mut state = pressed_at(0.0);
        state.poll(3.0);
        assert_eq!(state.pointer_moved(false), DragResponse::Follow);
        assert_eq!(state.phase(), RepositionPhase::Dragging);
    }

    #[test]
    fn test_cancel_restores_exact_original() {
        let original = Vec2::new(120.123_45, 80.987_65);
        let mut state = RepositionState::new(1, 3.0);
        state.press(PIECE, original, 0.0);
        state.poll(3.0);
        state.pointer_moved(false);

        let outcome = state.release(true, Vec2::new(400.0, 80.987_65));
        assert_eq!(outcome, Some((PIECE, ReleaseKind::Cancelled { original })));
        assert_eq!(state.phase(), RepositionPhase::Unselected);
    }

    #[test]
    fn test_commit_does_not_spend_tokens() {
        let mut state = pressed_at(0.0);
        state.poll(3.0);
        state.pointer_moved(true);
        let outcome = state.release(false, Vec2::new(300.0, 80.0));
        assert_eq!(
            outcome,
            Some((
                PIECE,
                ReleaseKind::Committed {
                    position: Vec2::new(300.0, 80.0)
                }
            ))
        );
        assert_eq!(state.tokens, 1);
    }

    #[test]
    fn test_release_before_ready_is_plain() {
        let mut state = pressed_at(0.0);
        assert_eq!(state.release(true, Vec2::new(120.0, 80.0)), Some((PIECE, ReleaseKind::Released)));
        assert_eq!(state.release(false, Vec2::ZERO), None);
    }
}
