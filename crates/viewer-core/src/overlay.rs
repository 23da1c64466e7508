//! Pointer-drag state machine for the rectangle overlay
//!
//! Tracks one gesture at a time. The most recently completed rectangle
//! stays in the state (phase `Idle`, points retained) until the next drag
//! begins or a new base bitmap resets it.

use crate::geometry::SurfacePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
}

/// Gesture state in display-surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragState {
    pub phase: DragPhase,
    pub start: SurfacePoint,
    pub end: SurfacePoint,
}

impl DragState {
    /// Idle with both points at the unset sentinel: nothing to draw
    pub const CLEARED: DragState = DragState {
        phase: DragPhase::Idle,
        start: SurfacePoint::ZERO,
        end: SurfacePoint::ZERO,
    };

    pub fn dragging(start: SurfacePoint, end: SurfacePoint) -> Self {
        Self { phase: DragPhase::Dragging, start, end }
    }

    pub fn completed(start: SurfacePoint, end: SurfacePoint) -> Self {
        Self { phase: DragPhase::Idle, start, end }
    }

    pub fn is_cleared(&self) -> bool {
        *self == Self::CLEARED
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// Start and end differ, so there is an outline to draw
    pub fn has_area(&self) -> bool {
        !self.is_cleared() && self.start != self.end
    }
}

/// Single writer of [`DragState`]
#[derive(Debug, Default)]
pub struct AnnotationOverlay {
    state: DragState,
}

impl AnnotationOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Begin a new drag at `position`, replacing any retained rectangle.
    ///
    /// A press that arrives while already dragging (the release was lost
    /// outside the window) restarts the gesture.
    pub fn pointer_down(&mut self, position: SurfacePoint) {
        if self.state.is_dragging() {
            log::debug!("pointer down while dragging; restarting gesture");
        }
        self.state = DragState::dragging(position, position);
    }

    /// Returns true when the move changed the drawn rectangle.
    pub fn pointer_move(&mut self, position: SurfacePoint) -> bool {
        if !self.state.is_dragging() || self.state.end == position {
            return false;
        }

        self.state.end = position;
        true
    }

    /// Finish the drag at `position`. Returns false when no drag was active.
    pub fn pointer_up(&mut self, position: SurfacePoint) -> bool {
        if !self.state.is_dragging() {
            return false;
        }

        self.state = DragState::completed(self.state.start, position);
        log::trace!(
            "drag finished: ({}, {}) -> ({}, {})",
            self.state.start.x,
            self.state.start.y,
            position.x,
            position.y
        );
        true
    }

    /// Drop any rectangle; called whenever the base bitmap is replaced.
    pub fn reset(&mut self) {
        self.state = DragState::CLEARED;
    }
}
