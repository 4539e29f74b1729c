//! Viewport anchoring: keeping the node the user is looking at fixed
//! across batch insertions.
//!
//! The engine does not own a screen; the view collaborator reports
//! which node currently sits at the top of its visible window, and the
//! timeline hands that anchor back after every mutation. Handles are
//! stable across insertions, so "restoring" the viewport is simply
//! scrolling the same handle back to the top; the engine guarantees
//! the handle still names the same node.

use crate::store::NodeHandle;

/// The anchor captured before a batch insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportAnchor {
    top: Option<NodeHandle>,
}

impl ViewportAnchor {
    /// Captures the node currently at the top of the viewport, or
    /// `None` when no viewport is active.
    #[must_use]
    pub const fn capture(top: Option<NodeHandle>) -> Self {
        Self { top }
    }

    /// The node the view should scroll back to the top after the
    /// mutation completes.
    #[must_use]
    pub const fn top(self) -> Option<NodeHandle> {
        self.top
    }
}
