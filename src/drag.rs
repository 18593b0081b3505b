//! Drag coordinator: captures one pointer gesture and streams deltas.
//!
//! A session targets either a node's rect (plain translation) or one of its
//! handles (the handle reinterprets the pointer as scale or rotation). The
//! coordinator itself never mutates geometry — it owns the pointer
//! bookkeeping and hands each step to the controller, which resolves the
//! target in the node store and applies the effect.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::geometry::Vector;
use crate::node::NodeId;

/// What a drag session is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// Translate the node's rect by the pointer delta.
    Node(NodeId),
    /// Route the current pointer to the handle's effect.
    Handle { node: NodeId, handle: usize },
}

/// One pointer-move step of an active session.
#[derive(Debug, Clone, Copy)]
pub struct DragStep {
    pub target: DragTarget,
    /// `pointer − last_pointer`.
    pub delta: Vector,
    /// The current corrected pointer.
    pub pointer: Vector,
}

/// At most one session is active at a time; a new capture supersedes any
/// stale one. `update` and `cancel` with no session are no-ops.
#[derive(Debug, Default)]
pub struct DragCoordinator {
    session: Option<Session>,
}

#[derive(Debug)]
struct Session {
    target: DragTarget,
    origin: Vector,
    last: Vector,
}

impl DragCoordinator {
    /// Begin a session at `origin`, replacing any active one.
    pub fn capture(&mut self, target: DragTarget, origin: Vector) {
        self.session = Some(Session { target, origin, last: origin });
    }

    /// Advance the session to `pointer`, yielding the step to apply.
    /// Returns `None` when no session is active.
    pub fn update(&mut self, pointer: Vector) -> Option<DragStep> {
        let session = self.session.as_mut()?;
        let delta = pointer - session.last;
        session.last = pointer;
        Some(DragStep { target: session.target, delta, pointer })
    }

    /// End the session, if any.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Target of the active session, if any.
    #[must_use]
    pub fn target(&self) -> Option<DragTarget> {
        self.session.as_ref().map(|s| s.target)
    }

    /// Pointer position where the active session began, if any.
    #[must_use]
    pub fn origin(&self) -> Option<Vector> {
        self.session.as_ref().map(|s| s.origin)
    }
}
