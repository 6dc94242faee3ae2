//! Per-editor interaction state: selection, drag and the chain cursor.

use trackplan_core::{ConnectionId, Node, PieceId, Pose};

/// An in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    /// Outermost node that moves as one body.
    pub target: Node,
    /// Every leaf piece of `target` with the pose its displacement is
    /// measured from. Edits made mid-drag move these along.
    pub origin: Vec<(PieceId, Pose)>,
    /// Poses when the drag started; a cancel restores these.
    pub start: Vec<(PieceId, Pose)>,
    /// Cumulative displacement since the drag started.
    pub dx: f64,
    pub dy: f64,
}

impl DragState {
    pub fn distance(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    pub fn moves(&self, piece: &PieceId) -> bool {
        self.origin.iter().any(|(id, _)| id == piece)
    }

    /// Records that `piece` now sits at `pose` mid-drag, so later moves
    /// start from it instead of the pose the drag began with.
    pub(crate) fn rebase(&mut self, piece: &PieceId, pose: Pose) {
        let start = pose.translate(-self.dx, -self.dy);
        for (id, origin) in &mut self.origin {
            if id == piece {
                *origin = start;
            }
        }
    }
}

/// Interaction state owned by a [`Layout`](crate::Layout).
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(crate) selection: Option<Node>,
    pub(crate) drag: Option<DragState>,
    pub(crate) cursor: Option<ConnectionId>,
}

impl Session {
    pub fn selection(&self) -> Option<Node> {
        self.selection
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// True while `piece` is part of the dragged body.
    pub fn is_dragging_piece(&self, piece: &PieceId) -> bool {
        self.drag.as_ref().is_some_and(|d| d.moves(piece))
    }

    /// Connector the next chained piece attaches to.
    pub fn cursor(&self) -> Option<ConnectionId> {
        self.cursor
    }

    /// Drops the selection when it names a node that no longer exists.
    pub(crate) fn forget_node(&mut self, node: Node) {
        if self.selection == Some(node) {
            self.selection = None;
        }
    }
}
