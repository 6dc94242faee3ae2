//! Drag gestures.
//!
//! A drag always moves the outermost group enclosing the grabbed node. The
//! dragged leaves leave the hit index when the drag starts and come back
//! once, when it ends or is cancelled.

use trackplan_core::{LayoutError, Node, Result};

use super::Layout;
use crate::session::DragState;

impl Layout {
    /// Starts dragging `node`. Returns the node that actually moves.
    ///
    /// A drag already in progress is cancelled first.
    pub fn start_drag(&mut self, node: Node) -> Result<Node> {
        self.require_node(node)?;
        if self.session.drag.is_some() {
            self.cancel_drag()?;
        }
        let target = self.root_group(node).map(Node::Group).unwrap_or(node);
        let leaves = self.leaves(target);
        for id in &leaves {
            self.index_remove(*id);
        }
        let origin: Vec<_> = leaves
            .iter()
            .filter_map(|id| self.pieces.get(id).map(|p| (*id, p.pose)))
            .collect();
        self.session.drag = Some(DragState {
            target,
            start: origin.clone(),
            origin,
            dx: 0.0,
            dy: 0.0,
        });
        tracing::debug!("Drag started on {} (grabbed {})", target, node);
        Ok(target)
    }

    /// Sets the cumulative drag displacement. Every leaf is placed at its
    /// starting pose plus `(dx, dy)`.
    pub fn drag_to(&mut self, dx: f64, dy: f64) -> Result<()> {
        let drag = self.session.drag.as_mut().ok_or(LayoutError::NotDragging)?;
        drag.dx = dx;
        drag.dy = dy;
        for (id, start) in &drag.origin {
            if let Some(piece) = self.pieces.get_mut(id) {
                piece.pose = start.translate(dx, dy);
            }
        }
        Ok(())
    }

    /// Adds `(dx, dy)` to the current drag displacement.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> Result<()> {
        let (total_x, total_y) = {
            let drag = self.session.drag.as_ref().ok_or(LayoutError::NotDragging)?;
            (drag.dx + dx, drag.dy + dy)
        };
        self.drag_to(total_x, total_y)
    }

    /// Finishes the drag.
    ///
    /// Below the drag threshold the gesture counts as a click: every pose is
    /// restored and `None` is returned. Otherwise links to pieces outside the
    /// dragged body are broken, the hit index is refreshed and auto-connect
    /// runs for the dropped pieces.
    pub fn end_drag(&mut self) -> Result<Option<Node>> {
        let distance = self
            .session
            .drag
            .as_ref()
            .ok_or(LayoutError::NotDragging)?
            .distance();
        if distance < self.settings.drag_threshold {
            self.cancel_drag()?;
            return Ok(None);
        }

        let Some(drag) = self.session.drag.take() else {
            return Err(LayoutError::NotDragging.into());
        };
        let leaves: Vec<_> = drag.origin.iter().map(|(id, _)| *id).collect();
        self.break_external_links(&leaves);
        for id in &leaves {
            self.index_insert(*id);
        }
        self.reconnect(&leaves)?;
        tracing::debug!("Drag of {} ended at ({}, {})", drag.target, drag.dx, drag.dy);
        Ok(Some(drag.target))
    }

    /// Aborts the drag, putting every piece back exactly where it started.
    /// Rotations made during the drag are undone as well.
    pub fn cancel_drag(&mut self) -> Result<()> {
        let drag = self.session.drag.take().ok_or(LayoutError::NotDragging)?;
        for (id, start) in &drag.start {
            if let Some(piece) = self.pieces.get_mut(id) {
                piece.pose = *start;
            }
            self.index_insert(*id);
        }
        tracing::debug!("Drag of {} cancelled", drag.target);
        Ok(())
    }
}
