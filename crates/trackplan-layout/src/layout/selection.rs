//! Selection handling.
//!
//! The selection is a single node. Selecting several things builds a
//! temporary group around them; any previous temporary group is dissolved
//! first, so at most one selection group exists at a time.

use std::collections::HashSet;

use trackplan_core::{Node, PieceId};

use super::Layout;
use crate::spatial_index::Bounds;

impl Layout {
    /// Reduces the raw pieces hit by a selection box to one selectable node.
    ///
    /// # Arguments
    /// * `pieces` - Pieces whose bounds the box touched, in any order
    ///
    /// # Returns
    /// * `None` when nothing was hit
    /// * the single selection unit when there is only one (a loose piece or
    ///   the outermost permanent group of the hit pieces)
    /// * a new temporary group holding all units otherwise
    ///
    /// The result also becomes the session selection. A permanent group is
    /// always selected whole: hitting any of its pieces yields the group.
    pub fn process_selection_box_results(&mut self, pieces: &[PieceId]) -> Option<Node> {
        self.discard_temporary_groups(None);

        let mut seen = HashSet::new();
        let units: Vec<Node> = pieces
            .iter()
            .filter(|id| self.pieces.contains_key(*id))
            .map(|id| {
                let node = Node::Piece(*id);
                self.outermost_permanent_group(node)
                    .map(Node::Group)
                    .unwrap_or(node)
            })
            .filter(|unit| seen.insert(*unit))
            .collect();

        let selection = match units.as_slice() {
            [] => None,
            [single] => Some(*single),
            _ => match self.group_nodes(&units, true) {
                Ok(group) => Some(Node::Group(group)),
                Err(err) => {
                    tracing::warn!("Could not build selection group: {}", err);
                    None
                }
            },
        };
        self.session.selection = selection;
        selection
    }

    /// Selects the pieces of visible layers touched by `area`.
    pub fn select_in_bounds(&mut self, area: &Bounds) -> Option<Node> {
        let hits: Vec<PieceId> = self
            .hit_index
            .search(area)
            .into_iter()
            .filter(|id| {
                self.pieces
                    .get(id)
                    .and_then(|p| self.layer(p.layer))
                    .is_some_and(|layer| layer.is_visible())
            })
            .collect();
        self.process_selection_box_results(&hits)
    }

    /// Makes `node` the selection, dissolving any other temporary group.
    pub fn select(&mut self, node: Option<Node>) {
        self.discard_temporary_groups(node.and_then(|n| n.as_group()));
        self.session.selection = node.filter(|n| self.require_node(*n).is_ok());
    }

    pub fn clear_selection(&mut self) {
        self.select(None);
    }
}
