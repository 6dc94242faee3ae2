//! Rigid-body operations on pieces and groups: move, rotate, z-order, clone.
//!
//! Group operations never recurse through intermediate group poses. They
//! flatten the node to its leaf pieces and apply one transform to all of
//! them, so nested groups keep their formation automatically.

use std::collections::{HashMap, HashSet};

use trackplan_core::{ConnectionId, Error, LayerId, Node, PieceId, Point, Result};

use super::Layout;
use crate::serialization::IdPolicy;

impl Layout {
    /// Leaf pieces of a node, depth first in member order. A piece is its
    /// own only leaf.
    pub fn leaves(&self, node: Node) -> Vec<PieceId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.collect_leaves(node, &mut out, &mut visited);
        out
    }

    fn collect_leaves(&self, node: Node, out: &mut Vec<PieceId>, visited: &mut HashSet<Node>) {
        if !visited.insert(node) {
            return;
        }
        match node {
            Node::Piece(id) => {
                if self.pieces.contains_key(&id) {
                    out.push(id);
                }
            }
            Node::Group(id) => {
                if let Some(group) = self.groups.get(&id) {
                    for member in &group.members {
                        self.collect_leaves(*member, out, visited);
                    }
                }
            }
        }
    }

    /// Mean position of a node's leaf pieces.
    pub fn centroid(&self, node: Node) -> Option<Point> {
        let leaves = self.leaves(node);
        if leaves.is_empty() {
            return None;
        }
        let (sx, sy) = leaves
            .iter()
            .filter_map(|id| self.pieces.get(id))
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.pose.x, sy + p.pose.y));
        let n = leaves.len() as f64;
        Some(Point::new(sx / n, sy / n))
    }

    /// Translates every leaf of a node by the same delta.
    ///
    /// Links to pieces outside the node are broken first; auto-connect runs
    /// afterwards when enabled.
    pub fn move_node(&mut self, node: Node, dx: f64, dy: f64) -> Result<()> {
        self.require_node(node)?;
        let leaves = self.leaves(node);
        self.break_external_links(&leaves);
        for id in &leaves {
            if let Some(pose) = self.pieces.get(id).map(|p| p.pose) {
                self.set_piece_pose(*id, pose.translate(dx, dy));
            }
        }
        self.reconnect(&leaves)?;
        Ok(())
    }

    /// Whether a node may rotate: every leaf must allow it, and a group must
    /// not be docked to anything outside itself.
    pub fn can_rotate_node(&self, node: Node) -> Result<bool> {
        self.require_node(node)?;
        match node {
            Node::Piece(id) => self.can_rotate_piece(id),
            Node::Group(_) => {
                let leaves = self.leaves(node);
                let all_rotate = leaves
                    .iter()
                    .filter_map(|id| self.pieces.get(id))
                    .all(|p| p.can_rotate());
                Ok(all_rotate && self.external_links(&leaves).is_empty())
            }
        }
    }

    /// Rotates every leaf of a node about one pivot.
    ///
    /// The pivot defaults to the node's centroid and is shared by all nesting
    /// levels. Returns `Ok(false)` without changes when
    /// [`can_rotate_node`](Self::can_rotate_node) refuses.
    pub fn rotate_node(&mut self, node: Node, angle: f64, pivot: Option<Point>) -> Result<bool> {
        if !self.can_rotate_node(node)? {
            tracing::debug!("Not rotating {}", node);
            return Ok(false);
        }
        let Some(pivot) = pivot.or_else(|| self.centroid(node)) else {
            return Ok(false);
        };
        let leaves = self.leaves(node);
        self.break_external_links(&leaves);
        for id in &leaves {
            if let Some(pose) = self.pieces.get(id).map(|p| p.pose) {
                self.set_piece_pose(*id, pose.rotate_around(pivot, angle));
            }
        }
        self.reconnect(&leaves)?;
        Ok(true)
    }

    /// Moves all leaves of a node to the top of their layers as one block.
    pub fn bring_to_front(&mut self, node: Node) -> Result<()> {
        self.require_node(node)?;
        for (layer, block) in self.leaves_by_layer(node) {
            self.layer_mut(layer)?.bring_block_to_front(&block);
        }
        Ok(())
    }

    /// Moves all leaves of a node to the bottom of their layers as one block.
    pub fn send_to_back(&mut self, node: Node) -> Result<()> {
        self.require_node(node)?;
        for (layer, block) in self.leaves_by_layer(node) {
            self.layer_mut(layer)?.send_block_to_back(&block);
        }
        Ok(())
    }

    /// Duplicates a node on its layer, offset by `(dx, dy)`.
    ///
    /// Every id in the copy is fresh. Links between pieces of the copy are
    /// kept; links that led outside the original are left open. Temporary
    /// groups are copied as temporary groups.
    pub fn clone_node(&mut self, node: Node, dx: f64, dy: f64) -> Result<Node> {
        self.require_node(node)?;
        let layer = self
            .leaves(node)
            .first()
            .and_then(|id| self.pieces.get(id))
            .map(|p| p.layer)
            .unwrap_or(self.active_layer);

        let mut fragment = self.serialize_node(node)?;
        for component in &mut fragment.components {
            component.pose = component.pose.translate(dx, dy);
        }
        let copy = self.deserialize_fragment(&fragment, layer, IdPolicy::Regenerate)?;
        copy.ok_or_else(|| Error::other(format!("Cloning {} produced nothing", node)))
    }

    /// Active links from `leaves` to pieces outside the set, as
    /// `(inside, outside)` pairs.
    pub(crate) fn external_links(&self, leaves: &[PieceId]) -> Vec<(ConnectionId, ConnectionId)> {
        let inside: HashSet<&PieceId> = leaves.iter().collect();
        leaves
            .iter()
            .filter_map(|id| self.pieces.get(id))
            .flat_map(|p| p.connections.iter())
            .filter_map(|c| c.other.map(|other| (c.id, other)))
            .filter(|(_, other)| {
                self.registry
                    .get(other)
                    .is_some_and(|slot| !inside.contains(&slot.piece))
            })
            .collect()
    }

    pub(crate) fn break_external_links(&mut self, leaves: &[PieceId]) {
        for (a, b) in self.external_links(leaves) {
            self.unlink(a, b);
        }
    }

    /// Re-runs auto-connect for moved pieces, unless disabled or mid-drag.
    pub(crate) fn reconnect(&mut self, leaves: &[PieceId]) -> Result<()> {
        if !self.settings.auto_connect {
            return Ok(());
        }
        for id in leaves {
            if !self.session.is_dragging_piece(id) {
                self.auto_connect(*id)?;
            }
        }
        Ok(())
    }

    fn leaves_by_layer(&self, node: Node) -> Vec<(LayerId, Vec<PieceId>)> {
        let mut by_layer: HashMap<LayerId, Vec<PieceId>> = HashMap::new();
        for id in self.leaves(node) {
            if let Some(piece) = self.pieces.get(&id) {
                by_layer.entry(piece.layer).or_default().push(id);
            }
        }
        by_layer.into_iter().collect()
    }
}
