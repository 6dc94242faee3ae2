//! Layers and their open-connection index.

use std::collections::HashSet;
use trackplan_core::{ConnectionId, LayerId, PieceId};

/// Unlinked connectors of one layer, kept in insertion order.
///
/// Auto-connect scans this index front to back and takes the first match, so
/// the order is observable and must be stable across re-keying.
#[derive(Debug, Clone, Default)]
pub struct OpenConnectionIndex {
    order: Vec<ConnectionId>,
    members: HashSet<ConnectionId>,
}

impl OpenConnectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an id. Returns false if it was already present.
    pub fn insert(&mut self, id: ConnectionId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        if let Some(pos) = self.order.iter().position(|c| c == id) {
            self.order.remove(pos);
        }
        true
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    /// Replaces `old` with `new` in place.
    pub fn rekey(&mut self, old: &ConnectionId, new: ConnectionId) -> bool {
        if !self.members.contains(old) || self.members.contains(&new) {
            return false;
        }
        self.members.remove(old);
        self.members.insert(new);
        if let Some(slot) = self.order.iter_mut().find(|c| *c == old) {
            *slot = new;
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

/// A z-ordered list of pieces plus the index of their open connectors.
///
/// Groups are not stored here: a group is an overlay on top of the pieces it
/// contains, and its pieces keep their own z positions.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    pub(crate) name: String,
    pub(crate) visible: bool,
    pub(crate) children: Vec<PieceId>,
    pub(crate) open: OpenConnectionIndex,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            children: Vec::new(),
            open: OpenConnectionIndex::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Pieces from back to front.
    pub fn children(&self) -> &[PieceId] {
        &self.children
    }

    pub fn open_connections(&self) -> &OpenConnectionIndex {
        &self.open
    }

    pub fn contains(&self, piece: &PieceId) -> bool {
        self.children.contains(piece)
    }

    /// Stacking position of a piece (0 is the back).
    pub fn z_index(&self, piece: &PieceId) -> Option<usize> {
        self.children.iter().position(|c| c == piece)
    }

    pub(crate) fn remove_child(&mut self, piece: &PieceId) -> bool {
        match self.children.iter().position(|c| c == piece) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Moves `block` to the front as one contiguous run, keeping the block's
    /// current relative order.
    pub(crate) fn bring_block_to_front(&mut self, block: &[PieceId]) {
        let (moved, rest) = self.split_block(block);
        self.children = rest;
        self.children.extend(moved);
    }

    /// Moves `block` to the back as one contiguous run, keeping the block's
    /// current relative order.
    pub(crate) fn send_block_to_back(&mut self, block: &[PieceId]) {
        let (mut moved, rest) = self.split_block(block);
        moved.extend(rest);
        self.children = moved;
    }

    fn split_block(&self, block: &[PieceId]) -> (Vec<PieceId>, Vec<PieceId>) {
        let wanted: HashSet<&PieceId> = block.iter().collect();
        self.children.iter().copied().partition(|c| wanted.contains(c))
    }
}
