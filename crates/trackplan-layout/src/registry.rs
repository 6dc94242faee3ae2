//! Connection registry.

use std::collections::HashMap;
use trackplan_core::ConnectionId;

use crate::connection::ConnectionRef;

/// Lookup from connector id to the piece slot that owns it.
///
/// Owned by a [`Layout`](crate::Layout) and rebuilt whenever a layout is
/// loaded; imports use it to resolve partner ids when re-linking.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, ConnectionRef>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection. Returns false (and leaves the registry alone)
    /// when the id is already taken.
    pub fn register(&mut self, id: ConnectionId, slot: ConnectionRef) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, slot);
        true
    }

    pub fn unregister(&mut self, id: &ConnectionId) -> Option<ConnectionRef> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<ConnectionRef> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.entries.contains_key(id)
    }

    /// Moves an entry to a new key.
    pub fn rekey(&mut self, old: &ConnectionId, new: ConnectionId) -> bool {
        if self.entries.contains_key(&new) {
            return false;
        }
        match self.entries.remove(old) {
            Some(slot) => {
                self.entries.insert(new, slot);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &ConnectionRef)> {
        self.entries.iter()
    }
}
