//! Linking, unlinking and re-keying connectors.

use trackplan_core::{ConnectionError, ConnectionId, LayerId, LayoutError, Pose, Result};

use super::Layout;
use crate::connection::Connection;
use crate::offset::ConnectorOffset;

impl Layout {
    /// Looks up a connection by id.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        let slot = self.registry.get(&id)?;
        self.pieces.get(&slot.piece)?.connections.get(slot.index)
    }

    /// World pose of a connection.
    pub fn connection_pose(&self, id: ConnectionId) -> Option<Pose> {
        let slot = self.registry.get(&id)?;
        self.pieces.get(&slot.piece)?.connection_pose(slot.index)
    }

    /// Links two open connectors of different pieces.
    ///
    /// Both leave their layers' open-connection indexes. Geometry is not
    /// checked: the caller decides the connectors belong together.
    ///
    /// # Errors
    /// * `UnknownConnection` if either id is not registered
    /// * `SameOwner` if both connectors belong to one piece
    /// * `AlreadyLinked` if either side already has a partner
    pub fn connect(&mut self, a: ConnectionId, b: ConnectionId) -> Result<()> {
        let (owner_a, open_a) = {
            let conn = self.require_connection(a)?;
            (conn.owner, conn.is_open())
        };
        let (owner_b, open_b) = {
            let conn = self.require_connection(b)?;
            (conn.owner, conn.is_open())
        };
        if owner_a == owner_b {
            tracing::warn!("Refusing to link two connectors of piece {}", owner_a);
            return Err(ConnectionError::SameOwner(owner_a).into());
        }
        for (id, open) in [(a, open_a), (b, open_b)] {
            if !open {
                tracing::warn!("Refusing to link {}: already linked", id);
                return Err(ConnectionError::AlreadyLinked(id).into());
            }
        }
        self.link(a, b);
        Ok(())
    }

    /// Unlinks a connector from its partner and reopens both.
    ///
    /// Returns `false` when the connector was already open.
    pub fn disconnect(&mut self, id: ConnectionId) -> Result<bool> {
        let partner = self.require_connection(id)?.other;
        match partner {
            Some(partner) => {
                self.unlink(id, partner);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Changes a connector's id, updating the registry, the open index entry
    /// (in place) and the partner's back link together.
    pub fn set_connection_id(&mut self, old: ConnectionId, new: ConnectionId) -> Result<()> {
        let slot = self
            .registry
            .get(&old)
            .ok_or(LayoutError::UnknownConnection(old))?;
        if old == new {
            return Ok(());
        }
        if self.registry.contains(&new) {
            return Err(ConnectionError::DuplicateId(new).into());
        }
        let piece = self
            .pieces
            .get_mut(&slot.piece)
            .ok_or(LayoutError::UnknownPiece(slot.piece))?;
        let layer = piece.layer;
        let conn = piece
            .connections
            .get_mut(slot.index)
            .ok_or(LayoutError::UnknownConnection(old))?;
        conn.id = new;
        let partner = conn.other;

        self.registry.rekey(&old, new);
        match partner {
            Some(partner) => self.set_partner(partner, Some(new)),
            None => {
                self.layer_mut(layer)?.open.rekey(&old, new);
            }
        }
        if self.session.cursor == Some(old) {
            self.session.cursor = Some(new);
        }
        Ok(())
    }

    /// Overrides the offset of a single connector instance.
    pub fn set_connection_offset(&mut self, id: ConnectionId, offset: ConnectorOffset) -> Result<()> {
        let conn = self
            .connection_mut(id)
            .ok_or(LayoutError::UnknownConnection(id))?;
        conn.offset = offset;
        conn.custom_offset = true;
        Ok(())
    }

    /// Number of open connectors on a layer.
    pub fn open_connection_count(&self, layer: LayerId) -> Result<usize> {
        let index = self.layer_index(layer)?;
        Ok(self.layers[index].open.len())
    }

    pub(crate) fn require_connection(
        &self,
        id: ConnectionId,
    ) -> std::result::Result<&Connection, LayoutError> {
        self.connection(id).ok_or(LayoutError::UnknownConnection(id))
    }

    pub(crate) fn connection_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        let slot = self.registry.get(&id)?;
        self.pieces
            .get_mut(&slot.piece)?
            .connections
            .get_mut(slot.index)
    }

    /// Links two connectors that are known to be open and on different pieces.
    pub(crate) fn link(&mut self, a: ConnectionId, b: ConnectionId) {
        self.set_partner(a, Some(b));
        self.set_partner(b, Some(a));
        self.close_in_index(a);
        self.close_in_index(b);
        tracing::debug!("Linked {} <-> {}", a, b);
    }

    pub(crate) fn unlink(&mut self, a: ConnectionId, b: ConnectionId) {
        self.set_partner(a, None);
        self.set_partner(b, None);
        self.open_in_index(a);
        self.open_in_index(b);
        tracing::debug!("Unlinked {} <-> {}", a, b);
    }

    fn set_partner(&mut self, id: ConnectionId, partner: Option<ConnectionId>) {
        if let Some(conn) = self.connection_mut(id) {
            conn.other = partner;
        }
    }

    pub(crate) fn owner_layer(&self, id: ConnectionId) -> Option<LayerId> {
        let slot = self.registry.get(&id)?;
        self.pieces.get(&slot.piece).map(|p| p.layer)
    }

    fn close_in_index(&mut self, id: ConnectionId) {
        if let Some(layer) = self.owner_layer(id) {
            if let Ok(layer) = self.layer_mut(layer) {
                layer.open.remove(&id);
            }
        }
    }

    fn open_in_index(&mut self, id: ConnectionId) {
        if let Some(layer) = self.owner_layer(id) {
            if let Ok(layer) = self.layer_mut(layer) {
                layer.open.insert(id);
            }
        }
    }
}
