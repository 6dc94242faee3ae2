//! Placing, destroying and rotating single pieces.

use trackplan_core::constants::{CONNECT_RADIUS, OPPOSITE_ANGLE_TOLERANCE, ROTATION_STEP};
use trackplan_core::{
    CatalogError, ConnectionError, ConnectionId, LayerId, LayoutError, Node, PieceId, Pose, Result,
};

use super::Layout;
use crate::connection::{Connection, ConnectionRef};
use crate::piece::Piece;

impl Layout {
    /// Adds a piece of type `alias` at `pose` on the active layer and, when
    /// enabled, docks it to matching open connectors.
    pub fn add_piece(&mut self, alias: &str, pose: Pose) -> Result<PieceId> {
        let layer = self.active_layer;
        let id = self.spawn_piece(alias, pose, layer)?;
        if self.settings.auto_connect {
            self.auto_connect(id)?;
        }
        Ok(id)
    }

    /// Places a piece without a connector reference.
    ///
    /// The new piece goes next to the selected piece, along the selected
    /// piece's heading, or at the layout origin when nothing is selected.
    /// Grid snapping is applied last. The new piece becomes the selection.
    /// The chain cursor goes to the connector named by the first connector's
    /// `next_connection_index`, or to the first open one if that is docked.
    pub fn place_piece(&mut self, alias: &str) -> Result<PieceId> {
        let width = self.catalog.resolve(alias)?.width;
        let pose = match self.reference_piece() {
            Some(selected) => {
                let distance = selected.data.width / 2.0 + width / 2.0;
                let (s, c) = selected.pose.angle.sin_cos();
                Pose::new(
                    selected.pose.x + distance * c,
                    selected.pose.y + distance * s,
                    selected.pose.angle,
                )
            }
            None => self.settings.origin(),
        };
        let pose = self.settings.snap(pose);

        let id = self.add_piece(alias, pose)?;
        self.session.cursor = self.pieces.get(&id).and_then(|piece| {
            let next = piece
                .connections
                .first()
                .and_then(|first| piece.connections.get(first.next_connection_index))
                .filter(|c| c.is_open());
            next.or_else(|| piece.open_connections().next()).map(|c| c.id)
        });
        self.select(Some(Node::Piece(id)));
        Ok(id)
    }

    /// Places a piece so that its first connector docks onto `target`.
    ///
    /// The chain cursor moves to the connector named by the docked
    /// connector's `next_connection_index`, if that one is still open.
    ///
    /// # Errors
    /// * `UnknownConnection` if `target` does not exist
    /// * `AlreadyLinked` if `target` is not open
    /// * `InvalidEntry` if the piece type has no connectors
    pub fn place_piece_at(&mut self, alias: &str, target: ConnectionId) -> Result<PieceId> {
        if !self.require_connection(target)?.is_open() {
            return Err(ConnectionError::AlreadyLinked(target).into());
        }
        let target_pose = self
            .connection_pose(target)
            .ok_or(LayoutError::UnknownConnection(target))?;
        let layer = self
            .owner_layer(target)
            .ok_or(LayoutError::UnknownConnection(target))?;

        let entry = self.catalog.resolve(alias)?;
        let first = entry
            .connectors
            .first()
            .ok_or_else(|| CatalogError::InvalidEntry {
                alias: alias.to_string(),
                reason: "piece type has no connectors".to_string(),
            })?;
        let pose = first.offset.docking_pose_for(&target_pose);

        let id = self.spawn_piece(alias, pose, layer)?;
        let (own, next) = {
            let piece = self.require_piece(id)?;
            let own = piece
                .connections
                .first()
                .ok_or(LayoutError::UnknownPiece(id))?;
            let next = piece
                .connections
                .get(own.next_connection_index)
                .map(|c| c.id);
            (own.id, next)
        };
        self.link(own, target);
        if self.settings.auto_connect {
            self.auto_connect(id)?;
        }

        self.session.cursor = next.filter(|c| {
            *c != own && self.connection(*c).is_some_and(Connection::is_open)
        });
        self.select(Some(Node::Piece(id)));
        Ok(id)
    }

    /// Extends the chain at the cursor, or places freely when the cursor is
    /// gone or already docked.
    pub fn place_next(&mut self, alias: &str) -> Result<PieceId> {
        let cursor = self
            .session
            .cursor
            .filter(|c| self.connection(*c).is_some_and(Connection::is_open));
        match cursor {
            Some(cursor) => self.place_piece_at(alias, cursor),
            None => self.place_piece(alias),
        }
    }

    /// Destroys a piece.
    ///
    /// Every linked partner is reopened, the piece leaves its group (groups
    /// left empty are removed), its layer, the registry and the hit index,
    /// and the scene is told to drop it.
    pub fn destroy_piece(&mut self, id: PieceId) -> Result<()> {
        let piece = self.require_piece(id)?;
        let links: Vec<(ConnectionId, ConnectionId)> = piece
            .connections
            .iter()
            .filter_map(|c| c.other.map(|other| (c.id, other)))
            .collect();
        let own: Vec<ConnectionId> = piece.connections.iter().map(|c| c.id).collect();
        let group = piece.group;
        let layer = piece.layer;

        if let Some(group) = group {
            self.detach_member(group, Node::Piece(id));
            self.prune_empty(group);
        }
        for (a, b) in links {
            self.unlink(a, b);
        }
        if !self.session.is_dragging_piece(&id) {
            self.index_remove(id);
        }
        if let Ok(layer) = self.layer_mut(layer) {
            for conn in &own {
                layer.open.remove(conn);
            }
            layer.remove_child(&id);
        }
        for conn in &own {
            self.registry.unregister(conn);
            if self.session.cursor == Some(*conn) {
                self.session.cursor = None;
            }
        }
        if let Some(drag) = self.session.drag.as_mut() {
            drag.origin.retain(|(piece, _)| *piece != id);
            drag.start.retain(|(piece, _)| *piece != id);
        }

        self.pieces.remove(&id);
        self.scene.detach(id);
        self.session.forget_node(Node::Piece(id));
        tracing::debug!("Destroyed piece {}", id);
        Ok(())
    }

    /// True when the piece has at most one linked connector.
    pub fn can_rotate_piece(&self, id: PieceId) -> Result<bool> {
        Ok(self.require_piece(id)?.can_rotate())
    }

    /// Turns a piece by one rotation step about its own origin.
    ///
    /// Returns `Ok(false)` (and changes nothing) when two or more connectors
    /// are docked. A single link is broken by the turn; auto-connect then
    /// runs again for the new heading.
    pub fn rotate_piece(&mut self, id: PieceId) -> Result<bool> {
        let piece = self.require_piece(id)?;
        if !piece.can_rotate() {
            tracing::debug!("Piece {} has {} links, not rotating", id, piece.linked_count());
            return Ok(false);
        }
        let links: Vec<(ConnectionId, ConnectionId)> = piece
            .connections
            .iter()
            .filter_map(|c| c.other.map(|other| (c.id, other)))
            .collect();
        let pose = piece.pose.with_angle(piece.pose.angle + ROTATION_STEP);

        for (a, b) in links {
            self.unlink(a, b);
        }
        self.set_piece_pose(id, pose);
        if self.settings.auto_connect && !self.session.is_dragging_piece(&id) {
            self.auto_connect(id)?;
        }
        Ok(true)
    }

    /// Docks every open connector of a piece to the first matching open
    /// connector on its layer. Returns the number of links made.
    ///
    /// A candidate matches when it belongs to another piece, has the same
    /// connector type, lies within [`CONNECT_RADIUS`] and faces the opposite
    /// way. The layer index is scanned in insertion order and the first match
    /// wins, so placement order decides pairings when several qualify.
    pub fn auto_connect(&mut self, id: PieceId) -> Result<usize> {
        let count = self.require_piece(id)?.connections.len();
        let mut made = 0;
        for index in 0..count {
            if let Some((own, candidate)) = self.find_partner(id, index)? {
                self.link(own, candidate);
                made += 1;
            }
        }
        Ok(made)
    }

    fn find_partner(
        &self,
        id: PieceId,
        index: usize,
    ) -> Result<Option<(ConnectionId, ConnectionId)>> {
        let piece = self.require_piece(id)?;
        let Some(conn) = piece.connections.get(index) else {
            return Ok(None);
        };
        if !conn.is_open() {
            return Ok(None);
        }
        let pose = conn.pose(&piece.pose);
        let layer = &self.layers[self.layer_index(piece.layer)?];

        let candidate = layer.open.iter().copied().find(|other| {
            let Some(slot) = self.registry.get(other) else {
                return false;
            };
            if slot.piece == id {
                return false;
            }
            let Some(owner) = self.pieces.get(&slot.piece) else {
                return false;
            };
            let Some(candidate) = owner.connections.get(slot.index) else {
                return false;
            };
            let candidate_pose = candidate.pose(&owner.pose);
            candidate.kind == conn.kind
                && candidate_pose.is_in_radius(&pose, CONNECT_RADIUS)
                && candidate_pose.has_opposite_angle(&pose, OPPOSITE_ANGLE_TOLERANCE)
        });
        Ok(candidate.map(|candidate| (conn.id, candidate)))
    }

    /// Instantiates a catalog entry on `layer` without docking it.
    pub(crate) fn spawn_piece(&mut self, alias: &str, pose: Pose, layer: LayerId) -> Result<PieceId> {
        self.layer_index(layer)?;
        let piece = Piece::from_entry(self.catalog.resolve(alias)?, pose, layer);
        Ok(self.insert_piece(piece))
    }

    /// Registers a new piece with every index. Its connectors must not be
    /// registered yet; open ones enter the layer's open index.
    pub(crate) fn insert_piece(&mut self, piece: Piece) -> PieceId {
        let id = piece.id;
        for (index, conn) in piece.connections.iter().enumerate() {
            self.registry.register(conn.id, ConnectionRef { piece: id, index });
        }
        if let Ok(layer) = self.layer_mut(piece.layer) {
            layer.children.push(id);
            for conn in piece.open_connections() {
                layer.open.insert(conn.id);
            }
        }
        self.scene.attach(&piece);
        self.hit_index.insert(id, &piece.bounds());
        self.pieces.insert(id, piece);
        id
    }

    /// Moves a piece, keeping the hit index in step unless it is being
    /// dragged. A dragged piece has its drag origin moved along instead.
    pub(crate) fn set_piece_pose(&mut self, id: PieceId, pose: Pose) {
        let dragging = self.session.is_dragging_piece(&id);
        if !dragging {
            self.index_remove(id);
        }
        let pose = pose.quantized();
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.pose = pose;
        }
        if dragging {
            if let Some(drag) = self.session.drag.as_mut() {
                drag.rebase(&id, pose);
            }
        } else {
            self.index_insert(id);
        }
    }

    /// The piece free placement positions against: the selected piece, or
    /// the last leaf of a selected group.
    fn reference_piece(&self) -> Option<&Piece> {
        match self.session.selection? {
            Node::Piece(id) => self.pieces.get(&id),
            group @ Node::Group(_) => self
                .leaves(group)
                .last()
                .and_then(|id| self.pieces.get(id)),
        }
    }
}
