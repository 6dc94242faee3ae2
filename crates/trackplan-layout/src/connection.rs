//! Connectors and their links.

use trackplan_core::{ConnectionId, PieceId, Pose};

use crate::catalog::ConnectorSpec;
use crate::offset::ConnectorOffset;

/// One docking point on a placed piece.
///
/// `other` is symmetric across the layout: when this connection points at a
/// partner, the partner points back. Links are only changed through
/// [`Layout::connect`](crate::Layout::connect) and
/// [`Layout::disconnect`](crate::Layout::disconnect), which keep the layer's
/// open-connection index in step.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub owner: PieceId,
    pub offset: ConnectorOffset,
    pub kind: String,
    pub next_connection_index: usize,
    pub(crate) other: Option<ConnectionId>,
    pub(crate) custom_offset: bool,
}

impl Connection {
    pub(crate) fn from_spec(owner: PieceId, spec: &ConnectorSpec) -> Self {
        Self {
            id: ConnectionId::new(),
            owner,
            offset: spec.offset,
            kind: spec.kind.clone(),
            next_connection_index: spec.next_connection_index,
            other: None,
            custom_offset: false,
        }
    }

    /// The linked partner, if any.
    pub fn other(&self) -> Option<ConnectionId> {
        self.other
    }

    pub fn is_open(&self) -> bool {
        self.other.is_none()
    }

    /// True when the offset differs from the catalog's.
    pub fn has_custom_offset(&self) -> bool {
        self.custom_offset
    }

    /// World pose given the owner's pose.
    pub fn pose(&self, owner_pose: &Pose) -> Pose {
        self.offset.world_pose(owner_pose)
    }
}

/// Where a connection lives: owning piece and slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionRef {
    pub piece: PieceId,
    pub index: usize,
}
