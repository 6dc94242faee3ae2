//! Identifier types.
//!
//! Every addressable object in a layout is named by a small `Copy` id. Pieces,
//! groups and connections use random v4 uuids so they can be persisted and
//! re-linked on import; layers use a per-layout counter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing uuid.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a placed piece.
    PieceId
);
uuid_id!(
    /// Identifier of a group (temporary or permanent).
    GroupId
);
uuid_id!(
    /// Identifier of a single connector on a piece.
    ConnectionId
);

/// Identifier of a layer within one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// A node of the composition tree: either a single piece or a group.
///
/// Group operations recurse over nodes, so every capability (move, rotate,
/// z-order, serialize, clone) is addressed through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Piece(PieceId),
    Group(GroupId),
}

impl Node {
    pub fn as_piece(&self) -> Option<PieceId> {
        match self {
            Node::Piece(id) => Some(*id),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<GroupId> {
        match self {
            Node::Group(id) => Some(*id),
            Node::Piece(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }
}

impl From<PieceId> for Node {
    fn from(id: PieceId) -> Self {
        Node::Piece(id)
    }
}

impl From<GroupId> for Node {
    fn from(id: GroupId) -> Self {
        Node::Group(id)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Piece(id) => write!(f, "piece {}", id),
            Node::Group(id) => write!(f, "group {}", id),
        }
    }
}
