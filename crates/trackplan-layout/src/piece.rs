//! Placed pieces.

use serde::{Deserialize, Serialize};
use trackplan_core::{ConnectionId, GroupId, LayerId, LengthUnit, PieceId, Pose};

use crate::catalog::{CatalogEntry, PieceKind};
use crate::connection::Connection;
use crate::spatial_index::Bounds;

/// Geometry of a free-form shape piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Text,
}

/// Per-instance geometry and style data.
///
/// Track pieces only use `width` / `height` (copied from the catalog);
/// baseplates add `units` and `color`; shapes use the remaining fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceData {
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<LengthUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

impl PieceData {
    /// Default data for a catalog entry.
    pub fn for_entry(entry: &CatalogEntry) -> Self {
        let mut data = Self {
            width: entry.width,
            height: entry.height,
            ..Self::default()
        };
        match entry.kind {
            PieceKind::Track => {}
            PieceKind::Baseplate => {
                data.units = Some(LengthUnit::Studs);
                data.color = Some("#237841".to_string());
            }
            PieceKind::Shape => {
                data.units = Some(LengthUnit::Millimeters);
                data.color = Some("#a0a5a9".to_string());
                data.shape = Some(ShapeKind::Rectangle);
            }
        }
        data
    }
}

/// A placed instance of a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub(crate) id: PieceId,
    pub(crate) alias: String,
    pub(crate) kind: PieceKind,
    pub(crate) pose: Pose,
    pub(crate) data: PieceData,
    pub(crate) connections: Vec<Connection>,
    pub(crate) group: Option<GroupId>,
    pub(crate) layer: LayerId,
}

impl Piece {
    /// Instantiates a catalog entry. Connections get fresh ids and start open.
    pub(crate) fn from_entry(entry: &CatalogEntry, pose: Pose, layer: LayerId) -> Self {
        let id = PieceId::new();
        let connections = entry
            .connectors
            .iter()
            .map(|spec| Connection::from_spec(id, spec))
            .collect();
        Self {
            id,
            alias: entry.alias.clone(),
            kind: entry.kind,
            pose: pose.quantized(),
            data: PieceData::for_entry(entry),
            connections,
            group: None,
            layer,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    /// Catalog alias (the serialized `type`).
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn data(&self) -> &PieceData {
        &self.data
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, index: usize) -> Option<&Connection> {
        self.connections.get(index)
    }

    pub fn connection_index(&self, id: &ConnectionId) -> Option<usize> {
        self.connections.iter().position(|c| c.id == *id)
    }

    /// World pose of the connector at `index`.
    pub fn connection_pose(&self, index: usize) -> Option<Pose> {
        self.connections.get(index).map(|c| c.pose(&self.pose))
    }

    /// Owning group, if any (temporary or permanent).
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Number of connectors currently docked to a partner.
    pub fn linked_count(&self) -> usize {
        self.connections.iter().filter(|c| !c.is_open()).count()
    }

    /// A piece may only rotate while at most one connector is docked.
    pub fn can_rotate(&self) -> bool {
        self.linked_count() <= 1
    }

    pub fn open_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(|c| c.is_open())
    }

    /// Loose axis-aligned bounds of the rotated footprint.
    pub fn bounds(&self) -> Bounds {
        Bounds::of_rotated_rect(&self.pose, self.data.width, self.data.height)
    }
}
