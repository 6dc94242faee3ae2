//! Error handling for TrackPlan
//!
//! Provides error types for every layer of the layout engine:
//! - Layout errors (unknown ids, unknown piece types)
//! - Group errors (refused membership changes)
//! - Connection errors (refused link changes)
//! - Catalog errors (piece catalog maintenance)
//! - Validation errors (rejected layout documents)
//! - Upgrade errors (unmigratable layout documents)
//!
//! All error types use `thiserror` for ergonomic error handling. Refused
//! structural edits are never fatal: the caller gets an error value and the
//! layout is left exactly as it was.

use thiserror::Error;

use crate::types::{ConnectionId, GroupId, LayerId, Node, PieceId};

/// Lookup failures against the layout arenas.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Unknown piece: {0}")]
    UnknownPiece(PieceId),

    #[error("Unknown group: {0}")]
    UnknownGroup(GroupId),

    #[error("Unknown layer: {0}")]
    UnknownLayer(LayerId),

    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    #[error("Group {0} already exists")]
    DuplicateGroup(GroupId),

    #[error("Nothing is being dragged")]
    NotDragging,

    #[error("Cannot remove the last layer")]
    LastLayer,
}

/// Group membership changes that would break an ownership invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupError {
    /// The member already belongs to another group
    #[error("{member} already belongs to group {owner}")]
    AlreadyGrouped {
        /// The member being added.
        member: Node,
        /// Its current owner.
        owner: GroupId,
    },

    /// The group would end up containing itself
    #[error("Group {0} cannot contain itself")]
    SelfContainment(GroupId),

    /// A permanent group's pieces must share a layer
    #[error("Permanent group {0} would span more than one layer")]
    CrossLayer(GroupId),

    /// The node is not a direct member of the group
    #[error("{member} is not a member of group {group}")]
    NotMember {
        /// The node that was expected to be a member.
        member: Node,
        /// The group that was searched.
        group: GroupId,
    },
}

/// Link changes that would break connection symmetry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    #[error("Connection {0} is already linked")]
    AlreadyLinked(ConnectionId),

    #[error("Cannot link two connectors of the same piece {0}")]
    SameOwner(PieceId),

    #[error("Connection {0} already exists")]
    DuplicateId(ConnectionId),
}

/// Piece catalog errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Unknown piece type: {0}")]
    UnknownType(String),

    #[error("Piece type already registered: {0}")]
    DuplicateType(String),

    #[error("Invalid catalog entry '{alias}': {reason}")]
    InvalidEntry {
        /// The alias of the rejected entry.
        alias: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Structural problems found while validating a serialized layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Layout is not a JSON object")]
    NotAnObject,

    #[error("Missing layout version")]
    MissingVersion,

    #[error("Invalid layout version: {0}")]
    InvalidVersion(String),

    #[error("Missing layout date")]
    MissingDate,

    #[error("Invalid layout date: {0}")]
    InvalidDate(String),

    #[error("Missing layers")]
    MissingLayers,

    #[error("Layout has no layers")]
    EmptyLayers,

    #[error("Layer {layer}: {reason}")]
    InvalidLayer {
        /// Index of the offending layer.
        layer: usize,
        /// What is wrong with it.
        reason: String,
    },

    #[error("Layer {layer}, component {component}: {reason}")]
    InvalidComponent {
        /// Index of the layer holding the component.
        layer: usize,
        /// Index of the component within the layer.
        component: usize,
        /// What is wrong with it.
        reason: String,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Failures of the migration chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpgradeError {
    #[error("Layout has no readable version")]
    MissingVersion,

    #[error("Layout version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u64,
        /// Highest version this build understands.
        supported: u64,
    },

    #[error("Malformed layout during upgrade: {0}")]
    Malformed(String),
}

/// Main error type for TrackPlan
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upgrade(#[from] UpgradeError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// True for refused structural edits (group or connection invariants).
    pub fn is_refused_edit(&self) -> bool {
        matches!(self, Error::Group(_) | Error::Connection(_))
    }

    /// True for import failures: the document must not be built.
    pub fn is_rejected_import(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Upgrade(_) | Error::Json(_)
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
