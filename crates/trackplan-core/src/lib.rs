//! # TrackPlan Core
//!
//! Core types, traits, and utilities for TrackPlan.
//! Provides pose math at single-precision resolution, stable identifiers for
//! pieces, groups, connections and layers, length units, and the error
//! taxonomy shared by every other crate in the workspace.

pub mod constants;
pub mod error;
pub mod pose;
pub mod types;
pub mod units;

pub use error::{
    CatalogError, ConnectionError, Error, GroupError, LayoutError, Result, UpgradeError,
    ValidationError,
};

pub use pose::{fround, normalize_angle, Point, Pose};

pub use types::{ConnectionId, GroupId, LayerId, Node, PieceId};

pub use units::LengthUnit;
