//! Piece catalog.
//!
//! The catalog maps a type alias (the `type` field of a serialized component)
//! to the geometry every instance of that type starts from: footprint, kind,
//! and connector offsets. The layout engine only reads it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};
use trackplan_core::{CatalogError, Error, Result};

use crate::offset::ConnectorOffset;

/// Connector type used by all built-in track pieces.
pub const RAIL_CONNECTOR: &str = "rail";

/// Alias of the built-in baseplate.
pub const BASEPLATE_ALIAS: &str = "baseplate";

/// Alias of the built-in free-form shape.
pub const SHAPE_ALIAS: &str = "shape";

/// Broad family of a piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Track,
    Baseplate,
    Shape,
}

/// One connector of a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSpec {
    pub offset: ConnectorOffset,
    #[serde(rename = "type", default = "default_connector_kind")]
    pub kind: String,
    #[serde(default)]
    pub next_connection_index: usize,
}

fn default_connector_kind() -> String {
    RAIL_CONNECTOR.to_string()
}

impl ConnectorSpec {
    pub fn rail(offset: ConnectorOffset, next_connection_index: usize) -> Self {
        Self {
            offset,
            kind: RAIL_CONNECTOR.to_string(),
            next_connection_index,
        }
    }
}

/// Everything the engine needs to instantiate a piece type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub alias: String,
    pub name: String,
    pub kind: PieceKind,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub connectors: Vec<ConnectorSpec>,
}

impl CatalogEntry {
    fn check(&self) -> std::result::Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidEntry {
            alias: self.alias.clone(),
            reason: reason.to_string(),
        };
        if self.alias.trim().is_empty() {
            return Err(invalid("alias must not be blank"));
        }
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(invalid("width and height must be positive"));
        }
        if self
            .connectors
            .iter()
            .any(|c| c.next_connection_index >= self.connectors.len())
        {
            return Err(invalid("nextConnectionIndex out of range"));
        }
        Ok(())
    }
}

/// Read-only registry of piece types, keyed by alias.
#[derive(Debug, Clone, Default)]
pub struct PieceCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl PieceCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog: straight, curve, crossing, buffer, baseplate and shape.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for entry in standard_entries() {
            catalog.entries.insert(entry.alias.clone(), entry);
        }
        catalog
    }

    /// Adds an entry; aliases must be unique.
    pub fn register(&mut self, entry: CatalogEntry) -> std::result::Result<(), CatalogError> {
        entry.check()?;
        if self.entries.contains_key(&entry.alias) {
            return Err(CatalogError::DuplicateType(entry.alias));
        }
        self.entries.insert(entry.alias.clone(), entry);
        Ok(())
    }

    /// Registers every entry of a JSON array of catalog entries.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        let count = entries.len();
        for entry in entries {
            self.register(entry).map_err(Error::from)?;
        }
        Ok(count)
    }

    pub fn get(&self, alias: &str) -> Option<&CatalogEntry> {
        self.entries.get(alias)
    }

    pub fn resolve(&self, alias: &str) -> std::result::Result<&CatalogEntry, CatalogError> {
        self.get(alias)
            .ok_or_else(|| CatalogError::UnknownType(alias.to_string()))
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All aliases, sorted.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }
}

/// Track gauge width in pixels (8 studs).
const TRACK_WIDTH: f64 = 128.0;
/// Straight length in pixels (16 studs).
const STRAIGHT_LENGTH: f64 = 256.0;
/// R40 curve radius in pixels.
const CURVE_RADIUS: f64 = 640.0;
/// Sweep of one curve segment (16 make a circle).
const CURVE_SWEEP: f64 = PI / 8.0;

fn standard_entries() -> Vec<CatalogEntry> {
    let half = STRAIGHT_LENGTH / 2.0;
    let half_chord = CURVE_RADIUS * (CURVE_SWEEP / 2.0).sin();
    let sagitta = CURVE_RADIUS * (1.0 - (CURVE_SWEEP / 2.0).cos());

    vec![
        CatalogEntry {
            alias: "straight".to_string(),
            name: "Straight".to_string(),
            kind: PieceKind::Track,
            width: STRAIGHT_LENGTH,
            height: TRACK_WIDTH,
            connectors: vec![
                ConnectorSpec::rail(ConnectorOffset::new(half, 0.0, 0.0), 1),
                ConnectorSpec::rail(ConnectorOffset::new(half, PI, PI), 0),
            ],
        },
        CatalogEntry {
            alias: "curve".to_string(),
            name: "Curve R40".to_string(),
            kind: PieceKind::Track,
            width: 2.0 * half_chord,
            height: TRACK_WIDTH + sagitta,
            connectors: vec![
                ConnectorSpec::rail(ConnectorOffset::new(half_chord, 0.0, CURVE_SWEEP / 2.0), 1),
                ConnectorSpec::rail(
                    ConnectorOffset::new(half_chord, PI, PI - CURVE_SWEEP / 2.0),
                    0,
                ),
            ],
        },
        CatalogEntry {
            alias: "crossing".to_string(),
            name: "Crossing".to_string(),
            kind: PieceKind::Track,
            width: STRAIGHT_LENGTH,
            height: STRAIGHT_LENGTH,
            connectors: vec![
                ConnectorSpec::rail(ConnectorOffset::new(half, 0.0, 0.0), 1),
                ConnectorSpec::rail(ConnectorOffset::new(half, PI, PI), 0),
                ConnectorSpec::rail(ConnectorOffset::new(half, FRAC_PI_2, FRAC_PI_2), 3),
                ConnectorSpec::rail(ConnectorOffset::new(half, -FRAC_PI_2, -FRAC_PI_2), 2),
            ],
        },
        CatalogEntry {
            alias: "buffer".to_string(),
            name: "Buffer Stop".to_string(),
            kind: PieceKind::Track,
            width: 64.0,
            height: TRACK_WIDTH,
            connectors: vec![ConnectorSpec::rail(ConnectorOffset::new(32.0, PI, PI), 0)],
        },
        CatalogEntry {
            alias: BASEPLATE_ALIAS.to_string(),
            name: "Baseplate".to_string(),
            kind: PieceKind::Baseplate,
            width: 512.0,
            height: 512.0,
            connectors: Vec::new(),
        },
        CatalogEntry {
            alias: SHAPE_ALIAS.to_string(),
            name: "Shape".to_string(),
            kind: PieceKind::Shape,
            width: 160.0,
            height: 160.0,
            connectors: Vec::new(),
        },
    ]
}
