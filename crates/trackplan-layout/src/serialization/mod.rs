//! Layout files.
//!
//! A layout on disk is a JSON document. Loading goes raw JSON →
//! [`upgrade_layout`] → [`validate_layout`] → [`LayoutDocument`] →
//! [`Layout`](crate::Layout); nothing is built from a document that failed
//! validation.
//!
//! Schema (version 2):
//!
//! ```text
//! { version, date, x?, y?, zoom?,
//!   layers: [ { name?, visible?, components: [...], groups?: [ {uuid, group?} ] } ],
//!   config }
//! ```

mod convert;
mod upgrade;
mod validate;

pub use convert::{Fragment, FragmentRoot, IdPolicy};
pub use upgrade::upgrade_layout;
pub use validate::{is_valid_layout, validate_layout};

use anyhow::{Context, Result as AnyResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use trackplan_core::constants::LAYOUT_FORMAT_VERSION;
use trackplan_core::{ConnectionId, GroupId, LengthUnit, Pose, Result};

use crate::catalog::PieceCatalog;
use crate::offset::ConnectorOffset;
use crate::piece::ShapeKind;
use crate::settings::EditorSettings;

/// File name suffix of layout documents.
pub const LAYOUT_FILE_EXTENSION: &str = "tpl.json";

/// Save date of a layout. Older files store a millisecond timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutDate {
    Text(String),
    Millis(u64),
}

impl LayoutDate {
    pub fn now() -> Self {
        LayoutDate::Text(Utc::now().to_rfc3339())
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            LayoutDate::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            LayoutDate::Millis(ms) => {
                i64::try_from(*ms)
                    .ok()
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
            }
        }
    }
}

/// A whole layout file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub version: u64,
    pub date: LayoutDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    pub layers: Vec<LayerData>,
    #[serde(default)]
    pub config: EditorSettings,
}

/// One serialized layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default)]
    pub components: Vec<ComponentData>,
    /// Present only when the layer holds at least one non-empty permanent group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupData>>,
}

/// One serialized piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentData {
    #[serde(rename = "type")]
    pub alias: String,
    pub pose: Pose,
    #[serde(default)]
    pub connections: Vec<ConnectionData>,
    /// Owning group, written only for permanent groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    /// Position among the owning group's members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
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

/// One serialized connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub uuid: ConnectionId,
    /// Partner uuid, or an empty string when open.
    #[serde(default)]
    pub other_connection: String,
    /// Per-instance override of the catalog offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<ConnectorOffset>,
}

impl ConnectionData {
    /// The linked partner, if the field holds a valid id.
    pub fn partner(&self) -> Option<ConnectionId> {
        if self.other_connection.is_empty() {
            return None;
        }
        self.other_connection.parse().ok()
    }
}

/// One serialized group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupData {
    pub uuid: GroupId,
    /// Enclosing group, if that group is serialized too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    /// Position among the enclosing group's members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_index: Option<usize>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub temporary: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl LayoutDocument {
    /// Upgrades, validates and decodes a raw JSON layout.
    pub fn from_value(mut value: Value, catalog: &PieceCatalog) -> Result<Self> {
        upgrade_layout(&mut value)?;
        validate_layout(&value, catalog)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Number of pieces across all layers.
    pub fn component_count(&self) -> usize {
        self.layers.iter().map(|l| l.components.len()).sum()
    }

    /// Save layout to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> AnyResult<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize layout")?;

        std::fs::write(path.as_ref(), json).context("Failed to write layout file")?;

        tracing::info!("Saved layout to {}", path.as_ref().display());
        Ok(())
    }

    /// Load layout from file, upgrading older versions
    pub fn load_from_file(path: impl AsRef<Path>, catalog: &PieceCatalog) -> AnyResult<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read layout file")?;

        let value: Value = serde_json::from_str(&content).context("Failed to parse layout file")?;

        let document = Self::from_value(value, catalog)
            .with_context(|| format!("Invalid layout file {}", path.as_ref().display()))?;

        tracing::info!(
            "Loaded layout from {} ({} layers, {} pieces)",
            path.as_ref().display(),
            document.layers.len(),
            document.component_count()
        );
        Ok(document)
    }
}

impl Default for LayoutDocument {
    fn default() -> Self {
        Self {
            version: LAYOUT_FORMAT_VERSION,
            date: LayoutDate::now(),
            x: None,
            y: None,
            zoom: None,
            layers: vec![LayerData::default()],
            config: EditorSettings::default(),
        }
    }
}
