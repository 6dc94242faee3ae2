//! Migration chain for older layout documents.
//!
//! Each step takes a document at version `n` to `n + 1` in place. Steps work
//! on raw JSON because older documents do not fit the current types.

use chrono::Utc;
use serde_json::{Map, Value};
use trackplan_core::constants::LAYOUT_FORMAT_VERSION;
use trackplan_core::{LengthUnit, UpgradeError};

use crate::catalog::{BASEPLATE_ALIAS, SHAPE_ALIAS};

type UpgradeStep = fn(&mut Map<String, Value>) -> Result<(), UpgradeError>;

/// Steps keyed by the version they upgrade from.
const STEPS: [(u64, UpgradeStep); 1] = [(1, upgrade_v1_to_v2)];

/// Brings a layout document up to the current format version.
///
/// Returns `Ok(false)` when the document is already current. Documents from
/// a newer version are rejected.
pub fn upgrade_layout(data: &mut Value) -> Result<bool, UpgradeError> {
    let root = data
        .as_object_mut()
        .ok_or_else(|| UpgradeError::Malformed("layout is not an object".to_string()))?;
    let found = root
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(UpgradeError::MissingVersion)?;

    if found > LAYOUT_FORMAT_VERSION {
        return Err(UpgradeError::UnsupportedVersion {
            found,
            supported: LAYOUT_FORMAT_VERSION,
        });
    }
    if found == LAYOUT_FORMAT_VERSION {
        return Ok(false);
    }

    let mut version = found;
    for (from, step) in STEPS {
        if version == from {
            step(root)?;
            version = from + 1;
            root.insert("version".to_string(), Value::from(version));
            tracing::debug!("Upgraded layout from version {} to {}", from, version);
        }
    }
    if version != LAYOUT_FORMAT_VERSION {
        return Err(UpgradeError::Malformed(format!(
            "no upgrade path from version {}",
            found
        )));
    }
    Ok(true)
}

/// Version 2 stores the length unit of baseplates and shapes. Version 1
/// files get one inferred from the dimensions.
fn upgrade_v1_to_v2(root: &mut Map<String, Value>) -> Result<(), UpgradeError> {
    if let Some(layers) = root.get_mut("layers").and_then(Value::as_array_mut) {
        for layer in layers {
            let Some(components) = layer.get_mut("components").and_then(Value::as_array_mut)
            else {
                continue;
            };
            for component in components.iter_mut().filter_map(Value::as_object_mut) {
                backfill_units(component);
            }
        }
    }

    if !root.contains_key("date") {
        root.insert("date".to_string(), Value::from(Utc::now().to_rfc3339()));
    }
    if !root.contains_key("config") {
        root.insert("config".to_string(), Value::Object(Map::new()));
    }
    Ok(())
}

fn backfill_units(component: &mut Map<String, Value>) {
    if component.contains_key("units") {
        return;
    }
    let alias = component.get("type").and_then(Value::as_str).unwrap_or_default();
    let fallback = if alias == SHAPE_ALIAS || component.contains_key("shape") {
        LengthUnit::Millimeters
    } else if alias == BASEPLATE_ALIAS {
        LengthUnit::Studs
    } else {
        return;
    };

    let width = component.get("width").and_then(Value::as_f64);
    let height = component.get("height").and_then(Value::as_f64);
    let unit = match (width, height) {
        (Some(width), Some(height)) => LengthUnit::infer(width, height).unwrap_or(fallback),
        _ => fallback,
    };
    component.insert("units".to_string(), Value::from(unit.as_str()));
}
