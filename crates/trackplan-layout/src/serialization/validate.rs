//! Structural validation of raw layout documents.

use std::collections::HashSet;

use chrono::DateTime;
use serde_json::{Map, Value};
use trackplan_core::constants::LAYOUT_FORMAT_VERSION;
use trackplan_core::{ConnectionId, GroupId, LengthUnit, ValidationError};

use crate::catalog::{CatalogEntry, PieceCatalog, PieceKind};
use crate::offset::ConnectorOffset;
use crate::settings::EditorSettings;

/// Checks a raw layout document against the current schema.
///
/// Piece types are resolved against `catalog`; a component whose type is
/// blank or unknown fails, as does any component whose connection list does
/// not match its catalog entry.
pub fn validate_layout(data: &Value, catalog: &PieceCatalog) -> Result<(), ValidationError> {
    let root = data.as_object().ok_or(ValidationError::NotAnObject)?;

    let version = root.get("version").ok_or(ValidationError::MissingVersion)?;
    match version.as_u64() {
        Some(v) if (1..=LAYOUT_FORMAT_VERSION).contains(&v) => {}
        _ => return Err(ValidationError::InvalidVersion(version.to_string())),
    }

    let date = root.get("date").ok_or(ValidationError::MissingDate)?;
    let date_ok = match date {
        Value::String(text) => DateTime::parse_from_rfc3339(text).is_ok(),
        Value::Number(n) => n.as_u64().is_some(),
        _ => false,
    };
    if !date_ok {
        return Err(ValidationError::InvalidDate(date.to_string()));
    }

    for key in ["x", "y", "zoom"] {
        if let Some(value) = root.get(key) {
            if !value.is_number() {
                return Err(ValidationError::InvalidConfig(format!(
                    "'{}' must be a number",
                    key
                )));
            }
        }
    }

    if let Some(config) = root.get("config") {
        if !config.is_object() {
            return Err(ValidationError::InvalidConfig(
                "config must be an object".to_string(),
            ));
        }
        serde_json::from_value::<EditorSettings>(config.clone())
            .map_err(|e| ValidationError::InvalidConfig(e.to_string()))?;
    }

    let layers = root
        .get("layers")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingLayers)?;
    if layers.is_empty() {
        return Err(ValidationError::EmptyLayers);
    }

    let mut ids = SeenIds::default();
    for (index, layer) in layers.iter().enumerate() {
        validate_layer(index, layer, catalog, &mut ids)?;
    }
    Ok(())
}

/// [`validate_layout`] as a plain yes/no answer.
pub fn is_valid_layout(data: &Value, catalog: &PieceCatalog) -> bool {
    validate_layout(data, catalog).is_ok()
}

/// Ids seen so far; uuids must be unique across the whole document.
#[derive(Default)]
struct SeenIds {
    connections: HashSet<ConnectionId>,
    groups: HashSet<GroupId>,
}

fn validate_layer(
    index: usize,
    layer: &Value,
    catalog: &PieceCatalog,
    ids: &mut SeenIds,
) -> Result<(), ValidationError> {
    let fail = |reason: String| ValidationError::InvalidLayer {
        layer: index,
        reason,
    };
    let layer = layer
        .as_object()
        .ok_or_else(|| fail("not an object".to_string()))?;

    if layer.get("name").is_some_and(|v| !v.is_string()) {
        return Err(fail("name must be a string".to_string()));
    }
    if layer.get("visible").is_some_and(|v| !v.is_boolean()) {
        return Err(fail("visible must be a boolean".to_string()));
    }

    let mut declared = HashSet::new();
    if let Some(groups) = layer.get("groups") {
        let groups = groups
            .as_array()
            .ok_or_else(|| fail("groups must be an array".to_string()))?;
        for group in groups {
            let uuid = group
                .get("uuid")
                .and_then(parse_id::<GroupId>)
                .ok_or_else(|| fail("group without a valid uuid".to_string()))?;
            if !ids.groups.insert(uuid) {
                return Err(fail(format!("duplicate group uuid {}", uuid)));
            }
            if let Some(parent) = group.get("group") {
                if parse_id::<GroupId>(parent).is_none() {
                    return Err(fail(format!("group {} has an invalid parent", uuid)));
                }
            }
            declared.insert(uuid);
        }
    }

    let Some(components) = layer.get("components") else {
        return Ok(());
    };
    let components = components
        .as_array()
        .ok_or_else(|| fail("components must be an array".to_string()))?;
    for (component, data) in components.iter().enumerate() {
        validate_component(data, catalog, &declared, ids).map_err(|reason| {
            ValidationError::InvalidComponent {
                layer: index,
                component,
                reason,
            }
        })?;
    }
    Ok(())
}

fn validate_component(
    data: &Value,
    catalog: &PieceCatalog,
    declared_groups: &HashSet<GroupId>,
    ids: &mut SeenIds,
) -> Result<(), String> {
    let component = data.as_object().ok_or("not an object")?;

    let alias = match component.get("type") {
        Some(Value::String(alias)) if !alias.trim().is_empty() => alias,
        Some(Value::String(_)) => return Err("blank type".to_string()),
        _ => return Err("missing type".to_string()),
    };
    let entry = catalog
        .get(alias)
        .ok_or_else(|| format!("unknown type '{}'", alias))?;

    let pose = component
        .get("pose")
        .and_then(Value::as_object)
        .ok_or("missing pose")?;
    for key in ["x", "y", "angle"] {
        if !pose.get(key).and_then(Value::as_f64).is_some_and(f64::is_finite) {
            return Err(format!("missing or invalid pose.{}", key));
        }
    }

    validate_connections(component, entry, ids)?;

    if let Some(group) = component.get("group") {
        let group = parse_id::<GroupId>(group).ok_or("invalid group uuid")?;
        if !declared_groups.contains(&group) {
            return Err(format!("group {} is not declared on the layer", group));
        }
    }

    if let Some(units) = component.get("units") {
        serde_json::from_value::<LengthUnit>(units.clone())
            .map_err(|_| format!("unknown units {}", units))?;
    }

    match entry.kind {
        PieceKind::Track => Ok(()),
        PieceKind::Baseplate => require_numbers(component, &["width", "height"]),
        PieceKind::Shape => validate_shape(component),
    }
}

fn validate_connections(
    component: &Map<String, Value>,
    entry: &CatalogEntry,
    ids: &mut SeenIds,
) -> Result<(), String> {
    let connections = match component.get("connections") {
        Some(Value::Array(connections)) => connections.as_slice(),
        Some(_) => return Err("connections must be an array".to_string()),
        None if entry.connectors.is_empty() => return Ok(()),
        None => return Err("missing connections".to_string()),
    };
    if connections.len() != entry.connectors.len() {
        return Err(format!(
            "expected {} connections, found {}",
            entry.connectors.len(),
            connections.len()
        ));
    }

    for (index, connection) in connections.iter().enumerate() {
        let connection = connection
            .as_object()
            .ok_or_else(|| format!("connection {} is not an object", index))?;
        let uuid = connection
            .get("uuid")
            .and_then(parse_id::<ConnectionId>)
            .ok_or_else(|| format!("connection {} has no valid uuid", index))?;
        if !ids.connections.insert(uuid) {
            return Err(format!("duplicate connection uuid {}", uuid));
        }
        match connection.get("otherConnection") {
            Some(Value::String(other)) if other.is_empty() => {}
            Some(other @ Value::String(_)) if parse_id::<ConnectionId>(other).is_some() => {}
            _ => {
                return Err(format!(
                    "connection {} has no valid otherConnection",
                    index
                ))
            }
        }
        if let Some(offset) = connection.get("offset") {
            serde_json::from_value::<ConnectorOffset>(offset.clone())
                .map_err(|e| format!("connection {} offset: {}", index, e))?;
        }
    }
    Ok(())
}

fn validate_shape(component: &Map<String, Value>) -> Result<(), String> {
    match component.get("shape").and_then(Value::as_str) {
        Some("rectangle") | Some("circle") => {
            require_numbers(component, &["width", "height"])?;
            require_string(component, "color")
        }
        Some("text") => {
            require_string(component, "text")?;
            require_numbers(component, &["fontSize"])?;
            require_string(component, "color")
        }
        Some(other) => Err(format!("unknown shape '{}'", other)),
        None => Err("missing shape".to_string()),
    }
}

fn require_numbers(component: &Map<String, Value>, keys: &[&str]) -> Result<(), String> {
    for key in keys {
        if !component.get(*key).is_some_and(Value::is_number) {
            return Err(format!("missing or invalid {}", key));
        }
    }
    Ok(())
}

fn require_string(component: &Map<String, Value>, key: &str) -> Result<(), String> {
    if component.get(key).is_some_and(Value::is_string) {
        Ok(())
    } else {
        Err(format!("missing or invalid {}", key))
    }
}

fn parse_id<T: std::str::FromStr>(value: &Value) -> Option<T> {
    value.as_str().and_then(|s| s.parse().ok())
}
