//! File operations behind the `trackplan` subcommands.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::Value;
use trackplan_layout::{upgrade_layout, validate_layout, Layout, LayoutDocument, PieceCatalog};

/// Counts of one layer of a loaded layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub name: String,
    pub visible: bool,
    pub pieces: usize,
    pub open_connections: usize,
}

/// What `info` prints about a layout file.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSummary {
    pub version: u64,
    pub saved: Option<String>,
    pub pieces: usize,
    pub groups: usize,
    pub layers: Vec<LayerSummary>,
}

impl fmt::Display for LayoutSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format version: {}", self.version)?;
        if let Some(saved) = &self.saved {
            writeln!(f, "Saved: {}", saved)?;
        }
        writeln!(f, "Pieces: {}", self.pieces)?;
        writeln!(f, "Groups: {}", self.groups)?;
        for layer in &self.layers {
            writeln!(
                f,
                "  {}{}: {} pieces, {} open connections",
                layer.name,
                if layer.visible { "" } else { " (hidden)" },
                layer.pieces,
                layer.open_connections
            )?;
        }
        Ok(())
    }
}

/// Loads a layout file into a live layout and checks its invariants.
pub fn check_file(path: &Path, catalog: Arc<PieceCatalog>) -> anyhow::Result<Layout> {
    let layout = Layout::load(path, catalog)?;
    let problems = layout.audit();
    if !problems.is_empty() {
        bail!(
            "{} is inconsistent after loading:\n  {}",
            path.display(),
            problems.join("\n  ")
        );
    }
    Ok(layout)
}

/// Upgrades a layout file to the current format version.
///
/// Writes to `output`, or back to `input` when no output is given. A current
/// file is left untouched unless an output path is given. Returns whether the
/// document needed an upgrade.
pub fn upgrade_file(
    input: &Path,
    output: Option<&Path>,
    catalog: &PieceCatalog,
) -> anyhow::Result<bool> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read layout file {}", input.display()))?;
    let mut value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse layout file {}", input.display()))?;

    let upgraded = upgrade_layout(&mut value)
        .with_context(|| format!("Cannot upgrade {}", input.display()))?;
    validate_layout(&value, catalog)
        .with_context(|| format!("Upgraded layout {} is invalid", input.display()))?;

    if upgraded || output.is_some() {
        let target = output.unwrap_or(input);
        let json = serde_json::to_string_pretty(&value).context("Failed to serialize layout")?;
        std::fs::write(target, json)
            .with_context(|| format!("Failed to write layout file {}", target.display()))?;
        tracing::info!("Wrote {}", target.display());
    }
    Ok(upgraded)
}

/// Reads a layout file and summarizes it.
pub fn summarize_file(path: &Path, catalog: Arc<PieceCatalog>) -> anyhow::Result<LayoutSummary> {
    let document = LayoutDocument::load_from_file(path, &catalog)?;
    let layout = Layout::from_document(&document, catalog)?;

    let layers = layout
        .layers()
        .iter()
        .map(|layer| LayerSummary {
            name: layer.name().to_string(),
            visible: layer.is_visible(),
            pieces: layer.children().len(),
            open_connections: layer.open_connections().len(),
        })
        .collect();

    Ok(LayoutSummary {
        version: document.version,
        saved: document.date.to_datetime().map(|d| d.to_rfc3339()),
        pieces: layout.piece_count(),
        groups: layout.group_count(),
        layers,
    })
}
