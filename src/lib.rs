//! # TrackPlan
//!
//! A layout planner for brick-built track systems:
//! - Dock track pieces connector to connector
//! - Group, nest, move, rotate and clone pieces without breaking formations
//! - Spread a layout over layers
//! - Keep layout files current across format versions
//!
//! ## Architecture
//!
//! TrackPlan is organized as a workspace with multiple crates:
//!
//! 1. **trackplan-core** - Pose math, identifiers, units, errors
//! 2. **trackplan-layout** - Catalog, pieces, connections, groups, layers, layout files
//! 3. **trackplan-settings** - Editor configuration file
//! 4. **trackplan** - Command line front end that integrates all crates

pub mod cli;

pub use trackplan_core::{
    ConnectionId, Error, GroupId, LayerId, LayoutError, LengthUnit, Node, PieceId, Point, Pose,
    Result,
};

pub use trackplan_layout::{
    is_valid_layout, upgrade_layout, validate_layout, EditorSettings, Layout, LayoutDocument,
    PieceCatalog, LAYOUT_FILE_EXTENSION,
};

pub use trackplan_settings::{Config, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
///
/// Logs go to stderr so that command output on stdout stays clean.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
