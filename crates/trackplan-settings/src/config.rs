//! Configuration and settings management for TrackPlan
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform-specific config directory.
//!
//! Configuration is organized into:
//! - Editor defaults (grid snap, auto-connect, placement origin, drag threshold)
//! - An optional JSON file of extra piece types
//! - The recent layouts list

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trackplan_layout::{EditorSettings, PieceCatalog};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// File name of the configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Length of the recent files list.
pub const MAX_RECENT_FILES: usize = 10;

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// JSON file with piece types added to the built-in catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Recently opened layouts, newest first
    pub recent_files: Vec<PathBuf>,
    /// Defaults for new layouts
    pub editor: EditorSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or_default().to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/trackplan/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no config directory on this platform".to_string())
        })?;
        Ok(dir.join("trackplan").join(CONFIG_FILE_NAME))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads the config at `path`, or the defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let editor = &self.editor;
        let out_of_range = |key: &str, value: f64| ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        };

        if !editor.snap_size.is_finite() || editor.snap_size < 0.0 {
            return Err(out_of_range("editor.snapSize", editor.snap_size));
        }
        if !editor.drag_threshold.is_finite() || editor.drag_threshold < 0.0 {
            return Err(out_of_range("editor.dragThreshold", editor.drag_threshold));
        }
        if !editor.origin_x.is_finite() {
            return Err(out_of_range("editor.originX", editor.origin_x));
        }
        if !editor.origin_y.is_finite() {
            return Err(out_of_range("editor.originY", editor.origin_y));
        }
        Ok(())
    }

    /// Add file to recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|f| f != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Editor settings for a new layout.
    pub fn editor_settings(&self) -> EditorSettings {
        self.editor.clone()
    }

    /// The built-in catalog plus the piece types from `catalog_path`.
    pub fn load_catalog(&self) -> SettingsResult<PieceCatalog> {
        let mut catalog = PieceCatalog::standard();
        if let Some(path) = &self.catalog_path {
            let json = std::fs::read_to_string(path)
                .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;
            let added = catalog.extend_from_json(&json)?;
            tracing::info!("Added {} piece types from {}", added, path.display());
        }
        Ok(catalog)
    }
}
