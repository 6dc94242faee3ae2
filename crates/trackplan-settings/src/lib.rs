//! TrackPlan Settings Crate
//!
//! Handles the editor configuration file: grid, auto-connect and placement
//! defaults, the extra piece catalog and the recent files list.

pub mod config;
pub mod error;

pub use config::{Config, CONFIG_FILE_NAME, MAX_RECENT_FILES};
pub use error::{ConfigError, SettingsError, SettingsResult};
