//! Spherical Easel Settings Crate
//!
//! Handles application configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{Config, ConstructionSettings, FileSettings, LoggingSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
