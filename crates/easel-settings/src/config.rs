//! Configuration and settings management for Spherical Easel
//!
//! Provides configuration file handling, defaults and validation.
//! Supports JSON and TOML file formats stored in the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Construction settings (tolerance, sampling, default styles)
//! - Logging preferences
//! - File defaults (author, recent files)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use easel_core::{AngleUnits, Style, DEFAULT_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config dir
const APP_DIR: &str = "spherical-easel";

/// Default config file name
const CONFIG_FILE: &str = "config.toml";

/// Construction engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionSettings {
    /// Numerical tolerance for geometric predicates
    pub tolerance: f64,
    /// Number of samples taken along parametric curves
    pub parametric_samples: usize,
    /// Show labels of newly created objects
    pub show_labels: bool,
    /// Units used when printing angles
    pub angle_units: AngleUnits,
    /// Style given to new points
    pub point_style: Style,
    /// Style given to new lines, segments, circles and curves
    pub curve_style: Style,
}

impl Default for ConstructionSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            parametric_samples: 64,
            show_labels: true,
            angle_units: AngleUnits::Degrees,
            point_style: Style::point(),
            curve_style: Style::curve(),
        }
    }
}

/// Logging preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// File handling defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    /// Author recorded in new construction files
    pub default_author: String,
    /// Number of recent files to remember
    pub recent_files_count: usize,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            default_author: String::new(),
            recent_files_count: 10,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Recent files list
    pub recent_files: Vec<PathBuf>,
    /// Construction engine settings
    pub construction: ConstructionSettings,
    /// Logging preferences
    pub logging: LoggingSettings,
    /// File defaults
    pub files: FileSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config file location (`<config_dir>/spherical-easel/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the config from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded settings");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let construction = &self.construction;
        if !(construction.tolerance > 0.0 && construction.tolerance < 1e-2) {
            return Err(ConfigError::ValueOutOfRange {
                key: "construction.tolerance".to_string(),
                value: construction.tolerance.to_string(),
            }
            .into());
        }

        if construction.parametric_samples < 2 {
            return Err(ConfigError::ValueOutOfRange {
                key: "construction.parametric_samples".to_string(),
                value: construction.parametric_samples.to_string(),
            }
            .into());
        }

        for (key, style) in [
            ("construction.point_style", &construction.point_style),
            ("construction.curve_style", &construction.curve_style),
        ] {
            if !style.is_valid() {
                return Err(SettingsError::InvalidSetting {
                    key: key.to_string(),
                    reason: "stroke width, opacity or dashes out of range".to_string(),
                });
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "logging.level".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.files.recent_files_count == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "files.recent_files_count".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Add file to recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|f| f != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.files.recent_files_count);
    }
}

/// Supported on-disk formats, chosen by file extension
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
        }
    }
}
