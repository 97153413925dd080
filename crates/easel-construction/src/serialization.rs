//! Serialization and deserialization for construction files.
//!
//! A construction file is a JSON envelope around the opcode script that
//! rebuilds the construction, plus metadata for file browsers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Construction file format version
pub const FILE_FORMAT_VERSION: &str = "1.0";

/// Complete construction file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionFile {
    pub version: String,
    pub metadata: ConstructionMetadata,
    #[serde(default)]
    pub earth_mode: bool,
    /// Opcode lines, oldest first.
    pub script: Vec<String>,
}

/// Construction metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionMetadata {
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// Opaque preview image, typically a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl ConstructionFile {
    /// Create new, empty construction file
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: ConstructionMetadata {
                id: Uuid::new_v4(),
                name: name.into(),
                created: now,
                modified: now,
                author: String::new(),
                description: String::new(),
                thumbnail: None,
            },
            earth_mode: false,
            script: Vec::new(),
        }
    }

    /// Script as text, one opcode per line.
    pub fn script_text(&self) -> String {
        self.script.join("\n")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize construction")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: ConstructionFile =
            serde_json::from_str(json).context("Failed to parse construction file")?;
        if file.version != FILE_FORMAT_VERSION {
            tracing::warn!(
                version = %file.version,
                expected = FILE_FORMAT_VERSION,
                "Construction file version differs"
            );
        }
        Ok(file)
    }

    /// Save construction to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).with_context(|| {
            format!(
                "Failed to write construction file {}",
                path.as_ref().display()
            )
        })?;
        Ok(())
    }

    /// Load construction from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read construction file {}",
                path.as_ref().display()
            )
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_has_current_version() {
        let file = ConstructionFile::new("Lune");
        assert_eq!(file.version, FILE_FORMAT_VERSION);
        assert_eq!(file.metadata.created, file.metadata.modified);
        assert!(file.script.is_empty());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{
            "version": "1.0",
            "metadata": {
                "id": "2f1d7e0a-4f57-4a8e-9e43-1d2b3c4d5e6f",
                "name": "Old",
                "created": "2024-01-01T00:00:00Z",
                "modified": "2024-01-01T00:00:00Z"
            },
            "script": ["AddPoint&pointVector=0.000000000,0.000000000,1.000000000"]
        }"#;
        let file = ConstructionFile::from_json(json).unwrap();
        assert!(!file.earth_mode);
        assert!(file.metadata.author.is_empty());
        assert_eq!(file.metadata.thumbnail, None);
        assert_eq!(file.script.len(), 1);
    }

    #[test]
    fn test_thumbnail_is_omitted_when_absent() {
        let json = ConstructionFile::new("x").to_json().unwrap();
        assert!(!json.contains("thumbnail"));
    }
}
