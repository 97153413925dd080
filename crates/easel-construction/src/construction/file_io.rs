//! File I/O operations (save, load, new) for construction state.

use super::{Construction, UNTITLED};
use crate::commands::ObjectNameMap;
use crate::history::CommandHistory;
use crate::serialization::ConstructionFile;
use crate::store::NoduleStore;
use anyhow::Context;
use chrono::Utc;
use std::path::Path;

impl Construction {
    /// Envelope for the current state, keeping the id and creation time of
    /// the file it was loaded from.
    pub fn to_file(&self) -> ConstructionFile {
        let mut file = ConstructionFile::new(&self.name);
        if let Some(metadata) = &self.loaded_metadata {
            file.metadata.id = metadata.id;
            file.metadata.created = metadata.created;
            file.metadata.thumbnail = metadata.thumbnail.clone();
        }
        file.metadata.modified = Utc::now();
        file.metadata.author = self.author.clone();
        file.metadata.description = self.description.clone();
        file.earth_mode = self.store.earth_mode();
        file.script = self.to_script();
        file
    }

    /// Save construction to file.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let file = self.to_file();
        file.save_to_file(&path)?;

        self.loaded_metadata = Some(file.metadata);
        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.is_modified = false;
        tracing::info!(path = %path.as_ref().display(), "Construction saved");
        Ok(())
    }

    /// Replaces the construction with the contents of `file`.
    ///
    /// Atomic: on error the current construction is unchanged.
    pub fn load_file(&mut self, file: ConstructionFile) -> anyhow::Result<ObjectNameMap> {
        let mut store = NoduleStore::with_options(self.store.options().clone());
        let mut history = CommandHistory::new();
        let names = crate::script::replay(&file.script_text(), &mut history, &mut store)
            .with_context(|| format!("Failed to replay construction '{}'", file.metadata.name))?;
        // Scripts written before the mode was recorded as a command.
        if file.earth_mode && !store.earth_mode() {
            store.set_earth_mode(true);
        }

        self.store = store;
        self.history = history;
        self.name = file.metadata.name.clone();
        self.author = file.metadata.author.clone();
        self.description = file.metadata.description.clone();
        self.loaded_metadata = Some(file.metadata);
        self.is_modified = false;
        Ok(names)
    }

    /// Load construction from file.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<ObjectNameMap> {
        let file = ConstructionFile::load_from_file(&path)?;
        let names = self.load_file(file)?;
        self.current_file_path = Some(path.as_ref().to_path_buf());
        tracing::info!(
            path = %path.as_ref().display(),
            objects = self.store.len(),
            "Construction loaded"
        );
        Ok(names)
    }

    /// Create new construction (clear all).
    pub fn new_construction(&mut self) {
        self.store = NoduleStore::with_options(self.store.options().clone());
        self.history.clear();
        self.name = UNTITLED.to_string();
        self.description.clear();
        self.current_file_path = None;
        self.loaded_metadata = None;
        self.is_modified = false;
    }

    /// Mark construction as modified.
    pub fn mark_modified(&mut self) {
        self.is_modified = true;
    }

    /// Name for title bars: the file stem if saved, with `*` when modified.
    pub fn display_name(&self) -> String {
        let base = self
            .current_file_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone());
        if self.is_modified {
            format!("{}*", base)
        } else {
            base
        }
    }
}
