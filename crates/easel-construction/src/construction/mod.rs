//! Construction state manager.
//!
//! [`Construction`] ties a nodule store to its command history and tracks
//! the file it came from. Callers that want undo, persistence and a
//! modified flag go through it rather than through the store directly.
//!
//! Submodules:
//! - `file_io`: save/load/new

mod file_io;

use crate::commands::{Command, ObjectNameMap};
use crate::history::CommandHistory;
use crate::script;
use crate::serialization::ConstructionMetadata;
use crate::store::{ConstructionOptions, NoduleStore};
use easel_core::Result;
use std::path::PathBuf;

const UNTITLED: &str = "Untitled";

/// A construction being edited.
#[derive(Debug)]
pub struct Construction {
    store: NoduleStore,
    history: CommandHistory,
    pub name: String,
    pub author: String,
    pub description: String,
    pub current_file_path: Option<PathBuf>,
    pub is_modified: bool,
    /// Metadata of the file this construction was loaded from.
    pub(crate) loaded_metadata: Option<ConstructionMetadata>,
}

impl Default for Construction {
    fn default() -> Self {
        Self::new()
    }
}

impl Construction {
    pub fn new() -> Self {
        Self::with_options(ConstructionOptions::default())
    }

    pub fn with_options(options: ConstructionOptions) -> Self {
        Self {
            store: NoduleStore::with_options(options),
            history: CommandHistory::new(),
            name: UNTITLED.to_string(),
            author: String::new(),
            description: String::new(),
            current_file_path: None,
            is_modified: false,
            loaded_metadata: None,
        }
    }

    pub fn store(&self) -> &NoduleStore {
        &self.store
    }

    /// Mutable store access for building commands, which may allocate ids
    /// and names. Graph changes should still go through [`Self::execute`].
    pub fn store_mut(&mut self) -> &mut NoduleStore {
        &mut self.store
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn options(&self) -> &ConstructionOptions {
        self.store.options()
    }

    /// Executes a command and records it for undo.
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<()> {
        self.history.execute(command, &mut self.store)?;
        self.is_modified = true;
        Ok(())
    }

    pub fn undo(&mut self) -> Result<bool> {
        let undone = self.history.undo(&mut self.store)?;
        if undone {
            self.is_modified = true;
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool> {
        let redone = self.history.redo(&mut self.store)?;
        if redone {
            self.is_modified = true;
        }
        Ok(redone)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Opcode script that rebuilds the current construction.
    pub fn to_script(&self) -> Vec<String> {
        self.history.to_script(&self.store)
    }

    /// Replaces the construction with the result of replaying `text`.
    ///
    /// The replay runs against a fresh store; on any error the current
    /// construction is left exactly as it was.
    pub fn load_script(&mut self, text: &str) -> Result<ObjectNameMap> {
        let mut store = NoduleStore::with_options(self.store.options().clone());
        let mut history = CommandHistory::new();
        let names = script::replay(text, &mut history, &mut store)?;
        self.store = store;
        self.history = history;
        self.is_modified = true;
        Ok(names)
    }
}
