//! Undo/redo history.

use crate::commands::{Command, OpcodeOutput};
use crate::store::NoduleStore;
use easel_core::Result;

/// Done and undone command stacks.
///
/// The done stack, read bottom to top, is the construction's script.
#[derive(Debug, Default)]
pub struct CommandHistory {
    done: Vec<Box<dyn Command>>,
    undone: Vec<Box<dyn Command>>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves state, applies and records `command`; clears the redo stack.
    ///
    /// A command whose `apply` fails is dropped and nothing is recorded.
    pub fn execute(&mut self, mut command: Box<dyn Command>, store: &mut NoduleStore) -> Result<()> {
        command.save_state(store);
        command.apply(store)?;
        tracing::debug!(command = command.name(), "Executed");
        self.done.push(command);
        self.undone.clear();
        Ok(())
    }

    /// Reverts the most recent command. `Ok(false)` when there is none.
    pub fn undo(&mut self, store: &mut NoduleStore) -> Result<bool> {
        let Some(mut command) = self.done.pop() else {
            return Ok(false);
        };
        if let Err(e) = command.restore_state(store) {
            self.done.push(command);
            return Err(e);
        }
        tracing::debug!(command = command.name(), "Undone");
        self.undone.push(command);
        Ok(true)
    }

    /// Re-applies the most recently undone command. `Ok(false)` when there is none.
    pub fn redo(&mut self, store: &mut NoduleStore) -> Result<bool> {
        let Some(mut command) = self.undone.pop() else {
            return Ok(false);
        };
        if let Err(e) = command.apply(store) {
            self.undone.push(command);
            return Err(e);
        }
        tracing::debug!(command = command.name(), "Redone");
        self.done.push(command);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.done.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.undone.len()
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }

    /// Opcode lines of the done stack, oldest first; transient commands are skipped.
    pub fn to_script(&self, store: &NoduleStore) -> Vec<String> {
        self.done
            .iter()
            .filter_map(|c| c.to_opcode(store))
            .flat_map(OpcodeOutput::into_lines)
            .collect()
    }
}
