//! Composite commands applied and reverted as one step.

use super::{Command, OpcodeOutput};
use crate::store::NoduleStore;
use easel_core::Result;

/// An ordered batch of commands.
///
/// Sub-commands save their state just before their own first `apply`, so
/// later members see the effects of earlier ones. Undo runs in reverse.
#[derive(Debug)]
pub struct CommandGroup {
    name: String,
    commands: Vec<Box<dyn Command>>,
    applied_once: bool,
}

impl CommandGroup {
    pub fn new(name: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            name: name.into(),
            commands,
            applied_once: false,
        }
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Reverts the first `count` members after a failed apply.
    fn unwind(&mut self, store: &mut NoduleStore, count: usize) {
        for command in self.commands[..count].iter_mut().rev() {
            if let Err(e) = command.restore_state(store) {
                tracing::warn!(command = command.name(), error = %e, "Rollback failed");
            }
        }
    }
}

impl Command for CommandGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        let first = !self.applied_once;
        for index in 0..self.commands.len() {
            let command = &mut self.commands[index];
            if first {
                command.save_state(store);
            }
            if let Err(e) = command.apply(store) {
                self.unwind(store, index);
                return Err(e);
            }
        }
        self.applied_once = true;
        Ok(())
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        for command in self.commands.iter_mut().rev() {
            command.restore_state(store)?;
        }
        Ok(())
    }

    fn to_opcode(&self, store: &NoduleStore) -> Option<OpcodeOutput> {
        let lines: Vec<String> = self
            .commands
            .iter()
            .filter_map(|c| c.to_opcode(store))
            .flat_map(OpcodeOutput::into_lines)
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(OpcodeOutput::Lines(lines))
        }
    }
}
