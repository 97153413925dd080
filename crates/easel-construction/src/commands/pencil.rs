//! Pencils: families of perpendiculars through several points to one curve.

use super::{AddNoduleCommand, Command, CommandGroup, OpcodeOutput};
use crate::nodule::NoduleId;
use crate::store::{NoduleStore, Pencil};
use easel_core::Result;

/// Records a pencil in the store's registry.
///
/// The member lines are ordinary nodules created by their own commands;
/// only the grouping is registered here. It has no opcode: a replayed
/// script recreates the perpendiculars from their `AddPerpendicularLine`
/// lines, without the pencil entry.
#[derive(Debug, Clone)]
pub struct AddPencilCommand {
    pencil: Pencil,
}

impl AddPencilCommand {
    pub fn new(pencil: Pencil) -> Self {
        Self { pencil }
    }

    /// Builds the perpendiculars from each of `points` to `curve` and the
    /// pencil that groups them, as one undoable step.
    pub fn with_perpendiculars(
        store: &mut NoduleStore,
        curve: NoduleId,
        points: &[NoduleId],
    ) -> Result<CommandGroup> {
        let mut commands: Vec<Box<dyn Command>> = Vec::with_capacity(points.len() + 1);
        let mut lines = Vec::with_capacity(points.len());
        for point in points {
            let line = AddNoduleCommand::perpendicular_line(store, *point, curve)?;
            lines.push(line.nodule_id());
            commands.push(Box::new(line));
        }

        let name = format!("Pencil{}", store.pencils().len() + 1);
        commands.push(Box::new(Self::new(Pencil {
            name,
            curve,
            lines,
        })));
        Ok(CommandGroup::new("Add Pencil", commands))
    }
}

impl Command for AddPencilCommand {
    fn name(&self) -> &str {
        "Add Pencil"
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        store.add_pencil(self.pencil.clone());
        Ok(())
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        store.remove_pencil(&self.pencil.name);
        Ok(())
    }

    fn to_opcode(&self, _store: &NoduleStore) -> Option<OpcodeOutput> {
        None
    }
}
