//! Hard deletion of nodules.

use super::add::OBJECT_NAME;
use super::{name_of, resolve_field, Command, CommandGroup, ObjectNameMap, OpcodeOutput};
use crate::nodule::{Nodule, NoduleId, NoduleKind};
use crate::script::OpcodeRecord;
use crate::store::NoduleStore;
use easel_core::{GraphError, Result};

pub(crate) const DELETE_NODULE: &str = "DeleteNodule";

/// Removes a nodule whose only children are its own labels; undo
/// re-inserts it and the labels with their edges.
#[derive(Debug, Clone)]
pub struct DeleteNoduleCommand {
    nodule: NoduleId,
    removed: Option<Nodule>,
    removed_labels: Vec<Nodule>,
    /// Index of the nodule in each parent's children before removal.
    slots: Vec<(NoduleId, usize)>,
}

impl DeleteNoduleCommand {
    pub fn new(nodule: NoduleId) -> Self {
        Self {
            nodule,
            removed: None,
            removed_labels: Vec::new(),
            slots: Vec::new(),
        }
    }

    fn own_labels(store: &NoduleStore, nodule: NoduleId) -> Result<Vec<NoduleId>> {
        let target = store.require(nodule)?;
        let labels: Vec<NoduleId> = target
            .children
            .iter()
            .copied()
            .filter(|c| {
                store
                    .get(*c)
                    .is_some_and(|n| matches!(&n.kind, NoduleKind::Label(l) if l.owner == nodule))
            })
            .collect();
        if labels.len() != target.children.len() {
            return Err(GraphError::HasDescendants {
                name: target.name.clone(),
                count: target.children.len() - labels.len(),
            }
            .into());
        }
        Ok(labels)
    }
}

impl Command for DeleteNoduleCommand {
    fn name(&self) -> &str {
        "Delete"
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        let labels = Self::own_labels(store, self.nodule)?;
        let slots = store
            .require(self.nodule)?
            .parents
            .iter()
            .filter_map(|p| {
                let parent = store.get(*p)?;
                let index = parent.children.iter().position(|c| *c == self.nodule)?;
                Some((*p, index))
            })
            .collect();
        let mut removed_labels = Vec::with_capacity(labels.len());
        for label in labels {
            removed_labels.push(store.remove_entity(label)?);
        }
        let removed = store.remove_entity(self.nodule)?;
        tracing::debug!(name = %removed.name, "Deleted nodule");
        self.removed = Some(removed);
        self.removed_labels = removed_labels;
        self.slots = slots;
        Ok(())
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        let Some(nodule) = self.removed.take() else {
            return Ok(());
        };
        let parents = nodule.parents.clone();
        store.add_entity(nodule)?;
        for parent in parents {
            let index = self
                .slots
                .iter()
                .find(|(p, _)| *p == parent)
                .map_or(usize::MAX, |(_, i)| *i);
            store.register_child_at(parent, self.nodule, index)?;
        }
        for label in std::mem::take(&mut self.removed_labels) {
            let id = label.id;
            store.add_entity(label)?;
            store.register_child(self.nodule, id)?;
        }
        store.update_from(&[self.nodule]);
        Ok(())
    }

    fn to_opcode(&self, store: &NoduleStore) -> Option<OpcodeOutput> {
        let record = OpcodeRecord::new(DELETE_NODULE)
            .with_text(OBJECT_NAME, &name_of(store, self.nodule));
        Some(OpcodeOutput::Line(record.encode()))
    }
}

/// Deletes `nodule` and everything that depends on it, children first.
pub fn delete_with_descendants(store: &NoduleStore, nodule: NoduleId) -> Result<CommandGroup> {
    let root = store.require(nodule)?;
    let name = format!("Delete {}", root.name);
    let closure = store.descendants_of(&[nodule]);
    let commands = store
        .topological_order(&closure)
        .into_iter()
        .rev()
        .map(|id| Box::new(DeleteNoduleCommand::new(id)) as Box<dyn Command>)
        .collect();
    Ok(CommandGroup::new(name, commands))
}

pub(crate) fn parse_delete(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let nodule = resolve_field(record, OBJECT_NAME, names, store, &[])?;
    let labels = store
        .get(nodule)
        .map(|n| n.children.clone())
        .unwrap_or_default();
    names.retain(|_, id| *id != nodule && !labels.contains(id));
    Ok(Box::new(DeleteNoduleCommand::new(nodule)))
}
