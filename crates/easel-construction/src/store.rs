//! Dependency graph store.
//!
//! [`NoduleStore`] owns every registered [`Nodule`], keyed by id, together with
//! the parent/child edges between them. All mutations go through methods that
//! keep both edge directions in sync and refuse to create cycles.

use crate::nodule::{Nodule, NoduleId, NoduleKind, NoduleType};
use easel_core::{GraphError, Result, Style, DEFAULT_TOLERANCE};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet, VecDeque};

/// Engine options consumed while building and updating nodules.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionOptions {
    pub tolerance: f64,
    pub parametric_samples: usize,
    pub show_labels: bool,
    pub point_style: Style,
    pub curve_style: Style,
}

impl Default for ConstructionOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            parametric_samples: 64,
            show_labels: true,
            point_style: Style::point(),
            curve_style: Style::curve(),
        }
    }
}

/// A family of lines perpendicular to a common curve.
///
/// Pencils are bookkeeping only; they are not nodes of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Pencil {
    pub name: String,
    pub curve: NoduleId,
    pub lines: Vec<NoduleId>,
}

/// Registry of nodules and their dependency edges.
#[derive(Debug, Clone)]
pub struct NoduleStore {
    entities: IndexMap<NoduleId, Nodule>,
    names: HashMap<String, NoduleId>,
    /// Names of removed nodules, kept so history can still describe them.
    retired_names: HashMap<NoduleId, String>,
    next_id: u64,
    counters: HashMap<NoduleType, u64>,
    earth_mode: bool,
    pencils: Vec<Pencil>,
    options: ConstructionOptions,
}

impl Default for NoduleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoduleStore {
    pub fn new() -> Self {
        Self::with_options(ConstructionOptions::default())
    }

    pub fn with_options(options: ConstructionOptions) -> Self {
        Self {
            entities: IndexMap::new(),
            names: HashMap::new(),
            retired_names: HashMap::new(),
            next_id: 1,
            counters: HashMap::new(),
            earth_mode: false,
            pencils: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> &ConstructionOptions {
        &self.options
    }

    pub fn tolerance(&self) -> f64 {
        self.options.tolerance
    }

    /// Builds an unregistered nodule with a fresh id and auto-generated name.
    pub fn create(&mut self, kind: NoduleKind, parents: Vec<NoduleId>) -> Nodule {
        let nodule_type = kind.nodule_type();
        let name = self.next_name(nodule_type);
        self.build(kind, parents, name)
    }

    /// Builds an unregistered nodule with a fresh id and the given name.
    ///
    /// Names of the form `<prefix><n>` advance the naming counter so later
    /// auto-generated names do not collide.
    pub fn create_named(
        &mut self,
        kind: NoduleKind,
        parents: Vec<NoduleId>,
        name: impl Into<String>,
    ) -> Nodule {
        let name = name.into();
        let nodule_type = kind.nodule_type();
        if let Some(n) = name
            .strip_prefix(nodule_type.prefix())
            .and_then(|rest| rest.parse::<u64>().ok())
        {
            let counter = self.counters.entry(nodule_type).or_insert(0);
            *counter = (*counter).max(n);
        }
        self.build(kind, parents, name)
    }

    fn build(&mut self, kind: NoduleKind, parents: Vec<NoduleId>, name: String) -> Nodule {
        let id = NoduleId(self.next_id);
        self.next_id += 1;
        let style = match kind.nodule_type() {
            NoduleType::Point => self.options.point_style.clone(),
            t if t.is_one_dimensional() => self.options.curve_style.clone(),
            _ => Style::text(),
        };
        Nodule::new(id, name, kind, parents, style)
    }

    fn next_name(&mut self, nodule_type: NoduleType) -> String {
        loop {
            let counter = self.counters.entry(nodule_type).or_insert(0);
            *counter += 1;
            let candidate = format!("{}{}", nodule_type.prefix(), counter);
            if !self.names.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Registers a nodule. Edges listed in `nodule.parents` are not wired
    /// until [`register_child`](Self::register_child) is called for them.
    pub fn add_entity(&mut self, nodule: Nodule) -> Result<()> {
        if self.entities.contains_key(&nodule.id) {
            return Err(GraphError::DuplicateId { id: nodule.id.0 }.into());
        }
        self.next_id = self.next_id.max(nodule.id.0 + 1);
        self.retired_names.remove(&nodule.id);
        self.names.insert(nodule.name.clone(), nodule.id);
        tracing::trace!(id = nodule.id.0, name = %nodule.name, "Registered nodule");
        self.entities.insert(nodule.id, nodule);
        Ok(())
    }

    /// Unregisters a childless nodule and detaches it from its parents.
    ///
    /// The returned nodule keeps its `parents` list so it can be re-added.
    pub fn remove_entity(&mut self, id: NoduleId) -> Result<Nodule> {
        let nodule = self
            .entities
            .get(&id)
            .ok_or(GraphError::UnknownEntity { id: id.0 })?;
        if !nodule.children.is_empty() {
            return Err(GraphError::HasDescendants {
                name: nodule.name.clone(),
                count: nodule.children.len(),
            }
            .into());
        }

        let nodule = self
            .entities
            .shift_remove(&id)
            .ok_or(GraphError::UnknownEntity { id: id.0 })?;
        for parent in &nodule.parents {
            if let Some(p) = self.entities.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        self.names.remove(&nodule.name);
        self.retired_names.insert(id, nodule.name.clone());
        tracing::trace!(id = id.0, name = %nodule.name, "Removed nodule");
        Ok(nodule)
    }

    /// Adds the edge `parent -> child`. Idempotent.
    pub fn register_child(&mut self, parent: NoduleId, child: NoduleId) -> Result<()> {
        self.register_child_at(parent, child, usize::MAX)
    }

    /// Adds the edge `parent -> child`, placing `child` at `index` in the
    /// parent's children (clamped to the end).
    pub fn register_child_at(
        &mut self,
        parent: NoduleId,
        child: NoduleId,
        index: usize,
    ) -> Result<()> {
        if !self.entities.contains_key(&parent) {
            return Err(GraphError::UnknownEntity { id: parent.0 }.into());
        }
        if !self.entities.contains_key(&child) {
            return Err(GraphError::UnknownEntity { id: child.0 }.into());
        }
        if parent == child || self.descendants_of(&[child]).contains(&parent) {
            return Err(GraphError::CycleDetected {
                parent: parent.0,
                child: child.0,
            }
            .into());
        }

        if let Some(p) = self.entities.get_mut(&parent) {
            if !p.children.contains(&child) {
                let index = index.min(p.children.len());
                p.children.insert(index, child);
            }
        }
        if let Some(c) = self.entities.get_mut(&child) {
            if !c.parents.contains(&parent) {
                c.parents.push(parent);
            }
        }
        Ok(())
    }

    /// Removes the edge `parent -> child`; absent edges are ignored.
    pub fn unregister_child(&mut self, parent: NoduleId, child: NoduleId) {
        if let Some(p) = self.entities.get_mut(&parent) {
            p.children.retain(|c| *c != child);
        }
        if let Some(c) = self.entities.get_mut(&child) {
            c.parents.retain(|p| *p != parent);
        }
    }

    /// Seeds plus every transitive child, in breadth-first discovery order.
    pub fn descendants_of(&self, seeds: &[NoduleId]) -> Vec<NoduleId> {
        self.closure(seeds, |n| &n.children)
    }

    /// Seeds plus every transitive parent, in breadth-first discovery order.
    pub fn ancestors_of(&self, seeds: &[NoduleId]) -> Vec<NoduleId> {
        self.closure(seeds, |n| &n.parents)
    }

    fn closure<F>(&self, seeds: &[NoduleId], edges: F) -> Vec<NoduleId>
    where
        F: Fn(&Nodule) -> &Vec<NoduleId>,
    {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<NoduleId> = VecDeque::new();
        for seed in seeds {
            if self.entities.contains_key(seed) && seen.insert(*seed) {
                queue.push_back(*seed);
            }
        }
        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(nodule) = self.entities.get(&id) {
                for next in edges(nodule) {
                    if seen.insert(*next) {
                        queue.push_back(*next);
                    }
                }
            }
        }
        order
    }

    /// Orders `ids` so every parent precedes its children (edges outside
    /// the set are ignored).
    pub fn topological_order(&self, ids: &[NoduleId]) -> Vec<NoduleId> {
        let members: HashSet<NoduleId> = ids.iter().copied().collect();
        let mut in_degree: HashMap<NoduleId, usize> = ids
            .iter()
            .map(|id| {
                let degree = self
                    .entities
                    .get(id)
                    .map(|n| n.parents.iter().filter(|p| members.contains(p)).count())
                    .unwrap_or(0);
                (*id, degree)
            })
            .collect();

        let mut queue: VecDeque<NoduleId> = ids
            .iter()
            .filter(|id| in_degree.get(id).copied() == Some(0))
            .copied()
            .collect();
        let mut order = Vec::with_capacity(ids.len());
        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(nodule) = self.entities.get(&id) {
                for child in &nodule.children {
                    if let Some(degree) = in_degree.get_mut(child) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(*child);
                        }
                    }
                }
            }
        }
        order
    }

    pub fn get(&self, id: NoduleId) -> Option<&Nodule> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: NoduleId) -> Option<&mut Nodule> {
        self.entities.get_mut(&id)
    }

    /// Looks a nodule up, failing with [`GraphError::UnknownEntity`].
    pub fn require(&self, id: NoduleId) -> Result<&Nodule> {
        self.entities
            .get(&id)
            .ok_or_else(|| GraphError::UnknownEntity { id: id.0 }.into())
    }

    pub fn require_mut(&mut self, id: NoduleId) -> Result<&mut Nodule> {
        self.entities
            .get_mut(&id)
            .ok_or_else(|| GraphError::UnknownEntity { id: id.0 }.into())
    }

    pub fn contains(&self, id: NoduleId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Nodule> {
        self.names.get(name).and_then(|id| self.entities.get(id))
    }

    /// Name of a registered or previously removed nodule.
    pub fn name_of(&self, id: NoduleId) -> Option<&str> {
        self.entities
            .get(&id)
            .map(|n| n.name.as_str())
            .or_else(|| self.retired_names.get(&id).map(String::as_str))
    }

    /// Registered nodules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Nodule> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns ids of dirty nodules and clears their flags.
    pub fn take_dirty(&mut self) -> Vec<NoduleId> {
        self.entities
            .values_mut()
            .filter(|n| n.dirty)
            .map(|n| {
                n.dirty = false;
                n.id
            })
            .collect()
    }

    pub fn earth_mode(&self) -> bool {
        self.earth_mode
    }

    pub fn set_earth_mode(&mut self, earth_mode: bool) {
        self.earth_mode = earth_mode;
    }

    pub fn add_pencil(&mut self, pencil: Pencil) {
        self.pencils.push(pencil);
    }

    pub fn remove_pencil(&mut self, name: &str) -> Option<Pencil> {
        let index = self.pencils.iter().position(|p| p.name == name)?;
        Some(self.pencils.remove(index))
    }

    pub fn pencils(&self) -> &[Pencil] {
        &self.pencils
    }
}
