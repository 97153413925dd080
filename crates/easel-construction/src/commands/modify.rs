//! Commands that modify existing nodules.

use super::add::{LABEL_NAME, LABEL_TEXT, OBJECT_NAME, OBJECT_SHOWING, OBJECT_STYLE};
use super::{name_of, resolve_field, Command, ObjectNameMap, OpcodeOutput};
use crate::nodule::{
    LineDefinition, NoduleId, NoduleKind, NoduleType, PointDefinition, SegmentDefinition,
};
use crate::script::OpcodeRecord;
use crate::store::NoduleStore;
use easel_core::{normalize, rotate_about, GeometryError, Result, SphereVector, Style};

pub(crate) const SET_NODULE_DISPLAY: &str = "SetNoduleDisplay";
pub(crate) const STYLE_NODULE: &str = "StyleNodule";
pub(crate) const CHANGE_LABEL_TEXT: &str = "ChangeLabelText";

fn not_movable(name: &str) -> easel_core::Error {
    GeometryError::InvalidParameter {
        name: name.to_string(),
        reason: "only free points and points on objects can be moved".to_string(),
    }
    .into()
}

fn set_location(store: &mut NoduleStore, point: NoduleId, location: SphereVector) -> Result<()> {
    let nodule = store.require_mut(point)?;
    if let NoduleKind::Point(p) = &mut nodule.kind {
        p.location = location;
        nodule.dirty = true;
    }
    store.update_from(&[point]);
    Ok(())
}

/// Drags a free point (or a point glued to a curve) to a new location.
///
/// Transient: moves are folded into the point's creation opcode.
#[derive(Debug, Clone)]
pub struct MovePointCommand {
    point: NoduleId,
    location: SphereVector,
    previous: Option<SphereVector>,
}

impl MovePointCommand {
    pub fn new(store: &NoduleStore, point: NoduleId, location: SphereVector) -> Result<Self> {
        let nodule = store.require(point)?;
        match &nodule.kind {
            NoduleKind::Point(p)
                if matches!(
                    p.definition,
                    PointDefinition::Free | PointDefinition::OnObject { .. }
                ) => {}
            _ => return Err(not_movable(&nodule.name)),
        }
        let location = normalize(&location, store.tolerance()).ok_or_else(|| {
            GeometryError::InvalidParameter {
                name: "location".to_string(),
                reason: "the zero vector has no direction".to_string(),
            }
        })?;
        Ok(Self {
            point,
            location,
            previous: None,
        })
    }
}

impl Command for MovePointCommand {
    fn name(&self) -> &str {
        "Move Point"
    }

    fn save_state(&mut self, store: &NoduleStore) {
        self.previous = store.get(self.point).and_then(|n| n.location());
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        set_location(store, self.point, self.location)
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        match self.previous {
            Some(previous) => set_location(store, self.point, previous),
            None => Ok(()),
        }
    }

    fn to_opcode(&self, _store: &NoduleStore) -> Option<OpcodeOutput> {
        None
    }
}

/// Rotates a line or segment through two free points by rotating both points.
#[derive(Debug, Clone)]
pub struct MoveLineCommand {
    endpoints: [NoduleId; 2],
    axis: SphereVector,
    angle: f64,
    previous: Vec<(NoduleId, SphereVector)>,
}

impl MoveLineCommand {
    pub fn new(
        store: &NoduleStore,
        line: NoduleId,
        axis: SphereVector,
        angle: f64,
    ) -> Result<Self> {
        let nodule = store.require(line)?;
        let endpoints = match &nodule.kind {
            NoduleKind::Line(l) => match l.definition {
                LineDefinition::ThroughPoints { start, end } => [start, end],
                _ => return Err(not_movable(&nodule.name)),
            },
            NoduleKind::Segment(s) => match s.definition {
                SegmentDefinition::ThroughPoints { start, end } => [start, end],
                SegmentDefinition::Image { .. } => return Err(not_movable(&nodule.name)),
            },
            _ => return Err(not_movable(&nodule.name)),
        };
        for endpoint in endpoints {
            let point = store.require(endpoint)?;
            if !matches!(
                &point.kind,
                NoduleKind::Point(p) if p.definition == PointDefinition::Free
            ) {
                return Err(not_movable(&point.name));
            }
        }
        let axis = normalize(&axis, store.tolerance()).ok_or_else(|| {
            GeometryError::InvalidParameter {
                name: "axis".to_string(),
                reason: "the zero vector has no direction".to_string(),
            }
        })?;
        Ok(Self {
            endpoints,
            axis,
            angle,
            previous: Vec::new(),
        })
    }
}

impl Command for MoveLineCommand {
    fn name(&self) -> &str {
        "Move Line"
    }

    fn save_state(&mut self, store: &NoduleStore) {
        self.previous = self
            .endpoints
            .iter()
            .filter_map(|id| store.get(*id).and_then(|n| n.location()).map(|l| (*id, l)))
            .collect();
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        for (id, location) in self.previous.clone() {
            set_location(store, id, rotate_about(&location, &self.axis, self.angle))?;
        }
        Ok(())
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        for (id, location) in self.previous.clone() {
            set_location(store, id, location)?;
        }
        Ok(())
    }

    fn to_opcode(&self, _store: &NoduleStore) -> Option<OpcodeOutput> {
        None
    }
}

/// Shows or hides a nodule. Existence is unaffected.
#[derive(Debug, Clone)]
pub struct SetNoduleDisplayCommand {
    nodule: NoduleId,
    showing: bool,
    previous: Option<bool>,
}

impl SetNoduleDisplayCommand {
    pub fn new(nodule: NoduleId, showing: bool) -> Self {
        Self {
            nodule,
            showing,
            previous: None,
        }
    }

    fn set(store: &mut NoduleStore, id: NoduleId, showing: bool) -> Result<()> {
        let nodule = store.require_mut(id)?;
        nodule.showing = showing;
        nodule.dirty = true;
        Ok(())
    }
}

impl Command for SetNoduleDisplayCommand {
    fn name(&self) -> &str {
        if self.showing {
            "Show Object"
        } else {
            "Hide Object"
        }
    }

    fn save_state(&mut self, store: &NoduleStore) {
        self.previous = store.get(self.nodule).map(|n| n.showing);
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        Self::set(store, self.nodule, self.showing)
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        match self.previous {
            Some(previous) => Self::set(store, self.nodule, previous),
            None => Ok(()),
        }
    }

    fn to_opcode(&self, store: &NoduleStore) -> Option<OpcodeOutput> {
        let record = OpcodeRecord::new(SET_NODULE_DISPLAY)
            .with_text(OBJECT_NAME, &name_of(store, self.nodule))
            .with_flag(OBJECT_SHOWING, self.showing);
        Some(OpcodeOutput::Line(record.encode()))
    }
}

pub(crate) fn parse_set_display(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let nodule = resolve_field(record, OBJECT_NAME, names, store, &[])?;
    let showing = record.flag(OBJECT_SHOWING)?;
    Ok(Box::new(SetNoduleDisplayCommand::new(nodule, showing)))
}

/// Replaces the style of a nodule.
#[derive(Debug, Clone)]
pub struct StyleNoduleCommand {
    nodule: NoduleId,
    style: Style,
    previous: Option<Style>,
}

impl StyleNoduleCommand {
    pub fn new(nodule: NoduleId, style: Style) -> Result<Self> {
        if !style.is_valid() {
            return Err(GeometryError::InvalidParameter {
                name: "style".to_string(),
                reason: "stroke width, opacity or dashes out of range".to_string(),
            }
            .into());
        }
        Ok(Self {
            nodule,
            style,
            previous: None,
        })
    }

    fn set(store: &mut NoduleStore, id: NoduleId, style: Style) -> Result<()> {
        let nodule = store.require_mut(id)?;
        nodule.style = style;
        nodule.dirty = true;
        Ok(())
    }
}

impl Command for StyleNoduleCommand {
    fn name(&self) -> &str {
        "Change Style"
    }

    fn save_state(&mut self, store: &NoduleStore) {
        self.previous = store.get(self.nodule).map(|n| n.style.clone());
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        Self::set(store, self.nodule, self.style.clone())
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        match self.previous.clone() {
            Some(previous) => Self::set(store, self.nodule, previous),
            None => Ok(()),
        }
    }

    fn to_opcode(&self, store: &NoduleStore) -> Option<OpcodeOutput> {
        let record = OpcodeRecord::new(STYLE_NODULE)
            .with_text(OBJECT_NAME, &name_of(store, self.nodule))
            .with_json(OBJECT_STYLE, &self.style);
        match record {
            Ok(record) => Some(OpcodeOutput::Line(record.encode())),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot serialize style");
                None
            }
        }
    }
}

pub(crate) fn parse_style(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let nodule = resolve_field(record, OBJECT_NAME, names, store, &[])?;
    let style: Style = record.json(OBJECT_STYLE)?;
    Ok(Box::new(StyleNoduleCommand::new(nodule, style)?))
}

/// Changes the text shown by a label.
#[derive(Debug, Clone)]
pub struct ChangeLabelTextCommand {
    label: NoduleId,
    text: String,
    previous: Option<String>,
}

impl ChangeLabelTextCommand {
    pub fn new(store: &NoduleStore, label: NoduleId, text: impl Into<String>) -> Result<Self> {
        let nodule = store.require(label)?;
        if nodule.nodule_type() != NoduleType::Label {
            return Err(GeometryError::InvalidParameter {
                name: "label".to_string(),
                reason: format!("{} is not a label", nodule.name),
            }
            .into());
        }
        Ok(Self {
            label,
            text: text.into(),
            previous: None,
        })
    }

    fn set(store: &mut NoduleStore, id: NoduleId, text: &str) -> Result<()> {
        let nodule = store.require_mut(id)?;
        if let NoduleKind::Label(l) = &mut nodule.kind {
            l.text = text.to_string();
            nodule.dirty = true;
        }
        Ok(())
    }
}

impl Command for ChangeLabelTextCommand {
    fn name(&self) -> &str {
        "Change Label Text"
    }

    fn save_state(&mut self, store: &NoduleStore) {
        self.previous = store
            .get(self.label)
            .and_then(|n| n.label_text())
            .map(str::to_string);
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        Self::set(store, self.label, &self.text)
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        match self.previous.clone() {
            Some(previous) => Self::set(store, self.label, &previous),
            None => Ok(()),
        }
    }

    fn to_opcode(&self, store: &NoduleStore) -> Option<OpcodeOutput> {
        let record = OpcodeRecord::new(CHANGE_LABEL_TEXT)
            .with_text(LABEL_NAME, &name_of(store, self.label))
            .with_text(LABEL_TEXT, &self.text);
        Some(OpcodeOutput::Line(record.encode()))
    }
}

pub(crate) fn parse_label_text(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let label = resolve_field(record, LABEL_NAME, names, store, &[NoduleType::Label])?;
    let text = record.text(LABEL_TEXT)?;
    Ok(Box::new(ChangeLabelTextCommand::new(store, label, text)?))
}
