//! Generic entity creation.
//!
//! Every `Add*` opcode builds an [`AddNoduleCommand`]: a prototype nodule
//! (with its label, for drawable objects) whose id was reserved when the
//! command was built. Applying registers the prototype and its edges,
//! restoring unregisters them again.

use super::{curves, earth, measurements, points, transformations, ObjectNameMap, OpcodeOutput};
use super::{name_of, Command};
use crate::nodule::{
    CircleDefinition, ExpressionDefinition, Label, LineDefinition, Nodule, NoduleId, NoduleKind,
    NoduleType, PointDefinition, SegmentDefinition, TransformationDefinition,
};
use crate::nodule::{unset_vector, EllipseDefinition};
use crate::script::OpcodeRecord;
use crate::store::NoduleStore;
use easel_core::{GeometryError, Result, ScriptError};

pub(crate) const OBJECT_NAME: &str = "objectName";
pub(crate) const OBJECT_EXISTS: &str = "objectExists";
pub(crate) const OBJECT_SHOWING: &str = "objectShowing";
pub(crate) const OBJECT_STYLE: &str = "objectStyle";
pub(crate) const LABEL_NAME: &str = "labelName";
pub(crate) const LABEL_TEXT: &str = "labelText";
pub(crate) const LABEL_SHOWING: &str = "labelShowing";

/// Inserts one nodule (and its label) into the graph.
#[derive(Debug, Clone)]
pub struct AddNoduleCommand {
    nodule: Nodule,
    label: Option<Nodule>,
}

impl AddNoduleCommand {
    /// Wraps a prototype from [`NoduleStore::create`], attaching a fresh
    /// label when the type is labelled.
    pub(crate) fn with_label(store: &mut NoduleStore, nodule: Nodule) -> Self {
        let label = nodule
            .nodule_type()
            .is_labelled()
            .then(|| make_label(store, &nodule, None));
        Self { nodule, label }
    }

    pub fn nodule_id(&self) -> NoduleId {
        self.nodule.id
    }

    pub fn label_id(&self) -> Option<NoduleId> {
        self.label.as_ref().map(|l| l.id)
    }

    pub fn nodule_name(&self) -> &str {
        &self.nodule.name
    }

    /// The prototype as it will be (or was last) registered.
    pub fn prototype(&self) -> &Nodule {
        &self.nodule
    }

    fn register(&mut self, store: &mut NoduleStore) -> Result<()> {
        let id = self.nodule.id;
        store.add_entity(self.nodule.clone())?;
        for parent in &self.nodule.parents {
            store.register_child(*parent, id)?;
        }
        if let Some(label) = &self.label {
            store.add_entity(label.clone())?;
            store.register_child(id, label.id)?;
        }
        store.update_from(&[id]);

        if let Some(registered) = store.get(id) {
            self.nodule.kind = registered.kind.clone();
            self.nodule.exists = registered.exists;
        }
        Ok(())
    }

    fn unregister(&self, store: &mut NoduleStore) -> Result<()> {
        if let Some(label) = &self.label {
            if store.contains(label.id) {
                store.remove_entity(label.id)?;
            }
        }
        if store.contains(self.nodule.id) {
            store.remove_entity(self.nodule.id)?;
        }
        Ok(())
    }
}

impl Command for AddNoduleCommand {
    fn name(&self) -> &str {
        creation_tag(&self.nodule.kind)
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        if let Err(e) = self.register(store) {
            self.unregister(store).ok();
            return Err(e);
        }
        tracing::debug!(name = %self.nodule.name, kind = %self.nodule.nodule_type(), "Added nodule");
        Ok(())
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        self.unregister(store)
    }

    /// Geometry comes from the store, since moves are not serialized.
    /// Display, style and label fields keep their creation-time values;
    /// later changes to them have opcodes of their own.
    fn to_opcode(&self, store: &NoduleStore) -> Option<OpcodeOutput> {
        let mut nodule = self.nodule.clone();
        if let Some(current) = store.get(self.nodule.id) {
            nodule.kind = current.kind.clone();
            nodule.exists = current.exists;
        }
        match creation_record(&nodule, self.label.as_ref(), store) {
            Ok(record) => Some(OpcodeOutput::Line(record.encode())),
            Err(e) => {
                tracing::warn!(name = %nodule.name, error = %e, "Cannot serialize nodule");
                None
            }
        }
    }
}

/// Builds the label of `owner`; its text defaults to the owner's name.
fn make_label(store: &mut NoduleStore, owner: &Nodule, name: Option<String>) -> Nodule {
    let kind = NoduleKind::Label(Label {
        owner: owner.id,
        text: owner.name.clone(),
        location: owner.kind.anchor().unwrap_or_else(unset_vector),
    });
    let mut label = match name {
        Some(name) => store.create_named(kind, vec![owner.id], name),
        None => store.create(kind, vec![owner.id]),
    };
    label.showing = store.options().show_labels;
    label
}

/// Opcode tag of a creation.
pub(crate) fn creation_tag(kind: &NoduleKind) -> &'static str {
    match kind {
        NoduleKind::Point(p) => match p.definition {
            PointDefinition::Free => points::ADD_POINT,
            PointDefinition::Intersection { .. } => points::ADD_INTERSECTION_POINT,
            PointDefinition::Midpoint { .. } => points::ADD_MIDPOINT,
            PointDefinition::Antipode { .. } => points::ADD_ANTIPODAL_POINT,
            PointDefinition::OnObject { .. } => points::ADD_POINT_ON_OBJECT,
            PointDefinition::Image { .. } => transformations::ADD_ISOMETRY_IMAGE,
        },
        NoduleKind::Line(l) => match l.definition {
            LineDefinition::ThroughPoints { .. } => curves::ADD_LINE,
            LineDefinition::Perpendicular { .. } => curves::ADD_PERPENDICULAR_LINE,
            LineDefinition::Longitude { .. } => earth::ADD_LONGITUDE,
            LineDefinition::Image { .. } => transformations::ADD_ISOMETRY_IMAGE,
        },
        NoduleKind::Segment(s) => match s.definition {
            SegmentDefinition::ThroughPoints { .. } => curves::ADD_SEGMENT,
            SegmentDefinition::Image { .. } => transformations::ADD_ISOMETRY_IMAGE,
        },
        NoduleKind::Circle(c) => match c.definition {
            CircleDefinition::CenterPoint { .. } => curves::ADD_CIRCLE,
            CircleDefinition::Latitude { .. } => earth::ADD_LATITUDE,
            CircleDefinition::Image { .. } => transformations::ADD_ISOMETRY_IMAGE,
        },
        NoduleKind::Ellipse(e) => match e.definition {
            EllipseDefinition::Foci { .. } => curves::ADD_ELLIPSE,
            EllipseDefinition::Image { .. } => transformations::ADD_ISOMETRY_IMAGE,
        },
        NoduleKind::Parametric(_) => curves::ADD_PARAMETRIC,
        NoduleKind::Label(_) => "AddLabel",
        NoduleKind::Expression(e) => match e.definition {
            ExpressionDefinition::SegmentLength { .. }
            | ExpressionDefinition::PointDistance { .. }
            | ExpressionDefinition::LineAngle { .. } => measurements::ADD_MEASUREMENT,
            ExpressionDefinition::Slider { .. } => measurements::ADD_SLIDER,
            ExpressionDefinition::Calculation { .. } => measurements::ADD_CALCULATION,
        },
        NoduleKind::Transformation(t) => match t.definition {
            TransformationDefinition::Reflection { .. } => transformations::ADD_REFLECTION,
            TransformationDefinition::PointReflection { .. } => {
                transformations::ADD_POINT_REFLECTION
            }
            TransformationDefinition::Rotation { .. } => transformations::ADD_ROTATION,
            TransformationDefinition::Translation { .. } => transformations::ADD_TRANSLATION,
        },
    }
}

/// Full creation record: kind-specific fields followed by the common ones.
fn creation_record(
    nodule: &Nodule,
    label: Option<&Nodule>,
    store: &NoduleStore,
) -> std::result::Result<OpcodeRecord, ScriptError> {
    let record = OpcodeRecord::new(creation_tag(&nodule.kind));
    let record = match &nodule.kind {
        NoduleKind::Point(p) => points::encode_fields(record, p, store),
        NoduleKind::Line(l) => curves::encode_line_fields(record, l, store),
        NoduleKind::Segment(s) => curves::encode_segment_fields(record, s, store),
        NoduleKind::Circle(c) => curves::encode_circle_fields(record, c, store),
        NoduleKind::Ellipse(e) => curves::encode_ellipse_fields(record, e, store),
        NoduleKind::Parametric(p) => curves::encode_parametric_fields(record, p),
        NoduleKind::Expression(e) => measurements::encode_fields(record, nodule, e, store),
        NoduleKind::Transformation(t) => transformations::encode_fields(record, t, store),
        NoduleKind::Label(_) => {
            return Err(ScriptError::InvalidValue {
                field: OBJECT_NAME.to_string(),
                value: nodule.name.clone(),
                reason: "labels are created with their owner".to_string(),
            })
        }
    };

    let mut record = record
        .with_text(OBJECT_NAME, &nodule.name)
        .with_flag(OBJECT_EXISTS, nodule.exists)
        .with_flag(OBJECT_SHOWING, nodule.showing)
        .with_json(OBJECT_STYLE, &nodule.style)?;
    if let Some(label) = label {
        record = record
            .with_text(LABEL_NAME, &label.name)
            .with_text(LABEL_TEXT, label.label_text().unwrap_or_default())
            .with_flag(LABEL_SHOWING, label.showing);
    }
    Ok(record)
}

/// Encodes an image definition shared by every transformable kind.
pub(crate) fn encode_image(
    record: OpcodeRecord,
    transformation: NoduleId,
    preimage: NoduleId,
    store: &NoduleStore,
) -> OpcodeRecord {
    record
        .with_text(
            transformations::TRANSFORMATION_NAME,
            &name_of(store, transformation),
        )
        .with_text(transformations::PREIMAGE_NAME, &name_of(store, preimage))
}

/// Builds the command for a parsed creation opcode, applying the common
/// fields and recording the new names.
pub(crate) fn finish_parse(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
    kind: NoduleKind,
    parents: Vec<NoduleId>,
) -> Result<Box<dyn Command>> {
    let name = record.text(OBJECT_NAME)?;
    ensure_unused(names, OBJECT_NAME, &name)?;

    let mut nodule = store.create_named(kind, parents, name.clone());
    if let Some(showing) = record.optional_flag(OBJECT_SHOWING)? {
        nodule.showing = showing;
    }
    if let Some(exists) = record.optional_flag(OBJECT_EXISTS)? {
        nodule.exists = exists;
    }
    if record.has(OBJECT_STYLE) {
        nodule.style = record.json(OBJECT_STYLE)?;
    }

    let label = match record.optional_text(LABEL_NAME)? {
        Some(label_name) => {
            ensure_unused(names, LABEL_NAME, &label_name)?;
            let mut label = make_label(store, &nodule, Some(label_name));
            if let (Some(text), NoduleKind::Label(l)) =
                (record.optional_text(LABEL_TEXT)?, &mut label.kind)
            {
                l.text = text;
            }
            if let Some(showing) = record.optional_flag(LABEL_SHOWING)? {
                label.showing = showing;
            }
            Some(label)
        }
        None => None,
    };

    names.insert(name, nodule.id);
    if let Some(label) = &label {
        names.insert(label.name.clone(), label.id);
    }
    Ok(Box::new(AddNoduleCommand { nodule, label }))
}

fn ensure_unused(names: &ObjectNameMap, field: &str, name: &str) -> Result<()> {
    if names.contains_key(name) {
        return Err(ScriptError::InvalidValue {
            field: field.to_string(),
            value: name.to_string(),
            reason: "name is already defined".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Checks that `id` is registered with one of the `expected` types.
pub(crate) fn require_type(
    store: &NoduleStore,
    id: NoduleId,
    role: &str,
    expected: &[NoduleType],
) -> Result<NoduleType> {
    let actual = store.require(id)?.nodule_type();
    if expected.contains(&actual) {
        Ok(actual)
    } else {
        Err(GeometryError::InvalidParameter {
            name: role.to_string(),
            reason: format!("a {} cannot be used here", actual),
        }
        .into())
    }
}
