//! Isometries of the sphere and images of objects under them.

use super::add::{finish_parse, require_type, AddNoduleCommand};
use super::{name_of, resolve_field, Command, ObjectNameMap, EXPRESSION, POINT, STRAIGHT};
use crate::nodule::{
    CircleDefinition, EllipseDefinition, LineDefinition, NoduleId, NoduleKind, NoduleType,
    PointDefinition, SegmentDefinition, SphereCircle, SphereEllipse, SphereLine, SpherePoint,
    SphereSegment, Transformation, TransformationDefinition,
};
use crate::script::OpcodeRecord;
use crate::store::NoduleStore;
use easel_core::{GeometryError, Result};
use nalgebra::Matrix3;

pub(crate) const ADD_REFLECTION: &str = "AddReflection";
pub(crate) const ADD_POINT_REFLECTION: &str = "AddPointReflection";
pub(crate) const ADD_ROTATION: &str = "AddRotation";
pub(crate) const ADD_TRANSLATION: &str = "AddTranslation";
pub(crate) const ADD_ISOMETRY_IMAGE: &str = "AddIsometryImage";

const REFLECTION_LINE: &str = "reflectionLineOrSegmentName";
const POINT_REFLECTION_POINT: &str = "pointReflectionPointName";
const ROTATION_POINT: &str = "rotationPointName";
const ROTATION_ANGLE: &str = "rotationAngleExpressionName";
const TRANSLATION_LINE: &str = "translationLineOrSegmentName";
const TRANSLATION_DISTANCE: &str = "translationDistanceExpressionName";
pub(crate) const TRANSFORMATION_NAME: &str = "transformationName";
pub(crate) const PREIMAGE_NAME: &str = "preimageName";

const TRANSFORMABLE: &[NoduleType] = &[
    NoduleType::Point,
    NoduleType::Line,
    NoduleType::Segment,
    NoduleType::Circle,
    NoduleType::Ellipse,
];

fn transformation_kind(definition: TransformationDefinition) -> NoduleKind {
    NoduleKind::Transformation(Transformation {
        matrix: Matrix3::identity(),
        definition,
    })
}

/// Image prototype: a copy of the preimage's geometry with an image definition.
fn image_kind(
    store: &NoduleStore,
    transformation: NoduleId,
    preimage: NoduleId,
) -> Result<NoduleKind> {
    let source = store.require(preimage)?;
    let kind = match &source.kind {
        NoduleKind::Point(p) => NoduleKind::Point(SpherePoint {
            location: p.location,
            definition: PointDefinition::Image {
                transformation,
                preimage,
            },
        }),
        NoduleKind::Line(l) => NoduleKind::Line(SphereLine {
            normal: l.normal,
            anchor: l.anchor,
            definition: LineDefinition::Image {
                transformation,
                preimage,
            },
        }),
        NoduleKind::Segment(s) => NoduleKind::Segment(SphereSegment {
            definition: SegmentDefinition::Image {
                transformation,
                preimage,
            },
            ..s.clone()
        }),
        NoduleKind::Circle(c) => NoduleKind::Circle(SphereCircle {
            center: c.center,
            radius: c.radius,
            definition: CircleDefinition::Image {
                transformation,
                preimage,
            },
        }),
        NoduleKind::Ellipse(e) => NoduleKind::Ellipse(SphereEllipse {
            focus1: e.focus1,
            focus2: e.focus2,
            angle_sum: e.angle_sum,
            definition: EllipseDefinition::Image {
                transformation,
                preimage,
            },
        }),
        other => {
            return Err(GeometryError::UnsupportedTransformation {
                kind: other.nodule_type().to_string(),
            }
            .into())
        }
    };
    Ok(kind)
}

impl AddNoduleCommand {
    /// Reflection across a line or segment.
    pub fn reflection(store: &mut NoduleStore, line: NoduleId) -> Result<Self> {
        require_type(store, line, "line", STRAIGHT)?;
        let kind = transformation_kind(TransformationDefinition::Reflection { line });
        let nodule = store.create(kind, vec![line]);
        Ok(Self::with_label(store, nodule))
    }

    /// Half-turn about a point.
    pub fn point_reflection(store: &mut NoduleStore, point: NoduleId) -> Result<Self> {
        require_type(store, point, "point", POINT)?;
        let kind = transformation_kind(TransformationDefinition::PointReflection { point });
        let nodule = store.create(kind, vec![point]);
        Ok(Self::with_label(store, nodule))
    }

    /// Rotation about `center` by the value (radians) of the `angle` expression.
    pub fn rotation(store: &mut NoduleStore, center: NoduleId, angle: NoduleId) -> Result<Self> {
        require_type(store, center, "center", POINT)?;
        require_type(store, angle, "angle", EXPRESSION)?;
        let kind = transformation_kind(TransformationDefinition::Rotation { center, angle });
        let nodule = store.create(kind, vec![center, angle]);
        Ok(Self::with_label(store, nodule))
    }

    /// Slide along a line or segment by the value of the `distance` expression.
    pub fn translation(
        store: &mut NoduleStore,
        line: NoduleId,
        distance: NoduleId,
    ) -> Result<Self> {
        require_type(store, line, "line", STRAIGHT)?;
        require_type(store, distance, "distance", EXPRESSION)?;
        let kind = transformation_kind(TransformationDefinition::Translation { line, distance });
        let nodule = store.create(kind, vec![line, distance]);
        Ok(Self::with_label(store, nodule))
    }

    /// Image of a point, line, segment, circle or ellipse.
    pub fn isometry_image(
        store: &mut NoduleStore,
        transformation: NoduleId,
        preimage: NoduleId,
    ) -> Result<Self> {
        require_type(
            store,
            transformation,
            "transformation",
            &[NoduleType::Transformation],
        )?;
        let kind = image_kind(store, transformation, preimage)?;
        let nodule = store.create(kind, vec![transformation, preimage]);
        Ok(Self::with_label(store, nodule))
    }
}

pub(crate) fn encode_fields(
    record: OpcodeRecord,
    transformation: &Transformation,
    store: &NoduleStore,
) -> OpcodeRecord {
    match &transformation.definition {
        TransformationDefinition::Reflection { line } => {
            record.with_text(REFLECTION_LINE, &name_of(store, *line))
        }
        TransformationDefinition::PointReflection { point } => {
            record.with_text(POINT_REFLECTION_POINT, &name_of(store, *point))
        }
        TransformationDefinition::Rotation { center, angle } => record
            .with_text(ROTATION_POINT, &name_of(store, *center))
            .with_text(ROTATION_ANGLE, &name_of(store, *angle)),
        TransformationDefinition::Translation { line, distance } => record
            .with_text(TRANSLATION_LINE, &name_of(store, *line))
            .with_text(TRANSLATION_DISTANCE, &name_of(store, *distance)),
    }
}

pub(crate) fn parse_reflection(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let line = resolve_field(record, REFLECTION_LINE, names, store, STRAIGHT)?;
    let kind = transformation_kind(TransformationDefinition::Reflection { line });
    finish_parse(record, names, store, kind, vec![line])
}

pub(crate) fn parse_point_reflection(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let point = resolve_field(record, POINT_REFLECTION_POINT, names, store, POINT)?;
    let kind = transformation_kind(TransformationDefinition::PointReflection { point });
    finish_parse(record, names, store, kind, vec![point])
}

pub(crate) fn parse_rotation(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let center = resolve_field(record, ROTATION_POINT, names, store, POINT)?;
    let angle = resolve_field(record, ROTATION_ANGLE, names, store, EXPRESSION)?;
    let kind = transformation_kind(TransformationDefinition::Rotation { center, angle });
    finish_parse(record, names, store, kind, vec![center, angle])
}

pub(crate) fn parse_translation(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let line = resolve_field(record, TRANSLATION_LINE, names, store, STRAIGHT)?;
    let distance = resolve_field(record, TRANSLATION_DISTANCE, names, store, EXPRESSION)?;
    let kind = transformation_kind(TransformationDefinition::Translation { line, distance });
    finish_parse(record, names, store, kind, vec![line, distance])
}

pub(crate) fn parse_isometry_image(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let transformation = resolve_field(
        record,
        TRANSFORMATION_NAME,
        names,
        store,
        &[NoduleType::Transformation],
    )?;
    let preimage = resolve_field(record, PREIMAGE_NAME, names, store, TRANSFORMABLE)?;
    let kind = image_kind(store, transformation, preimage)?;
    finish_parse(record, names, store, kind, vec![transformation, preimage])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_images_of_expressions_are_rejected() {
        let mut store = NoduleStore::new();
        let mut a = AddNoduleCommand::point(&mut store, Vector3::x()).unwrap();
        a.apply(&mut store).unwrap();
        let mut t = AddNoduleCommand::point_reflection(&mut store, a.nodule_id()).unwrap();
        t.apply(&mut store).unwrap();
        let mut s = AddNoduleCommand::slider(&mut store, 0.5, 0.0, 1.0, 0.1).unwrap();
        s.apply(&mut store).unwrap();

        let err = AddNoduleCommand::isometry_image(&mut store, t.nodule_id(), s.nodule_id())
            .unwrap_err();
        assert!(err.is_geometry_error());
    }
}
