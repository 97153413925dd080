//! Point constructions.

use super::add::{encode_image, finish_parse, require_type, AddNoduleCommand};
use super::{name_of, resolve_field, Command, ObjectNameMap, CURVES, POINT};
use crate::nodule::{NoduleId, NoduleKind, NoduleType, PointDefinition, SpherePoint};
use crate::script::OpcodeRecord;
use crate::store::NoduleStore;
use crate::update::project_onto;
use easel_core::{normalize, GeometryError, Result, SphereVector};

pub(crate) const ADD_POINT: &str = "AddPoint";
pub(crate) const ADD_INTERSECTION_POINT: &str = "AddIntersectionPoint";
pub(crate) const ADD_MIDPOINT: &str = "AddMidpoint";
pub(crate) const ADD_ANTIPODAL_POINT: &str = "AddAntipodalPoint";
pub(crate) const ADD_POINT_ON_OBJECT: &str = "AddPointOnObject";

pub(crate) const POINT_VECTOR: &str = "pointVector";
const INTERSECTION_FIRST: &str = "intersectionFirstParentName";
const INTERSECTION_SECOND: &str = "intersectionSecondParentName";
const INTERSECTION_INDEX: &str = "intersectionIndex";
const MIDPOINT_SEGMENT: &str = "midpointSegmentName";
const ANTIPODE_PARENT: &str = "antipodeParentName";
const POINT_ON_OBJECT_PARENT: &str = "pointOnObjectParentName";

const INTERSECTABLE: &[NoduleType] = &[NoduleType::Line, NoduleType::Segment, NoduleType::Circle];

fn point_kind(location: SphereVector, definition: PointDefinition) -> NoduleKind {
    NoduleKind::Point(SpherePoint {
        location,
        definition,
    })
}

fn unit_location(store: &NoduleStore, location: &SphereVector) -> Result<SphereVector> {
    normalize(location, store.tolerance()).ok_or_else(|| {
        GeometryError::InvalidParameter {
            name: "location".to_string(),
            reason: "the zero vector has no direction".to_string(),
        }
        .into()
    })
}

fn check_intersectable(store: &NoduleStore, first: NoduleId, second: NoduleId) -> Result<()> {
    let a = store.require(first)?.nodule_type();
    let b = store.require(second)?.nodule_type();
    if first == second || !INTERSECTABLE.contains(&a) || !INTERSECTABLE.contains(&b) {
        return Err(GeometryError::UnsupportedIntersection {
            first: a.to_string(),
            second: b.to_string(),
        }
        .into());
    }
    Ok(())
}

fn check_index(index: usize) -> Result<()> {
    if index > 1 {
        return Err(GeometryError::InvalidParameter {
            name: "index".to_string(),
            reason: format!("two curves meet in at most two points, got index {}", index),
        }
        .into());
    }
    Ok(())
}

fn check_projectable(store: &NoduleStore, parent: NoduleId) -> Result<()> {
    let kind = store.require(parent)?.nodule_type();
    if !CURVES.contains(&kind) || kind == NoduleType::Ellipse {
        return Err(GeometryError::UnsupportedProjection {
            kind: kind.to_string(),
        }
        .into());
    }
    Ok(())
}

impl AddNoduleCommand {
    /// Free point at `location` (normalized onto the sphere).
    pub fn point(store: &mut NoduleStore, location: SphereVector) -> Result<Self> {
        let location = unit_location(store, &location)?;
        let nodule = store.create(point_kind(location, PointDefinition::Free), vec![]);
        Ok(Self::with_label(store, nodule))
    }

    /// Intersection number `index` (0 or 1) of two lines, segments or circles.
    pub fn intersection_point(
        store: &mut NoduleStore,
        first: NoduleId,
        second: NoduleId,
        index: usize,
    ) -> Result<Self> {
        check_intersectable(store, first, second)?;
        check_index(index)?;
        let definition = PointDefinition::Intersection {
            first,
            second,
            index,
        };
        let nodule = store.create(point_kind(unset_location(), definition), vec![first, second]);
        Ok(Self::with_label(store, nodule))
    }

    pub fn midpoint(store: &mut NoduleStore, segment: NoduleId) -> Result<Self> {
        require_type(store, segment, "segment", &[NoduleType::Segment])?;
        let definition = PointDefinition::Midpoint { segment };
        let nodule = store.create(point_kind(unset_location(), definition), vec![segment]);
        Ok(Self::with_label(store, nodule))
    }

    pub fn antipodal_point(store: &mut NoduleStore, point: NoduleId) -> Result<Self> {
        require_type(store, point, "point", POINT)?;
        let definition = PointDefinition::Antipode { point };
        let nodule = store.create(point_kind(unset_location(), definition), vec![point]);
        Ok(Self::with_label(store, nodule))
    }

    /// Point glued to `parent`, starting at the projection of `near`.
    pub fn point_on_object(
        store: &mut NoduleStore,
        parent: NoduleId,
        near: SphereVector,
    ) -> Result<Self> {
        check_projectable(store, parent)?;
        let near = unit_location(store, &near)?;
        let tol = store.tolerance();
        let location = store
            .get(parent)
            .and_then(|p| project_onto(&p.kind, &near, tol))
            .unwrap_or(near);
        let definition = PointDefinition::OnObject { parent };
        let nodule = store.create(point_kind(location, definition), vec![parent]);
        Ok(Self::with_label(store, nodule))
    }
}

fn unset_location() -> SphereVector {
    crate::nodule::unset_vector()
}

pub(crate) fn encode_fields(
    record: OpcodeRecord,
    point: &SpherePoint,
    store: &NoduleStore,
) -> OpcodeRecord {
    let record = match &point.definition {
        PointDefinition::Free => record,
        PointDefinition::Intersection {
            first,
            second,
            index,
        } => record
            .with_text(INTERSECTION_FIRST, &name_of(store, *first))
            .with_text(INTERSECTION_SECOND, &name_of(store, *second))
            .with_integer(INTERSECTION_INDEX, *index),
        PointDefinition::Midpoint { segment } => {
            record.with_text(MIDPOINT_SEGMENT, &name_of(store, *segment))
        }
        PointDefinition::Antipode { point } => {
            record.with_text(ANTIPODE_PARENT, &name_of(store, *point))
        }
        PointDefinition::OnObject { parent } => {
            record.with_text(POINT_ON_OBJECT_PARENT, &name_of(store, *parent))
        }
        PointDefinition::Image {
            transformation,
            preimage,
        } => encode_image(record, *transformation, *preimage, store),
    };
    record.with_vector(POINT_VECTOR, &point.location)
}

fn optional_location(record: &OpcodeRecord) -> Result<SphereVector> {
    if record.has(POINT_VECTOR) {
        Ok(record.vector(POINT_VECTOR)?)
    } else {
        Ok(unset_location())
    }
}

pub(crate) fn parse_point(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let location = unit_location(store, &record.vector(POINT_VECTOR)?)?;
    let kind = point_kind(location, PointDefinition::Free);
    finish_parse(record, names, store, kind, vec![])
}

pub(crate) fn parse_intersection_point(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let first = resolve_field(record, INTERSECTION_FIRST, names, store, INTERSECTABLE)?;
    let second = resolve_field(record, INTERSECTION_SECOND, names, store, INTERSECTABLE)?;
    check_intersectable(store, first, second)?;
    let index = record.integer(INTERSECTION_INDEX)?;
    check_index(index)?;
    let definition = PointDefinition::Intersection {
        first,
        second,
        index,
    };
    let kind = point_kind(optional_location(record)?, definition);
    finish_parse(record, names, store, kind, vec![first, second])
}

pub(crate) fn parse_midpoint(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let segment = resolve_field(record, MIDPOINT_SEGMENT, names, store, &[NoduleType::Segment])?;
    let kind = point_kind(
        optional_location(record)?,
        PointDefinition::Midpoint { segment },
    );
    finish_parse(record, names, store, kind, vec![segment])
}

pub(crate) fn parse_antipodal_point(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let point = resolve_field(record, ANTIPODE_PARENT, names, store, POINT)?;
    let kind = point_kind(
        optional_location(record)?,
        PointDefinition::Antipode { point },
    );
    finish_parse(record, names, store, kind, vec![point])
}

pub(crate) fn parse_point_on_object(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let parent = resolve_field(record, POINT_ON_OBJECT_PARENT, names, store, CURVES)?;
    check_projectable(store, parent)?;
    let location = unit_location(store, &record.vector(POINT_VECTOR)?)?;
    let kind = point_kind(location, PointDefinition::OnObject { parent });
    finish_parse(record, names, store, kind, vec![parent])
}
