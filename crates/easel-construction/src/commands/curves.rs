//! Line, segment, circle, ellipse and parametric curve constructions.

use super::add::{encode_image, finish_parse, require_type, AddNoduleCommand};
use super::{name_of, resolve_field, Command, ObjectNameMap, POINT};
use crate::nodule::{
    unset_vector, CircleDefinition, EllipseDefinition, LineDefinition, NoduleId, NoduleKind,
    NoduleType, ParametricCurve, SegmentDefinition, SphereCircle, SphereEllipse, SphereLine,
    SphereSegment,
};
use crate::script::OpcodeRecord;
use crate::store::NoduleStore;
use crate::update::sample_parametric;
use easel_core::{any_perpendicular, normalize, GeometryError, Result, SphereVector};

pub(crate) const ADD_LINE: &str = "AddLine";
pub(crate) const ADD_SEGMENT: &str = "AddSegment";
pub(crate) const ADD_CIRCLE: &str = "AddCircle";
pub(crate) const ADD_ELLIPSE: &str = "AddEllipse";
pub(crate) const ADD_PERPENDICULAR_LINE: &str = "AddPerpendicularLine";
pub(crate) const ADD_PARAMETRIC: &str = "AddParametric";

const LINE_START: &str = "lineStartPointName";
const LINE_END: &str = "lineEndPointName";
pub(crate) const LINE_NORMAL: &str = "lineNormalVector";
const SEGMENT_START: &str = "segmentStartPointName";
const SEGMENT_END: &str = "segmentEndPointName";
const SEGMENT_LONG: &str = "segmentLong";
const SEGMENT_NORMAL: &str = "segmentNormalVector";
const SEGMENT_ARC_LENGTH: &str = "segmentArcLength";
const CIRCLE_CENTER: &str = "circleCenterPointName";
const CIRCLE_POINT: &str = "circleCirclePointName";
const CIRCLE_RADIUS: &str = "circleRadius";
const ELLIPSE_FOCUS1: &str = "ellipseFocus1Name";
const ELLIPSE_FOCUS2: &str = "ellipseFocus2Name";
const ELLIPSE_POINT: &str = "ellipsePointName";
const PERPENDICULAR_POINT: &str = "perpendicularPointName";
const PERPENDICULAR_CURVE: &str = "perpendicularCurveName";
const PARAMETRIC_X: &str = "parametricXExpression";
const PARAMETRIC_Y: &str = "parametricYExpression";
const PARAMETRIC_Z: &str = "parametricZExpression";
const PARAMETRIC_T_MIN: &str = "parametricTMin";
const PARAMETRIC_T_MAX: &str = "parametricTMax";

const PERPENDICULAR_TARGETS: &[NoduleType] =
    &[NoduleType::Line, NoduleType::Segment, NoduleType::Circle];

fn distinct(first: NoduleId, second: NoduleId, role: &str) -> Result<()> {
    if first == second {
        return Err(GeometryError::InvalidParameter {
            name: role.to_string(),
            reason: "both defining points are the same object".to_string(),
        }
        .into());
    }
    Ok(())
}

/// A pole for the great circle through `start` and `end`, valid even when
/// the points coincide.
fn initial_normal(store: &NoduleStore, start: NoduleId, end: NoduleId) -> SphereVector {
    let a = store.get(start).and_then(|n| n.location()).unwrap_or_else(unset_vector);
    let b = store.get(end).and_then(|n| n.location()).unwrap_or_else(unset_vector);
    normalize(&a.cross(&b), store.tolerance()).unwrap_or_else(|| any_perpendicular(&a))
}

fn check_perpendicular_target(store: &NoduleStore, curve: NoduleId) -> Result<()> {
    let kind = store.require(curve)?.nodule_type();
    if !PERPENDICULAR_TARGETS.contains(&kind) {
        return Err(GeometryError::UnsupportedPerpendicular {
            kind: kind.to_string(),
        }
        .into());
    }
    Ok(())
}

fn check_parameter_range(t_min: f64, t_max: f64) -> Result<()> {
    if t_min >= t_max || !t_min.is_finite() || !t_max.is_finite() {
        return Err(GeometryError::InvalidParameter {
            name: "t".to_string(),
            reason: format!("empty range [{}, {}]", t_min, t_max),
        }
        .into());
    }
    Ok(())
}

fn parametric_curve(
    store: &NoduleStore,
    x: String,
    y: String,
    z: String,
    t_min: f64,
    t_max: f64,
) -> Result<ParametricCurve> {
    check_parameter_range(t_min, t_max)?;
    let mut curve = ParametricCurve {
        x_expression: x,
        y_expression: y,
        z_expression: z,
        t_min,
        t_max,
        samples: Vec::new(),
    };
    curve.samples = sample_parametric(
        &curve,
        store.options().parametric_samples,
        store.tolerance(),
    )?;
    Ok(curve)
}

impl AddNoduleCommand {
    /// Line through two points.
    pub fn line(store: &mut NoduleStore, start: NoduleId, end: NoduleId) -> Result<Self> {
        require_type(store, start, "start", POINT)?;
        require_type(store, end, "end", POINT)?;
        distinct(start, end, "line")?;
        let normal = initial_normal(store, start, end);
        let kind = NoduleKind::Line(SphereLine {
            normal,
            anchor: unset_vector(),
            definition: LineDefinition::ThroughPoints { start, end },
        });
        let nodule = store.create(kind, vec![start, end]);
        Ok(Self::with_label(store, nodule))
    }

    /// Segment from `start` to `end`; `long` selects the arc longer than π.
    pub fn segment(
        store: &mut NoduleStore,
        start: NoduleId,
        end: NoduleId,
        long: bool,
    ) -> Result<Self> {
        require_type(store, start, "start", POINT)?;
        require_type(store, end, "end", POINT)?;
        distinct(start, end, "segment")?;
        let normal = initial_normal(store, start, end);
        let kind = NoduleKind::Segment(SphereSegment {
            start: unset_vector(),
            end: unset_vector(),
            normal: if long { -normal } else { normal },
            arc_length: 0.0,
            long,
            definition: SegmentDefinition::ThroughPoints { start, end },
        });
        let nodule = store.create(kind, vec![start, end]);
        Ok(Self::with_label(store, nodule))
    }

    /// Circle centered at `center` through `circle_point`.
    pub fn circle(
        store: &mut NoduleStore,
        center: NoduleId,
        circle_point: NoduleId,
    ) -> Result<Self> {
        require_type(store, center, "center", POINT)?;
        require_type(store, circle_point, "circle point", POINT)?;
        distinct(center, circle_point, "circle")?;
        let kind = NoduleKind::Circle(SphereCircle {
            center: unset_vector(),
            radius: 0.0,
            definition: CircleDefinition::CenterPoint {
                center,
                circle_point,
            },
        });
        let nodule = store.create(kind, vec![center, circle_point]);
        Ok(Self::with_label(store, nodule))
    }

    /// Ellipse with foci `focus1`, `focus2` passing through `point`.
    pub fn ellipse(
        store: &mut NoduleStore,
        focus1: NoduleId,
        focus2: NoduleId,
        point: NoduleId,
    ) -> Result<Self> {
        for (id, role) in [(focus1, "focus1"), (focus2, "focus2"), (point, "point")] {
            require_type(store, id, role, POINT)?;
        }
        distinct(focus1, focus2, "ellipse")?;
        let kind = NoduleKind::Ellipse(SphereEllipse {
            focus1: unset_vector(),
            focus2: unset_vector(),
            angle_sum: 0.0,
            definition: EllipseDefinition::Foci {
                focus1,
                focus2,
                point,
            },
        });
        let nodule = store.create(kind, vec![focus1, focus2, point]);
        Ok(Self::with_label(store, nodule))
    }

    /// Line through `point` perpendicular to a line, segment or circle.
    pub fn perpendicular_line(
        store: &mut NoduleStore,
        point: NoduleId,
        curve: NoduleId,
    ) -> Result<Self> {
        require_type(store, point, "point", POINT)?;
        check_perpendicular_target(store, curve)?;
        let through = store
            .get(point)
            .and_then(|n| n.location())
            .unwrap_or_else(unset_vector);
        let kind = NoduleKind::Line(SphereLine {
            normal: any_perpendicular(&through),
            anchor: through,
            definition: LineDefinition::Perpendicular { point, curve },
        });
        let nodule = store.create(kind, vec![point, curve]);
        Ok(Self::with_label(store, nodule))
    }

    /// Curve `t -> (x(t), y(t), z(t))` projected onto the sphere.
    pub fn parametric(
        store: &mut NoduleStore,
        x_expression: impl Into<String>,
        y_expression: impl Into<String>,
        z_expression: impl Into<String>,
        t_min: f64,
        t_max: f64,
    ) -> Result<Self> {
        let curve = parametric_curve(
            store,
            x_expression.into(),
            y_expression.into(),
            z_expression.into(),
            t_min,
            t_max,
        )?;
        let nodule = store.create(NoduleKind::Parametric(curve), vec![]);
        Ok(Self::with_label(store, nodule))
    }
}

pub(crate) fn encode_line_fields(
    record: OpcodeRecord,
    line: &SphereLine,
    store: &NoduleStore,
) -> OpcodeRecord {
    let record = match &line.definition {
        LineDefinition::ThroughPoints { start, end } => record
            .with_text(LINE_START, &name_of(store, *start))
            .with_text(LINE_END, &name_of(store, *end)),
        LineDefinition::Perpendicular { point, curve } => record
            .with_text(PERPENDICULAR_POINT, &name_of(store, *point))
            .with_text(PERPENDICULAR_CURVE, &name_of(store, *curve)),
        LineDefinition::Longitude { degrees } => super::earth::encode_longitude(record, *degrees),
        LineDefinition::Image {
            transformation,
            preimage,
        } => encode_image(record, *transformation, *preimage, store),
    };
    record.with_vector(LINE_NORMAL, &line.normal)
}

pub(crate) fn encode_segment_fields(
    record: OpcodeRecord,
    segment: &SphereSegment,
    store: &NoduleStore,
) -> OpcodeRecord {
    let record = match &segment.definition {
        SegmentDefinition::ThroughPoints { start, end } => record
            .with_text(SEGMENT_START, &name_of(store, *start))
            .with_text(SEGMENT_END, &name_of(store, *end)),
        SegmentDefinition::Image {
            transformation,
            preimage,
        } => encode_image(record, *transformation, *preimage, store),
    };
    record
        .with_flag(SEGMENT_LONG, segment.long)
        .with_vector(SEGMENT_NORMAL, &segment.normal)
        .with_number(SEGMENT_ARC_LENGTH, segment.arc_length)
}

pub(crate) fn encode_circle_fields(
    record: OpcodeRecord,
    circle: &SphereCircle,
    store: &NoduleStore,
) -> OpcodeRecord {
    let record = match &circle.definition {
        CircleDefinition::CenterPoint {
            center,
            circle_point,
        } => record
            .with_text(CIRCLE_CENTER, &name_of(store, *center))
            .with_text(CIRCLE_POINT, &name_of(store, *circle_point)),
        CircleDefinition::Latitude { degrees } => super::earth::encode_latitude(record, *degrees),
        CircleDefinition::Image {
            transformation,
            preimage,
        } => encode_image(record, *transformation, *preimage, store),
    };
    record.with_number(CIRCLE_RADIUS, circle.radius)
}

pub(crate) fn encode_ellipse_fields(
    record: OpcodeRecord,
    ellipse: &SphereEllipse,
    store: &NoduleStore,
) -> OpcodeRecord {
    match &ellipse.definition {
        EllipseDefinition::Foci {
            focus1,
            focus2,
            point,
        } => record
            .with_text(ELLIPSE_FOCUS1, &name_of(store, *focus1))
            .with_text(ELLIPSE_FOCUS2, &name_of(store, *focus2))
            .with_text(ELLIPSE_POINT, &name_of(store, *point)),
        EllipseDefinition::Image {
            transformation,
            preimage,
        } => encode_image(record, *transformation, *preimage, store),
    }
}

pub(crate) fn encode_parametric_fields(
    record: OpcodeRecord,
    curve: &ParametricCurve,
) -> OpcodeRecord {
    record
        .with_text(PARAMETRIC_X, &curve.x_expression)
        .with_text(PARAMETRIC_Y, &curve.y_expression)
        .with_text(PARAMETRIC_Z, &curve.z_expression)
        .with_number(PARAMETRIC_T_MIN, curve.t_min)
        .with_number(PARAMETRIC_T_MAX, curve.t_max)
}

/// Pole stored in the record, used as the degenerate-case fallback.
fn stored_normal(record: &OpcodeRecord, key: &str, store: &NoduleStore) -> Result<SphereVector> {
    if record.has(key) {
        let normal = record.vector(key)?;
        Ok(normalize(&normal, store.tolerance()).unwrap_or_else(unset_vector))
    } else {
        Ok(unset_vector())
    }
}

pub(crate) fn parse_line(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let start = resolve_field(record, LINE_START, names, store, POINT)?;
    let end = resolve_field(record, LINE_END, names, store, POINT)?;
    let kind = NoduleKind::Line(SphereLine {
        normal: stored_normal(record, LINE_NORMAL, store)?,
        anchor: unset_vector(),
        definition: LineDefinition::ThroughPoints { start, end },
    });
    finish_parse(record, names, store, kind, vec![start, end])
}

pub(crate) fn parse_segment(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let start = resolve_field(record, SEGMENT_START, names, store, POINT)?;
    let end = resolve_field(record, SEGMENT_END, names, store, POINT)?;
    let long = record.optional_flag(SEGMENT_LONG)?.unwrap_or(false);
    let arc_length = if record.has(SEGMENT_ARC_LENGTH) {
        record.number(SEGMENT_ARC_LENGTH)?
    } else {
        0.0
    };
    let kind = NoduleKind::Segment(SphereSegment {
        start: unset_vector(),
        end: unset_vector(),
        normal: stored_normal(record, SEGMENT_NORMAL, store)?,
        arc_length,
        long,
        definition: SegmentDefinition::ThroughPoints { start, end },
    });
    finish_parse(record, names, store, kind, vec![start, end])
}

pub(crate) fn parse_circle(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let center = resolve_field(record, CIRCLE_CENTER, names, store, POINT)?;
    let circle_point = resolve_field(record, CIRCLE_POINT, names, store, POINT)?;
    let kind = NoduleKind::Circle(SphereCircle {
        center: unset_vector(),
        radius: 0.0,
        definition: CircleDefinition::CenterPoint {
            center,
            circle_point,
        },
    });
    finish_parse(record, names, store, kind, vec![center, circle_point])
}

pub(crate) fn parse_ellipse(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let focus1 = resolve_field(record, ELLIPSE_FOCUS1, names, store, POINT)?;
    let focus2 = resolve_field(record, ELLIPSE_FOCUS2, names, store, POINT)?;
    let point = resolve_field(record, ELLIPSE_POINT, names, store, POINT)?;
    let kind = NoduleKind::Ellipse(SphereEllipse {
        focus1: unset_vector(),
        focus2: unset_vector(),
        angle_sum: 0.0,
        definition: EllipseDefinition::Foci {
            focus1,
            focus2,
            point,
        },
    });
    finish_parse(record, names, store, kind, vec![focus1, focus2, point])
}

pub(crate) fn parse_perpendicular_line(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let point = resolve_field(record, PERPENDICULAR_POINT, names, store, POINT)?;
    let curve = resolve_field(
        record,
        PERPENDICULAR_CURVE,
        names,
        store,
        PERPENDICULAR_TARGETS,
    )?;
    let kind = NoduleKind::Line(SphereLine {
        normal: stored_normal(record, LINE_NORMAL, store)?,
        anchor: unset_vector(),
        definition: LineDefinition::Perpendicular { point, curve },
    });
    finish_parse(record, names, store, kind, vec![point, curve])
}

pub(crate) fn parse_parametric(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let curve = parametric_curve(
        store,
        record.text(PARAMETRIC_X)?,
        record.text(PARAMETRIC_Y)?,
        record.text(PARAMETRIC_Z)?,
        record.number(PARAMETRIC_T_MIN)?,
        record.number(PARAMETRIC_T_MAX)?,
    )?;
    finish_parse(record, names, store, NoduleKind::Parametric(curve), vec![])
}
