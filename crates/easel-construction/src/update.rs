//! Update protocol: recompute geometry and existence after a change.
//!
//! A change to a set of seed nodules invalidates exactly their descendant
//! closure. [`NoduleStore::update_from`] visits that closure parents-first,
//! recomputing each nodule from its definition and the already-updated
//! geometry of its parents.

use crate::nodule::{
    CircleDefinition, EllipseDefinition, ExpressionDefinition, LineDefinition, Nodule, NoduleId,
    NoduleKind, ParametricCurve, PointDefinition, SegmentDefinition, SphereCircle, SphereEllipse,
    SphereLine, SpherePoint, SphereSegment, TransformationDefinition,
};
use crate::store::NoduleStore;
use easel_core::{
    angle_between, arc_parameter, intersect_planes, is_proper_radius, normalize, point_on_arc,
    project_to_great_circle, project_to_small_circle, reflection_matrix, rotation_matrix,
    to_radians, GeometryError, SphereVector,
};
use evalexpr::{build_operator_tree, ContextWithMutableVariables, HashMapContext, Value};
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::{E, PI, TAU};

impl NoduleStore {
    /// Recomputes every descendant of `seeds` (seeds included) in
    /// topological order. Nodules whose geometry or existence changed are
    /// flagged dirty.
    pub fn update_from(&mut self, seeds: &[NoduleId]) {
        let affected = self.descendants_of(seeds);
        let order = self.topological_order(&affected);

        for id in order {
            let Some(nodule) = self.get(id) else {
                continue;
            };
            let (kind, defined) = recompute(self, nodule);
            let parents_exist = nodule
                .parents
                .iter()
                .all(|p| self.get(*p).is_some_and(|p| p.exists));
            let exists = defined && parents_exist;

            let Some(nodule) = self.get_mut(id) else {
                continue;
            };
            if nodule.exists != exists {
                tracing::debug!(name = %nodule.name, exists, "Existence changed");
            }
            if nodule.exists != exists || nodule.kind != kind {
                nodule.dirty = true;
            }
            nodule.exists = exists;
            nodule.kind = kind;
        }
    }
}

/// Geometry of `nodule` given the current state of its parents, plus
/// whether its defining condition holds.
pub(crate) fn recompute(store: &NoduleStore, nodule: &Nodule) -> (NoduleKind, bool) {
    let tol = store.tolerance();
    match &nodule.kind {
        NoduleKind::Point(p) => {
            let (location, defined) = point_location(store, p, tol);
            (
                NoduleKind::Point(SpherePoint {
                    location,
                    definition: p.definition.clone(),
                }),
                defined,
            )
        }
        NoduleKind::Line(l) => {
            let (line, defined) = line_geometry(store, l, tol);
            (NoduleKind::Line(line), defined)
        }
        NoduleKind::Segment(s) => {
            let (segment, defined) = segment_geometry(store, s, tol);
            (NoduleKind::Segment(segment), defined)
        }
        NoduleKind::Circle(c) => {
            let (circle, defined) = circle_geometry(store, c, tol);
            (NoduleKind::Circle(circle), defined)
        }
        NoduleKind::Ellipse(e) => {
            let (ellipse, defined) = ellipse_geometry(store, e, tol);
            (NoduleKind::Ellipse(ellipse), defined)
        }
        NoduleKind::Parametric(p) => {
            let samples = sample_parametric(p, store.options().parametric_samples, tol);
            let defined = samples.is_ok();
            let mut curve = p.clone();
            if let Ok(samples) = samples {
                curve.samples = samples;
            }
            (NoduleKind::Parametric(curve), defined)
        }
        NoduleKind::Label(l) => {
            let mut label = l.clone();
            if let Some(anchor) = store.get(l.owner).and_then(|o| o.kind.anchor()) {
                label.location = anchor;
            }
            (NoduleKind::Label(label), true)
        }
        NoduleKind::Expression(e) => {
            let value = expression_value(store, nodule, &e.definition);
            let defined = value.is_some();
            let mut expression = e.clone();
            if let Some(value) = value {
                expression.value = value;
            }
            (NoduleKind::Expression(expression), defined)
        }
        NoduleKind::Transformation(t) => {
            let matrix = transformation_matrix(store, &t.definition, tol);
            let defined = matrix.is_some();
            let mut transformation = t.clone();
            if let Some(matrix) = matrix {
                transformation.matrix = matrix;
            }
            (NoduleKind::Transformation(transformation), defined)
        }
    }
}

fn location_of(store: &NoduleStore, id: NoduleId) -> Option<SphereVector> {
    store.get(id).and_then(Nodule::location)
}

fn value_of(store: &NoduleStore, id: NoduleId) -> Option<f64> {
    store.get(id).and_then(Nodule::value)
}

fn matrix_of(store: &NoduleStore, id: NoduleId) -> Option<Matrix3<f64>> {
    match &store.get(id)?.kind {
        NoduleKind::Transformation(t) => Some(t.matrix),
        _ => None,
    }
}

/// Pole of a line or segment.
fn normal_of(store: &NoduleStore, id: NoduleId) -> Option<SphereVector> {
    match &store.get(id)?.kind {
        NoduleKind::Line(l) => Some(l.normal),
        NoduleKind::Segment(s) => Some(s.normal),
        _ => None,
    }
}

/// Orientation sign of an isometry: `+1` for rotations, `-1` for reflections.
fn orientation(matrix: &Matrix3<f64>) -> f64 {
    matrix.determinant().signum()
}

/// Keeps the previous pole when the new one is undetermined, as long as it
/// is still perpendicular to `through`.
fn fallback_normal(previous: &SphereVector, through: &SphereVector, tol: f64) -> Option<SphereVector> {
    normalize(&(previous - through * through.dot(previous)), tol)
}

fn point_location(store: &NoduleStore, point: &SpherePoint, tol: f64) -> (SphereVector, bool) {
    let previous = point.location;
    let computed = match &point.definition {
        PointDefinition::Free => Some(previous),
        PointDefinition::Antipode { point } => location_of(store, *point).map(|p| -p),
        PointDefinition::Midpoint { segment } => match store.get(*segment).map(|s| &s.kind) {
            Some(NoduleKind::Segment(s)) => {
                Some(point_on_arc(&s.start, &s.normal, s.arc_length / 2.0))
            }
            _ => None,
        },
        PointDefinition::OnObject { parent } => {
            store.get(*parent).and_then(|p| project_onto(&p.kind, &previous, tol))
        }
        PointDefinition::Intersection {
            first,
            second,
            index,
        } => intersection_location(store, *first, *second, *index, tol),
        PointDefinition::Image {
            transformation,
            preimage,
        } => match (matrix_of(store, *transformation), location_of(store, *preimage)) {
            (Some(m), Some(p)) => Some(m * p),
            _ => None,
        },
    };
    match computed {
        Some(location) => (location, true),
        None => (previous, false),
    }
}

/// Nearest point of a curve to `x`.
pub(crate) fn project_onto(kind: &NoduleKind, x: &SphereVector, tol: f64) -> Option<SphereVector> {
    match kind {
        NoduleKind::Line(l) => project_to_great_circle(x, &l.normal, tol),
        NoduleKind::Segment(s) => {
            let on_circle = project_to_great_circle(x, &s.normal, tol)?;
            let theta = arc_parameter(&on_circle, &s.start, &s.normal);
            if theta <= s.arc_length + tol {
                Some(on_circle)
            } else if theta - s.arc_length < TAU - theta {
                Some(s.end)
            } else {
                Some(s.start)
            }
        }
        NoduleKind::Circle(c) => Some(project_to_small_circle(x, &c.center, c.radius, tol)),
        NoduleKind::Parametric(p) => p
            .samples
            .iter()
            .min_by(|a, b| angle_between(a, x).total_cmp(&angle_between(b, x)))
            .copied(),
        _ => None,
    }
}

fn segment_contains(segment: &SphereSegment, x: &SphereVector, tol: f64) -> bool {
    let theta = arc_parameter(x, &segment.start, &segment.normal);
    theta <= segment.arc_length + tol || theta >= TAU - tol
}

fn intersection_location(
    store: &NoduleStore,
    first: NoduleId,
    second: NoduleId,
    index: usize,
    tol: f64,
) -> Option<SphereVector> {
    let a = &store.get(first)?.kind;
    let b = &store.get(second)?.kind;
    let candidates = intersect_planes(&a.plane()?, &b.plane()?, tol)?;
    let x = normalize(candidates.get(index)?, tol)?;
    for kind in [a, b] {
        if let NoduleKind::Segment(s) = kind {
            if !segment_contains(s, &x, tol) {
                return None;
            }
        }
    }
    Some(x)
}

fn line_geometry(store: &NoduleStore, line: &SphereLine, tol: f64) -> (SphereLine, bool) {
    let mut result = line.clone();
    let defined = match &line.definition {
        LineDefinition::ThroughPoints { start, end } => {
            match (location_of(store, *start), location_of(store, *end)) {
                (Some(a), Some(b)) => {
                    let normal = normalize(&a.cross(&b), tol)
                        .or_else(|| fallback_normal(&line.normal, &a, tol));
                    result.anchor = a;
                    match normal {
                        Some(n) => {
                            result.normal = n;
                            true
                        }
                        None => false,
                    }
                }
                _ => false,
            }
        }
        LineDefinition::Perpendicular { point, curve } => {
            let through = location_of(store, *point);
            let pole = store.get(*curve).and_then(|c| match &c.kind {
                NoduleKind::Line(l) => Some(l.normal),
                NoduleKind::Segment(s) => Some(s.normal),
                NoduleKind::Circle(c) => Some(c.center),
                _ => None,
            });
            match (through, pole) {
                (Some(p), Some(pole)) => {
                    result.anchor = p;
                    match normalize(&p.cross(&pole), tol)
                        .or_else(|| fallback_normal(&line.normal, &p, tol))
                    {
                        Some(n) => {
                            result.normal = n;
                            true
                        }
                        None => false,
                    }
                }
                _ => false,
            }
        }
        LineDefinition::Longitude { degrees } => {
            let lambda = to_radians(*degrees);
            result.normal = Vector3::new(-lambda.sin(), lambda.cos(), 0.0);
            result.anchor = Vector3::new(lambda.cos(), lambda.sin(), 0.0);
            true
        }
        LineDefinition::Image {
            transformation,
            preimage,
        } => match (
            matrix_of(store, *transformation),
            store.get(*preimage).map(|p| &p.kind),
        ) {
            (Some(m), Some(NoduleKind::Line(pre))) => {
                result.normal = m * pre.normal * orientation(&m);
                result.anchor = m * pre.anchor;
                true
            }
            _ => false,
        },
    };
    (result, defined)
}

fn segment_geometry(store: &NoduleStore, segment: &SphereSegment, tol: f64) -> (SphereSegment, bool) {
    let mut result = segment.clone();
    let defined = match &segment.definition {
        SegmentDefinition::ThroughPoints { start, end } => {
            match (location_of(store, *start), location_of(store, *end)) {
                (Some(a), Some(b)) => {
                    let short = normalize(&a.cross(&b), tol)
                        .or_else(|| fallback_normal(&segment.normal, &a, tol));
                    match short {
                        Some(n) => {
                            let angle = angle_between(&a, &b);
                            result.start = a;
                            result.end = b;
                            if segment.long {
                                result.normal = -n;
                                result.arc_length = TAU - angle;
                            } else {
                                result.normal = n;
                                result.arc_length = angle;
                            }
                            true
                        }
                        None => false,
                    }
                }
                _ => false,
            }
        }
        SegmentDefinition::Image {
            transformation,
            preimage,
        } => match (
            matrix_of(store, *transformation),
            store.get(*preimage).map(|p| &p.kind),
        ) {
            (Some(m), Some(NoduleKind::Segment(pre))) => {
                result.start = m * pre.start;
                result.end = m * pre.end;
                result.normal = m * pre.normal * orientation(&m);
                result.arc_length = pre.arc_length;
                result.long = pre.long;
                true
            }
            _ => false,
        },
    };
    (result, defined)
}

fn circle_geometry(store: &NoduleStore, circle: &SphereCircle, tol: f64) -> (SphereCircle, bool) {
    let mut result = circle.clone();
    let defined = match &circle.definition {
        CircleDefinition::CenterPoint {
            center,
            circle_point,
        } => match (location_of(store, *center), location_of(store, *circle_point)) {
            (Some(c), Some(p)) => {
                result.center = c;
                result.radius = angle_between(&c, &p);
                is_proper_radius(result.radius, tol)
            }
            _ => false,
        },
        CircleDefinition::Latitude { degrees } => {
            result.center = Vector3::z();
            result.radius = to_radians(90.0 - degrees);
            is_proper_radius(result.radius, tol)
        }
        CircleDefinition::Image {
            transformation,
            preimage,
        } => match (
            matrix_of(store, *transformation),
            store.get(*preimage).map(|p| &p.kind),
        ) {
            (Some(m), Some(NoduleKind::Circle(pre))) => {
                result.center = m * pre.center;
                result.radius = pre.radius;
                true
            }
            _ => false,
        },
    };
    (result, defined)
}

fn ellipse_geometry(
    store: &NoduleStore,
    ellipse: &SphereEllipse,
    tol: f64,
) -> (SphereEllipse, bool) {
    let mut result = ellipse.clone();
    let defined = match &ellipse.definition {
        EllipseDefinition::Foci {
            focus1,
            focus2,
            point,
        } => match (
            location_of(store, *focus1),
            location_of(store, *focus2),
            location_of(store, *point),
        ) {
            (Some(f1), Some(f2), Some(p)) => {
                result.focus1 = f1;
                result.focus2 = f2;
                result.angle_sum = angle_between(&f1, &p) + angle_between(&f2, &p);
                let separation = angle_between(&f1, &f2);
                result.angle_sum > separation + tol && result.angle_sum < TAU - separation - tol
            }
            _ => false,
        },
        EllipseDefinition::Image {
            transformation,
            preimage,
        } => match (
            matrix_of(store, *transformation),
            store.get(*preimage).map(|p| &p.kind),
        ) {
            (Some(m), Some(NoduleKind::Ellipse(pre))) => {
                result.focus1 = m * pre.focus1;
                result.focus2 = m * pre.focus2;
                result.angle_sum = pre.angle_sum;
                true
            }
            _ => false,
        },
    };
    (result, defined)
}

fn expression_value(
    store: &NoduleStore,
    nodule: &Nodule,
    definition: &ExpressionDefinition,
) -> Option<f64> {
    match definition {
        ExpressionDefinition::SegmentLength { segment } => match &store.get(*segment)?.kind {
            NoduleKind::Segment(s) => Some(s.arc_length),
            _ => None,
        },
        ExpressionDefinition::PointDistance { first, second } => Some(angle_between(
            &location_of(store, *first)?,
            &location_of(store, *second)?,
        )),
        ExpressionDefinition::LineAngle { first, second } => Some(angle_between(
            &normal_of(store, *first)?,
            &normal_of(store, *second)?,
        )),
        ExpressionDefinition::Slider { .. } => nodule.value(),
        ExpressionDefinition::Calculation { expression } => {
            let inputs = nodule
                .parents
                .iter()
                .filter_map(|p| store.get(*p))
                .filter_map(|p| p.value().map(|v| (p.name.clone(), v)));
            evaluate(expression, inputs).ok()
        }
    }
}

fn transformation_matrix(
    store: &NoduleStore,
    definition: &TransformationDefinition,
    tol: f64,
) -> Option<Matrix3<f64>> {
    match definition {
        TransformationDefinition::Reflection { line } => {
            Some(reflection_matrix(&normal_of(store, *line)?))
        }
        TransformationDefinition::PointReflection { point } => {
            Some(rotation_matrix(&location_of(store, *point)?, PI))
        }
        TransformationDefinition::Rotation { center, angle } => {
            let axis = normalize(&location_of(store, *center)?, tol)?;
            Some(rotation_matrix(&axis, value_of(store, *angle)?))
        }
        TransformationDefinition::Translation { line, distance } => Some(rotation_matrix(
            &normal_of(store, *line)?,
            value_of(store, *distance)?,
        )),
    }
}

/// Evaluates a formula with the given named variables bound.
///
/// `pi`/`PI` and `e`/`E` are always available.
pub fn evaluate<I>(expression: &str, variables: I) -> Result<f64, GeometryError>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let invalid = |reason: String| GeometryError::InvalidExpression {
        expression: expression.to_string(),
        reason,
    };

    let tree = build_operator_tree(expression).map_err(|e| invalid(e.to_string()))?;
    let mut context = HashMapContext::new();
    let constants =
        [("pi", PI), ("PI", PI), ("e", E), ("E", E)].map(|(n, v)| (n.to_string(), v));
    for (name, value) in constants.into_iter().chain(variables) {
        context
            .set_value(name, Value::Float(value))
            .map_err(|e| invalid(e.to_string()))?;
    }

    let value = match tree.eval_with_context(&context) {
        Ok(Value::Float(v)) => v,
        Ok(Value::Int(v)) => v as f64,
        Ok(other) => return Err(invalid(format!("not a number: {}", other))),
        Err(e) => return Err(invalid(e.to_string())),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid("result is not finite".to_string()))
    }
}

/// Samples a parametric curve uniformly in `t`, normalizing onto the sphere.
pub(crate) fn sample_parametric(
    curve: &ParametricCurve,
    samples: usize,
    tol: f64,
) -> Result<Vec<SphereVector>, GeometryError> {
    let samples = samples.max(2);
    let step = (curve.t_max - curve.t_min) / (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            let t = curve.t_min + step * i as f64;
            let at = |expr: &str| evaluate(expr, [("t".to_string(), t)]);
            let v = Vector3::new(
                at(&curve.x_expression)?,
                at(&curve.y_expression)?,
                at(&curve.z_expression)?,
            );
            normalize(&v, tol).ok_or_else(|| GeometryError::InvalidParameter {
                name: "t".to_string(),
                reason: format!("curve passes through the origin at t = {}", t),
            })
        })
        .collect()
}
