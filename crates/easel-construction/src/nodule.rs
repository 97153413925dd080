//! Entity model: every object of a construction is a [`Nodule`].
//!
//! A nodule couples bookkeeping shared by all objects (id, name, existence,
//! visibility, graph edges, style) with a closed set of geometric variants
//! ([`NoduleKind`]). Each variant stores both its current geometry and the
//! definition used to recompute that geometry from its parents.

use easel_core::{
    any_perpendicular, north_pole, point_on_arc, SpherePlane, SphereVector, Style,
};
use nalgebra::Matrix3;
use std::fmt;

/// Unique numeric identifier of a nodule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoduleId(pub u64);

impl fmt::Display for NoduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Field-less tag of a [`NoduleKind`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoduleType {
    Point,
    Line,
    Segment,
    Circle,
    Ellipse,
    Parametric,
    Label,
    Expression,
    Transformation,
}

impl NoduleType {
    /// All types, in naming-counter order.
    pub const ALL: [NoduleType; 9] = [
        NoduleType::Point,
        NoduleType::Line,
        NoduleType::Segment,
        NoduleType::Circle,
        NoduleType::Ellipse,
        NoduleType::Parametric,
        NoduleType::Label,
        NoduleType::Expression,
        NoduleType::Transformation,
    ];

    /// Prefix of auto-generated names.
    pub fn prefix(&self) -> &'static str {
        match self {
            NoduleType::Point => "P",
            NoduleType::Line => "Li",
            NoduleType::Segment => "Ls",
            NoduleType::Circle => "C",
            NoduleType::Ellipse => "E",
            NoduleType::Parametric => "Pa",
            NoduleType::Label => "Lb",
            NoduleType::Expression => "M",
            NoduleType::Transformation => "T",
        }
    }

    /// Curves a point can lie on.
    pub fn is_one_dimensional(&self) -> bool {
        matches!(
            self,
            NoduleType::Line
                | NoduleType::Segment
                | NoduleType::Circle
                | NoduleType::Ellipse
                | NoduleType::Parametric
        )
    }

    /// Types that receive a label on creation.
    pub fn is_labelled(&self) -> bool {
        self.is_one_dimensional() || *self == NoduleType::Point
    }

    /// Lowercase display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoduleType::Point => "point",
            NoduleType::Line => "line",
            NoduleType::Segment => "segment",
            NoduleType::Circle => "circle",
            NoduleType::Ellipse => "ellipse",
            NoduleType::Parametric => "parametric",
            NoduleType::Label => "label",
            NoduleType::Expression => "expression",
            NoduleType::Transformation => "transformation",
        }
    }
}

impl fmt::Display for NoduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a point is defined.
#[derive(Debug, Clone, PartialEq)]
pub enum PointDefinition {
    /// Placed directly by the user.
    Free,
    /// One of the (up to two) intersections of two curves.
    Intersection {
        first: NoduleId,
        second: NoduleId,
        index: usize,
    },
    /// Midpoint of a segment.
    Midpoint { segment: NoduleId },
    /// Antipode of a point.
    Antipode { point: NoduleId },
    /// Glued to a curve; the stored location is projected onto it.
    OnObject { parent: NoduleId },
    /// Image of a point under a transformation.
    Image {
        transformation: NoduleId,
        preimage: NoduleId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpherePoint {
    pub location: SphereVector,
    pub definition: PointDefinition,
}

/// How a line (full great circle) is defined.
#[derive(Debug, Clone, PartialEq)]
pub enum LineDefinition {
    ThroughPoints { start: NoduleId, end: NoduleId },
    /// Through `point`, perpendicular to `curve`.
    Perpendicular { point: NoduleId, curve: NoduleId },
    /// Earth-mode meridian.
    Longitude { degrees: f64 },
    Image {
        transformation: NoduleId,
        preimage: NoduleId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereLine {
    pub normal: SphereVector,
    /// A point on the line used to place its label.
    pub anchor: SphereVector,
    pub definition: LineDefinition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentDefinition {
    ThroughPoints { start: NoduleId, end: NoduleId },
    Image {
        transformation: NoduleId,
        preimage: NoduleId,
    },
}

/// Arc from `start` sweeping `arc_length` counter-clockwise about `normal`.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereSegment {
    pub start: SphereVector,
    pub end: SphereVector,
    pub normal: SphereVector,
    pub arc_length: f64,
    /// Take the complementary (longer than π) arc.
    pub long: bool,
    pub definition: SegmentDefinition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CircleDefinition {
    CenterPoint {
        center: NoduleId,
        circle_point: NoduleId,
    },
    /// Earth-mode parallel of latitude.
    Latitude { degrees: f64 },
    Image {
        transformation: NoduleId,
        preimage: NoduleId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereCircle {
    pub center: SphereVector,
    /// Angular radius in radians.
    pub radius: f64,
    pub definition: CircleDefinition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EllipseDefinition {
    Foci {
        focus1: NoduleId,
        focus2: NoduleId,
        point: NoduleId,
    },
    Image {
        transformation: NoduleId,
        preimage: NoduleId,
    },
}

/// Locus of points whose angular distances to the foci sum to `angle_sum`.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereEllipse {
    pub focus1: SphereVector,
    pub focus2: SphereVector,
    pub angle_sum: f64,
    pub definition: EllipseDefinition,
}

/// Curve `t -> normalize(x(t), y(t), z(t))` for `t` in `[t_min, t_max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricCurve {
    pub x_expression: String,
    pub y_expression: String,
    pub z_expression: String,
    pub t_min: f64,
    pub t_max: f64,
    pub samples: Vec<SphereVector>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub owner: NoduleId,
    pub text: String,
    pub location: SphereVector,
}

/// Measurements that read geometry off other objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    SegmentLength,
    PointDistance,
    LineAngle,
}

impl MeasurementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::SegmentLength => "segmentLength",
            MeasurementKind::PointDistance => "pointDistance",
            MeasurementKind::LineAngle => "lineAngle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "segmentLength" => Some(MeasurementKind::SegmentLength),
            "pointDistance" => Some(MeasurementKind::PointDistance),
            "lineAngle" => Some(MeasurementKind::LineAngle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionDefinition {
    SegmentLength { segment: NoduleId },
    PointDistance { first: NoduleId, second: NoduleId },
    LineAngle { first: NoduleId, second: NoduleId },
    Slider { min: f64, max: f64, step: f64 },
    /// Formula over the values of the parent expressions, referenced by name.
    Calculation { expression: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub value: f64,
    pub definition: ExpressionDefinition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformationDefinition {
    Reflection { line: NoduleId },
    PointReflection { point: NoduleId },
    /// Rotation about `center` by the value of the `angle` expression.
    Rotation { center: NoduleId, angle: NoduleId },
    /// Rotation about the pole of `line` by the value of `distance`.
    Translation { line: NoduleId, distance: NoduleId },
}

/// An isometry of the sphere stored as an orthogonal 3×3 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    pub matrix: Matrix3<f64>,
    pub definition: TransformationDefinition,
}

/// Closed set of entity variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NoduleKind {
    Point(SpherePoint),
    Line(SphereLine),
    Segment(SphereSegment),
    Circle(SphereCircle),
    Ellipse(SphereEllipse),
    Parametric(ParametricCurve),
    Label(Label),
    Expression(Expression),
    Transformation(Transformation),
}

impl NoduleKind {
    pub fn nodule_type(&self) -> NoduleType {
        match self {
            NoduleKind::Point(_) => NoduleType::Point,
            NoduleKind::Line(_) => NoduleType::Line,
            NoduleKind::Segment(_) => NoduleType::Segment,
            NoduleKind::Circle(_) => NoduleType::Circle,
            NoduleKind::Ellipse(_) => NoduleType::Ellipse,
            NoduleKind::Parametric(_) => NoduleType::Parametric,
            NoduleKind::Label(_) => NoduleType::Label,
            NoduleKind::Expression(_) => NoduleType::Expression,
            NoduleKind::Transformation(_) => NoduleType::Transformation,
        }
    }

    /// Where a label attached to this object is placed.
    pub fn anchor(&self) -> Option<SphereVector> {
        match self {
            NoduleKind::Point(p) => Some(p.location),
            NoduleKind::Line(l) => Some(l.anchor),
            NoduleKind::Segment(s) => Some(point_on_arc(&s.start, &s.normal, s.arc_length / 2.0)),
            NoduleKind::Circle(c) => {
                Some(c.center * c.radius.cos() + any_perpendicular(&c.center) * c.radius.sin())
            }
            NoduleKind::Ellipse(e) => Some(
                (e.focus1 + e.focus2)
                    .try_normalize(f64::EPSILON)
                    .unwrap_or(e.focus1),
            ),
            NoduleKind::Parametric(p) => p.samples.first().copied(),
            NoduleKind::Label(l) => Some(l.location),
            NoduleKind::Expression(_) | NoduleKind::Transformation(_) => None,
        }
    }

    /// Plane whose trace on the sphere carries this curve (lines, segments, circles).
    pub fn plane(&self) -> Option<SpherePlane> {
        match self {
            NoduleKind::Line(l) => Some(SpherePlane::great_circle(l.normal)),
            NoduleKind::Segment(s) => Some(SpherePlane::great_circle(s.normal)),
            NoduleKind::Circle(c) => Some(SpherePlane::small_circle(c.center, c.radius)),
            _ => None,
        }
    }

    /// Parents a definition refers to, in registration order.
    pub fn defining_parents(&self) -> Vec<NoduleId> {
        match self {
            NoduleKind::Point(p) => match &p.definition {
                PointDefinition::Free => vec![],
                PointDefinition::Intersection { first, second, .. } => vec![*first, *second],
                PointDefinition::Midpoint { segment } => vec![*segment],
                PointDefinition::Antipode { point } => vec![*point],
                PointDefinition::OnObject { parent } => vec![*parent],
                PointDefinition::Image {
                    transformation,
                    preimage,
                } => vec![*transformation, *preimage],
            },
            NoduleKind::Line(l) => match &l.definition {
                LineDefinition::ThroughPoints { start, end } => vec![*start, *end],
                LineDefinition::Perpendicular { point, curve } => vec![*point, *curve],
                LineDefinition::Longitude { .. } => vec![],
                LineDefinition::Image {
                    transformation,
                    preimage,
                } => vec![*transformation, *preimage],
            },
            NoduleKind::Segment(s) => match &s.definition {
                SegmentDefinition::ThroughPoints { start, end } => vec![*start, *end],
                SegmentDefinition::Image {
                    transformation,
                    preimage,
                } => vec![*transformation, *preimage],
            },
            NoduleKind::Circle(c) => match &c.definition {
                CircleDefinition::CenterPoint {
                    center,
                    circle_point,
                } => vec![*center, *circle_point],
                CircleDefinition::Latitude { .. } => vec![],
                CircleDefinition::Image {
                    transformation,
                    preimage,
                } => vec![*transformation, *preimage],
            },
            NoduleKind::Ellipse(e) => match &e.definition {
                EllipseDefinition::Foci {
                    focus1,
                    focus2,
                    point,
                } => vec![*focus1, *focus2, *point],
                EllipseDefinition::Image {
                    transformation,
                    preimage,
                } => vec![*transformation, *preimage],
            },
            NoduleKind::Parametric(_) => vec![],
            NoduleKind::Label(l) => vec![l.owner],
            // Calculations list their inputs separately; see `Nodule::parents`.
            NoduleKind::Expression(e) => match &e.definition {
                ExpressionDefinition::SegmentLength { segment } => vec![*segment],
                ExpressionDefinition::PointDistance { first, second }
                | ExpressionDefinition::LineAngle { first, second } => vec![*first, *second],
                ExpressionDefinition::Slider { .. } | ExpressionDefinition::Calculation { .. } => {
                    vec![]
                }
            },
            NoduleKind::Transformation(t) => match &t.definition {
                TransformationDefinition::Reflection { line } => vec![*line],
                TransformationDefinition::PointReflection { point } => vec![*point],
                TransformationDefinition::Rotation { center, angle } => vec![*center, *angle],
                TransformationDefinition::Translation { line, distance } => {
                    vec![*line, *distance]
                }
            },
        }
    }
}

/// A geometric or decorative object participating in the dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Nodule {
    pub id: NoduleId,
    pub name: String,
    /// The defining geometric condition currently holds.
    pub exists: bool,
    /// User visibility flag, independent of existence.
    pub showing: bool,
    pub parents: Vec<NoduleId>,
    pub children: Vec<NoduleId>,
    pub style: Style,
    /// Set whenever geometry or existence changed; drained by the renderer.
    pub dirty: bool,
    pub kind: NoduleKind,
}

impl Nodule {
    /// Creates an unregistered nodule; `exists` starts true until the first update.
    pub fn new(
        id: NoduleId,
        name: impl Into<String>,
        kind: NoduleKind,
        parents: Vec<NoduleId>,
        style: Style,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            exists: true,
            showing: true,
            parents,
            children: Vec::new(),
            style,
            dirty: true,
            kind,
        }
    }

    pub fn nodule_type(&self) -> NoduleType {
        self.kind.nodule_type()
    }

    /// Drawn only while both existing and showing.
    pub fn is_visible(&self) -> bool {
        self.exists && self.showing
    }

    pub fn location(&self) -> Option<SphereVector> {
        match &self.kind {
            NoduleKind::Point(p) => Some(p.location),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match &self.kind {
            NoduleKind::Expression(e) => Some(e.value),
            _ => None,
        }
    }

    pub fn label_text(&self) -> Option<&str> {
        match &self.kind {
            NoduleKind::Label(l) => Some(&l.text),
            _ => None,
        }
    }
}

/// Placeholder geometry for a freshly built nodule; replaced on first update.
pub(crate) fn unset_vector() -> SphereVector {
    north_pole()
}
