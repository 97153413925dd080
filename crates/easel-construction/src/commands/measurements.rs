//! Measurements, sliders and calculations: scalar-valued nodules.

use super::add::{finish_parse, require_type, AddNoduleCommand};
use super::{name_of, resolve, Command, ObjectNameMap, OpcodeOutput, EXPRESSION, POINT, STRAIGHT};
use crate::nodule::{
    Expression, ExpressionDefinition, MeasurementKind, Nodule, NoduleId, NoduleKind, NoduleType,
};
use crate::script::OpcodeRecord;
use crate::store::NoduleStore;
use crate::update::evaluate;
use easel_core::{GeometryError, Result, ScriptError};

pub(crate) const ADD_MEASUREMENT: &str = "AddMeasurement";
pub(crate) const ADD_SLIDER: &str = "AddSlider";
pub(crate) const ADD_CALCULATION: &str = "AddCalculation";

const MEASUREMENT_KIND: &str = "measurementKind";
const MEASUREMENT_PARENTS: &str = "measurementParentNames";
const SLIDER_VALUE: &str = "sliderValue";
const SLIDER_MIN: &str = "sliderMin";
const SLIDER_MAX: &str = "sliderMax";
const SLIDER_STEP: &str = "sliderStep";
const CALCULATION_EXPRESSION: &str = "calculationExpression";
const CALCULATION_PARENTS: &str = "calculationParentNames";

fn expression_kind(value: f64, definition: ExpressionDefinition) -> NoduleKind {
    NoduleKind::Expression(Expression { value, definition })
}

fn check_slider(value: f64, min: f64, max: f64, step: f64) -> Result<()> {
    let reason = if min >= max {
        Some(format!("minimum {} is not below maximum {}", min, max))
    } else if step <= 0.0 {
        Some(format!("step {} must be positive", step))
    } else if !(min..=max).contains(&value) {
        Some(format!("value {} is outside [{}, {}]", value, min, max))
    } else {
        None
    };
    match reason {
        Some(reason) => Err(GeometryError::InvalidParameter {
            name: "slider".to_string(),
            reason,
        }
        .into()),
        None => Ok(()),
    }
}

/// Evaluates `expression` against the current values of `parents`.
fn check_calculation(store: &NoduleStore, expression: &str, parents: &[NoduleId]) -> Result<f64> {
    let inputs = parents
        .iter()
        .filter_map(|id| store.get(*id))
        .filter_map(|n| n.value().map(|v| (n.name.clone(), v)))
        .collect::<Vec<_>>();
    Ok(evaluate(expression, inputs)?)
}

fn measurement_parents(kind: MeasurementKind) -> (usize, &'static [NoduleType]) {
    match kind {
        MeasurementKind::SegmentLength => (1, &[NoduleType::Segment]),
        MeasurementKind::PointDistance => (2, POINT),
        MeasurementKind::LineAngle => (2, STRAIGHT),
    }
}

fn measurement_definition(
    kind: MeasurementKind,
    parents: &[NoduleId],
) -> Result<ExpressionDefinition> {
    let definition = match (kind, parents) {
        (MeasurementKind::SegmentLength, [segment]) => {
            ExpressionDefinition::SegmentLength { segment: *segment }
        }
        (MeasurementKind::PointDistance, [first, second]) => ExpressionDefinition::PointDistance {
            first: *first,
            second: *second,
        },
        (MeasurementKind::LineAngle, [first, second]) => ExpressionDefinition::LineAngle {
            first: *first,
            second: *second,
        },
        _ => {
            let (arity, _) = measurement_parents(kind);
            return Err(ScriptError::InvalidValue {
                field: MEASUREMENT_PARENTS.to_string(),
                value: parents.len().to_string(),
                reason: format!("{} needs {} parent(s)", kind.as_str(), arity),
            }
            .into());
        }
    };
    Ok(definition)
}

impl AddNoduleCommand {
    /// Arc length of a segment.
    pub fn segment_length(store: &mut NoduleStore, segment: NoduleId) -> Result<Self> {
        Self::measurement(store, MeasurementKind::SegmentLength, &[segment])
    }

    /// Angular distance between two points.
    pub fn point_distance(
        store: &mut NoduleStore,
        first: NoduleId,
        second: NoduleId,
    ) -> Result<Self> {
        Self::measurement(store, MeasurementKind::PointDistance, &[first, second])
    }

    /// Angle between two lines or segments.
    pub fn line_angle(store: &mut NoduleStore, first: NoduleId, second: NoduleId) -> Result<Self> {
        Self::measurement(store, MeasurementKind::LineAngle, &[first, second])
    }

    fn measurement(
        store: &mut NoduleStore,
        kind: MeasurementKind,
        parents: &[NoduleId],
    ) -> Result<Self> {
        let (_, expected) = measurement_parents(kind);
        for parent in parents {
            require_type(store, *parent, kind.as_str(), expected)?;
        }
        let definition = measurement_definition(kind, parents)?;
        let nodule = store.create(expression_kind(0.0, definition), parents.to_vec());
        Ok(Self::with_label(store, nodule))
    }

    /// User-adjustable value in `[min, max]`.
    pub fn slider(
        store: &mut NoduleStore,
        value: f64,
        min: f64,
        max: f64,
        step: f64,
    ) -> Result<Self> {
        check_slider(value, min, max, step)?;
        let definition = ExpressionDefinition::Slider { min, max, step };
        let nodule = store.create(expression_kind(value, definition), vec![]);
        Ok(Self::with_label(store, nodule))
    }

    /// Formula over other expressions, which it refers to by name.
    pub fn calculation(
        store: &mut NoduleStore,
        expression: impl Into<String>,
        parents: &[NoduleId],
    ) -> Result<Self> {
        let expression = expression.into();
        for parent in parents {
            require_type(store, *parent, "calculation input", EXPRESSION)?;
        }
        let value = check_calculation(store, &expression, parents)?;
        let definition = ExpressionDefinition::Calculation { expression };
        let nodule = store.create(expression_kind(value, definition), parents.to_vec());
        Ok(Self::with_label(store, nodule))
    }
}

pub(crate) fn encode_fields(
    record: OpcodeRecord,
    nodule: &Nodule,
    expression: &Expression,
    store: &NoduleStore,
) -> OpcodeRecord {
    let parent_names: Vec<String> = nodule.parents.iter().map(|p| name_of(store, *p)).collect();
    match &expression.definition {
        ExpressionDefinition::SegmentLength { .. } => record
            .with_text(MEASUREMENT_KIND, MeasurementKind::SegmentLength.as_str())
            .with_names(MEASUREMENT_PARENTS, &parent_names),
        ExpressionDefinition::PointDistance { .. } => record
            .with_text(MEASUREMENT_KIND, MeasurementKind::PointDistance.as_str())
            .with_names(MEASUREMENT_PARENTS, &parent_names),
        ExpressionDefinition::LineAngle { .. } => record
            .with_text(MEASUREMENT_KIND, MeasurementKind::LineAngle.as_str())
            .with_names(MEASUREMENT_PARENTS, &parent_names),
        ExpressionDefinition::Slider { min, max, step } => record
            .with_number(SLIDER_VALUE, expression.value)
            .with_number(SLIDER_MIN, *min)
            .with_number(SLIDER_MAX, *max)
            .with_number(SLIDER_STEP, *step),
        ExpressionDefinition::Calculation { expression } => record
            .with_text(CALCULATION_EXPRESSION, expression)
            .with_names(CALCULATION_PARENTS, &parent_names),
    }
}

fn resolve_list(
    record: &OpcodeRecord,
    key: &str,
    names: &ObjectNameMap,
    store: &NoduleStore,
    expected: &[NoduleType],
) -> Result<Vec<NoduleId>> {
    record
        .names(key)?
        .iter()
        .map(|name| resolve(names, store, name, expected))
        .collect()
}

pub(crate) fn parse_measurement(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let raw_kind = record.text(MEASUREMENT_KIND)?;
    let kind = MeasurementKind::parse(&raw_kind).ok_or_else(|| ScriptError::InvalidValue {
        field: MEASUREMENT_KIND.to_string(),
        value: raw_kind.clone(),
        reason: "unknown measurement".to_string(),
    })?;
    let (_, expected) = measurement_parents(kind);
    let parents = resolve_list(record, MEASUREMENT_PARENTS, names, store, expected)?;
    let definition = measurement_definition(kind, &parents)?;
    finish_parse(record, names, store, expression_kind(0.0, definition), parents)
}

pub(crate) fn parse_slider(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let value = record.number(SLIDER_VALUE)?;
    let min = record.number(SLIDER_MIN)?;
    let max = record.number(SLIDER_MAX)?;
    let step = record.number(SLIDER_STEP)?;
    check_slider(value, min, max, step)?;
    let definition = ExpressionDefinition::Slider { min, max, step };
    finish_parse(record, names, store, expression_kind(value, definition), vec![])
}

pub(crate) fn parse_calculation(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let expression = record.text(CALCULATION_EXPRESSION)?;
    let parents = resolve_list(record, CALCULATION_PARENTS, names, store, EXPRESSION)?;
    let value = check_calculation(store, &expression, &parents)?;
    let definition = ExpressionDefinition::Calculation { expression };
    finish_parse(record, names, store, expression_kind(value, definition), parents)
}

/// Moves a slider to a new value (clamped to its range).
///
/// Transient: not serialized, the slider's creation opcode records the
/// value current at save time.
#[derive(Debug, Clone)]
pub struct ChangeSliderCommand {
    slider: NoduleId,
    value: f64,
    previous: Option<f64>,
}

impl ChangeSliderCommand {
    pub fn new(store: &NoduleStore, slider: NoduleId, value: f64) -> Result<Self> {
        let nodule = store.require(slider)?;
        match &nodule.kind {
            NoduleKind::Expression(Expression {
                definition: ExpressionDefinition::Slider { min, max, .. },
                ..
            }) => Ok(Self {
                slider,
                value: value.clamp(*min, *max),
                previous: None,
            }),
            _ => Err(GeometryError::InvalidParameter {
                name: "slider".to_string(),
                reason: format!("{} is not a slider", nodule.name),
            }
            .into()),
        }
    }

    fn set(store: &mut NoduleStore, slider: NoduleId, value: f64) -> Result<()> {
        let nodule = store.require_mut(slider)?;
        if let NoduleKind::Expression(e) = &mut nodule.kind {
            e.value = value;
            nodule.dirty = true;
        }
        store.update_from(&[slider]);
        Ok(())
    }
}

impl Command for ChangeSliderCommand {
    fn name(&self) -> &str {
        "Change Slider"
    }

    fn save_state(&mut self, store: &NoduleStore) {
        self.previous = store.get(self.slider).and_then(Nodule::value);
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        Self::set(store, self.slider, self.value)
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        match self.previous {
            Some(previous) => Self::set(store, self.slider, previous),
            None => Ok(()),
        }
    }

    fn to_opcode(&self, _store: &NoduleStore) -> Option<OpcodeOutput> {
        None
    }
}
