//! Reversible commands over the nodule store.
//!
//! Every user-level change to a construction is a [`Command`]. The history
//! calls [`Command::save_state`] once before the first [`Command::apply`],
//! then alternates `restore_state`/`apply` for undo and redo. Commands that
//! persist serialize themselves to opcode lines and are rebuilt by the
//! parser registered for their tag.

mod add;
mod curves;
mod delete;
mod earth;
mod group;
mod measurements;
mod modify;
mod pencil;
mod points;
mod transformations;

pub use add::AddNoduleCommand;
pub use delete::{delete_with_descendants, DeleteNoduleCommand};
pub use earth::SetEarthModeCommand;
pub use group::CommandGroup;
pub use measurements::ChangeSliderCommand;
pub use modify::{
    ChangeLabelTextCommand, MoveLineCommand, MovePointCommand, SetNoduleDisplayCommand,
    StyleNoduleCommand,
};
pub use pencil::AddPencilCommand;

use crate::nodule::{NoduleId, NoduleType};
use crate::script::OpcodeRecord;
use crate::store::NoduleStore;
use easel_core::{Result, ScriptError};
use std::collections::HashMap;
use std::fmt;

/// Object names resolved so far while replaying a script.
pub type ObjectNameMap = HashMap<String, NoduleId>;

/// Serialized form of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpcodeOutput {
    Line(String),
    Lines(Vec<String>),
}

impl OpcodeOutput {
    pub fn into_lines(self) -> Vec<String> {
        match self {
            OpcodeOutput::Line(line) => vec![line],
            OpcodeOutput::Lines(lines) => lines,
        }
    }
}

/// A reversible change to a construction.
pub trait Command: fmt::Debug {
    /// Display name for menus and logs.
    fn name(&self) -> &str;

    /// Captures whatever `restore_state` needs. Called once, before the
    /// first `apply`.
    fn save_state(&mut self, _store: &NoduleStore) {}

    /// Performs the change.
    fn apply(&mut self, store: &mut NoduleStore) -> Result<()>;

    /// Reverts exactly the effect of the last `apply`.
    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()>;

    /// Opcode line(s), or `None` for transient commands.
    fn to_opcode(&self, store: &NoduleStore) -> Option<OpcodeOutput>;
}

/// Builds a command from a decoded opcode, resolving names through `names`.
pub type ParseFn =
    fn(&OpcodeRecord, &mut ObjectNameMap, &mut NoduleStore) -> Result<Box<dyn Command>>;

/// Parser registered for a tag.
pub fn parser_for(tag: &str) -> Option<ParseFn> {
    let parse: ParseFn = match tag {
        points::ADD_POINT => points::parse_point,
        points::ADD_INTERSECTION_POINT => points::parse_intersection_point,
        points::ADD_MIDPOINT => points::parse_midpoint,
        points::ADD_ANTIPODAL_POINT => points::parse_antipodal_point,
        points::ADD_POINT_ON_OBJECT => points::parse_point_on_object,
        curves::ADD_LINE => curves::parse_line,
        curves::ADD_SEGMENT => curves::parse_segment,
        curves::ADD_CIRCLE => curves::parse_circle,
        curves::ADD_ELLIPSE => curves::parse_ellipse,
        curves::ADD_PERPENDICULAR_LINE => curves::parse_perpendicular_line,
        curves::ADD_PARAMETRIC => curves::parse_parametric,
        earth::ADD_LATITUDE => earth::parse_latitude,
        earth::ADD_LONGITUDE => earth::parse_longitude,
        earth::SET_EARTH_MODE => earth::parse_set_earth_mode,
        measurements::ADD_MEASUREMENT => measurements::parse_measurement,
        measurements::ADD_SLIDER => measurements::parse_slider,
        measurements::ADD_CALCULATION => measurements::parse_calculation,
        transformations::ADD_REFLECTION => transformations::parse_reflection,
        transformations::ADD_POINT_REFLECTION => transformations::parse_point_reflection,
        transformations::ADD_ROTATION => transformations::parse_rotation,
        transformations::ADD_TRANSLATION => transformations::parse_translation,
        transformations::ADD_ISOMETRY_IMAGE => transformations::parse_isometry_image,
        modify::SET_NODULE_DISPLAY => modify::parse_set_display,
        modify::STYLE_NODULE => modify::parse_style,
        modify::CHANGE_LABEL_TEXT => modify::parse_label_text,
        delete::DELETE_NODULE => delete::parse_delete,
        _ => return None,
    };
    Some(parse)
}

/// Decodes `record` with the parser registered for its tag.
pub fn parse_command(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let parse = parser_for(record.tag()).ok_or_else(|| ScriptError::UnknownCommand {
        tag: record.tag().to_string(),
    })?;
    parse(record, names, store)
}

/// Resolves a referenced object name, checking its type.
pub(crate) fn resolve(
    names: &ObjectNameMap,
    store: &NoduleStore,
    name: &str,
    expected: &[NoduleType],
) -> Result<NoduleId> {
    let unknown = || ScriptError::UnknownObject {
        name: name.to_string(),
    };
    let id = *names.get(name).ok_or_else(unknown)?;
    let nodule = store.get(id).ok_or_else(unknown)?;
    let actual = nodule.nodule_type();
    if expected.is_empty() || expected.contains(&actual) {
        Ok(id)
    } else {
        Err(ScriptError::UnexpectedKind {
            name: name.to_string(),
            expected: expected
                .iter()
                .map(NoduleType::as_str)
                .collect::<Vec<_>>()
                .join(" or "),
            actual: actual.as_str().to_string(),
        }
        .into())
    }
}

/// Resolves the name stored under `key`.
pub(crate) fn resolve_field(
    record: &OpcodeRecord,
    key: &str,
    names: &ObjectNameMap,
    store: &NoduleStore,
    expected: &[NoduleType],
) -> Result<NoduleId> {
    let name = record.text(key)?;
    resolve(names, store, &name, expected)
}

/// Name of a nodule for serialization; removed nodules keep their name.
pub(crate) fn name_of(store: &NoduleStore, id: NoduleId) -> String {
    store
        .name_of(id)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

pub(crate) const CURVES: &[NoduleType] = &[
    NoduleType::Line,
    NoduleType::Segment,
    NoduleType::Circle,
    NoduleType::Ellipse,
    NoduleType::Parametric,
];
pub(crate) const STRAIGHT: &[NoduleType] = &[NoduleType::Line, NoduleType::Segment];
pub(crate) const POINT: &[NoduleType] = &[NoduleType::Point];
pub(crate) const EXPRESSION: &[NoduleType] = &[NoduleType::Expression];
