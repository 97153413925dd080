//! # Spherical Easel Construction
//!
//! The construction engine: a dependency graph of spherical geometry
//! objects ("nodules"), the update protocol that keeps them consistent,
//! undoable commands that change the graph, and the opcode scripts and
//! files those commands persist to.
//!
//! ## Modules
//! - `nodule`: entity model
//! - `store`: dependency graph store
//! - `update`: recomputation and existence propagation
//! - `commands`: reversible user actions
//! - `history`: undo/redo stacks
//! - `script`: opcode codec and replay
//! - `serialization`: construction file format
//! - `construction`: editing state facade

pub mod commands;
pub mod construction;
pub mod history;
pub mod nodule;
pub mod script;
pub mod serialization;
pub mod store;
pub mod update;

pub use commands::{
    delete_with_descendants, parse_command, parser_for, AddNoduleCommand, AddPencilCommand,
    ChangeLabelTextCommand, ChangeSliderCommand, Command, CommandGroup, DeleteNoduleCommand,
    MoveLineCommand, MovePointCommand, ObjectNameMap, OpcodeOutput, SetEarthModeCommand,
    SetNoduleDisplayCommand, StyleNoduleCommand,
};
pub use construction::Construction;
pub use history::CommandHistory;
pub use nodule::{
    CircleDefinition, EllipseDefinition, Expression, ExpressionDefinition, Label, LineDefinition,
    MeasurementKind, Nodule, NoduleId, NoduleKind, NoduleType, ParametricCurve, PointDefinition,
    SegmentDefinition, SphereCircle, SphereEllipse, SphereLine, SpherePoint, SphereSegment,
    Transformation, TransformationDefinition,
};
pub use script::{replay, OpcodeRecord};
pub use serialization::{ConstructionFile, ConstructionMetadata, FILE_FORMAT_VERSION};
pub use store::{ConstructionOptions, NoduleStore, Pencil};
pub use update::evaluate;
