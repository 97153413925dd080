//! Error handling for Spherical Easel
//!
//! Provides error types for every layer of the construction engine:
//! - Graph errors (illegal mutations of the dependency graph)
//! - Script errors (malformed or inconsistent opcode scripts)
//! - Geometry errors (unsupported constructions and bad parameters)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Dependency graph error type
///
/// Raised at the store boundary before an illegal mutation can corrupt the graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An entity with this id is already registered
    #[error("Entity {id} is already registered")]
    DuplicateId {
        /// The clashing id.
        id: u64,
    },

    /// No entity with this id is registered
    #[error("Unknown entity {id}")]
    UnknownEntity {
        /// The id that was looked up.
        id: u64,
    },

    /// The entity still has registered children and cannot be hard-deleted
    #[error("Entity {name} still has {count} dependent object(s)")]
    HasDescendants {
        /// Display name of the entity.
        name: String,
        /// Number of direct children still registered.
        count: usize,
    },

    /// Registering the edge would make an entity its own ancestor
    #[error("Edge {parent} -> {child} would create a cycle")]
    CycleDetected {
        /// Parent id of the rejected edge.
        parent: u64,
        /// Child id of the rejected edge.
        child: u64,
    },
}

/// Script error type
///
/// Represents failures while decoding or replaying an opcode script.
/// Every script error is fatal for the load that raised it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// The line does not have the `Tag&key=value` shape
    #[error("Malformed opcode line {line_number}: {reason}")]
    Malformed {
        /// One-based line number (0 when decoding a single line).
        line_number: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// No parser is registered for the command tag
    #[error("Unknown command '{tag}'")]
    UnknownCommand {
        /// The unrecognized tag.
        tag: String,
    },

    /// A required field is absent
    #[error("Command '{tag}' is missing field '{field}'")]
    MissingField {
        /// The command tag.
        tag: String,
        /// The absent key.
        field: String,
    },

    /// A field value could not be interpreted
    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidValue {
        /// The key of the field.
        field: String,
        /// The raw (unescaped) value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A referenced object name is not in the object map
    #[error("Object '{name}' is not defined")]
    UnknownObject {
        /// The unresolved name.
        name: String,
    },

    /// A referenced object exists but has the wrong type
    #[error("Object '{name}' is a {actual}, expected {expected}")]
    UnexpectedKind {
        /// The referenced name.
        name: String,
        /// The kind the command needs.
        expected: String,
        /// The kind found in the store.
        actual: String,
    },
}

/// Geometry error type
///
/// Raised when a construction is requested that the engine cannot define.
/// Degenerate configurations of valid constructions are *not* errors; they
/// are reported through the existence flag instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Intersection between these object types is not supported
    #[error("Cannot intersect a {first} with a {second}")]
    UnsupportedIntersection {
        /// Type of the first parent.
        first: String,
        /// Type of the second parent.
        second: String,
    },

    /// A point cannot be glued to this object type
    #[error("Cannot place a point on a {kind}")]
    UnsupportedProjection {
        /// Type of the host object.
        kind: String,
    },

    /// Perpendiculars to this object type are not supported
    #[error("Cannot construct a perpendicular to a {kind}")]
    UnsupportedPerpendicular {
        /// Type of the curve.
        kind: String,
    },

    /// Transformations cannot be applied to this object type
    #[error("Cannot transform a {kind}")]
    UnsupportedTransformation {
        /// Type of the preimage.
        kind: String,
    },

    /// A parameter is outside its valid range
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A formula failed to parse
    #[error("Invalid expression '{expression}': {reason}")]
    InvalidExpression {
        /// The formula text.
        expression: String,
        /// Parser message.
        reason: String,
    },
}

/// Main error type for Spherical Easel
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Graph error
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Script error
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a script error
    pub fn is_script_error(&self) -> bool {
        matches!(self, Error::Script(_))
    }

    /// Check if this is a graph error
    pub fn is_graph_error(&self) -> bool {
        matches!(self, Error::Graph(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
