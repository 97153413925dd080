//! # Spherical Easel Core
//!
//! Core types and utilities shared by the Spherical Easel crates:
//! the error hierarchy, unit-sphere geometry primitives, styles and angle units.

pub mod error;
pub mod sphere;
pub mod style;
pub mod units;

pub use error::{Error, GeometryError, GraphError, Result, ScriptError};

pub use sphere::{
    angle_between, any_perpendicular, arc_parameter, intersect_planes, is_proper_radius,
    north_pole, normalize, point_on_arc, project_to_great_circle, project_to_small_circle,
    reflection_matrix, rotate_about, rotation_matrix, SpherePlane, SphereVector,
};

pub use style::Style;

pub use units::{format_angle, to_degrees, to_radians, AngleUnits};

/// Default numerical tolerance for geometric predicates.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;
