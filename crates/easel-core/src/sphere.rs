//! Unit-sphere geometry primitives.
//!
//! Every location in a construction is a unit vector in R³. Great circles
//! (lines) are stored by their unit normal, small circles by their center and
//! angular radius. Both are planes `n · x = d` cut against the sphere, which
//! lets intersections and projections share one code path.

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use std::f64::consts::{PI, TAU};

/// A vector in R³; locations are kept on the unit sphere.
pub type SphereVector = Vector3<f64>;

/// The north pole `(0, 0, 1)`.
pub fn north_pole() -> SphereVector {
    Vector3::z()
}

/// Normalizes `v`, or returns `None` when its length is below `tolerance`.
pub fn normalize(v: &SphereVector, tolerance: f64) -> Option<SphereVector> {
    let norm = v.norm();
    if norm < tolerance || !norm.is_finite() {
        None
    } else {
        Some(v / norm)
    }
}

/// Angle between two vectors in `[0, π]`, stable near 0 and π.
pub fn angle_between(a: &SphereVector, b: &SphereVector) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Some unit vector perpendicular to `v`.
pub fn any_perpendicular(v: &SphereVector) -> SphereVector {
    let helper = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    v.cross(&helper).normalize()
}

/// Rotates `v` about the unit `axis` by `angle` (right-hand rule).
pub fn rotate_about(v: &SphereVector, axis: &SphereVector, angle: f64) -> SphereVector {
    rotation_matrix(axis, angle) * v
}

/// Rotation matrix about `axis` by `angle`.
pub fn rotation_matrix(axis: &SphereVector, angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle).into_inner()
}

/// Reflection through the plane with unit normal `normal`: `I - 2nnᵀ`.
pub fn reflection_matrix(normal: &SphereVector) -> Matrix3<f64> {
    Matrix3::identity() - 2.0 * normal * normal.transpose()
}

/// Point at angle `theta` along the great circle through `start` with
/// normal `normal`, sweeping counter-clockwise about the normal.
pub fn point_on_arc(start: &SphereVector, normal: &SphereVector, theta: f64) -> SphereVector {
    start * theta.cos() + normal.cross(start) * theta.sin()
}

/// Angular position of `x` along the great circle through `start`, in `[0, 2π)`.
pub fn arc_parameter(x: &SphereVector, start: &SphereVector, normal: &SphereVector) -> f64 {
    let theta = normal.cross(start).dot(x).atan2(start.dot(x));
    if theta < 0.0 {
        theta + TAU
    } else {
        theta
    }
}

/// Nearest point to `x` on the great circle with unit normal `normal`.
///
/// `None` when `x` is (numerically) one of the circle's poles.
pub fn project_to_great_circle(
    x: &SphereVector,
    normal: &SphereVector,
    tolerance: f64,
) -> Option<SphereVector> {
    normalize(&(x - normal * normal.dot(x)), tolerance)
}

/// Nearest point to `x` on the small circle around `center` with angular
/// `radius`. When `x` sits on the axis any point of the circle is nearest.
pub fn project_to_small_circle(
    x: &SphereVector,
    center: &SphereVector,
    radius: f64,
    tolerance: f64,
) -> SphereVector {
    let direction = normalize(&(x - center * center.dot(x)), tolerance)
        .unwrap_or_else(|| any_perpendicular(center));
    center * radius.cos() + direction * radius.sin()
}

/// A plane `normal · x = offset`; its trace on the sphere is a line
/// (`offset == 0`) or a small circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpherePlane {
    pub normal: SphereVector,
    pub offset: f64,
}

impl SpherePlane {
    /// The plane of a great circle.
    pub fn great_circle(normal: SphereVector) -> Self {
        Self {
            normal,
            offset: 0.0,
        }
    }

    /// The plane of the small circle around `center` with angular `radius`.
    pub fn small_circle(center: SphereVector, radius: f64) -> Self {
        Self {
            normal: center,
            offset: radius.cos(),
        }
    }
}

/// Intersects two planes with the unit sphere.
///
/// Returns the two candidate points `x0 + t·u` and `x0 - t·u`; they coincide
/// when the curves are tangent. `None` when the planes are parallel or their
/// common line misses the sphere.
pub fn intersect_planes(
    first: &SpherePlane,
    second: &SpherePlane,
    tolerance: f64,
) -> Option<[SphereVector; 2]> {
    let direction = first.normal.cross(&second.normal);
    let det = direction.norm_squared();
    if det < tolerance {
        return None;
    }

    let g = first.normal.dot(&second.normal);
    let a = (first.offset - second.offset * g) / det;
    let b = (second.offset - first.offset * g) / det;
    let base = first.normal * a + second.normal * b;

    let remaining = 1.0 - base.norm_squared();
    if remaining < -tolerance {
        return None;
    }
    let t = (remaining.max(0.0) / det).sqrt();
    Some([base + direction * t, base - direction * t])
}

/// True when `angle` lies strictly between 0 and π with `tolerance` margin.
pub fn is_proper_radius(angle: f64, tolerance: f64) -> bool {
    angle > tolerance && angle < PI - tolerance
}
