use easel_core::{
    angle_between, arc_parameter, point_on_arc, project_to_great_circle,
    project_to_small_circle, rotate_about, SphereVector, DEFAULT_TOLERANCE,
};
use proptest::prelude::*;
use std::f64::consts::PI;

fn unit_vector() -> impl Strategy<Value = SphereVector> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_filter("non-zero", |(x, y, z)| x * x + y * y + z * z > 0.01)
        .prop_map(|(x, y, z)| SphereVector::new(x, y, z).normalize())
}

#[test]
fn test_projection_onto_equator() {
    let x = SphereVector::new(1.0, 0.0, 1.0).normalize();
    let p = project_to_great_circle(&x, &SphereVector::z(), DEFAULT_TOLERANCE).unwrap();
    assert!((p - SphereVector::x()).norm() < 1e-12);
}

#[test]
fn test_projection_from_pole_is_undefined() {
    let p = project_to_great_circle(&SphereVector::z(), &SphereVector::z(), DEFAULT_TOLERANCE);
    assert!(p.is_none());
}

#[test]
fn test_small_circle_projection_keeps_radius() {
    let x = SphereVector::new(0.3, -0.4, 0.2).normalize();
    let p = project_to_small_circle(&x, &SphereVector::z(), PI / 3.0, DEFAULT_TOLERANCE);
    assert!((angle_between(&p, &SphereVector::z()) - PI / 3.0).abs() < 1e-12);
}

proptest! {
    #[test]
    fn prop_rotation_preserves_angles(v in unit_vector(), axis in unit_vector(), angle in -PI..PI) {
        let rotated = rotate_about(&v, &axis, angle);
        prop_assert!((rotated.norm() - 1.0).abs() < 1e-9);
        prop_assert!((angle_between(&rotated, &axis) - angle_between(&v, &axis)).abs() < 1e-9);
    }

    #[test]
    fn prop_point_on_arc_inverts_arc_parameter(theta in 0.0f64..6.28) {
        let start = SphereVector::x();
        let normal = SphereVector::z();
        let p = point_on_arc(&start, &normal, theta);
        prop_assert!((arc_parameter(&p, &start, &normal) - theta).abs() < 1e-9);
    }
}
