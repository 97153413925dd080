use easel_core::{intersect_planes, SpherePlane, SphereVector, DEFAULT_TOLERANCE};
use std::f64::consts::PI;

fn assert_on_sphere(v: &SphereVector) {
    assert!((v.norm() - 1.0).abs() < 1e-9, "not on sphere: {:?}", v);
}

#[test]
fn test_two_great_circles_meet_at_antipodes() {
    let equator = SpherePlane::great_circle(SphereVector::z());
    let meridian = SpherePlane::great_circle(SphereVector::y());

    let [a, b] = intersect_planes(&equator, &meridian, DEFAULT_TOLERANCE).unwrap();
    assert_on_sphere(&a);
    assert_on_sphere(&b);
    assert!((a + b).norm() < 1e-9);
    assert!(a.z.abs() < 1e-9 && a.y.abs() < 1e-9);
}

#[test]
fn test_parallel_planes_do_not_meet() {
    let equator = SpherePlane::great_circle(SphereVector::z());
    let latitude = SpherePlane::small_circle(SphereVector::z(), PI / 4.0);
    assert!(intersect_planes(&equator, &latitude, DEFAULT_TOLERANCE).is_none());
}

#[test]
fn test_circle_and_line_intersection() {
    // Circle of radius 60° around the north pole crosses the meridian y = 0.
    let circle = SpherePlane::small_circle(SphereVector::z(), PI / 3.0);
    let meridian = SpherePlane::great_circle(SphereVector::y());

    let [a, b] = intersect_planes(&circle, &meridian, DEFAULT_TOLERANCE).unwrap();
    assert_on_sphere(&a);
    assert_on_sphere(&b);
    assert!((a.z - 0.5).abs() < 1e-9);
    assert!((b.z - 0.5).abs() < 1e-9);
    assert!((a.x + b.x).abs() < 1e-9);
}

#[test]
fn test_disjoint_small_circles() {
    let north = SpherePlane::small_circle(SphereVector::z(), 0.2);
    let east = SpherePlane::small_circle(SphereVector::x(), 0.2);
    assert!(intersect_planes(&north, &east, DEFAULT_TOLERANCE).is_none());
}
