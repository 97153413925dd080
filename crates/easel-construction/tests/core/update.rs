use easel_construction::{
    AddNoduleCommand, ChangeSliderCommand, Construction, MoveLineCommand, MovePointCommand,
    NoduleId,
};
use nalgebra::Vector3;
use std::f64::consts::FRAC_PI_2;

fn execute(construction: &mut Construction, command: AddNoduleCommand) -> (NoduleId, Option<NoduleId>) {
    let ids = (command.nodule_id(), command.label_id());
    construction.execute(Box::new(command)).unwrap();
    ids
}

fn point(construction: &mut Construction, v: Vector3<f64>) -> NoduleId {
    let command = AddNoduleCommand::point(construction.store_mut(), v).unwrap();
    execute(construction, command).0
}

fn exists(construction: &Construction, id: NoduleId) -> bool {
    construction.store().get(id).unwrap().exists
}

#[test]
fn test_intersection_existence_follows_parents() {
    let mut c = Construction::new();
    let a = point(&mut c, Vector3::x());
    let b = point(&mut c, Vector3::y());
    let pole = point(&mut c, Vector3::z());
    let d = point(&mut c, Vector3::y());

    let equator = AddNoduleCommand::line(c.store_mut(), a, b).unwrap();
    let (equator, _) = execute(&mut c, equator);
    let meridian = AddNoduleCommand::line(c.store_mut(), pole, d).unwrap();
    let (meridian, _) = execute(&mut c, meridian);
    let crossing = AddNoduleCommand::intersection_point(c.store_mut(), equator, meridian, 0).unwrap();
    let (crossing, label) = execute(&mut c, crossing);
    let label = label.unwrap();

    assert!(exists(&c, crossing));
    let location = c.store().get(crossing).unwrap().location().unwrap();
    assert!(location.x.abs() < 1e-9 && location.z.abs() < 1e-9);

    // Both lines become the equator: the intersection is undefined.
    let drag = MovePointCommand::new(c.store(), pole, -Vector3::x()).unwrap();
    c.execute(Box::new(drag)).unwrap();
    assert!(!exists(&c, crossing));
    assert!(!exists(&c, label));

    c.undo().unwrap();
    assert!(exists(&c, crossing));
    assert!(exists(&c, label));
}

#[test]
fn test_midpoint_follows_its_segment() {
    let mut c = Construction::new();
    let a = point(&mut c, Vector3::x());
    let b = point(&mut c, Vector3::y());
    let segment = AddNoduleCommand::segment(c.store_mut(), a, b, false).unwrap();
    let (segment, _) = execute(&mut c, segment);
    let midpoint = AddNoduleCommand::midpoint(c.store_mut(), segment).unwrap();
    let (midpoint, _) = execute(&mut c, midpoint);

    let m = c.store().get(midpoint).unwrap().location().unwrap();
    let expected = Vector3::new(1.0, 1.0, 0.0).normalize();
    assert!((m - expected).norm() < 1e-9);

    let drag = MovePointCommand::new(c.store(), b, Vector3::z()).unwrap();
    c.execute(Box::new(drag)).unwrap();
    let m = c.store().get(midpoint).unwrap().location().unwrap();
    let expected = Vector3::new(1.0, 0.0, 1.0).normalize();
    assert!((m - expected).norm() < 1e-9);
}

#[test]
fn test_calculation_tracks_slider() {
    let mut c = Construction::new();
    let slider = AddNoduleCommand::slider(c.store_mut(), 0.5, 0.0, 1.0, 0.1).unwrap();
    let slider_name = slider.nodule_name().to_string();
    let (slider, _) = execute(&mut c, slider);
    let calculation =
        AddNoduleCommand::calculation(c.store_mut(), format!("{} * 2", slider_name), &[slider])
            .unwrap();
    let (calculation, _) = execute(&mut c, calculation);
    assert!((c.store().get(calculation).unwrap().value().unwrap() - 1.0).abs() < 1e-12);

    let change = ChangeSliderCommand::new(c.store(), slider, 0.75).unwrap();
    c.execute(Box::new(change)).unwrap();
    assert!((c.store().get(calculation).unwrap().value().unwrap() - 1.5).abs() < 1e-12);

    c.undo().unwrap();
    assert!((c.store().get(calculation).unwrap().value().unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_reflection_image_moves_with_preimage() {
    let mut c = Construction::new();
    let a = point(&mut c, Vector3::x());
    let b = point(&mut c, Vector3::y());
    let p = point(&mut c, Vector3::new(0.6, 0.0, 0.8));
    let equator = AddNoduleCommand::line(c.store_mut(), a, b).unwrap();
    let (equator, _) = execute(&mut c, equator);
    let mirror = AddNoduleCommand::reflection(c.store_mut(), equator).unwrap();
    let (mirror, _) = execute(&mut c, mirror);
    let image = AddNoduleCommand::isometry_image(c.store_mut(), mirror, p).unwrap();
    let (image, _) = execute(&mut c, image);

    let location = c.store().get(image).unwrap().location().unwrap();
    assert!((location - Vector3::new(0.6, 0.0, -0.8)).norm() < 1e-9);

    let drag = MovePointCommand::new(c.store(), p, Vector3::new(0.0, 0.6, 0.8)).unwrap();
    c.execute(Box::new(drag)).unwrap();
    let location = c.store().get(image).unwrap().location().unwrap();
    assert!((location - Vector3::new(0.0, 0.6, -0.8)).norm() < 1e-9);
}

#[test]
fn test_longitude_and_latitude_geometry() {
    let mut c = Construction::new();
    let meridian = AddNoduleCommand::longitude(c.store_mut(), 90.0).unwrap();
    let (meridian, _) = execute(&mut c, meridian);
    let parallel = AddNoduleCommand::latitude(c.store_mut(), 0.0).unwrap();
    let (parallel, _) = execute(&mut c, parallel);

    match &c.store().get(meridian).unwrap().kind {
        easel_construction::NoduleKind::Line(l) => {
            assert!((l.normal - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-9);
        }
        other => panic!("unexpected kind {other:?}"),
    }
    match &c.store().get(parallel).unwrap().kind {
        easel_construction::NoduleKind::Circle(circle) => {
            assert!((circle.radius - FRAC_PI_2).abs() < 1e-12);
            assert!((circle.center - Vector3::z()).norm() < 1e-12);
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn test_update_marks_only_changed_nodules_dirty() {
    let mut c = Construction::new();
    let a = point(&mut c, Vector3::x());
    let b = point(&mut c, Vector3::y());
    let other = point(&mut c, Vector3::z());
    let segment = AddNoduleCommand::segment(c.store_mut(), a, b, false).unwrap();
    let (segment, _) = execute(&mut c, segment);
    let midpoint = AddNoduleCommand::midpoint(c.store_mut(), segment).unwrap();
    let (midpoint, _) = execute(&mut c, midpoint);

    // New nodules start dirty.
    assert!(c.store_mut().take_dirty().contains(&midpoint));
    assert!(c.store_mut().take_dirty().is_empty());

    c.store_mut().update_from(&[other]);
    assert!(c.store_mut().take_dirty().is_empty());

    let target = Vector3::new(1.0, 0.0, 1.0).normalize();
    let drag = MovePointCommand::new(c.store(), a, target).unwrap();
    c.execute(Box::new(drag)).unwrap();
    let dirty = c.store_mut().take_dirty();
    for id in [a, segment, midpoint] {
        assert!(dirty.contains(&id));
    }
    assert!(!dirty.contains(&b));
    assert!(!dirty.contains(&other));
    assert!(c.store_mut().take_dirty().is_empty());
}

#[test]
fn test_move_line_rotates_both_endpoints() {
    let mut c = Construction::new();
    let a = point(&mut c, Vector3::x());
    let b = point(&mut c, Vector3::y());
    let equator = AddNoduleCommand::line(c.store_mut(), a, b).unwrap();
    let (equator, _) = execute(&mut c, equator);

    // A quarter turn about +y tips the equator onto the x = 0 meridian.
    let turn = MoveLineCommand::new(c.store(), equator, Vector3::y(), FRAC_PI_2).unwrap();
    c.execute(Box::new(turn)).unwrap();
    let moved_a = c.store().get(a).unwrap().location().unwrap();
    assert!((moved_a - -Vector3::z()).norm() < 1e-9);
    let moved_b = c.store().get(b).unwrap().location().unwrap();
    assert!((moved_b - Vector3::y()).norm() < 1e-9);
    assert_eq!(c.to_script().len(), 3);

    assert!(c.undo().unwrap());
    let restored = c.store().get(a).unwrap().location().unwrap();
    assert!((restored - Vector3::x()).norm() < 1e-12);
}
