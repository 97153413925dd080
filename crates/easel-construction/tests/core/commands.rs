use easel_construction::{
    delete_with_descendants, AddNoduleCommand, AddPencilCommand, ChangeLabelTextCommand,
    Command, Construction, DeleteNoduleCommand, NoduleId, SetNoduleDisplayCommand,
    StyleNoduleCommand,
};
use easel_core::Style;
use nalgebra::Vector3;

fn execute(c: &mut Construction, command: AddNoduleCommand) -> NoduleId {
    let id = command.nodule_id();
    c.execute(Box::new(command)).unwrap();
    id
}

fn point(c: &mut Construction, v: Vector3<f64>) -> NoduleId {
    let command = AddNoduleCommand::point(c.store_mut(), v).unwrap();
    execute(c, command)
}

/// Two points, the segment between them and its midpoint.
fn segment_with_midpoint(c: &mut Construction) -> [NoduleId; 4] {
    let a = point(c, Vector3::x());
    let b = point(c, Vector3::y());
    let segment = AddNoduleCommand::segment(c.store_mut(), a, b, false).unwrap();
    let segment = execute(c, segment);
    let midpoint = AddNoduleCommand::midpoint(c.store_mut(), segment).unwrap();
    let midpoint = execute(c, midpoint);
    [a, b, segment, midpoint]
}

#[test]
fn test_add_then_restore_leaves_store_unchanged() {
    let mut c = Construction::new();
    let a = point(&mut c, Vector3::x());
    let before = c.store().len();

    let mut command = AddNoduleCommand::antipodal_point(c.store_mut(), a).unwrap();
    command.save_state(c.store());
    command.apply(c.store_mut()).unwrap();
    assert_eq!(c.store().len(), before + 2);
    command.restore_state(c.store_mut()).unwrap();
    assert_eq!(c.store().len(), before);
    assert!(c.store().get(a).unwrap().children.len() == 1);
}

#[test]
fn test_delete_of_a_parent_fails_without_side_effects() {
    let mut c = Construction::new();
    let [a, ..] = segment_with_midpoint(&mut c);
    let before = c.store().len();
    let depth = c.history().undo_depth();

    assert!(c.execute(Box::new(DeleteNoduleCommand::new(a))).is_err());
    assert_eq!(c.store().len(), before);
    assert_eq!(c.history().undo_depth(), depth);
}

#[test]
fn test_delete_with_descendants_and_undo() {
    let mut c = Construction::new();
    let [a, b, segment, midpoint] = segment_with_midpoint(&mut c);
    let midpoint_location = c.store().get(midpoint).unwrap().location().unwrap();
    let before = c.store().len();

    let group = delete_with_descendants(c.store(), a).unwrap();
    // a, segment, midpoint and their three labels.
    assert_eq!(group.len(), 6);
    c.execute(Box::new(group)).unwrap();
    assert!(!c.store().contains(a));
    assert!(!c.store().contains(segment));
    assert!(!c.store().contains(midpoint));
    assert!(c.store().contains(b));
    assert_eq!(c.store().len(), 2);

    assert!(c.undo().unwrap());
    assert_eq!(c.store().len(), before);
    let restored = c.store().get(midpoint).unwrap();
    assert!(restored.exists);
    assert!((restored.location().unwrap() - midpoint_location).norm() < 1e-12);
    assert!(c.store().get(a).unwrap().children.contains(&segment));

    assert!(c.redo().unwrap());
    assert_eq!(c.store().len(), 2);
}

#[test]
fn test_display_style_and_label_changes_are_undoable() {
    let mut c = Construction::new();
    let command = AddNoduleCommand::point(c.store_mut(), Vector3::z()).unwrap();
    let label = command.label_id().unwrap();
    let p = execute(&mut c, command);

    c.execute(Box::new(SetNoduleDisplayCommand::new(p, false))).unwrap();
    assert!(!c.store().get(p).unwrap().showing);

    let mut style = Style::point();
    style.stroke_width = 4.0;
    c.execute(Box::new(StyleNoduleCommand::new(p, style.clone()).unwrap()))
        .unwrap();
    assert_eq!(c.store().get(p).unwrap().style, style);

    let rename = ChangeLabelTextCommand::new(c.store(), label, "North pole").unwrap();
    c.execute(Box::new(rename)).unwrap();
    assert_eq!(c.store().get(label).unwrap().label_text(), Some("North pole"));

    c.undo().unwrap();
    c.undo().unwrap();
    c.undo().unwrap();
    let restored = c.store().get(p).unwrap();
    assert!(restored.showing);
    assert_eq!(restored.style, Style::point());
    assert_eq!(c.store().get(label).unwrap().label_text(), Some("P1"));
}

#[test]
fn test_pencil_groups_perpendiculars() {
    let mut c = Construction::new();
    let a = point(&mut c, Vector3::x());
    let b = point(&mut c, Vector3::y());
    let equator = AddNoduleCommand::line(c.store_mut(), a, b).unwrap();
    let equator = execute(&mut c, equator);
    let p = point(&mut c, Vector3::new(0.0, 0.6, 0.8));
    let q = point(&mut c, Vector3::new(0.6, 0.0, 0.8));

    let group = AddPencilCommand::with_perpendiculars(c.store_mut(), equator, &[p, q]).unwrap();
    c.execute(Box::new(group)).unwrap();
    assert_eq!(c.store().pencils().len(), 1);
    assert_eq!(c.store().pencils()[0].lines.len(), 2);
    // Only the perpendiculars persist.
    assert_eq!(c.to_script().len(), 7);

    c.undo().unwrap();
    assert!(c.store().pencils().is_empty());
}

#[test]
fn test_invalid_constructions_are_rejected() {
    let mut c = Construction::new();
    let a = point(&mut c, Vector3::x());
    assert!(AddNoduleCommand::line(c.store_mut(), a, a).is_err());
    assert!(AddNoduleCommand::latitude(c.store_mut(), 95.0).is_err());
    assert!(AddNoduleCommand::longitude(c.store_mut(), 181.0).is_err());
    assert!(AddNoduleCommand::slider(c.store_mut(), 2.0, 0.0, 1.0, 0.1).is_err());
    assert!(AddNoduleCommand::calculation(c.store_mut(), "1 +", &[]).is_err());
}

#[test]
fn test_delete_takes_the_label_along() {
    let mut c = Construction::new();
    let command = AddNoduleCommand::point(c.store_mut(), Vector3::z()).unwrap();
    let label = command.label_id().unwrap();
    let p = execute(&mut c, command);

    c.execute(Box::new(DeleteNoduleCommand::new(p))).unwrap();
    assert!(c.store().is_empty());
    assert_eq!(c.to_script()[1], "DeleteNodule&objectName=P1");

    c.undo().unwrap();
    assert!(c.store().get(p).unwrap().children.contains(&label));
    assert_eq!(c.store().get(label).unwrap().label_text(), Some("P1"));

    let mut replayed = Construction::new();
    replayed.load_script(&c.to_script().join("\n")).unwrap();
    assert_eq!(replayed.store().len(), 2);
}

#[test]
fn test_undo_of_delete_keeps_child_order() {
    let mut c = Construction::new();
    let a = point(&mut c, Vector3::x());
    let b = point(&mut c, Vector3::y());
    let pole = point(&mut c, Vector3::z());
    let segment = AddNoduleCommand::segment(c.store_mut(), a, b, false).unwrap();
    let segment = execute(&mut c, segment);
    let line = AddNoduleCommand::line(c.store_mut(), a, pole).unwrap();
    let line = execute(&mut c, line);
    let children = c.store().get(a).unwrap().children.clone();
    assert_eq!(children[1..], [segment, line]);

    c.execute(Box::new(DeleteNoduleCommand::new(segment))).unwrap();
    assert!(c.undo().unwrap());
    assert_eq!(c.store().get(a).unwrap().children, children);

    let group = delete_with_descendants(c.store(), b).unwrap();
    c.execute(Box::new(group)).unwrap();
    assert!(c.undo().unwrap());
    assert_eq!(c.store().get(a).unwrap().children, children);
    // a, segment, line and their labels.
    assert_eq!(delete_with_descendants(c.store(), a).unwrap().len(), 6);
}
