use easel_construction::{
    parse_command, AddNoduleCommand, ChangeLabelTextCommand, Command, Construction,
    DeleteNoduleCommand, ObjectNameMap, OpcodeRecord, SetEarthModeCommand,
    SetNoduleDisplayCommand, StyleNoduleCommand,
};
use easel_core::{Error, ScriptError, Style};
use nalgebra::Vector3;

fn add(c: &mut Construction, command: AddNoduleCommand) -> easel_construction::NoduleId {
    let id = command.nodule_id();
    c.execute(Box::new(command)).unwrap();
    id
}

/// A construction touching every persisted command family.
fn sample() -> Construction {
    let mut c = Construction::new();
    let a = AddNoduleCommand::point(c.store_mut(), Vector3::x()).unwrap();
    let a = add(&mut c, a);
    let b = AddNoduleCommand::point(c.store_mut(), Vector3::y()).unwrap();
    let b = add(&mut c, b);
    let pole = AddNoduleCommand::point(c.store_mut(), Vector3::z()).unwrap();
    let pole = add(&mut c, pole);
    let segment = AddNoduleCommand::segment(c.store_mut(), a, b, false).unwrap();
    let segment = add(&mut c, segment);
    let midpoint = AddNoduleCommand::midpoint(c.store_mut(), segment).unwrap();
    add(&mut c, midpoint);
    let circle = AddNoduleCommand::circle(c.store_mut(), pole, a).unwrap();
    let circle = add(&mut c, circle);
    let on_circle =
        AddNoduleCommand::point_on_object(c.store_mut(), circle, Vector3::new(1.0, 1.0, 0.2))
            .unwrap();
    add(&mut c, on_circle);
    let length = AddNoduleCommand::segment_length(c.store_mut(), segment).unwrap();
    add(&mut c, length);
    let half_turn = AddNoduleCommand::point_reflection(c.store_mut(), pole).unwrap();
    let half_turn = add(&mut c, half_turn);
    let image = AddNoduleCommand::isometry_image(c.store_mut(), half_turn, segment).unwrap();
    add(&mut c, image);
    let parallel = AddNoduleCommand::latitude(c.store_mut(), 45.0).unwrap();
    add(&mut c, parallel);
    c.execute(Box::new(SetEarthModeCommand::new(true))).unwrap();

    let label = c.store().get(b).unwrap().children[0];
    let rename = ChangeLabelTextCommand::new(c.store(), label, "B & co").unwrap();
    c.execute(Box::new(rename)).unwrap();
    c
}

#[test]
fn test_script_replays_to_the_same_script() {
    let original = sample();
    let script = original.to_script();
    assert_eq!(script.len(), 13);

    let mut copy = Construction::new();
    copy.load_script(&script.join("\n")).unwrap();
    assert_eq!(copy.to_script(), script);
    assert_eq!(copy.store().len(), original.store().len());
    assert!(copy.store().earth_mode());
}

#[test]
fn test_latitude_opcode() {
    let mut c = Construction::new();
    let parallel = AddNoduleCommand::latitude(c.store_mut(), 45.0).unwrap();
    add(&mut c, parallel);
    let script = c.to_script();
    assert!(script[0].starts_with("AddLatitude&"));
    assert!(script[0].contains("earthLatitude=45.000000000"));
}

#[test]
fn test_reference_to_unknown_object_fails() {
    let mut c = Construction::new();
    let err = c
        .load_script("AddReflection&reflectionLineOrSegmentName=L1&objectName=T1")
        .unwrap_err();
    match err {
        Error::Script(ScriptError::UnknownObject { name }) => assert_eq!(name, "L1"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(c.store().is_empty());
}

#[test]
fn test_reference_to_wrong_kind_fails() {
    let mut c = Construction::new();
    let err = c
        .load_script(
            "AddPoint&pointVector=1,0,0&objectName=P1\n\
             AddReflection&reflectionLineOrSegmentName=P1&objectName=T1",
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Script(ScriptError::UnexpectedKind { .. })
    ));
}

#[test]
fn test_parse_of_opcode_recreates_command() {
    let mut c = Construction::new();
    let a = AddNoduleCommand::point(c.store_mut(), Vector3::x()).unwrap();
    let a = add(&mut c, a);
    let b = AddNoduleCommand::point(c.store_mut(), Vector3::y()).unwrap();
    let b = add(&mut c, b);
    let line = AddNoduleCommand::line(c.store_mut(), a, b).unwrap();
    add(&mut c, line);
    let script = c.to_script();

    let mut copy = Construction::new();
    let mut names: ObjectNameMap = copy.load_script(&script[..2].join("\n")).unwrap();
    let record = OpcodeRecord::decode(&script[2]).unwrap();
    let mut command = parse_command(&record, &mut names, copy.store_mut()).unwrap();
    assert_eq!(command.name(), "AddLine");
    assert!(names.contains_key("Li1"));

    command.save_state(copy.store());
    command.apply(copy.store_mut()).unwrap();
    assert_eq!(
        command.to_opcode(copy.store()).unwrap().into_lines(),
        vec![script[2].clone()]
    );
}

#[test]
fn test_deletions_replay() {
    let mut c = Construction::new();
    let a = AddNoduleCommand::point(c.store_mut(), Vector3::x()).unwrap();
    let label = a.label_id().unwrap();
    let a = add(&mut c, a);
    c.execute(Box::new(DeleteNoduleCommand::new(label))).unwrap();
    c.execute(Box::new(DeleteNoduleCommand::new(a))).unwrap();
    let script = c.to_script();
    assert_eq!(script[1], "DeleteNodule&objectName=Lb1");
    assert_eq!(script[2], "DeleteNodule&objectName=P1");

    let mut copy = Construction::new();
    copy.load_script(&script.join("\n")).unwrap();
    assert!(copy.store().is_empty());
}

fn display_state(c: &Construction) -> Vec<(String, bool)> {
    c.store()
        .iter()
        .map(|n| (n.name.clone(), n.showing))
        .collect()
}

#[test]
fn test_creation_opcode_keeps_creation_time_display() {
    let mut c = Construction::new();
    let p = AddNoduleCommand::point(c.store_mut(), Vector3::z()).unwrap();
    let p = add(&mut c, p);
    c.execute(Box::new(SetNoduleDisplayCommand::new(p, false)))
        .unwrap();
    let mut style = Style::point();
    style.stroke_color = "#ff0000".to_string();
    c.execute(Box::new(StyleNoduleCommand::new(p, style).unwrap()))
        .unwrap();

    let script = c.to_script();
    assert_eq!(script.len(), 3);
    assert!(script[0].contains("objectShowing=true"));
    assert!(!script[0].contains("ff0000"));

    let mut copy = Construction::new();
    copy.load_script(&script.join("\n")).unwrap();
    assert_eq!(copy.to_script(), script);
    assert_eq!(display_state(&copy), display_state(&c));

    c.undo().unwrap();
    c.undo().unwrap();
    copy.undo().unwrap();
    copy.undo().unwrap();
    assert_eq!(display_state(&copy), display_state(&c));
    assert_eq!(
        display_state(&copy),
        vec![("P1".to_string(), true), ("Lb1".to_string(), true)]
    );
    assert_eq!(copy.store().get(p).unwrap().style, Style::point());
}

#[test]
fn test_label_rename_replays_as_its_own_opcode() {
    let mut c = Construction::new();
    let p = AddNoduleCommand::point(c.store_mut(), Vector3::z()).unwrap();
    let label = p.label_id().unwrap();
    add(&mut c, p);
    let rename = ChangeLabelTextCommand::new(c.store(), label, "north").unwrap();
    c.execute(Box::new(rename)).unwrap();

    let script = c.to_script();
    assert!(script[0].contains("labelText=P1"));

    let mut copy = Construction::new();
    copy.load_script(&script.join("\n")).unwrap();
    copy.undo().unwrap();
    let text = copy
        .store()
        .find_by_name("Lb1")
        .and_then(|l| l.label_text().map(str::to_string));
    assert_eq!(text.as_deref(), Some("P1"));
}
