use easel_construction::{AddNoduleCommand, Construction, ConstructionFile};
use nalgebra::Vector3;
use tempfile::tempdir;

fn triangle() -> Construction {
    let mut c = Construction::new();
    let mut corners = Vec::new();
    for v in [Vector3::x(), Vector3::y(), Vector3::z()] {
        let command = AddNoduleCommand::point(c.store_mut(), v).unwrap();
        corners.push(command.nodule_id());
        c.execute(Box::new(command)).unwrap();
    }
    for i in 0..3 {
        let side =
            AddNoduleCommand::segment(c.store_mut(), corners[i], corners[(i + 1) % 3], false)
                .unwrap();
        c.execute(Box::new(side)).unwrap();
    }
    c.name = "Octant".to_string();
    c.author = "Ada".to_string();
    c
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("octant.json");

    let mut original = triangle();
    original.save_to_file(&path).unwrap();
    assert!(!original.is_modified);
    assert_eq!(original.display_name(), "octant");

    let mut loaded = Construction::new();
    loaded.load_from_file(&path).unwrap();
    assert_eq!(loaded.name, "Octant");
    assert_eq!(loaded.author, "Ada");
    assert_eq!(loaded.to_script(), original.to_script());
    assert_eq!(loaded.store().len(), original.store().len());
    assert!(!loaded.is_modified);
    assert_eq!(loaded.current_file_path.as_deref(), Some(path.as_path()));
}

#[test]
fn test_resave_keeps_identity() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("a.json");
    let second = dir.path().join("b.json");

    let mut c = triangle();
    c.save_to_file(&first).unwrap();
    let mut loaded = Construction::new();
    loaded.load_from_file(&first).unwrap();
    loaded.save_to_file(&second).unwrap();

    let a = ConstructionFile::load_from_file(&first).unwrap();
    let b = ConstructionFile::load_from_file(&second).unwrap();
    assert_eq!(a.metadata.id, b.metadata.id);
    assert_eq!(a.metadata.created, b.metadata.created);
    assert!(b.metadata.modified >= a.metadata.modified);
}

#[test]
fn test_corrupt_file_leaves_construction_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    let mut file = ConstructionFile::new("Bad");
    file.script = vec!["AddSegment&segmentStartPointName=P7".to_string()];
    file.save_to_file(&path).unwrap();

    let mut c = triangle();
    let before = c.to_script();
    assert!(c.load_from_file(&path).is_err());
    assert_eq!(c.to_script(), before);
    assert_eq!(c.name, "Octant");

    std::fs::write(&path, "not json").unwrap();
    assert!(c.load_from_file(&path).is_err());
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = ConstructionFile::load_from_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
}
