use easel_construction::{AddNoduleCommand, Command, NoduleStore, NoduleType};
use easel_core::{Error, GraphError};
use nalgebra::Vector3;

fn add(store: &mut NoduleStore, mut command: AddNoduleCommand) -> easel_construction::NoduleId {
    command.save_state(store);
    command.apply(store).unwrap();
    command.nodule_id()
}

#[test]
fn test_edges_are_kept_in_both_directions() {
    let mut store = NoduleStore::new();
    let a = AddNoduleCommand::point(&mut store, Vector3::x()).unwrap();
    let a = add(&mut store, a);
    let b = AddNoduleCommand::point(&mut store, Vector3::y()).unwrap();
    let b = add(&mut store, b);
    let line = AddNoduleCommand::line(&mut store, a, b).unwrap();
    let line = add(&mut store, line);

    let registered = store.get(line).unwrap();
    assert_eq!(registered.parents, vec![a, b]);
    assert!(store.get(a).unwrap().children.contains(&line));
    assert!(store.get(b).unwrap().children.contains(&line));
}

#[test]
fn test_descendants_include_labels_and_transitive_children() {
    let mut store = NoduleStore::new();
    let a = AddNoduleCommand::point(&mut store, Vector3::x()).unwrap();
    let a = add(&mut store, a);
    let b = AddNoduleCommand::point(&mut store, Vector3::y()).unwrap();
    let b = add(&mut store, b);
    let segment = AddNoduleCommand::segment(&mut store, a, b, false).unwrap();
    let segment = add(&mut store, segment);
    let midpoint = AddNoduleCommand::midpoint(&mut store, segment).unwrap();
    let midpoint = add(&mut store, midpoint);

    let closure = store.descendants_of(&[a]);
    assert!(closure.contains(&a));
    assert!(closure.contains(&segment));
    assert!(closure.contains(&midpoint));
    assert!(!closure.contains(&b));
    let labels = closure
        .iter()
        .filter(|id| store.get(**id).unwrap().nodule_type() == NoduleType::Label)
        .count();
    assert_eq!(labels, 3);

    let order = store.topological_order(&closure);
    let position = |id| order.iter().position(|x| *x == id).unwrap();
    assert!(position(a) < position(segment));
    assert!(position(segment) < position(midpoint));
}

#[test]
fn test_removing_a_parent_is_refused() {
    let mut store = NoduleStore::new();
    let a = AddNoduleCommand::point(&mut store, Vector3::x()).unwrap();
    let a = add(&mut store, a);
    let antipode = AddNoduleCommand::antipodal_point(&mut store, a).unwrap();
    add(&mut store, antipode);

    let err = store.remove_entity(a).unwrap_err();
    assert!(matches!(err, Error::Graph(GraphError::HasDescendants { .. })));
    assert!(store.contains(a));
}

#[test]
fn test_cycles_are_refused() {
    let mut store = NoduleStore::new();
    let a = AddNoduleCommand::point(&mut store, Vector3::x()).unwrap();
    let a = add(&mut store, a);
    let antipode = AddNoduleCommand::antipodal_point(&mut store, a).unwrap();
    let antipode = add(&mut store, antipode);

    let err = store.register_child(antipode, a).unwrap_err();
    assert!(matches!(err, Error::Graph(GraphError::CycleDetected { .. })));
    assert!(!store.get(antipode).unwrap().children.contains(&a));
}

#[test]
fn test_names_follow_type_prefixes() {
    let mut store = NoduleStore::new();
    let a = AddNoduleCommand::point(&mut store, Vector3::x()).unwrap();
    let b = AddNoduleCommand::point(&mut store, Vector3::y()).unwrap();
    assert_eq!(a.nodule_name(), "P1");
    assert_eq!(b.nodule_name(), "P2");
    let a = add(&mut store, a);
    let b = add(&mut store, b);
    let line = AddNoduleCommand::line(&mut store, a, b).unwrap();
    assert_eq!(line.nodule_name(), "Li1");
}

#[test]
fn test_ancestors_follow_parents_transitively() {
    let mut store = NoduleStore::new();
    let a = AddNoduleCommand::point(&mut store, Vector3::x()).unwrap();
    let a = add(&mut store, a);
    let b = AddNoduleCommand::point(&mut store, Vector3::y()).unwrap();
    let b = add(&mut store, b);
    let segment = AddNoduleCommand::segment(&mut store, a, b, false).unwrap();
    let segment = add(&mut store, segment);
    let midpoint = AddNoduleCommand::midpoint(&mut store, segment).unwrap();
    let label = midpoint.label_id().unwrap();
    let midpoint = add(&mut store, midpoint);

    assert_eq!(store.ancestors_of(&[midpoint]), vec![midpoint, segment, a, b]);
    assert_eq!(
        store.ancestors_of(&[label]),
        vec![label, midpoint, segment, a, b]
    );
    assert_eq!(store.ancestors_of(&[a]), vec![a]);
}
