use easel_construction::{AddNoduleCommand, CommandHistory, NoduleStore};
use nalgebra::Vector3;
use proptest::prelude::*;

fn add_point(history: &mut CommandHistory, store: &mut NoduleStore, v: Vector3<f64>) {
    let command = AddNoduleCommand::point(store, v).unwrap();
    history.execute(Box::new(command), store).unwrap();
}

#[test]
fn test_execute_clears_redo_stack() {
    let mut store = NoduleStore::new();
    let mut history = CommandHistory::new();
    add_point(&mut history, &mut store, Vector3::x());
    add_point(&mut history, &mut store, Vector3::y());
    assert!(history.undo(&mut store).unwrap());
    assert!(history.can_redo());

    add_point(&mut history, &mut store, Vector3::z());
    assert!(!history.can_redo());
    assert_eq!(history.redo_depth(), 0);
    assert_eq!(history.undo_depth(), 2);
}

#[test]
fn test_undo_redo_move_between_stacks() {
    let mut store = NoduleStore::new();
    let mut history = CommandHistory::new();
    add_point(&mut history, &mut store, Vector3::x());

    assert!(history.undo(&mut store).unwrap());
    assert!(store.is_empty());
    assert_eq!(history.redo_depth(), 1);
    assert!(!history.undo(&mut store).unwrap());

    assert!(history.redo(&mut store).unwrap());
    assert_eq!(store.len(), 2);
    assert!(!history.redo(&mut store).unwrap());
}

#[test]
fn test_script_follows_done_stack() {
    let mut store = NoduleStore::new();
    let mut history = CommandHistory::new();
    add_point(&mut history, &mut store, Vector3::x());
    add_point(&mut history, &mut store, Vector3::y());
    history.undo(&mut store).unwrap();

    let script = history.to_script(&store);
    assert_eq!(script.len(), 1);
    assert!(script[0].starts_with("AddPoint&"));
    assert!(script[0].contains("objectName=P1"));
}

#[derive(Debug, Clone)]
enum Step {
    Add(u8),
    Undo,
    Redo,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u8..6).prop_map(Step::Add),
        Just(Step::Undo),
        Just(Step::Redo),
    ]
}

fn axis(i: u8) -> Vector3<f64> {
    let v = match i % 3 {
        0 => Vector3::x(),
        1 => Vector3::y(),
        _ => Vector3::z(),
    };
    if i >= 3 {
        -v
    } else {
        v
    }
}

proptest! {
    #[test]
    fn history_depths_match_a_stack_model(steps in prop::collection::vec(step(), 0..40)) {
        let mut store = NoduleStore::new();
        let mut history = CommandHistory::new();
        let (mut done, mut undone) = (0usize, 0usize);

        for step in steps {
            match step {
                Step::Add(i) => {
                    add_point(&mut history, &mut store, axis(i));
                    done += 1;
                    undone = 0;
                }
                Step::Undo => {
                    let moved = history.undo(&mut store).unwrap();
                    prop_assert_eq!(moved, done > 0);
                    if moved {
                        done -= 1;
                        undone += 1;
                    }
                }
                Step::Redo => {
                    let moved = history.redo(&mut store).unwrap();
                    prop_assert_eq!(moved, undone > 0);
                    if moved {
                        undone -= 1;
                        done += 1;
                    }
                }
            }
            prop_assert_eq!(history.undo_depth(), done);
            prop_assert_eq!(history.redo_depth(), undone);
            // Every point carries a label.
            prop_assert_eq!(store.len(), 2 * done);
        }

        while history.undo(&mut store).unwrap() {}
        prop_assert!(store.is_empty());
    }
}
