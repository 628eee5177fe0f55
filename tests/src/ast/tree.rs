//! Random sequences of structural edits keep parents and children in sync.

use as2js_ast::{Arena, NodeError, NodeId, NodeKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Append,
    Insert(usize),
    Set(usize),
    Delete(usize),
    Replace(usize),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        Just(Edit::Append),
        any::<usize>().prop_map(Edit::Insert),
        any::<usize>().prop_map(Edit::Set),
        any::<usize>().prop_map(Edit::Delete),
        any::<usize>().prop_map(Edit::Replace),
    ]
}

/// Applies `edit` to both the arena and the expected children list.
/// Returns the node that left the list, if any.
fn apply(arena: &mut Arena, list: NodeId, expected: &mut Vec<NodeId>, edit: &Edit) -> Option<NodeId> {
    let fresh = arena.create(NodeKind::Identifier);
    match *edit {
        Edit::Append => {
            arena.append_child(list, fresh).unwrap();
            expected.push(fresh);
            None
        }
        Edit::Insert(at) => {
            let at = at % (expected.len() + 1);
            arena.insert_child(list, at, fresh).unwrap();
            expected.insert(at, fresh);
            None
        }
        _ if expected.is_empty() => {
            assert!(matches!(
                arena.delete_child(list, 0),
                Err(NodeError::IndexOutOfRange { .. })
            ));
            None
        }
        Edit::Set(at) => {
            let at = at % expected.len();
            let previous = arena.set_child(list, at, fresh).unwrap();
            assert_eq!(previous, expected[at]);
            Some(std::mem::replace(&mut expected[at], fresh))
        }
        Edit::Delete(at) => {
            let at = at % expected.len();
            let removed = arena.delete_child(list, at).unwrap();
            assert_eq!(removed, expected[at]);
            Some(expected.remove(at))
        }
        Edit::Replace(at) => {
            let at = at % expected.len();
            arena.replace_with(expected[at], fresh).unwrap();
            Some(std::mem::replace(&mut expected[at], fresh))
        }
    }
}

proptest! {
    #[test]
    fn children_and_parents_stay_consistent(edits in prop::collection::vec(edit(), 0..40)) {
        let mut arena = Arena::new();
        let list = arena.create(NodeKind::DirectiveList);
        let mut expected = Vec::new();

        for edit in &edits {
            if let Some(gone) = apply(&mut arena, list, &mut expected, edit) {
                prop_assert_eq!(arena.parent(gone), None);
            }
            prop_assert_eq!(arena.children(list), expected.as_slice());
            prop_assert_eq!(arena.children_size(list), expected.len());
            for (offset, child) in expected.iter().enumerate() {
                prop_assert_eq!(arena.parent(*child), Some(list));
                prop_assert_eq!(arena.offset(*child).unwrap(), offset);
            }
        }
    }
}

#[test]
fn moving_a_child_detaches_it_from_its_previous_parent() {
    let mut arena = Arena::new();
    let first = arena.create(NodeKind::DirectiveList);
    let second = arena.create(NodeKind::DirectiveList);
    let child = arena.create(NodeKind::Identifier);

    arena.append_child(first, child).unwrap();
    arena.append_child(second, child).unwrap();

    assert_eq!(arena.children_size(first), 0);
    assert_eq!(arena.children(second), [child]);
    assert_eq!(arena.parent(child), Some(second));
}

#[test]
fn discarded_subtrees_reject_further_edits() {
    let mut arena = Arena::new();
    let list = arena.create(NodeKind::DirectiveList);
    let child = arena.create(NodeKind::Identifier);
    arena.append_child(list, child).unwrap();
    arena.delete_child(list, 0).unwrap();
    arena.discard(child).unwrap();

    assert!(!arena.is_alive(child));
    assert!(matches!(
        arena.append_child(list, child),
        Err(NodeError::DeadNode { .. })
    ));
}
