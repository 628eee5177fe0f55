use as2js_ast::{Arena, Attribute, Flag, NodeError, NodeId, NodeKind, NodeLock};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn list_with_child(arena: &mut Arena) -> (NodeId, NodeId) {
    let list = arena.create(NodeKind::DirectiveList);
    let child = arena.create(NodeKind::Identifier);
    arena.append_child(list, child).unwrap();
    (list, child)
}

fn is_locked_error<T: std::fmt::Debug>(result: Result<T, NodeError>) -> bool {
    matches!(result, Err(NodeError::Locked { .. }))
}

proptest! {
    #[test]
    fn nested_guards_all_have_to_go(depth in 1usize..8) {
        let mut arena = Arena::new();
        let (list, _) = list_with_child(&mut arena);

        let mut guards: Vec<NodeLock> = (0..depth).map(|_| NodeLock::new(&arena, list)).collect();
        prop_assert_eq!(arena.lock_count(list), u32::try_from(depth).unwrap());

        while guards.len() > 1 {
            guards.pop();
            let extra = arena.create(NodeKind::Identifier);
            prop_assert!(is_locked_error(arena.append_child(list, extra)));
        }
        guards.pop();

        let extra = arena.create(NodeKind::Identifier);
        prop_assert!(arena.append_child(list, extra).is_ok());
        prop_assert_eq!(arena.children_size(list), 2);
    }

    #[test]
    fn explicit_locks_need_as_many_unlocks(depth in 1usize..8) {
        let mut arena = Arena::new();
        let (list, child) = list_with_child(&mut arena);

        for _ in 0..depth {
            arena.lock(list);
        }
        for _ in 0..depth {
            prop_assert!(is_locked_error(arena.delete_child(list, 0)));
            arena.unlock(list).unwrap();
        }
        prop_assert_eq!(arena.delete_child(list, 0).unwrap(), child);
        let unbalanced = matches!(arena.unlock(list), Err(NodeError::UnlockUnlocked { .. }));
        prop_assert!(unbalanced);
    }
}

#[test]
fn a_locked_node_keeps_its_flags_attributes_and_payload() {
    let mut arena = Arena::new();
    let (_, child) = list_with_child(&mut arena);
    let guard = NodeLock::new(&arena, child);

    assert!(is_locked_error(arena.set_flag(child, Flag::IdentifierWith, true)));
    assert!(is_locked_error(arena.set_attribute(child, Attribute::Public, true)));
    assert!(is_locked_error(arena.set_string(child, "renamed")));
    assert!(!arena.flag(child, Flag::IdentifierWith).unwrap());

    drop(guard);
    arena.set_flag(child, Flag::IdentifierWith, true).unwrap();
    assert!(arena.flag(child, Flag::IdentifierWith).unwrap());
}

#[test]
fn a_locked_child_cannot_be_moved_out() {
    let mut arena = Arena::new();
    let (list, child) = list_with_child(&mut arena);
    let other = arena.create(NodeKind::DirectiveList);
    let _guard = NodeLock::new(&arena, child);

    assert!(is_locked_error(arena.append_child(other, child)));
    assert_eq!(arena.parent(child), Some(list));
}

#[test]
fn early_unlock_is_not_repeated_on_drop() {
    let mut arena = Arena::new();
    let (list, _) = list_with_child(&mut arena);
    let _outer = NodeLock::new(&arena, list);
    let mut inner = NodeLock::new(&arena, list);

    inner.unlock().unwrap();
    assert_eq!(inner.node(), None);
    drop(inner);
    assert_eq!(arena.lock_count(list), 1);
}
