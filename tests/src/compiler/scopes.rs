//! Order in which the scopes and their declarations are searched.

use as2js_ast::{Flag, Int64, NodeKind};
use as2js_compiler::ResourceConfig;
use pretty_assertions::assert_eq;

use crate::utils::Session;

#[test]
fn block_variable_is_visible_inside_a_function_declared_before_its_user() {
    // var x = 1; function f() { return x; } var x2 = x;
    let mut s = Session::new(ResourceConfig::default());
    let list = s.list;
    let x = s.var(list, "x");
    let set = s.add(x, NodeKind::Set, "");
    let one = s.add(set, NodeKind::Int64, "");
    s.arena().set_int64(one, Int64::new(1)).unwrap();
    let (_, body) = s.scope(list, NodeKind::Function, "f");
    let ret = s.add(body, NodeKind::Return, "");
    let in_function = s.add(ret, NodeKind::Identifier, "x");
    let x2 = s.var(list, "x2");
    let set = s.add(x2, NodeKind::Set, "");
    let in_initializer = s.add(set, NodeKind::Identifier, "x");

    assert_eq!(s.resolve(in_function), Some(x));
    assert_eq!(s.resolve(in_initializer), Some(x));
    assert_eq!(s.sink.borrow().error_count(), 0);
}

#[test]
fn function_body_sees_a_variable_declared_after_it() {
    // function g() { return y; } var y;
    let mut s = Session::new(ResourceConfig::default());
    let list = s.list;
    let (_, body) = s.scope(list, NodeKind::Function, "g");
    let ret = s.add(body, NodeKind::Return, "");
    let reference = s.add(ret, NodeKind::Identifier, "y");
    let y = s.var(list, "y");

    assert_eq!(s.resolve(reference), Some(y));
}

#[test]
fn same_named_siblings_resolve_backward_first() {
    // the scan goes toward the start of the block before looking ahead,
    // so an earlier declaration shadows a later one
    let mut s = Session::new(ResourceConfig::default());
    let list = s.list;
    let first = s.add(list, NodeKind::Package, "twice");
    let between = s.add(list, NodeKind::Identifier, "twice");
    s.add(list, NodeKind::Package, "twice");

    assert_eq!(s.resolve(between), Some(first));

    // with nothing behind it, the forward scan picks the nearest one
    let arena = s.arena();
    let at_start = arena.create(NodeKind::Identifier);
    arena.set_string(at_start, "twice").unwrap();
    arena.insert_child(list, 0, at_start).unwrap();
    assert_eq!(s.resolve(at_start), Some(first));
}

#[test]
fn enclosing_function_parameters_come_before_outer_declarations() {
    // var a; function h(a) { a; }
    let mut s = Session::new(ResourceConfig::default());
    let list = s.list;
    s.var(list, "a");
    let (h, body) = s.scope(list, NodeKind::Function, "h");
    let parameters = s.add(h, NodeKind::Parameters, "");
    let param = s.add(parameters, NodeKind::Param, "a");
    let reference = s.add(body, NodeKind::Identifier, "a");

    assert_eq!(s.resolve(reference), Some(param));
    assert!(s.compiler.arena().flag(param, Flag::ParamReferenced).unwrap());
}

#[test]
fn resolution_is_remembered_on_the_identifier() {
    let mut s = Session::new(ResourceConfig::default());
    let list = s.list;
    let (class, _) = s.scope(list, NodeKind::Class, "Shape");
    let reference = s.add(list, NodeKind::Identifier, "Shape");

    assert_eq!(s.resolve(reference), Some(class));
    assert!(s.compiler.arena().flag(reference, Flag::IdentifierTyped).unwrap());
    // a class is its own type
    assert_eq!(s.compiler.arena().type_node(class), Some(class));
}
