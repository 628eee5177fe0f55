//! Picking one function among overloads from the call arguments.

use as2js_ast::{ErrorCode, NodeKind};
use as2js_compiler::{SEARCH_ERROR_PROTOTYPE, SEARCH_FLAG_GETTER};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::utils::{AS_INIT, Session, installation};

/// A session whose native import declares the basic classes.
fn with_natives() -> (TempDir, Session) {
    let (dir, options) = installation(&[("as_init.js", AS_INIT)]);
    let mut s = Session::new(options);
    s.compiler.internal_imports().unwrap();
    (dir, s)
}

#[test]
fn argument_literals_select_the_overload() {
    let (_dir, mut s) = with_natives();
    let list = s.list;
    let on_string = s.function(list, "print", &[("value", "String")]);
    let on_integer = s.function(list, "print", &[("value", "Integer")]);

    let (text_call, text_args) = s.call(list, "print");
    s.add(text_args, NodeKind::String, "hello");
    let (number_call, number_args) = s.call(list, "print");
    s.add(number_args, NodeKind::Int64, "");

    assert_eq!(
        s.compiler
            .resolve_name(text_call, text_call, Some(text_args), 0)
            .unwrap(),
        Some(on_string)
    );
    assert_eq!(
        s.compiler
            .resolve_name(number_call, number_call, Some(number_args), 0)
            .unwrap(),
        Some(on_integer)
    );
    assert_eq!(s.sink.borrow().error_count(), 0);
}

#[test]
fn object_parameter_accepts_anything_but_loses_to_an_exact_type() {
    let (_dir, mut s) = with_natives();
    let list = s.list;
    s.function(list, "show", &[("value", "Object")]);
    let exact = s.function(list, "show", &[("value", "Boolean")]);

    let (call, args) = s.call(list, "show");
    s.add(args, NodeKind::True, "");

    assert_eq!(
        s.compiler.resolve_name(call, call, Some(args), 0).unwrap(),
        Some(exact)
    );
}

#[test]
fn incompatible_arguments_are_reported_once() {
    let (_dir, mut s) = with_natives();
    let list = s.list;
    s.function(list, "square", &[("value", "Double")]);
    let (call, args) = s.call(list, "square");
    s.add(args, NodeKind::String, "four");

    assert_eq!(
        s.compiler.resolve_name(call, call, Some(args), 0).unwrap(),
        None
    );
    assert_eq!(
        s.compiler.context().last_search_errors(),
        SEARCH_ERROR_PROTOTYPE
    );
    let sink = s.sink.borrow();
    assert_eq!(sink.error_count(), 1);
    assert_eq!(sink.messages()[0].code, ErrorCode::CannotMatch);
}

#[test]
fn getters_are_found_by_their_internal_name() {
    let (_dir, mut s) = with_natives();
    let list = s.list;
    let getter = s.function(list, "->length", &[]);
    s.arena()
        .set_flag(getter, as2js_ast::Flag::FunctionGetter, true)
        .unwrap();
    let (reference, args) = s.call(list, "length");

    assert_eq!(
        s.compiler
            .resolve_name(reference, reference, Some(args), SEARCH_FLAG_GETTER)
            .unwrap(),
        Some(getter)
    );
    assert_eq!(s.sink.borrow().error_count(), 0);
}
