//! Who may see private, protected and internal declarations.

use as2js_ast::{Attribute, ErrorCode, NodeId, NodeKind};
use as2js_compiler::{
    ResourceConfig, SEARCH_ERROR_INTERNAL, SEARCH_ERROR_PRIVATE, SEARCH_ERROR_PRIVATE_PACKAGE,
    SEARCH_ERROR_PROTECTED,
};
use pretty_assertions::assert_eq;

use crate::utils::Session;

fn mark(s: &mut Session, node: NodeId, attribute: Attribute) {
    assert!(s.arena().set_attribute(node, attribute, true).unwrap());
}

/// `object.field` appended to `parent`; returns the `MEMBER`.
fn member(s: &mut Session, parent: NodeId, object: &str, field: &str) -> NodeId {
    let member = s.add(parent, NodeKind::Member, "");
    s.add(member, NodeKind::Identifier, object);
    s.add(member, NodeKind::Identifier, field);
    member
}

#[test]
fn private_method_is_only_visible_inside_its_class() {
    let mut s = Session::new(ResourceConfig::default());
    let list = s.list;
    let (_, body) = s.scope(list, NodeKind::Class, "C");
    let m = s.add(body, NodeKind::Function, "m");
    mark(&mut s, m, Attribute::Private);
    let (_, n_body) = s.scope(body, NodeKind::Function, "n");
    let inside = s.add(n_body, NodeKind::Identifier, "m");
    let outside = member(&mut s, list, "C", "m");

    assert_eq!(s.resolve(inside), Some(m));
    assert_eq!(s.compiler.context().last_search_errors(), 0);

    assert_eq!(s.resolve(outside), None);
    let errors = s.compiler.context().last_search_errors();
    assert_eq!(errors & SEARCH_ERROR_PRIVATE, SEARCH_ERROR_PRIVATE);

    let sink = s.sink.borrow();
    assert_eq!(sink.error_count(), 1);
    let message = &sink.messages()[0];
    assert_eq!(message.code, ErrorCode::CannotMatch);
    assert!(message.text.starts_with("the name 'm' could not be resolved because:"));
    assert!(message.text.contains("You cannot access a private class member"));
}

#[test]
fn package_private_variable_stays_in_its_package() {
    let mut s = Session::new(ResourceConfig::default());
    let list = s.list;
    let (_, body) = s.scope(list, NodeKind::Package, "vault");
    let secret = s.var(body, "secret");
    mark(&mut s, secret, Attribute::Private);
    let (_, f_body) = s.scope(body, NodeKind::Function, "open");
    let inside = s.add(f_body, NodeKind::Identifier, "secret");
    let outside = member(&mut s, list, "vault", "secret");

    assert_eq!(s.resolve(inside), Some(secret));
    assert_eq!(s.resolve(outside), None);
    assert_eq!(
        s.compiler.context().last_search_errors() & SEARCH_ERROR_PRIVATE_PACKAGE,
        SEARCH_ERROR_PRIVATE_PACKAGE
    );
}

#[test]
fn protected_member_is_visible_from_derived_classes_only() {
    let mut s = Session::new(ResourceConfig::default());
    let list = s.list;
    let (_, base_body) = s.scope(list, NodeKind::Class, "Base");
    let p = s.add(base_body, NodeKind::Function, "p");
    mark(&mut s, p, Attribute::Protected);

    let (derived, derived_body) = s.scope(list, NodeKind::Class, "Derived");
    let extends = s.add(derived, NodeKind::Extends, "");
    s.add(extends, NodeKind::Identifier, "Base");
    let (_, q_body) = s.scope(derived_body, NodeKind::Function, "q");
    let from_derived = s.add(q_body, NodeKind::Identifier, "p");

    let (_, other_body) = s.scope(list, NodeKind::Class, "Other");
    let (_, r_body) = s.scope(other_body, NodeKind::Function, "r");
    let from_other = member(&mut s, r_body, "Base", "p");

    assert_eq!(s.resolve(from_derived), Some(p));
    assert_eq!(s.resolve(from_other), None);
    assert_eq!(
        s.compiler.context().last_search_errors() & SEARCH_ERROR_PROTECTED,
        SEARCH_ERROR_PROTECTED
    );
}

#[test]
fn internal_declarations_need_a_package_around_the_reference() {
    let mut s = Session::new(ResourceConfig::default());
    let list = s.list;
    let shared = s.var(list, "shared");
    mark(&mut s, shared, Attribute::Internal);
    let (_, body) = s.scope(list, NodeKind::Package, "users");
    let (_, f_body) = s.scope(body, NodeKind::Function, "f");
    let from_package = s.add(f_body, NodeKind::Identifier, "shared");
    let from_program = s.add(list, NodeKind::Identifier, "shared");

    assert_eq!(s.resolve(from_package), Some(shared));
    assert_eq!(s.resolve(from_program), None);
    assert_eq!(s.compiler.context().last_search_errors(), SEARCH_ERROR_INTERNAL);
    assert!(s.sink.borrow().has_code(ErrorCode::CannotMatch));
}
