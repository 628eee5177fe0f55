//! Packages of other modules, found through the package database.

use std::fs;

use as2js_ast::{ErrorCode, Flag, NodeId, NodeKind};
use as2js_compiler::CompileError;
use pretty_assertions::assert_eq;

use crate::utils::{AS_INIT, Session, installation};

const TOOLS: &str = "package tools\nfunction saw\nprivate function secret\nvar blade\n}\n";

fn import(s: &mut Session, package: &str) -> NodeId {
    let list = s.list;
    let import = s.add(list, NodeKind::Import, package);
    s.arena()
        .set_flag(import, Flag::ImportImplements, true)
        .unwrap();
    import
}

#[test]
fn imported_names_come_from_the_module_the_database_points_to() {
    let (_dir, options) = installation(&[("as_init.js", AS_INIT), ("tools.js", TOOLS)]);
    let mut s = Session::new(options);
    s.compiler.internal_imports().unwrap();
    import(&mut s, "tools");
    let list = s.list;
    let saw = s.add(list, NodeKind::Identifier, "saw");
    let secret = s.add(list, NodeKind::Identifier, "secret");

    let found = s.resolve(saw).unwrap();
    let arena = s.compiler.arena();
    assert_eq!(arena.kind(found), NodeKind::Function);
    assert_eq!(arena.string(found).unwrap(), "saw");
    assert!(arena.position(found).filename().ends_with("tools.js"));
    assert_eq!(arena.position(found).line(), 2);

    assert_eq!(s.resolve(secret), None);

    let referenced = s.compiler.context().compiled_packages().to_vec();
    assert_eq!(referenced.len(), 1);
    let arena = s.compiler.arena();
    assert_eq!(arena.string(referenced[0]).unwrap(), "tools");
    assert!(arena.flag(referenced[0], Flag::PackageReferenced).unwrap());
    assert_eq!(s.sink.borrow().error_count(), 0);
}

#[test]
fn a_new_compilation_indexes_scripts_installed_since_the_last_one() {
    let (dir, options) = installation(&[("as_init.js", AS_INIT), ("tools.js", TOOLS)]);
    let mut first = Session::new(options.clone());
    first.compiler.internal_imports().unwrap();
    assert!(first.compiler.context().database().get_package("late").is_none());

    fs::write(
        dir.path().join("scripts/native/late.js"),
        "package late\nvar never\n}\n",
    )
    .unwrap();

    let mut second = Session::new(options);
    second.compiler.internal_imports().unwrap();
    let database = second.compiler.context().database();
    assert!(database.get_package("tools").is_some());
    assert!(database.get_package("late").is_some());

    import(&mut second, "tools");
    let list = second.list;
    let blade = second.add(list, NodeKind::Identifier, "blade");
    let found = second.resolve(blade).unwrap();
    assert_eq!(second.compiler.arena().kind(found), NodeKind::Variable);
}

#[test]
fn import_directive_references_the_package() {
    let (_dir, options) = installation(&[("as_init.js", AS_INIT), ("tools.js", TOOLS)]);
    let mut s = Session::new(options);
    s.compiler.internal_imports().unwrap();
    let tools = import(&mut s, "tools");
    let nowhere = import(&mut s, "nowhere");

    s.compiler.import(tools).unwrap();
    assert_eq!(s.compiler.context().compiled_packages().len(), 1);
    s.compiler.import(tools).unwrap();
    assert_eq!(s.compiler.context().compiled_packages().len(), 1);

    s.compiler.import(nowhere).unwrap();
    let sink = s.sink.borrow();
    assert_eq!(sink.error_count(), 1);
    assert_eq!(sink.messages()[0].code, ErrorCode::NotFound);
    assert_eq!(sink.messages()[0].text, "cannot find package 'nowhere'.");
}

#[test]
fn a_stale_database_entry_is_fatal() {
    let (dir, options) = installation(&[("as_init.js", AS_INIT), ("tools.js", TOOLS)]);
    let mut s = Session::new(options);
    s.compiler.internal_imports().unwrap();
    // the module no longer declares the package the database remembers
    fs::write(dir.path().join("scripts/native/tools.js"), "package renamed\n}\n").unwrap();

    let mut fresh = Session::new(crate::utils::config_in(dir.path()));
    fresh.compiler.internal_imports().unwrap();
    import(&mut fresh, "tools");
    let list = fresh.list;
    let saw = fresh.add(list, NodeKind::Identifier, "saw");
    let err = fresh.compiler.resolve_name(saw, saw, None, 0).unwrap_err();

    assert!(matches!(err, CompileError::PackageMustExist { ref package } if package == "tools"));
    assert!(fresh.sink.borrow().has_code(ErrorCode::InternalError));
}

#[test]
fn missing_native_scripts_abort_the_compilation() {
    let (_dir, options) = installation(&[]);
    let mut s = Session::new(options);
    let err = s.compiler.internal_imports().unwrap_err();

    assert!(matches!(err, CompileError::ModuleLoadFailed { .. }));
    assert_eq!(err.exit_code(), 1);
    let sink = s.sink.borrow();
    assert_eq!(sink.messages()[0].code, ErrorCode::NotFound);
    assert!(sink.messages()[0].text.starts_with("cannot open module file"));
}
