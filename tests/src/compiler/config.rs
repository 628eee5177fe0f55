//! A compilation configured from a resource file, and sources supplied
//! without touching the disk.

use std::fs;

use as2js_ast::NodeKind;
use as2js_compiler::ResourceConfig;
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};

use crate::utils::{AS_INIT, Session, installation};

const TOOLS: &str = "package tools\nfunction saw\nvar blade\n}\n";

/// The saved database, its comment header removed.
fn saved_database(path: &str) -> Value {
    let content = fs::read_to_string(path).unwrap();
    let body: String = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");
    serde_json::from_str(&body).unwrap()
}

#[test]
fn resource_file_points_the_compiler_at_its_scripts_and_database() {
    let (dir, _) = installation(&[("as_init.js", AS_INIT), ("tools.js", TOOLS)]);
    let rc = json!({
        "scripts": dir.path().join("scripts"),
        "db": dir.path().join("state/packages.db"),
    });
    fs::create_dir_all(dir.path().join("state")).unwrap();
    fs::write(
        dir.path().join("as2js.rc"),
        format!("// local installation\n{rc:#}\n"),
    )
    .unwrap();

    let options = ResourceConfig::find(&[dir.path().to_path_buf()], false).unwrap();
    assert_eq!(options.temporary_variable_name, "@temp");
    let db = options.db.clone();

    let mut s = Session::new(options);
    s.compiler.internal_imports().unwrap();
    let list = s.list;
    let reference = s.add(list, NodeKind::Identifier, "Integer");
    let class = s.resolve(reference).unwrap();
    let arena = s.compiler.arena();
    assert_eq!(arena.kind(class), NodeKind::Class);
    assert!(arena.position(class).filename().ends_with("native/as_init.js"));

    let saved = saved_database(&db);
    assert_eq!(saved["tools"]["saw"]["type"], "function");
    assert_eq!(saved["tools"]["saw"]["line"], 2);
    assert_eq!(saved["tools"]["blade"]["type"], "variable");
    assert!(
        saved["tools"]["saw"]["filename"]
            .as_str()
            .unwrap()
            .ends_with("tools.js")
    );
}

#[test]
fn retrieved_sources_take_precedence_over_the_disk() {
    // the native import only exists in memory
    let (dir, options) = installation(&[("tools.js", TOOLS)]);
    let native = format!("{}/native/as_init.js", options.scripts);
    let mut sources = FxHashMap::default();
    sources.insert(native.clone(), AS_INIT.to_string());

    let mut s = Session::with_sources(options, sources);
    s.compiler.internal_imports().unwrap();
    assert!(!dir.path().join("scripts/native/as_init.js").exists());

    let list = s.list;
    let reference = s.add(list, NodeKind::Identifier, "Boolean");
    let class = s.resolve(reference).unwrap();
    assert_eq!(s.compiler.arena().position(class).filename(), native);
    assert!(
        s.compiler
            .context()
            .database()
            .get_package("tools")
            .is_some()
    );
    assert_eq!(s.sink.borrow().error_count(), 0);
}
