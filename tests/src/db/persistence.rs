use std::fs;

use as2js_ast::{CollectingSink, Diagnostics, ErrorCode};
use as2js_compiler::Database;
use as2js_compiler::db::HEADER;
use pretty_assertions::assert_eq;

use crate::utils::init_logging;

/// (package, element, type, filename, line)
const ENTRIES: &[(&str, &str, &str, &str, i64)] = &[
    ("p1", "Buffer", "class", "scripts/p1.js", 3),
    ("p1", "trim", "function", "scripts/p1.js", 17),
    ("p1", "->size", "getter", "scripts/p1.js", 29),
    ("p2", "<-size", "setter", "scripts/p2.js", 5),
    ("p2", "encoding", "variable", "scripts/p2.js", 8),
    ("p2", "Stream", "class", "other/p2.js", 1234),
];

fn snapshot(db: &Database) -> Vec<(String, String, String, String, i64)> {
    db.find_packages("*")
        .iter()
        .flat_map(|package| {
            let package = package.borrow();
            package
                .find_elements("*")
                .iter()
                .map(|element| {
                    let element = element.borrow();
                    (
                        package.name().to_string(),
                        element.name().to_string(),
                        element.element_type().to_string(),
                        element.filename().to_string(),
                        element.line(),
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn saved_packages_load_back_identically() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");
    let mut diagnostics = Diagnostics::default();

    let mut db = Database::new();
    assert!(db.load(&path, &mut diagnostics));
    assert!(db.find_packages("*").is_empty());

    for (package, name, ty, filename, line) in ENTRIES {
        let package = db.add_package(package).unwrap();
        let element = package.borrow_mut().add_element(name);
        let mut element = element.borrow_mut();
        element.set_type(*ty);
        element.set_filename(*filename);
        element.set_line(*line);
    }
    db.save().unwrap();
    assert!(fs::read_to_string(&path).unwrap().starts_with(HEADER));

    let mut reloaded = Database::new();
    assert!(reloaded.load(&path, &mut diagnostics));
    assert_eq!(snapshot(&reloaded), snapshot(&db));
    assert_eq!(snapshot(&reloaded).len(), 6);

    let names: Vec<String> = reloaded
        .find_packages("p*")
        .iter()
        .map(|p| p.borrow().name().to_string())
        .collect();
    assert_eq!(names, ["p1", "p2"]);
}

#[test]
fn adding_twice_returns_the_same_handles() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    assert!(db.load(dir.path().join("packages.db"), &mut Diagnostics::default()));

    let first = db.add_package("tools").unwrap();
    let second = db.add_package("tools").unwrap();
    assert!(std::rc::Rc::ptr_eq(&first, &second));

    let hammer = first.borrow_mut().add_element("hammer");
    let again = second.borrow_mut().add_element("hammer");
    assert!(std::rc::Rc::ptr_eq(&hammer, &again));
    assert_eq!(first.borrow().len(), 1);
}

#[test]
fn element_lookup_combines_patterns_and_type() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = Database::new();
    assert!(db.load(dir.path().join("packages.db"), &mut Diagnostics::default()));
    for (package, name, ty, _, _) in ENTRIES {
        let package = db.add_package(package).unwrap();
        package.borrow_mut().add_element(name).borrow_mut().set_type(*ty);
    }

    let class = db.find_element("p*", "S*", Some("class")).unwrap();
    assert_eq!(class.borrow().name(), "Stream");
    assert!(db.find_element("p1", "*size", Some("setter")).is_none());
    assert!(db.find_element("p*", "*size", Some("setter")).is_some());
    assert!(db.find_element("nowhere", "*", None).is_none());
}

#[test]
fn malformed_fields_are_reported_and_defaulted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("packages.db");
    fs::write(
        &path,
        r#"// written by hand
{
    "p1": {
        "odd": { "type": 3, "filename": "a.js", "line": "seven" },
        /* fine */
        "even": { "type": "class", "filename": "b.js", "line": 2 }
    }
}"#,
    )
    .unwrap();
    let sink = std::rc::Rc::new(std::cell::RefCell::new(CollectingSink::new()));
    let mut diagnostics = Diagnostics::new(Box::new(sink.clone()));

    let mut db = Database::new();
    assert!(db.load(&path, &mut diagnostics));

    let sink = sink.borrow();
    assert_eq!(sink.error_count(), 2);
    assert!(sink.has_code(ErrorCode::UnexpectedDatabase));

    let package = db.get_package("p1").unwrap();
    let odd = package.borrow().get_element("odd").unwrap();
    let odd = odd.borrow();
    assert_eq!((odd.element_type(), odd.filename(), odd.line()), ("", "a.js", 1));
    let even = package.borrow().get_element("even").unwrap();
    assert_eq!(even.borrow().line(), 2);
}

#[test]
fn a_database_that_is_not_an_object_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("packages.db");
    fs::write(&path, "[\"p1\"]").unwrap();
    let sink = std::rc::Rc::new(std::cell::RefCell::new(CollectingSink::new()));
    let mut diagnostics = Diagnostics::new(Box::new(sink.clone()));

    let mut db = Database::new();
    assert!(!db.load(&path, &mut diagnostics));
    assert!(sink.borrow().has_code(ErrorCode::UnexpectedDatabase));
    assert!(db.find_packages("*").is_empty());
}
