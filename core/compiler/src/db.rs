//! Persistent package database.
//!
//! The database remembers, for every package seen in a module, which
//! classes, functions and variables it declares and where. Name resolution
//! uses it to find the module defining a package without parsing every
//! module available.
//!
//! On disk it is a JSON object of packages, each an object of elements:
//!
//! ```text
//! {
//!   "pkg": { "Item": { "filename": "a.js", "line": 3, "type": "class" } }
//! }
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use as2js_ast::{Diagnostics, ErrorCode, Position};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::DatabaseError;
use crate::json;

pub const HEADER: &str = "// Database used by the AS2JS Compiler (as2js)\n\
//\n\
// DO NOT EDIT UNLESS YOU KNOW WHAT YOU ARE DOING\n\
// If you have a problem because of the database, just delete the file\n\
// and the compiler will re-generate it.\n\
//\n\
// Copyright (c) 2005-2017 by Made to Order Software Corp.\n\
// This file is written in UTF-8\n\
// You can safely modify it with an editor supporting UTF-8\n\
// The format is JSON:\n\
//\n\
// {\n\
//   \"package_name\": {\n\
//     \"element_name\": {\n\
//       \"filename\": \"<full path filename>\",\n\
//       \"line\": <line number>,\n\
//       \"type\": \"<type name>\"\n\
//     },\n\
//     <...other elements...>\n\
//   },\n\
//   <...other packages...>\n\
// }\n\
//";

pub type PackageRef = Rc<RefCell<Package>>;
pub type ElementRef = Rc<RefCell<Element>>;

/// A named declaration of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    #[serde(skip)]
    name: String,
    #[serde(rename = "type")]
    element_type: String,
    filename: String,
    line: i64,
}

impl Element {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            element_type: String::new(),
            filename: String::new(),
            line: 1,
        }
    }

    /// Reads an element object. Fields of the wrong type are reported and
    /// keep their default value.
    fn from_json(
        name: &str,
        object: &Map<String, Value>,
        position: &Position,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut element = Element::new(name);
        for (field, value) in object {
            match field.as_str() {
                "type" => match value.as_str() {
                    Some(s) => element.element_type = s.to_string(),
                    None => diagnostics.error(
                        ErrorCode::UnexpectedDatabase,
                        position,
                        "The type of an element in the database has to be a string.",
                    ),
                },
                "filename" => match value.as_str() {
                    Some(s) => element.filename = s.to_string(),
                    None => diagnostics.error(
                        ErrorCode::UnexpectedDatabase,
                        position,
                        "The filename of an element in the database has to be a string.",
                    ),
                },
                "line" => match value.as_i64() {
                    Some(line) => element.line = line,
                    None => diagnostics.error(
                        ErrorCode::UnexpectedDatabase,
                        position,
                        "The line of an element in the database has to be an integer.",
                    ),
                },
                _ => {}
            }
        }
        element
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One of `class`, `function`, `getter`, `setter` or `variable`.
    #[must_use]
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn line(&self) -> i64 {
        self.line
    }

    pub fn set_type(&mut self, element_type: impl Into<String>) {
        self.element_type = element_type.into();
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    pub fn set_line(&mut self, line: i64) {
        self.line = line;
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Package {
    #[serde(skip)]
    name: String,
    elements: BTreeMap<String, ElementRef>,
}

impl Package {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            elements: BTreeMap::new(),
        }
    }

    fn from_json(
        name: &str,
        object: &Map<String, Value>,
        position: &Position,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut package = Package::new(name);
        for (element_name, value) in object {
            let Some(fields) = value.as_object() else {
                diagnostics.error(
                    ErrorCode::UnexpectedDatabase,
                    position,
                    "A database is expected to be an object of object packages composed of object elements.",
                );
                continue;
            };
            let element = Element::from_json(element_name, fields, position, diagnostics);
            package
                .elements
                .insert(element_name.clone(), Rc::new(RefCell::new(element)));
        }
        package
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Elements whose name matches `pattern`, in name order.
    #[must_use]
    pub fn find_elements(&self, pattern: &str) -> Vec<ElementRef> {
        self.elements
            .iter()
            .filter(|(name, _)| match_pattern(name, pattern))
            .map(|(_, element)| Rc::clone(element))
            .collect()
    }

    #[must_use]
    pub fn get_element(&self, name: &str) -> Option<ElementRef> {
        self.elements.get(name).cloned()
    }

    /// Returns the element named `name`, creating it when missing.
    pub fn add_element(&mut self, name: &str) -> ElementRef {
        Rc::clone(
            self.elements
                .entry(name.to_string())
                .or_insert_with(|| Rc::new(RefCell::new(Element::new(name)))),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[derive(Debug)]
struct Loaded {
    path: PathBuf,
    valid: bool,
}

#[derive(Debug, Default)]
pub struct Database {
    loaded: Option<Loaded>,
    packages: BTreeMap<String, PackageRef>,
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Loads the database from `path`.
    ///
    /// A missing file gives an empty database and so does a file holding
    /// `null`. Problems with the content are reported to `diagnostics` and
    /// make the function return `false`; the packages read so far stay
    /// available. Once loaded, further calls return the first result
    /// without reading the file again.
    pub fn load(&mut self, path: impl AsRef<Path>, diagnostics: &mut Diagnostics) -> bool {
        if let Some(loaded) = &self.loaded {
            return loaded.valid;
        }
        let path = path.as_ref();
        let valid = self.read(path, diagnostics);
        tracing::debug!(path = %path.display(), valid, packages = self.packages.len(), "loaded package database");
        self.loaded = Some(Loaded {
            path: path.to_path_buf(),
            valid,
        });
        valid
    }

    fn read(&mut self, path: &Path, diagnostics: &mut Diagnostics) -> bool {
        let position = Position::new(path.display().to_string());
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return true,
            Err(err) => {
                diagnostics.error(
                    ErrorCode::IoError,
                    &position,
                    format!("cannot read database file: {err}"),
                );
                return false;
            }
        };
        let root = match json::parse(&content) {
            Ok(root) => root,
            Err(err) => {
                diagnostics.error(
                    ErrorCode::UnexpectedDatabase,
                    &position,
                    format!("the database is not valid JSON: {err}"),
                );
                return false;
            }
        };
        let packages = match root {
            Value::Null => return true,
            Value::Object(packages) => packages,
            _ => {
                diagnostics.error(
                    ErrorCode::UnexpectedDatabase,
                    &position,
                    "A database must be defined as a JSON object, or set to 'null'.",
                );
                return false;
            }
        };
        for (name, value) in &packages {
            let Some(elements) = value.as_object() else {
                diagnostics.error(
                    ErrorCode::UnexpectedDatabase,
                    &position,
                    "A database is expected to be an object of object packages composed of elements.",
                );
                return false;
            };
            let package = Package::from_json(name, elements, &position, diagnostics);
            self.packages
                .insert(name.clone(), Rc::new(RefCell::new(package)));
        }
        true
    }

    /// Writes the database back where it was loaded from. Does nothing if
    /// it was never loaded.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::Io`] when the file cannot be written.
    pub fn save(&self) -> Result<(), DatabaseError> {
        let Some(loaded) = &self.loaded else {
            return Ok(());
        };
        let body = serde_json::to_string_pretty(&self.packages)?;
        fs::write(&loaded.path, format!("{HEADER}\n{body}\n")).map_err(|source| {
            DatabaseError::Io {
                path: loaded.path.clone(),
                source,
            }
        })?;
        tracing::debug!(path = %loaded.path.display(), packages = self.packages.len(), "saved package database");
        Ok(())
    }

    /// Packages whose name matches `pattern`, in name order.
    #[must_use]
    pub fn find_packages(&self, pattern: &str) -> Vec<PackageRef> {
        self.packages
            .iter()
            .filter(|(name, _)| match_pattern(name, pattern))
            .map(|(_, package)| Rc::clone(package))
            .collect()
    }

    #[must_use]
    pub fn get_package(&self, name: &str) -> Option<PackageRef> {
        self.packages.get(name).cloned()
    }

    /// Returns the package named `name`, creating it when missing.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::NotLoaded`] before [`Database::load`].
    pub fn add_package(&mut self, name: &str) -> Result<PackageRef, DatabaseError> {
        if self.loaded.is_none() {
            return Err(DatabaseError::NotLoaded);
        }
        Ok(Rc::clone(
            self.packages
                .entry(name.to_string())
                .or_insert_with(|| Rc::new(RefCell::new(Package::new(name)))),
        ))
    }

    /// First element matching `element_pattern` in the packages matching
    /// `package_pattern`, optionally restricted to one element type.
    #[must_use]
    pub fn find_element(
        &self,
        package_pattern: &str,
        element_pattern: &str,
        element_type: Option<&str>,
    ) -> Option<ElementRef> {
        self.find_packages(package_pattern)
            .into_iter()
            .flat_map(|package| package.borrow().find_elements(element_pattern))
            .find(|element| element_type.is_none_or(|t| element.borrow().element_type() == t))
    }
}

/// Matches `name` against `pattern` where `*` stands for any sequence of
/// characters, including none.
#[must_use]
pub fn match_pattern(name: &str, pattern: &str) -> bool {
    fn do_match(name: &[char], pattern: &[char]) -> bool {
        match pattern.split_first() {
            None => name.is_empty(),
            Some(('*', mut rest)) => {
                while let Some(('*', more)) = rest.split_first() {
                    rest = more;
                }
                if rest.is_empty() {
                    return true;
                }
                (0..=name.len()).any(|split| do_match(&name[split..], rest))
            }
            Some((c, rest)) => name
                .split_first()
                .is_some_and(|(n, name_rest)| n == c && do_match(name_rest, rest)),
        }
    }
    let name: Vec<char> = name.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    do_match(&name, &pattern)
}
