//! Modules, packages and imports.
//!
//! Modules are loaded once per context and cached by filename. The package
//! database remembers which module declares which package element, so an
//! import can load the one module it needs instead of every script.

use std::fs;
use std::path::Path;

use as2js_ast::{Attribute, ErrorCode, Flag, NodeId, NodeKind, NodeLock, Position};

use super::{Compiler, SEARCH_FLAG_PACKAGE_MUST_EXIST};
use crate::errors::{CompileError, CompileResult};
use crate::input::is_package_script;
use crate::rc::ResourceConfig;

/// Kinds `find_labels` does not enter: nested declarations and expressions.
fn hides_labels(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Function
            | NodeKind::Class
            | NodeKind::Interface
            | NodeKind::Var
            | NodeKind::Package
            | NodeKind::Program
            | NodeKind::Assignment
            | NodeKind::AssignmentAdd
            | NodeKind::AssignmentBitwiseAnd
            | NodeKind::AssignmentBitwiseOr
            | NodeKind::AssignmentBitwiseXor
            | NodeKind::AssignmentDivide
            | NodeKind::AssignmentLogicalAnd
            | NodeKind::AssignmentLogicalOr
            | NodeKind::AssignmentLogicalXor
            | NodeKind::AssignmentMaximum
            | NodeKind::AssignmentMinimum
            | NodeKind::AssignmentModulo
            | NodeKind::AssignmentMultiply
            | NodeKind::AssignmentPower
            | NodeKind::AssignmentRotateLeft
            | NodeKind::AssignmentRotateRight
            | NodeKind::AssignmentShiftLeft
            | NodeKind::AssignmentShiftRight
            | NodeKind::AssignmentShiftRightUnsigned
            | NodeKind::AssignmentSubtract
            | NodeKind::Call
            | NodeKind::Decrement
            | NodeKind::Delete
            | NodeKind::Increment
            | NodeKind::Member
            | NodeKind::New
            | NodeKind::PostDecrement
            | NodeKind::PostIncrement
    )
}

impl Compiler {
    /// Resource configuration, read from `as2js.rc` on first use unless one
    /// was given to the context. A missing file is accepted when an input
    /// retriever is installed.
    fn options(&mut self) -> CompileResult<&ResourceConfig> {
        if self.ctx.options.is_none() {
            let options = ResourceConfig::load(self.ctx.input_retriever.is_some())?;
            self.ctx.options = Some(options);
        }
        Ok(self.ctx.options.get_or_insert_with(ResourceConfig::default))
    }

    /// Returns the `PROGRAM` of module `filename`, loading and parsing it on
    /// first request.
    ///
    /// # Errors
    ///
    /// [`CompileError::ModuleLoadFailed`] when the source cannot be read and
    /// [`CompileError::ModuleParseFailed`] when it does not parse. A fatal
    /// message is emitted in both cases.
    pub fn find_module(&mut self, filename: &str) -> CompileResult<NodeId> {
        if let Some(program) = self.ctx.modules.get(filename) {
            return Ok(*program);
        }

        let retrieved = self
            .ctx
            .input_retriever
            .as_mut()
            .and_then(|r| r.retrieve(filename));
        let source = match retrieved {
            Some(source) => source,
            None => fs::read_to_string(filename).map_err(|e| {
                self.ctx.diagnostics.fatal(
                    ErrorCode::NotFound,
                    &Position::new(filename),
                    format!("cannot open module file \"{filename}\"."),
                );
                CompileError::ModuleLoadFailed {
                    filename: filename.to_string(),
                    reason: e.to_string(),
                }
            })?,
        };

        let parsed = self
            .ctx
            .parser
            .parse(&mut self.ctx.arena, &source, filename);
        let program = match parsed {
            Ok(Some(program)) => program,
            rejected => {
                self.ctx.diagnostics.fatal(
                    ErrorCode::CannotCompile,
                    &Position::new(filename),
                    format!("could not compile module file \"{filename}\"."),
                );
                return Err(CompileError::ModuleParseFailed {
                    filename: filename.to_string(),
                    reason: rejected.err().map(|e| format!("{e:#}")),
                });
            }
        };

        tracing::debug!(filename, node = %program, "loaded module");
        self.ctx.modules.insert(filename.to_string(), program);
        Ok(program)
    }

    /// Loads `<scripts>/<module>/<file>`.
    ///
    /// # Errors
    ///
    /// See [`Compiler::find_module`]; reading the resource file may fail too.
    pub fn load_module(&mut self, module: &str, file: &str) -> CompileResult<NodeId> {
        let scripts = self.options()?.scripts.clone();
        self.find_module(&format!("{scripts}/{module}/{file}"))
    }

    /// Records in the database every element the packages of `program`
    /// declare.
    ///
    /// Packages are found in directive lists only. Their classes, functions
    /// (as `function`, `getter` or `setter`) and variables are saved under
    /// the package name; nested packages use a dotted name.
    ///
    /// # Errors
    ///
    /// The database was not loaded.
    pub fn find_packages(&mut self, program: NodeId) -> CompileResult<()> {
        if self.ctx.arena.kind(program) != NodeKind::Program {
            return Ok(());
        }
        self.find_packages_directive_list(program)
    }

    fn find_packages_directive_list(&mut self, list: NodeId) -> CompileResult<()> {
        for child in self.ctx.arena.children(list).to_vec() {
            match self.ctx.arena.kind(child) {
                NodeKind::DirectiveList => self.find_packages_directive_list(child)?,
                NodeKind::Package => {
                    if let Some(&body) = self.ctx.arena.children(child).first() {
                        let name = self.name_of(child);
                        self.save_package_elements(body, &name)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn save_package_elements(&mut self, list: NodeId, package_name: &str) -> CompileResult<()> {
        for child in self.ctx.arena.children(list).to_vec() {
            match self.ctx.arena.kind(child) {
                NodeKind::DirectiveList => self.save_package_elements(child, package_name)?,
                NodeKind::Class => self.add_database_entry(package_name, child, "class")?,
                NodeKind::Function => {
                    let element_type = if self.ctx.arena.flag(child, Flag::FunctionGetter)? {
                        "getter"
                    } else if self.ctx.arena.flag(child, Flag::FunctionSetter)? {
                        "setter"
                    } else {
                        "function"
                    };
                    self.add_database_entry(package_name, child, element_type)?;
                }
                NodeKind::Var => {
                    for variable in self.ctx.arena.children(child).to_vec() {
                        self.add_database_entry(package_name, variable, "variable")?;
                    }
                }
                NodeKind::Package => {
                    if let Some(&body) = self.ctx.arena.children(child).first() {
                        let name = format!("{package_name}.{}", self.name_of(child));
                        self.save_package_elements(body, &name)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Saves one element unless it is `private`, `false` or `internal`.
    fn add_database_entry(
        &mut self,
        package_name: &str,
        element: NodeId,
        element_type: &str,
    ) -> CompileResult<()> {
        for hidden in [Attribute::Private, Attribute::False, Attribute::Internal] {
            if self.get_attribute(element, hidden)? {
                return Ok(());
            }
        }

        let name = self.name_of(element);
        let position = self.ctx.arena.position(element);
        let package = self.ctx.database.add_package(package_name)?;
        let entry = package.borrow_mut().add_element(&name);
        let mut entry = entry.borrow_mut();
        entry.set_type(element_type);
        entry.set_filename(position.filename());
        entry.set_line(i64::from(position.line()));
        Ok(())
    }

    /// Loads every script of `<scripts>/<module>` and indexes its packages.
    /// Files are visited in name order.
    ///
    /// # Errors
    ///
    /// [`CompileError::Installation`] when the directory cannot be read,
    /// and the failures of [`Compiler::load_module`].
    pub fn load_internal_packages(&mut self, module: &str) -> CompileResult<()> {
        let path = format!("{}/{module}", self.options()?.scripts);
        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(e) => {
                self.ctx.diagnostics.fatal(
                    ErrorCode::Installation,
                    &Position::new(path.as_str()),
                    format!("cannot read directory \"{path}\"."),
                );
                return Err(CompileError::Installation {
                    reason: format!("cannot read directory \"{path}\": {e}"),
                });
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_package_script(name))
            .collect();
        names.sort();

        for name in names {
            let program = self.load_module(module, &name)?;
            self.find_packages(program)?;
        }
        Ok(())
    }

    /// Loads the native import and the package database. The first call of
    /// a compilation indexes the native scripts into the database and saves
    /// it, so scripts installed since the last run are picked up.
    ///
    /// A database that cannot be loaded is reported as fatal and the
    /// indexing skipped.
    ///
    /// # Errors
    ///
    /// Module, directory and database failures.
    pub fn internal_imports(&mut self) -> CompileResult<()> {
        if self.ctx.native_import.is_none() {
            let native = self.load_module("native", "as_init.js")?;
            self.ctx.native_import = Some(native);
        }

        let db = self.options()?.db.clone();
        if !self
            .ctx
            .database
            .load(Path::new(&db), &mut self.ctx.diagnostics)
        {
            self.ctx.diagnostics.fatal(
                ErrorCode::UnexpectedDatabase,
                &Position::new(db.as_str()),
                "Failed reading the compiler database. You may need to delete it and try again or fix the resource file to point to the right file.",
            );
            return Ok(());
        }

        if !self.ctx.packages_indexed {
            self.load_internal_packages("native")?;
            self.ctx.database.save()?;
            tracing::debug!(db, "indexed native packages");
        }
        self.ctx.packages_indexed = true;
        Ok(())
    }

    /// First package named `name` in `list`, searching nested directive
    /// lists.
    pub fn find_package(&self, list: NodeId, name: &str) -> Option<NodeId> {
        let arena = &self.ctx.arena;
        let _lock = NodeLock::new(arena, list);
        arena.children(list).iter().copied().find_map(|child| match arena.kind(child) {
            NodeKind::DirectiveList => self.find_package(child, name),
            NodeKind::Package if arena.string_is(child, name) => Some(child),
            _ => None,
        })
    }

    /// Loads the module the database names for an element matching `name`
    /// in the package the import designates.
    ///
    /// # Errors
    ///
    /// See [`Compiler::find_module`].
    pub fn find_external_package(
        &mut self,
        import: NodeId,
        name: &str,
    ) -> CompileResult<Option<NodeId>> {
        let package_name = self.name_of(import);
        let Some(element) = self.ctx.database.find_element(&package_name, name, None) else {
            return Ok(None);
        };
        let filename = element.borrow().filename().to_string();
        self.find_module(&filename).map(Some)
    }

    /// `import` directive: with `implements`, the imported package has to
    /// exist and gets referenced.
    ///
    /// # Errors
    ///
    /// Module loading failures.
    pub fn import(&mut self, import: NodeId) -> CompileResult<()> {
        if !self.ctx.arena.flag(import, Flag::ImportImplements)? {
            return Ok(());
        }

        let name = self.name_of(import);
        let mut package = self.ctx.program.and_then(|p| self.find_package(p, &name));
        if package.is_none()
            && let Some(program) = self.find_external_package(import, "*")?
        {
            package = self.find_package(program, &name);
        }
        match package {
            Some(package) => self.mark_referenced(package),
            None => {
                self.error(
                    ErrorCode::NotFound,
                    import,
                    format!("cannot find package '{name}'."),
                );
                Ok(())
            }
        }
    }

    /// Looks for `name` in the package an `implements` import designates:
    /// first in the program being compiled, then in the module the database
    /// points to.
    ///
    /// # Errors
    ///
    /// [`CompileError::PackageMustExist`] when the database names a module
    /// that does not declare the package.
    pub fn check_import(
        &mut self,
        import: NodeId,
        name: &str,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<Option<NodeId>> {
        if !self.ctx.arena.flag(import, Flag::ImportImplements)? {
            return Ok(None);
        }

        if let Some(program) = self.ctx.program
            && let Some(found) =
                self.find_package_item(program, import, name, params, search_flags)?
        {
            return Ok(Some(found));
        }

        let Some(program) = self.find_external_package(import, name)? else {
            return Ok(None);
        };
        self.find_package_item(
            program,
            import,
            name,
            params,
            search_flags | SEARCH_FLAG_PACKAGE_MUST_EXIST,
        )
    }

    /// Finds `name` among the members of the imported package declared in
    /// `program`. Private members are never visible to importers and
    /// internal ones only to other packages.
    ///
    /// # Errors
    ///
    /// [`CompileError::PackageMustExist`] when the package is missing and
    /// `SEARCH_FLAG_PACKAGE_MUST_EXIST` is set.
    pub fn find_package_item(
        &mut self,
        program: NodeId,
        import: NodeId,
        name: &str,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<Option<NodeId>> {
        let package_name = self.name_of(import);
        let Some(package) = self.find_package(program, &package_name) else {
            if search_flags & SEARCH_FLAG_PACKAGE_MUST_EXIST != 0 {
                self.error(
                    ErrorCode::InternalError,
                    import,
                    format!("cannot find package '{package_name}' in any of the previously registered packages."),
                );
                return Err(CompileError::PackageMustExist {
                    package: package_name,
                });
            }
            return Ok(None);
        };
        let Some(&body) = self.ctx.arena.children(package).first() else {
            return Ok(None);
        };

        if !self.ctx.arena.flag(package, Flag::PackageFoundLabels)? {
            self.ctx
                .arena
                .set_flag(package, Flag::PackageFoundLabels, true)?;
            self.find_labels(package, body)?;
        }

        let id = self
            .ctx
            .arena
            .create_replacement(import, NodeKind::Identifier);
        self.ctx.arena.set_string(id, name)?;
        let mut funcs = 0;
        let found = self.find_field(package, id, &mut funcs, params, search_flags)?;
        let Some(resolution) = self.select_field_match(found, funcs, params)? else {
            return Ok(None);
        };

        if self.get_attribute(resolution, Attribute::Private)? {
            return Ok(None);
        }
        if self.get_attribute(resolution, Attribute::Internal)?
            && self
                .ctx
                .arena
                .find_ancestor(import, &[NodeKind::Package])
                .is_none()
        {
            return Ok(None);
        }

        self.mark_referenced(package)?;
        Ok(Some(resolution))
    }

    /// Flags `package` as referenced. The first time, it is queued in
    /// [`crate::CompilationContext::compiled_packages`] for compilation.
    fn mark_referenced(&mut self, package: NodeId) -> CompileResult<()> {
        if self.ctx.arena.flag(package, Flag::PackageReferenced)? {
            return Ok(());
        }
        self.ctx
            .arena
            .set_flag(package, Flag::PackageReferenced, true)?;
        self.ctx.compiled_packages.push(package);
        tracing::debug!(package = %self.name_of(package), "package referenced");
        Ok(())
    }

    /// Registers the labels found under `node` with `owner`, a function,
    /// package or program. Nested declarations and expressions are not
    /// entered.
    ///
    /// # Errors
    ///
    /// `owner` cannot hold labels.
    pub fn find_labels(&mut self, owner: NodeId, node: NodeId) -> CompileResult<()> {
        let kind = self.ctx.arena.kind(node);
        if kind == NodeKind::Label {
            let name = self.name_of(node);
            if self.ctx.arena.find_label(owner, &name).is_some() {
                self.error(
                    ErrorCode::Duplicates,
                    owner,
                    format!("label '{name}' defined twice in the same program, package or function."),
                );
            } else {
                self.ctx.arena.add_label(owner, node)?;
            }
            return Ok(());
        }
        if hides_labels(kind) {
            return Ok(());
        }

        let _lock = NodeLock::new(&self.ctx.arena, node);
        for child in self.ctx.arena.children(node).to_vec() {
            self.find_labels(owner, child)?;
        }
        Ok(())
    }
}
