//! State shared by every resolution call of one compilation.

use std::fmt;

use as2js_ast::{Arena, AttributeSet, Diagnostics, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::db::Database;
use crate::input::{InputRetriever, ModuleParser};
use crate::rc::ResourceConfig;

/// Everything a compilation owns: the arena with every loaded tree, the
/// module cache, the package database, options and diagnostics.
///
/// One context is built per compilation; nothing lives in globals, so
/// independent compilations can run side by side in one process.
pub struct CompilationContext {
    pub arena: Arena,
    pub diagnostics: Diagnostics,
    pub(crate) options: Option<ResourceConfig>,
    pub(crate) database: Database,
    pub(crate) parser: Box<dyn ModuleParser>,
    pub(crate) input_retriever: Option<Box<dyn InputRetriever>>,
    /// Loaded modules by filename.
    pub(crate) modules: FxHashMap<String, NodeId>,
    pub(crate) program: Option<NodeId>,
    pub(crate) global_import: Option<NodeId>,
    pub(crate) system_import: Option<NodeId>,
    pub(crate) native_import: Option<NodeId>,
    pub(crate) packages_indexed: bool,
    /// `SEARCH_ERROR_*` bits gathered by the running search.
    pub(crate) err_flags: u32,
    /// Flags of the last search that failed, kept for callers and tests.
    pub(crate) last_search_errors: u32,
    /// Effective attributes, inherited ones included.
    pub(crate) attributes: FxHashMap<NodeId, AttributeSet>,
    /// Attribute variables being expanded, to detect loops.
    pub(crate) expanding_attributes: FxHashSet<NodeId>,
    pub(crate) compiled_packages: Vec<NodeId>,
}

impl CompilationContext {
    pub fn new(parser: impl ModuleParser + 'static) -> Self {
        Self {
            arena: Arena::new(),
            diagnostics: Diagnostics::default(),
            options: None,
            database: Database::new(),
            parser: Box::new(parser),
            input_retriever: None,
            modules: FxHashMap::default(),
            program: None,
            global_import: None,
            system_import: None,
            native_import: None,
            packages_indexed: false,
            err_flags: 0,
            last_search_errors: 0,
            attributes: FxHashMap::default(),
            expanding_attributes: FxHashSet::default(),
            compiled_packages: Vec::new(),
        }
    }

    /// Uses `options` instead of searching for `as2js.rc`.
    #[must_use]
    pub fn with_options(mut self, options: ResourceConfig) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn with_input_retriever(mut self, retriever: impl InputRetriever + 'static) -> Self {
        self.input_retriever = Some(Box::new(retriever));
        self
    }

    /// Starts from an arena that already holds trees.
    #[must_use]
    pub fn with_arena(mut self, arena: Arena) -> Self {
        self.arena = arena;
        self
    }

    #[must_use]
    pub fn options(&self) -> Option<&ResourceConfig> {
        self.options.as_ref()
    }

    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.database
    }

    /// The `PROGRAM` being compiled, searched first by imports.
    #[must_use]
    pub fn program(&self) -> Option<NodeId> {
        self.program
    }

    pub fn set_program(&mut self, program: Option<NodeId>) {
        self.program = program;
    }

    #[must_use]
    pub fn module(&self, filename: &str) -> Option<NodeId> {
        self.modules.get(filename).copied()
    }

    #[must_use]
    pub fn global_import(&self) -> Option<NodeId> {
        self.global_import
    }

    pub fn set_global_import(&mut self, program: Option<NodeId>) {
        self.global_import = program;
    }

    #[must_use]
    pub fn system_import(&self) -> Option<NodeId> {
        self.system_import
    }

    pub fn set_system_import(&mut self, program: Option<NodeId>) {
        self.system_import = program;
    }

    #[must_use]
    pub fn native_import(&self) -> Option<NodeId> {
        self.native_import
    }

    pub fn set_native_import(&mut self, program: Option<NodeId>) {
        self.native_import = program;
    }

    #[must_use]
    pub fn err_flags(&self) -> u32 {
        self.err_flags
    }

    /// `SEARCH_ERROR_*` bits of the last name that could not be resolved.
    #[must_use]
    pub fn last_search_errors(&self) -> u32 {
        self.last_search_errors
    }

    /// Packages marked `REFERENCED`, in the order they were first used.
    /// Their directive lists are what the caller compiles next.
    #[must_use]
    pub fn compiled_packages(&self) -> &[NodeId] {
        &self.compiled_packages
    }

    /// Forgets the cached effective attributes, needed after attributes
    /// of already inspected nodes were edited.
    pub fn clear_attribute_cache(&mut self) {
        self.attributes.clear();
    }
}

impl fmt::Debug for CompilationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationContext")
            .field("nodes", &self.arena.len())
            .field("options", &self.options)
            .field("modules", &self.modules)
            .field("program", &self.program)
            .field("native_import", &self.native_import)
            .field("err_flags", &self.err_flags)
            .finish_non_exhaustive()
    }
}
