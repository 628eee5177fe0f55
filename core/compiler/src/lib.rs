#![warn(clippy::pedantic)]
//! Package and name resolution of the as2js compiler.
//!
//! A [`CompilationContext`] owns everything one compilation needs: the node
//! arena, the module cache, the package [`Database`], the resource options
//! and the diagnostics sink. The [`Compiler`] resolves identifiers against
//! it. Lexing and parsing are injected through [`ModuleParser`].

pub mod compiler;
pub mod context;
pub mod db;
pub mod errors;
pub mod input;
mod json;
pub mod rc;

pub use compiler::{
    Compiler, SEARCH_ERROR_INTERNAL, SEARCH_ERROR_NONE,
    SEARCH_ERROR_PRIVATE, SEARCH_ERROR_PRIVATE_PACKAGE, SEARCH_ERROR_PROTECTED,
    SEARCH_ERROR_PROTOTYPE, SEARCH_ERROR_WRONG_PRIVATE, SEARCH_ERROR_WRONG_PROTECTED,
    SEARCH_FLAG_GETTER, SEARCH_FLAG_NO_PARSING, SEARCH_FLAG_PACKAGE_MUST_EXIST,
    SEARCH_FLAG_SETTER,
};
pub use context::CompilationContext;
pub use db::{Database, Element, ElementRef, Package, PackageRef};
pub use errors::{CompileError, CompileResult, ConfigError, DatabaseError};
pub use input::{InputRetriever, ModuleParser};
pub use rc::ResourceConfig;
