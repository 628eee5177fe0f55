//! Name resolution core.
//!
//! The [`Compiler`] walks the node trees held by its [`CompilationContext`]
//! to map identifiers to the declarations they reference. The work is split
//! by concern:
//!
//! - `package`: module loading, package indexing and imports
//! - `resolve`: the scope walk (`resolve_name`) and the per-sibling test
//!   (`check_name`)
//! - `class`: fields, inheritance and type links
//! - `function`: overload matching and selection
//! - `attributes`: effective (inherited) attributes
//!
//! Visibility violations found during a walk are not errors on their own:
//! they are gathered as `SEARCH_ERROR_*` bits and only reported, as a single
//! `CANNOT_MATCH` error, once the whole walk failed.

mod attributes;
mod class;
mod function;
mod package;
mod resolve;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fmt::Write as _;

use as2js_ast::{Arena, ErrorCode, Flag, NodeId, NodeKind};

use crate::context::CompilationContext;
use crate::errors::CompileResult;

pub const SEARCH_ERROR_NONE: u32 = 0x0000_0000;
pub const SEARCH_ERROR_PRIVATE: u32 = 0x0000_0001;
pub const SEARCH_ERROR_PROTECTED: u32 = 0x0000_0002;
pub const SEARCH_ERROR_PROTOTYPE: u32 = 0x0000_0004;
pub const SEARCH_ERROR_WRONG_PRIVATE: u32 = 0x0000_0008;
pub const SEARCH_ERROR_WRONG_PROTECTED: u32 = 0x0000_0010;
pub const SEARCH_ERROR_PRIVATE_PACKAGE: u32 = 0x0000_0020;
pub const SEARCH_ERROR_INTERNAL: u32 = 0x0000_0080;

/// Do not compile the variables found on the way.
pub const SEARCH_FLAG_NO_PARSING: u32 = 0x0000_0001;
/// Accept getters (reading a value).
pub const SEARCH_FLAG_GETTER: u32 = 0x0000_0002;
/// Accept setters (writing a value).
pub const SEARCH_FLAG_SETTER: u32 = 0x0000_0004;
/// The database said the package exists; not finding it is fatal.
pub const SEARCH_FLAG_PACKAGE_MUST_EXIST: u32 = 0x0000_0008;

const SEARCH_ERROR_REASONS: &[(u32, &str)] = &[
    (
        SEARCH_ERROR_PRIVATE,
        "You cannot access a private class member from outside that very class.",
    ),
    (
        SEARCH_ERROR_PROTECTED,
        "You cannot access a protected class member from outside a class or its derived classes.",
    ),
    (
        SEARCH_ERROR_PROTOTYPE,
        "One or more functions were found, but none matched the input parameters.",
    ),
    (
        SEARCH_ERROR_WRONG_PRIVATE,
        "You cannot use the private attribute outside of a package or a class.",
    ),
    (
        SEARCH_ERROR_WRONG_PROTECTED,
        "You cannot use the protected attribute outside of a class.",
    ),
    (
        SEARCH_ERROR_PRIVATE_PACKAGE,
        "You cannot access a package private declaration from outside of that package.",
    ),
    (
        SEARCH_ERROR_INTERNAL,
        "You cannot access an internal declaration from outside of a package.",
    ),
];

/// Resolves names against the trees of one [`CompilationContext`].
#[derive(Debug)]
pub struct Compiler {
    ctx: CompilationContext,
}

impl Compiler {
    #[must_use]
    pub fn new(ctx: CompilationContext) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn context(&self) -> &CompilationContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut CompilationContext {
        &mut self.ctx
    }

    #[must_use]
    pub fn into_context(self) -> CompilationContext {
        self.ctx
    }

    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.ctx.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.ctx.arena
    }

    /// Error bits gathered by the search currently running.
    #[must_use]
    pub fn err_flags(&self) -> u32 {
        self.ctx.err_flags
    }

    /// Runs `f` with cleared error flags and puts the caller's flags back
    /// afterward, whatever `f` returns.
    pub(crate) fn with_restored_flags<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.ctx.err_flags, SEARCH_ERROR_NONE);
        let result = f(self);
        self.ctx.err_flags = saved;
        result
    }

    /// Reports why `name` could not be resolved, if the search found
    /// candidates it had to reject.
    pub fn print_search_errors(&mut self, name: NodeId) {
        let flags = self.ctx.err_flags;
        self.ctx.last_search_errors = flags;
        if flags == SEARCH_ERROR_NONE {
            return;
        }

        let mut text = format!(
            "the name '{}' could not be resolved because:\n",
            self.name_of(name)
        );
        for (_, reason) in SEARCH_ERROR_REASONS
            .iter()
            .filter(|(bit, _)| flags & bit != 0)
        {
            let _ = write!(text, "   {reason}");
        }
        self.error(ErrorCode::CannotMatch, name, text);
    }

    /// Decides whether the search can stop at `resolution`.
    ///
    /// Plain functions can be overloaded, so they are only counted in
    /// `funcs` (when `increment` is set) and the search goes on. Anything
    /// else, getters and setters included, ends the search unless functions
    /// were already found.
    pub(crate) fn funcs_name(
        &self,
        funcs: &mut usize,
        resolution: Option<NodeId>,
        increment: bool,
    ) -> CompileResult<bool> {
        let Some(resolution) = resolution else {
            return Ok(true);
        };
        let arena = &self.ctx.arena;
        if arena.kind(resolution) != NodeKind::Function
            || arena.flag(resolution, Flag::FunctionGetter)?
            || arena.flag(resolution, Flag::FunctionSetter)?
        {
            return Ok(*funcs == 0);
        }
        if increment {
            *funcs += 1;
        }
        Ok(false)
    }

    /// [`Compiler::funcs_name`] for a name found during a walk. Without call
    /// parameters there are no overloads to choose from and the first match
    /// is taken.
    pub(crate) fn match_found(
        &self,
        funcs: &mut usize,
        resolution: Option<NodeId>,
        params: Option<NodeId>,
        increment: bool,
    ) -> CompileResult<bool> {
        if params.is_none() {
            return Ok(true);
        }
        self.funcs_name(funcs, resolution, increment)
    }

    /// String payload of `id`, empty for kinds without one.
    pub(crate) fn name_of(&self, id: NodeId) -> String {
        self.ctx.arena.string(id).unwrap_or_default().to_string()
    }

    pub(crate) fn error(&mut self, code: ErrorCode, node: NodeId, text: impl Into<String>) {
        self.ctx
            .diagnostics
            .error(code, self.ctx.arena.position(node), text);
    }

    pub(crate) fn warning(&mut self, code: ErrorCode, node: NodeId, text: impl Into<String>) {
        self.ctx
            .diagnostics
            .warning(code, self.ctx.arena.position(node), text);
    }

    pub(crate) fn fatal(&mut self, code: ErrorCode, node: NodeId, text: impl Into<String>) {
        self.ctx
            .diagnostics
            .fatal(code, self.ctx.arena.position(node), text);
    }
}
