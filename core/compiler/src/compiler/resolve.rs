//! The scope walk: from a reference up through its enclosing scopes, then
//! through the global, system and native imports.

use as2js_ast::{Attribute, Flag, NodeError, NodeId, NodeKind, NodeLock};

use super::{
    Compiler, SEARCH_ERROR_INTERNAL, SEARCH_ERROR_PRIVATE, SEARCH_ERROR_PRIVATE_PACKAGE,
    SEARCH_ERROR_PROTECTED, SEARCH_ERROR_PROTOTYPE, SEARCH_ERROR_WRONG_PRIVATE,
    SEARCH_ERROR_WRONG_PROTECTED, SEARCH_FLAG_NO_PARSING,
};
use crate::errors::{CompileError, CompileResult};

/// Where the walk currently looks. The imports are only consulted once the
/// user program was searched up to its `PROGRAM` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    User,
    Global,
    System,
    Native,
    Exhausted,
}

impl Scope {
    fn next(self) -> Scope {
        match self {
            Scope::User => Scope::Global,
            Scope::Global => Scope::System,
            Scope::System => Scope::Native,
            Scope::Native | Scope::Exhausted => Scope::Exhausted,
        }
    }
}

pub(crate) fn is_name(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Identifier | NodeKind::Videntifier | NodeKind::String
    )
}

fn stops_walk(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::DirectiveList
            | NodeKind::For
            | NodeKind::With
            | NodeKind::Program
            | NodeKind::Function
            | NodeKind::Parameters
            | NodeKind::Enum
            | NodeKind::Catch
            | NodeKind::Class
            | NodeKind::Interface
    )
}

impl Compiler {
    /// Finds the declaration `id` refers to.
    ///
    /// The walk starts at `list`, usually `id` itself or the expression
    /// holding it, and climbs through the enclosing scopes. `params` holds
    /// the arguments when `id` names a function being called: every
    /// compatible overload is appended to it as a `PARAM_MATCH` and the best
    /// one is picked once the walk is over. Without `params` the first
    /// match wins.
    ///
    /// `None` means the name is unknown or every candidate was rejected; in
    /// the latter case one `CANNOT_MATCH` error lists the reasons.
    ///
    /// # Errors
    ///
    /// Malformed trees (a `MEMBER` without two children, a walk reaching the
    /// `ROOT`, a scope kind the walk does not handle) and failures of the
    /// module loads triggered by imports.
    pub fn resolve_name(
        &mut self,
        list: NodeId,
        id: NodeId,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<Option<NodeId>> {
        self.with_restored_flags(|c| c.walk_scopes(list, id, params, search_flags))
    }

    fn walk_scopes(
        &mut self,
        list: NodeId,
        id: NodeId,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<Option<NodeId>> {
        let kind = self.ctx.arena.kind(id);
        if kind == NodeKind::Member {
            return self.resolve_member(list, id, params, search_flags);
        }
        if !is_name(kind) {
            return Err(CompileError::internal(
                "resolve_name() was called with an 'identifier node' which is not a NODE_[V]IDENTIFIER or NODE_STRING.",
            ));
        }
        if let Some(resolved) = self.ctx.arena.type_node(id) {
            return Ok(Some(resolved));
        }

        let name = self.name_of(id);
        let mut list = list;
        if let Some(with) = self
            .ctx
            .arena
            .parent(list)
            .filter(|p| self.ctx.arena.kind(*p) == NodeKind::With)
        {
            list = with;
        }

        let mut scope = Scope::User;
        let mut offset = 0;
        let mut funcs = 0;
        let mut resolution = None;
        loop {
            if scope == Scope::User {
                (list, offset) = self.enclosing_scope(list)?;
            }
            if scope != Scope::User || self.ctx.arena.kind(list) == NodeKind::Program {
                match self.next_import(&mut scope) {
                    Some(first) => list = first,
                    None => break,
                }
                offset = 0;
            }

            let lock = NodeLock::new(&self.ctx.arena, list);
            match self.ctx.arena.kind(list) {
                NodeKind::DirectiveList => {
                    let size = self.ctx.arena.children_size(list);
                    if size > 0 && offset >= size {
                        return Err(CompileError::internal(
                            "somehow an offset is out of range.",
                        ));
                    }
                    // earlier siblings first, later ones stay visible
                    for idx in (0..offset).rev().chain(offset..size) {
                        if self.try_sibling(list, idx, id, params, search_flags, &mut funcs, &mut resolution)? {
                            return Ok(resolution);
                        }
                    }
                }
                NodeKind::For => {
                    if self.ctx.arena.children_size(list) > 0
                        && self.try_sibling(list, 0, id, params, search_flags, &mut funcs, &mut resolution)?
                    {
                        return Ok(resolution);
                    }
                }
                NodeKind::With => {
                    if self.ctx.arena.children_size(list) == 2
                        && let Some(object) = self.ctx.arena.instance(self.ctx.arena.child(list, 0)?)
                        && let Some(found) = self.resolve_field(object, id, params, search_flags)?
                    {
                        self.ctx.arena.set_flag(id, Flag::IdentifierWith, true)?;
                        if funcs != 0 {
                            return Err(CompileError::internal(
                                "at this time we do not support functions here (under a with).",
                            ));
                        }
                        return Ok(Some(found));
                    }
                }
                NodeKind::Function => {
                    // a type cannot be declared by a parameter
                    if !self.ctx.arena.attribute(id, Attribute::Type)?
                        && let Some(parameters) =
                            self.ctx.arena.find_first_child(list, NodeKind::Parameters)
                    {
                        let _parameters_lock = NodeLock::new(&self.ctx.arena, parameters);
                        for idx in 0..self.ctx.arena.children_size(parameters) {
                            if self.try_sibling(parameters, idx, id, params, search_flags, &mut funcs, &mut resolution)? {
                                return Ok(resolution);
                            }
                        }
                    }
                }
                NodeKind::Parameters => {
                    // a default value only sees the parameters declared before it
                    for idx in (0..offset).rev() {
                        if self.try_sibling(list, idx, id, params, search_flags, &mut funcs, &mut resolution)? {
                            return Ok(resolution);
                        }
                    }
                }
                NodeKind::Catch => {
                    if let Some(&parameters) = self.ctx.arena.children(list).first()
                        && self.ctx.arena.children_size(parameters) > 0
                        && self.try_sibling(parameters, 0, id, params, search_flags, &mut funcs, &mut resolution)?
                    {
                        return Ok(resolution);
                    }
                }
                NodeKind::Enum => {
                    if self.ctx.arena.string_is(list, &name) {
                        drop(lock);
                        self.ctx.arena.set_flag(list, Flag::EnumInuse, true)?;
                        return Ok(Some(list));
                    }
                    let enumerator = self.ctx.arena.children(list).iter().copied().find(|c| {
                        self.ctx.arena.kind(*c) == NodeKind::Variable
                            && self.ctx.arena.string_is(*c, &name)
                    });
                    if let Some(enumerator) = enumerator {
                        self.ctx
                            .arena
                            .set_flag(enumerator, Flag::VariableInuse, true)?;
                        return Ok(Some(enumerator));
                    }
                }
                NodeKind::Class | NodeKind::Interface => {
                    if self.find_in_extends(list, id, &mut funcs, &mut resolution, params, search_flags)?
                        && self.match_found(&mut funcs, resolution, params, false)?
                    {
                        return Ok(resolution);
                    }
                }
                other => {
                    return Err(CompileError::internal(format!(
                        "unhandled type {} in Compiler::resolve_name().",
                        other.name()
                    )));
                }
            }
        }

        if funcs != 0
            && let Some(best) = self.select_best_func(params)?
        {
            return Ok(Some(best));
        }

        self.print_search_errors(id);
        Ok(None)
    }

    /// Climbs from `list` to the next node that opens a scope. Returns that
    /// node and the offset of the child the walk came from.
    fn enclosing_scope(&self, list: NodeId) -> CompileResult<(NodeId, usize)> {
        let arena = &self.ctx.arena;
        let no_parent = || NodeError::NoParent {
            operation: "resolve_name()",
        };
        let mut list = list;
        if arena.kind(list) == NodeKind::Parameters {
            // the parameters were searched, skip their function
            list = arena.parent(list).ok_or_else(no_parent)?;
        }
        loop {
            let offset = arena.offset(list)?;
            list = arena.parent(list).ok_or_else(no_parent)?;
            match arena.kind(list) {
                NodeKind::Root => {
                    return Err(CompileError::internal(
                        "Compiler::resolve_name() found the NODE_ROOT while searching for a parent.",
                    ));
                }
                // names in an extends list never refer to the class members
                NodeKind::Extends | NodeKind::Implements => {
                    list = arena.parent(list).ok_or_else(no_parent)?;
                }
                kind if stops_walk(kind) => return Ok((list, offset)),
                _ => {}
            }
        }
    }

    /// Moves `scope` to the next loaded import and returns its first
    /// directive list. `None` once every import was consulted.
    fn next_import(&self, scope: &mut Scope) -> Option<NodeId> {
        loop {
            *scope = scope.next();
            let program = match *scope {
                Scope::Global => self.ctx.global_import,
                Scope::System => self.ctx.system_import,
                Scope::Native => self.ctx.native_import,
                Scope::User | Scope::Exhausted => return None,
            };
            if let Some(first) = program.and_then(|p| self.ctx.arena.children(p).first().copied())
            {
                return Some(first);
            }
        }
    }

    /// Runs `check_name` on one child of `list` and tells whether the walk
    /// is over.
    #[allow(clippy::too_many_arguments)]
    fn try_sibling(
        &mut self,
        list: NodeId,
        idx: usize,
        id: NodeId,
        params: Option<NodeId>,
        search_flags: u32,
        funcs: &mut usize,
        resolution: &mut Option<NodeId>,
    ) -> CompileResult<bool> {
        match self.check_name(list, idx, id, params, search_flags)? {
            Some(found) => {
                *resolution = Some(found);
                self.match_found(funcs, *resolution, params, true)
            }
            None => Ok(false),
        }
    }

    /// `a.b`: resolves `a`, then looks for `b` in what `a` designates.
    fn resolve_member(
        &mut self,
        list: NodeId,
        member: NodeId,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<Option<NodeId>> {
        if self.ctx.arena.children_size(member) != 2 {
            return Err(CompileError::internal(
                "resolve_name() called with a MEMBER which does not have exactly two children.",
            ));
        }
        let object = self.ctx.arena.child(member, 0)?;
        let field = self.ctx.arena.child(member, 1)?;
        let Some(scope) = self.resolve_name(list, object, None, search_flags)? else {
            return Ok(None);
        };

        match self.ctx.arena.kind(scope) {
            NodeKind::Package => {
                let mut funcs = 0;
                let found = self.find_field(scope, field, &mut funcs, params, search_flags)?;
                self.select_field_match(found, funcs, params)
            }
            NodeKind::Enum => {
                let name = self.name_of(field);
                let enumerator = self.ctx.arena.children(scope).iter().copied().find(|c| {
                    self.ctx.arena.kind(*c) == NodeKind::Variable
                        && self.ctx.arena.string_is(*c, &name)
                });
                if let Some(enumerator) = enumerator {
                    self.ctx
                        .arena
                        .set_flag(enumerator, Flag::VariableInuse, true)?;
                }
                Ok(enumerator)
            }
            _ => self.resolve_field(scope, field, params, search_flags),
        }
    }

    /// Tests whether child `idx` of `list` declares the name of `id` and
    /// whether `id` may see it.
    ///
    /// Visibility failures are not errors: the matching `SEARCH_ERROR_*`
    /// bit is recorded and `None` returned so the walk goes on.
    ///
    /// # Errors
    ///
    /// `idx` out of range, failures of the nested lookups.
    pub fn check_name(
        &mut self,
        list: NodeId,
        idx: usize,
        id: NodeId,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<Option<NodeId>> {
        if idx >= self.ctx.arena.children_size(list) {
            return Err(CompileError::internal(
                "Compiler::check_name() index too large.",
            ));
        }
        let child = self.ctx.arena.child(list, idx)?;
        let name = self.name_of(id);

        let resolution = match self.ctx.arena.kind(child) {
            NodeKind::Var => {
                let arena = &self.ctx.arena;
                let _lock = NodeLock::new(arena, child);
                arena.children(child).iter().copied().find(|v| {
                    arena.kind(*v) == NodeKind::Variable && arena.string_is(*v, &name)
                })
            }
            NodeKind::Param => {
                if self.ctx.arena.string_is(child, &name) {
                    self.ctx
                        .arena
                        .set_flag(child, Flag::ParamReferenced, true)?;
                    return Ok(Some(child));
                }
                None
            }
            NodeKind::Function => match self.is_constructor(child)? {
                Some(class) => self.ctx.arena.string_is(class, &name).then_some(class),
                None => self.check_function(child, &name, params, search_flags)?,
            },
            NodeKind::Class | NodeKind::Interface => {
                if self.ctx.arena.string_is(child, &name) {
                    // a class is its own type
                    if self.ctx.arena.type_node(child).is_none() {
                        self.ctx.arena.set_type_node(child, Some(child));
                    }
                    self.ctx.arena.set_flag(id, Flag::IdentifierTyped, true)?;
                    Some(child)
                } else {
                    None
                }
            }
            NodeKind::Enum => {
                if self.ctx.arena.string_is(child, &name) {
                    self.ctx.arena.set_flag(child, Flag::EnumInuse, true)?;
                    return Ok(Some(child));
                }
                let enumerator = self.ctx.arena.children(child).iter().copied().find(|c| {
                    self.ctx.arena.kind(*c) == NodeKind::Variable
                        && self.ctx.arena.string_is(*c, &name)
                });
                if let Some(enumerator) = enumerator {
                    self.ctx
                        .arena
                        .set_flag(enumerator, Flag::VariableInuse, true)?;
                    return Ok(Some(enumerator));
                }
                None
            }
            NodeKind::Package => {
                return Ok(self.ctx.arena.string_is(child, &name).then_some(child));
            }
            NodeKind::Import => {
                return self.check_import(child, &name, params, search_flags);
            }
            _ => None,
        };
        let Some(resolution) = resolution else {
            return Ok(None);
        };

        if !self.is_visible_from(id, resolution)? {
            return Ok(None);
        }

        if self.ctx.arena.kind(child) == NodeKind::Function
            && params.is_some()
            && !self.check_function_with_params(child, params)?
        {
            self.ctx.err_flags |= SEARCH_ERROR_PROTOTYPE;
            return Ok(None);
        }

        Ok(Some(resolution))
    }

    /// Applies the `private`, `protected` and `internal` rules of
    /// `resolution` to a reference made by `id`.
    fn is_visible_from(&mut self, id: NodeId, resolution: NodeId) -> CompileResult<bool> {
        if self.get_attribute(resolution, Attribute::Private)? {
            let owner = self.member_owner(resolution);
            let violation = match owner.map(|o| self.ctx.arena.kind(o)) {
                None => Some(SEARCH_ERROR_PRIVATE),
                Some(NodeKind::Package) => (self
                    .ctx
                    .arena
                    .find_ancestor(id, &[NodeKind::Package])
                    != owner)
                    .then_some(SEARCH_ERROR_PRIVATE_PACKAGE),
                Some(NodeKind::Class | NodeKind::Interface) => {
                    (self.class_of_member(id) != owner).then_some(SEARCH_ERROR_PRIVATE)
                }
                Some(_) => Some(SEARCH_ERROR_WRONG_PRIVATE),
            };
            if let Some(bit) = violation {
                self.ctx.err_flags |= bit;
                return Ok(false);
            }
        }

        if self.get_attribute(resolution, Attribute::Protected)? {
            let (derived, super_class) = self.are_objects_derived_from_one_another(id, resolution)?;
            if !derived {
                let in_class = super_class.is_some_and(|s| {
                    matches!(
                        self.ctx.arena.kind(s),
                        NodeKind::Class | NodeKind::Interface
                    )
                });
                self.ctx.err_flags |= if in_class {
                    SEARCH_ERROR_PROTECTED
                } else {
                    SEARCH_ERROR_WRONG_PROTECTED
                };
                return Ok(false);
            }
        }

        if self.get_attribute(resolution, Attribute::Internal)?
            && self
                .ctx
                .arena
                .find_ancestor(id, &[NodeKind::Package])
                .is_none()
        {
            self.ctx.err_flags |= SEARCH_ERROR_INTERNAL;
            return Ok(false);
        }

        Ok(true)
    }

    /// Resolves one of the well known native types (`Object`, `String`,
    /// `Boolean`, ...) from the point of view of `parent`.
    ///
    /// # Errors
    ///
    /// [`CompileError::MissingType`] when the type cannot be found, which
    /// means the native scripts are not installed properly. A fatal
    /// message is emitted first.
    pub fn resolve_internal_type(&mut self, parent: NodeId, name: &str) -> CompileResult<NodeId> {
        let id = self
            .ctx
            .arena
            .create_replacement(parent, NodeKind::Identifier);
        self.ctx.arena.set_string(id, name)?;

        let lock = NodeLock::new(&self.ctx.arena, parent);
        let resolution = self.resolve_name(parent, id, None, SEARCH_FLAG_NO_PARSING)?;
        drop(lock);

        match resolution {
            Some(found) => Ok(found),
            None => {
                self.fatal(
                    as2js_ast::ErrorCode::InternalError,
                    parent,
                    format!("cannot find internal type \"{name}\"."),
                );
                Err(CompileError::MissingType {
                    name: name.to_string(),
                })
            }
        }
    }
}
