//! Classes: fields, inheritance and type links.

use as2js_ast::{Attribute, ErrorCode, MATCH_NOT_FOUND, NodeId, NodeKind, NodeLock};

use super::Compiler;
use super::resolve::is_name;
use crate::errors::{CompileError, CompileResult};

impl Compiler {
    /// Returns the class `func` constructs, if it is a constructor.
    ///
    /// A function is a constructor when it is declared directly in a class
    /// (possibly nested in blocks, not in another function) and either has
    /// the class name or the `constructor` attribute.
    ///
    /// # Errors
    ///
    /// `func` is not a `FUNCTION`.
    pub fn is_constructor(&mut self, func: NodeId) -> CompileResult<Option<NodeId>> {
        if self.ctx.arena.kind(func) != NodeKind::Function {
            return Err(CompileError::internal(
                "Compiler::is_constructor() was called with a node which is not a NODE_FUNCTION.",
            ));
        }

        let mut parent = self.ctx.arena.parent(func);
        while let Some(node) = parent {
            match self.ctx.arena.kind(node) {
                NodeKind::Package
                | NodeKind::Program
                | NodeKind::Function
                | NodeKind::Interface => break,
                NodeKind::Class => {
                    let named_after_class = self
                        .ctx
                        .arena
                        .string(node)
                        .is_ok_and(|class| self.ctx.arena.string_is(func, class));
                    if named_after_class || self.get_attribute(func, Attribute::Constructor)? {
                        return Ok(Some(node));
                    }
                    return Ok(None);
                }
                _ => parent = self.ctx.arena.parent(node),
            }
        }

        if self.get_attribute(func, Attribute::Constructor)? {
            let name = self.name_of(func);
            self.error(
                ErrorCode::InvalidAttributes,
                func,
                format!("'constructor {name}()' cannot be used outside of a class declaration."),
            );
        }
        Ok(None)
    }

    /// Links a type name to the class or interface it designates, recorded
    /// as the name's instance. Each name is only tried once.
    pub fn link_type(&mut self, ty: NodeId) -> CompileResult<()> {
        let arena = &self.ctx.arena;
        if arena.instance(ty).is_some()
            || !matches!(arena.kind(ty), NodeKind::Identifier | NodeKind::String)
            || arena.flag(ty, as2js_ast::Flag::IdentifierTyped)?
        {
            return Ok(());
        }
        self.ctx
            .arena
            .set_flag(ty, as2js_ast::Flag::IdentifierTyped, true)?;

        let name = self.name_of(ty);
        let Some(object) = self.resolve_name(ty, ty, None, 0)? else {
            self.error(
                ErrorCode::InvalidExpression,
                ty,
                format!("cannot find a class definition for type '{name}'."),
            );
            return Ok(());
        };
        if !matches!(
            self.ctx.arena.kind(object),
            NodeKind::Class | NodeKind::Interface
        ) {
            self.error(
                ErrorCode::InvalidExpression,
                ty,
                format!("the name '{name}' is not referencing a class nor an interface."),
            );
            return Ok(());
        }
        self.ctx.arena.set_instance(ty, Some(object));
        Ok(())
    }

    /// Names listed by the `extends` and `implements` clauses of `class`.
    fn super_names(&self, class: NodeId) -> Vec<NodeId> {
        let arena = &self.ctx.arena;
        let mut names = Vec::new();
        for &link in arena.children(class) {
            if !matches!(arena.kind(link), NodeKind::Extends | NodeKind::Implements)
                || arena.children_size(link) != 1
            {
                continue;
            }
            let name = arena.children(link)[0];
            if arena.kind(name) == NodeKind::List {
                names.extend_from_slice(arena.children(name));
            } else {
                names.push(name);
            }
        }
        names
    }

    /// Searches `field` in the classes `link` extends or implements.
    ///
    /// More than one match among the super classes is ambiguous and
    /// reported as `DUPLICATES`, unless the matches are overloads.
    pub fn find_in_extends(
        &mut self,
        link: NodeId,
        field: NodeId,
        funcs: &mut usize,
        resolution: &mut Option<NodeId>,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<bool> {
        let _lock = NodeLock::new(&self.ctx.arena, link);
        let mut count = 0;
        for name in self.super_names(link) {
            self.link_type(name)?;
            match self.ctx.arena.instance(name) {
                Some(super_class) => {
                    if self.find_any_field(super_class, field, funcs, resolution, params, search_flags)? {
                        count += 1;
                    }
                }
                None => self.warning(
                    ErrorCode::TypeNotLinked,
                    link,
                    "type not linked, cannot lookup member.",
                ),
            }
        }

        if count == 1 || *funcs != 0 {
            return Ok(true);
        }
        if count > 1 {
            let name = self.name_of(field);
            self.error(
                ErrorCode::Duplicates,
                field,
                format!("found more than one match for '{name}'."),
            );
        }
        Ok(false)
    }

    /// Searches `field` among the declarations of `link`'s body.
    pub(crate) fn check_field(
        &mut self,
        link: NodeId,
        field: NodeId,
        funcs: &mut usize,
        resolution: &mut Option<NodeId>,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<bool> {
        let _lock = NodeLock::new(&self.ctx.arena, link);
        let lists: Vec<NodeId> = self
            .ctx
            .arena
            .children(link)
            .iter()
            .copied()
            .filter(|c| self.ctx.arena.kind(*c) == NodeKind::DirectiveList)
            .collect();
        for list in lists {
            if self.check_field_list(list, field, funcs, resolution, params, search_flags)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn check_field_list(
        &mut self,
        list: NodeId,
        field: NodeId,
        funcs: &mut usize,
        resolution: &mut Option<NodeId>,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<bool> {
        let _lock = NodeLock::new(&self.ctx.arena, list);
        for idx in 0..self.ctx.arena.children_size(list) {
            let child = self.ctx.arena.child(list, idx)?;
            match self.ctx.arena.kind(child) {
                NodeKind::DirectiveList => {
                    if self.check_field_list(child, field, funcs, resolution, params, search_flags)?
                        && self.match_found(funcs, *resolution, params, false)?
                    {
                        return Ok(true);
                    }
                }
                NodeKind::Empty => {}
                _ => {
                    let Some(found) = self.check_name(list, idx, field, params, search_flags)? else {
                        continue;
                    };
                    *resolution = Some(found);
                    if self.match_found(funcs, *resolution, params, true)? {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }

    pub fn find_any_field(
        &mut self,
        link: NodeId,
        field: NodeId,
        funcs: &mut usize,
        resolution: &mut Option<NodeId>,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<bool> {
        if self.check_field(link, field, funcs, resolution, params, search_flags)? {
            return Ok(true);
        }
        if *funcs != 0 {
            // overloads found here hide the ones of the super classes
            return Ok(true);
        }
        self.find_in_extends(link, field, funcs, resolution, params, search_flags)
    }

    /// Searches `field` in `link` and its super classes. A single match is
    /// recorded as the instance of `field`; rejected candidates are
    /// reported against it.
    pub fn find_field(
        &mut self,
        link: NodeId,
        field: NodeId,
        funcs: &mut usize,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<Option<NodeId>> {
        self.with_restored_flags(|c| {
            let mut resolution = None;
            if !c.find_any_field(link, field, funcs, &mut resolution, params, search_flags)? {
                c.print_search_errors(field);
                return Ok(None);
            }
            if *funcs == 0
                && let Some(found) = resolution
            {
                match c.ctx.arena.instance(field) {
                    None => c.ctx.arena.set_instance(field, Some(found)),
                    Some(instance) if instance != found => {
                        return Err(CompileError::internal(
                            "found an instance twice, but it was different each time.",
                        ));
                    }
                    Some(_) => {}
                }
            }
            Ok(resolution)
        })
    }

    /// Picks among the overloads a field search accumulated.
    pub(crate) fn select_field_match(
        &mut self,
        found: Option<NodeId>,
        funcs: usize,
        params: Option<NodeId>,
    ) -> CompileResult<Option<NodeId>> {
        if found.is_none() || funcs == 0 || params.is_none() {
            return Ok(found);
        }
        self.select_best_func(params)
    }

    /// Resolves `field` as a member of `object`: a class or interface, or a
    /// typed variable or parameter.
    ///
    /// # Errors
    ///
    /// Failures of the nested lookups.
    pub fn resolve_field(
        &mut self,
        object: NodeId,
        field: NodeId,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<Option<NodeId>> {
        let link = match self.ctx.arena.kind(object) {
            NodeKind::Variable | NodeKind::Param => {
                let ty = self.ctx.arena.children(object).iter().copied().find(|c| {
                    !matches!(
                        self.ctx.arena.kind(*c),
                        NodeKind::Set | NodeKind::VarAttributes
                    )
                });
                let Some(ty) = ty else {
                    self.warning(
                        ErrorCode::Incompatible,
                        object,
                        "variables and parameters without a type should not be used with members.",
                    );
                    return Ok(None);
                };
                self.link_type(ty)?;
                match self.ctx.arena.instance(ty) {
                    Some(class) => class,
                    None => return Ok(None),
                }
            }
            NodeKind::Class | NodeKind::Interface => object,
            _ => {
                let kind = self.ctx.arena.kind_name(object);
                self.error(
                    ErrorCode::InvalidType,
                    object,
                    format!("object of type '{kind}' is not known to have members."),
                );
                return Ok(None);
            }
        };

        // dynamic fields are checked at run time
        if !is_name(self.ctx.arena.kind(field)) {
            return Ok(None);
        }

        let mut funcs = 0;
        let found = self.find_field(link, field, &mut funcs, params, search_flags)?;
        self.select_field_match(found, funcs, params)
    }

    /// Depth of `ty` among the super classes of `class_type`, `depth` for
    /// a direct parent. `MATCH_NOT_FOUND` when `ty` is not an ancestor.
    pub fn find_class(
        &mut self,
        class_type: NodeId,
        ty: NodeId,
        depth: i32,
    ) -> CompileResult<i32> {
        let _lock = NodeLock::new(&self.ctx.arena, class_type);
        let names = self.super_names(class_type);

        let mut parents = Vec::with_capacity(names.len());
        for name in names {
            if self.ctx.arena.instance(name).is_none() {
                self.link_type(name)?;
            }
            let Some(super_class) = self.ctx.arena.instance(name) else {
                self.error(
                    ErrorCode::InvalidExpression,
                    class_type,
                    "cannot find the type named in an 'extends' or 'implements' list.",
                );
                continue;
            };
            if super_class == ty {
                return Ok(depth);
            }
            parents.push(super_class);
        }

        let mut result = MATCH_NOT_FOUND;
        for super_class in parents {
            result = result.max(self.find_class(super_class, ty, depth + 1)?);
        }
        Ok(result)
    }

    /// Whether `derived` is `super_class` or inherits from it.
    pub fn is_derived_from(
        &mut self,
        derived: NodeId,
        super_class: NodeId,
    ) -> CompileResult<bool> {
        if derived == super_class {
            return Ok(true);
        }
        for name in self.super_names(derived) {
            self.link_type(name)?;
            if let Some(parent) = self.ctx.arena.instance(name)
                && self.is_derived_from(parent, super_class)?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Class or interface declaring `node`, if any.
    #[must_use]
    pub fn class_of_member(&self, node: NodeId) -> Option<NodeId> {
        let arena = &self.ctx.arena;
        let mut current = Some(node);
        while let Some(n) = current {
            match arena.kind(n) {
                NodeKind::Class | NodeKind::Interface => return Some(n),
                NodeKind::Package | NodeKind::Program | NodeKind::Root => return None,
                _ => current = arena.parent(n),
            }
        }
        None
    }

    /// Like [`Compiler::class_of_member`] but a package also owns its
    /// members.
    pub(crate) fn member_owner(&self, node: NodeId) -> Option<NodeId> {
        let arena = &self.ctx.arena;
        let mut current = arena.parent(node);
        while let Some(n) = current {
            match arena.kind(n) {
                NodeKind::Class | NodeKind::Interface | NodeKind::Package => return Some(n),
                NodeKind::Program | NodeKind::Root => return None,
                _ => current = arena.parent(n),
            }
        }
        None
    }

    /// Whether the class around `derived` inherits from the class declaring
    /// `super_member`. Also returns the owner of `super_member`.
    pub fn are_objects_derived_from_one_another(
        &mut self,
        derived: NodeId,
        super_member: NodeId,
    ) -> CompileResult<(bool, Option<NodeId>)> {
        let owner = self.member_owner(super_member);
        let Some(super_class) = owner.filter(|o| {
            matches!(
                self.ctx.arena.kind(*o),
                NodeKind::Class | NodeKind::Interface
            )
        }) else {
            return Ok((false, owner));
        };
        let Some(derived_class) = self.class_of_member(derived) else {
            return Ok((false, owner));
        };
        Ok((self.is_derived_from(derived_class, super_class)?, owner))
    }
}
