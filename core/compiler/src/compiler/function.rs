//! Functions: return types, argument matching and overload selection.
//!
//! Each overload compatible with the arguments of a call is recorded as a
//! `PARAM_MATCH` node appended to the argument list. The node's depth table
//! scores every argument (`MATCH_HIGHEST_DEPTH` for an exact type, larger
//! values for more distant super classes) and its index table maps
//! arguments to parameters. Once the walk is over the lowest depths win.

use std::cmp::Ordering;

use as2js_ast::{
    Attribute, ErrorCode, Flag, MATCH_HIGHEST_DEPTH, MATCH_LOWEST_DEPTH, MATCH_NOT_FOUND, NodeId,
    NodeKind, NodeLock,
};

use super::resolve::is_name;
use super::{Compiler, SEARCH_FLAG_GETTER, SEARCH_FLAG_SETTER};
use crate::errors::{CompileError, CompileResult};

impl Compiler {
    /// Makes sure `func` has its return type in its `type_node`.
    ///
    /// Returns `false` when the type cannot be determined. A function
    /// without children only has a type when flagged `VOID`.
    pub fn define_function_type(&mut self, func: NodeId) -> CompileResult<bool> {
        if self.ctx.arena.type_node(func).is_some() {
            return Ok(true);
        }
        if self.ctx.arena.children_size(func) == 0 {
            return Ok(self.ctx.arena.flag(func, Flag::FunctionVoid)?);
        }

        let _lock = NodeLock::new(&self.ctx.arena, func);
        let arena = &self.ctx.arena;
        let declared = arena
            .children(func)
            .iter()
            .copied()
            .find(|c| arena.kind(*c) == NodeKind::Type && arena.children_size(*c) == 1)
            .map(|t| arena.children(t)[0]);

        let Some(expr) = declared else {
            let ty = if self.is_constructor(func)?.is_some() {
                self.ctx.arena.create_replacement(func, NodeKind::Void)
            } else {
                self.resolve_internal_type(func, "Object")?
            };
            self.ctx.arena.set_type_node(func, Some(ty));
            return Ok(true);
        };

        // parameters are not searched for a name marked as a type
        self.ctx
            .arena
            .set_attribute_tree(expr, Attribute::Type, true)?;
        let kind = self.ctx.arena.kind(expr);
        let resolved = if is_name(kind) || kind == NodeKind::Member {
            self.resolve_name(expr, expr, None, 0)?
        } else {
            None
        };
        match resolved {
            Some(ty) => {
                self.ctx.arena.set_type_node(func, Some(ty));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Scores how well argument `t1` fits `t2`, a parameter or a typed
    /// node. `MATCH_NOT_FOUND` when it does not fit at all.
    pub fn match_type(&mut self, t1: NodeId, t2: NodeId) -> CompileResult<i32> {
        let mut t2 = t2;
        if self.ctx.arena.kind(t2) == NodeKind::Param {
            if self.ctx.arena.flag(t2, Flag::ParamOut)?
                && self.ctx.arena.kind(t1) != NodeKind::Identifier
            {
                self.warning(
                    ErrorCode::MisssingVariableName,
                    t1,
                    "a variable name is expected for a function parameter flagged as an OUT parameter.",
                );
                return Ok(MATCH_NOT_FOUND);
            }
            // an untyped parameter takes anything
            let Some(&ty) = self.ctx.arena.children(t2).first() else {
                return Ok(MATCH_LOWEST_DEPTH);
            };
            if self.ctx.arena.kind(ty) == NodeKind::Set {
                return Ok(MATCH_LOWEST_DEPTH);
            }
            if self.ctx.arena.type_node(ty).is_none() {
                let resolved = if is_name(self.ctx.arena.kind(ty)) {
                    self.resolve_name(ty, ty, None, 0)?
                } else {
                    None
                };
                let Some(resolved) = resolved else {
                    return Ok(MATCH_NOT_FOUND);
                };
                self.ctx.arena.set_type_node(ty, Some(resolved));
            }
            t2 = ty;
        }

        if self.ctx.arena.type_node(t1).is_none() {
            self.type_expr(t1)?;
        }
        let Some(tp1) = self.ctx.arena.type_node(t1) else {
            return Ok(MATCH_HIGHEST_DEPTH);
        };
        let Some(tp2) = self.ctx.arena.type_node(t2) else {
            return Ok(MATCH_HIGHEST_DEPTH);
        };
        if tp1 == tp2 {
            return Ok(MATCH_HIGHEST_DEPTH);
        }

        let object = self.resolve_internal_type(t1, "Object")?;
        if tp1 == object {
            return Ok(MATCH_HIGHEST_DEPTH);
        }
        if tp2 == object {
            return Ok(MATCH_LOWEST_DEPTH);
        }
        if self.ctx.arena.kind(tp1) != NodeKind::Class {
            return Ok(MATCH_NOT_FOUND);
        }
        self.find_class(tp1, tp2, 2)
    }

    /// Gives literals their native type and a reference to a typed
    /// variable that variable's class.
    ///
    /// # Errors
    ///
    /// [`CompileError::MissingType`] when the type of a typed variable
    /// cannot be linked.
    pub(crate) fn type_expr(&mut self, expr: NodeId) -> CompileResult<()> {
        if self.ctx.arena.type_node(expr).is_some() {
            return Ok(());
        }
        let name = match self.ctx.arena.kind(expr) {
            NodeKind::String => "String",
            NodeKind::Int64 => "Integer",
            NodeKind::Float64 => "Double",
            NodeKind::True | NodeKind::False => "Boolean",
            NodeKind::ObjectLiteral => "Object",
            NodeKind::ArrayLiteral => "Array",
            _ => return self.variable_type(expr),
        };
        let ty = self.resolve_internal_type(expr, name)?;
        self.ctx.arena.set_type_node(expr, Some(ty));
        Ok(())
    }

    fn variable_type(&mut self, expr: NodeId) -> CompileResult<()> {
        let arena = &self.ctx.arena;
        let Some(variable) = arena
            .instance(expr)
            .filter(|i| arena.kind(*i) == NodeKind::Variable)
        else {
            return Ok(());
        };
        let Some(&ty) = arena.children(variable).first() else {
            return Ok(());
        };
        if arena.kind(ty) == NodeKind::Set {
            return Ok(());
        }

        self.link_type(ty)?;
        match self.ctx.arena.instance(ty) {
            Some(class) => {
                self.ctx.arena.set_type_node(expr, Some(class));
                Ok(())
            }
            None => {
                let name = self.name_of(ty);
                self.fatal(
                    ErrorCode::InternalError,
                    expr,
                    "type is missing when it should not.",
                );
                Err(CompileError::MissingType { name })
            }
        }
    }

    /// Tests whether `func` is the function named `name`.
    ///
    /// With `SEARCH_FLAG_GETTER` (`SEARCH_FLAG_SETTER`) a getter (setter)
    /// matches through its `->name` (`<-name`) internal name. Functions
    /// marked `unused` never match.
    pub fn check_function(
        &mut self,
        func: NodeId,
        name: &str,
        params: Option<NodeId>,
        search_flags: u32,
    ) -> CompileResult<Option<NodeId>> {
        if self.get_attribute(func, Attribute::Unused)? {
            return Ok(None);
        }

        let getter = self.ctx.arena.flag(func, Flag::FunctionGetter)?;
        let setter = self.ctx.arena.flag(func, Flag::FunctionSetter)?;
        let expected = if getter && search_flags & SEARCH_FLAG_GETTER != 0 {
            format!("->{name}")
        } else if setter && search_flags & SEARCH_FLAG_SETTER != 0 {
            format!("<-{name}")
        } else {
            name.to_string()
        };
        if !self.ctx.arena.string_is(func, &expected) {
            return Ok(None);
        }

        if params.is_none() {
            if (getter || setter) && self.is_constructor(func)?.is_none() {
                let found = self.name_of(func);
                self.error(
                    ErrorCode::MismatchFuncVar,
                    func,
                    format!("a variable name was expected, we found the function '{found}' instead."),
                );
                return Ok(None);
            }
            self.define_function_type(func)?;
        }

        Ok(Some(func))
    }

    fn param_flag(&self, param: NodeId, flag: Flag) -> CompileResult<bool> {
        if self.ctx.arena.kind(param) != NodeKind::Param {
            return Ok(false);
        }
        Ok(self.ctx.arena.flag(param, flag)?)
    }

    fn accept_unprototyped(&mut self, params: NodeId, candidate: NodeId) -> CompileResult<bool> {
        self.ctx
            .arena
            .set_flag(candidate, Flag::ParamMatchUnprototyped, true)?;
        self.ctx.arena.append_child(params, candidate)?;
        Ok(true)
    }

    /// Checks the arguments in `params` against the parameters of `func`.
    /// When they are compatible, a `PARAM_MATCH` describing the fit is
    /// appended to `params`.
    ///
    /// Arguments are matched by position, or by name when given as a `NAME`
    /// node. Extra arguments need a trailing rest parameter and parameters
    /// left without an argument need a default value (or to be `unchecked`
    /// or a rest parameter).
    pub fn check_function_with_params(
        &mut self,
        func: NodeId,
        params: Option<NodeId>,
    ) -> CompileResult<bool> {
        let Some(params) = params else {
            return Ok(true);
        };

        let candidate = self
            .ctx
            .arena
            .create_replacement(func, NodeKind::ParamMatch);
        self.ctx.arena.set_instance(candidate, Some(func));

        if !self.define_function_type(func)? {
            return Ok(false);
        }

        let args: Vec<NodeId> = self
            .ctx
            .arena
            .children(params)
            .iter()
            .copied()
            .filter(|a| self.ctx.arena.kind(*a) != NodeKind::ParamMatch)
            .collect();

        if self.ctx.arena.children_size(func) == 0 {
            if !self.ctx.arena.flag(func, Flag::FunctionNoparams)? {
                return self.accept_unprototyped(params, candidate);
            }
            if !args.is_empty() {
                return Ok(false);
            }
            self.ctx.arena.append_child(params, candidate)?;
            return Ok(true);
        }

        let _func_lock = NodeLock::new(&self.ctx.arena, func);
        let parameters = self.ctx.arena.child(func, 0)?;
        if self.ctx.arena.kind(parameters) != NodeKind::Parameters {
            return self.accept_unprototyped(params, candidate);
        }
        let _parameters_lock = NodeLock::new(&self.ctx.arena, parameters);
        let declared = self.ctx.arena.children(parameters).to_vec();
        let Some(&last) = declared.last() else {
            if !args.is_empty() {
                return Ok(false);
            }
            self.ctx.arena.append_child(params, candidate)?;
            return Ok(true);
        };
        if self.param_flag(declared[0], Flag::ParamUnprototyped)? {
            return self.accept_unprototyped(params, candidate);
        }

        let size = declared.len().max(args.len());
        self.ctx.arena.set_param_size(candidate, size)?;

        let mut used = vec![false; declared.len()];
        let mut min = 0;
        let mut rest = declared.len();
        for (idx, &arg) in args.iter().enumerate() {
            let j = if self.ctx.arena.kind(arg) == NodeKind::Name {
                let Some(j) = self.named_parameter(arg, &declared)? else {
                    return Ok(false);
                };
                if used[j] {
                    if !self.param_flag(declared[j], Flag::ParamRest)? {
                        let name = self.name_of(declared[j]);
                        self.error(
                            ErrorCode::InvalidFieldName,
                            arg,
                            format!("function parameter name '{name}' already used & not a 'rest' (...)."),
                        );
                        return Ok(false);
                    }
                    rest += 1;
                    rest - 1
                } else {
                    j
                }
            } else {
                while min < declared.len() && used[min] {
                    min += 1;
                }
                if min < declared.len() {
                    min
                } else {
                    // only a rest parameter takes more arguments
                    if !self.param_flag(last, Flag::ParamRest)? {
                        return Ok(false);
                    }
                    rest += 1;
                    rest - 1
                }
            };

            let param = declared[j.min(declared.len() - 1)];
            let depth = self.match_type(arg, param)?;
            if depth == MATCH_NOT_FOUND {
                return Ok(false);
            }
            if let Some(slot) = used.get_mut(j) {
                *slot = true;
            }
            if j < size {
                self.ctx.arena.set_param_depth(candidate, j, depth)?;
                self.ctx.arena.set_param_index(candidate, idx, j)?;
            }
        }

        let mut idx = args.len();
        for (j, &param) in declared.iter().enumerate() {
            if used[j] {
                continue;
            }
            if idx < size {
                self.ctx.arena.set_param_index(candidate, idx, j)?;
            }
            idx += 1;
            if self.param_flag(param, Flag::ParamUnchecked)? || self.param_flag(param, Flag::ParamRest)? {
                continue;
            }
            let has_default = self
                .ctx
                .arena
                .children(param)
                .iter()
                .any(|c| self.ctx.arena.kind(*c) == NodeKind::Set);
            if !has_default {
                return Ok(false);
            }
        }

        self.ctx.arena.append_child(params, candidate)?;
        Ok(true)
    }

    /// Index of the parameter a `NAME` argument designates.
    fn named_parameter(&mut self, arg: NodeId, declared: &[NodeId]) -> CompileResult<Option<usize>> {
        if self.ctx.arena.children_size(arg) != 1 {
            self.error(
                ErrorCode::InternalError,
                arg,
                "found a NODE_NAME without children.",
            );
            return Ok(None);
        }
        let name_node = self.ctx.arena.child(arg, 0)?;
        if self.ctx.arena.kind(name_node) != NodeKind::Identifier {
            self.error(
                ErrorCode::InternalError,
                name_node,
                "the name of a parameter needs to be an identifier.",
            );
            return Ok(None);
        }
        let name = self.name_of(name_node);
        let found = declared
            .iter()
            .position(|p| self.ctx.arena.string_is(*p, &name));
        if found.is_none() {
            self.error(
                ErrorCode::InvalidFieldName,
                name_node,
                format!("no parameter named '{name}' was found in this function declaration."),
            );
        }
        Ok(found)
    }

    /// Picks the better of two `PARAM_MATCH` nodes. `None` when they cannot
    /// be told apart.
    pub(crate) fn best_param_match(
        &mut self,
        best: NodeId,
        candidate: NodeId,
    ) -> CompileResult<Option<NodeId>> {
        let arena = &self.ctx.arena;
        let best_size = arena.param_size(best);
        let candidate_size = arena.param_size(candidate);
        if best_size == 0 && candidate_size == 0 {
            return self.best_param_match_derived_from(best, candidate);
        }
        // unprototyped matches lose against anything else
        if best_size == 0 {
            return Ok(Some(candidate));
        }
        if candidate_size == 0 {
            return Ok(Some(best));
        }

        let mut best_more = 0;
        let mut candidate_more = 0;
        for j in 0..best_size.min(candidate_size) {
            match arena.param_depth(best, j)?.cmp(&arena.param_depth(candidate, j)?) {
                Ordering::Less => best_more += 1,
                Ordering::Greater => candidate_more += 1,
                Ordering::Equal => {}
            }
        }

        if (best_more == 0) == (candidate_more == 0) {
            return self.best_param_match_derived_from(best, candidate);
        }
        Ok(Some(if candidate_more != 0 { candidate } else { best }))
    }

    /// Breaks a tie between two matches: a method of a derived class
    /// overrides the one of its super class.
    pub(crate) fn best_param_match_derived_from(
        &mut self,
        best: NodeId,
        candidate: NodeId,
    ) -> CompileResult<Option<NodeId>> {
        let best_func = self.ctx.arena.instance(best);
        let candidate_func = self.ctx.arena.instance(candidate);
        if best_func == candidate_func {
            return Ok(Some(best));
        }

        if let (Some(b), Some(c)) = (best_func, candidate_func)
            && let (Some(best_class), Some(candidate_class)) =
                (self.class_of_member(b), self.class_of_member(c))
            && best_class != candidate_class
        {
            if self.is_derived_from(candidate_class, best_class)? {
                return Ok(Some(candidate));
            }
            if self.is_derived_from(best_class, candidate_class)? {
                return Ok(Some(best));
            }
        }

        let at = best_func.unwrap_or(best);
        let name = self.name_of(at);
        self.error(
            ErrorCode::Duplicates,
            at,
            format!(
                "found two functions named '{name}' and both have the same prototype. Cannot determine which one to use."
            ),
        );
        Ok(None)
    }

    /// Keeps the best `PARAM_MATCH` of `params`, discards the others and
    /// returns the function it designates. `None` when two matches are
    /// equally good.
    ///
    /// # Errors
    ///
    /// `params` is `None` or holds no match.
    pub fn select_best_func(
        &mut self,
        params: Option<NodeId>,
    ) -> CompileResult<Option<NodeId>> {
        let Some(params) = params else {
            return Err(CompileError::internal(
                "select_best_func() was called without a list of parameters.",
            ));
        };

        let mut best: Option<NodeId> = None;
        let mut ambiguous = false;
        let mut idx = 0;
        while idx < self.ctx.arena.children_size(params) {
            let candidate = self.ctx.arena.child(params, idx)?;
            if self.ctx.arena.kind(candidate) != NodeKind::ParamMatch {
                idx += 1;
                continue;
            }
            let Some(current) = best else {
                best = Some(candidate);
                idx += 1;
                continue;
            };
            match self.best_param_match(current, candidate)? {
                Some(winner) if winner == candidate => {
                    let previous = self.ctx.arena.offset(current)?;
                    self.ctx.arena.delete_child(params, previous)?;
                    self.ctx.arena.discard(current)?;
                    best = Some(candidate);
                }
                Some(_) => {
                    self.ctx.arena.delete_child(params, idx)?;
                    self.ctx.arena.discard(candidate)?;
                }
                None => {
                    ambiguous = true;
                    idx += 1;
                }
            }
        }

        let Some(best) = best else {
            return Err(CompileError::internal(
                "did not find at least one best function, even though we cannot have an empty list of choices when called.",
            ));
        };
        if ambiguous {
            return Ok(None);
        }
        Ok(self.ctx.arena.instance(best))
    }
}
