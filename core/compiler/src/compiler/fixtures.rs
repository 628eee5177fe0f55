//! Tree builders shared by the unit tests of the compiler.

use std::cell::RefCell;
use std::rc::Rc;

use as2js_ast::{
    Arena, Attribute, CollectingSink, Diagnostics, Flag, NodeId, NodeKind, Position,
};

use super::Compiler;
use crate::context::CompilationContext;
use crate::rc::ResourceConfig;

const NATIVE_CLASSES: &[&str] = &["Object", "String", "Integer", "Double", "Boolean", "Array"];

/// Parses one declaration per line:
///
/// ```text
/// [private|internal|public|false] package|class NAME    (opens a scope)
/// [private|internal|public|false] function|getter|setter|var NAME
/// }                                                     (closes a scope)
/// error                                                 (rejects the source)
/// ```
pub(crate) fn parse_lines(
    arena: &mut Arena,
    source: &str,
    filename: &str,
) -> anyhow::Result<Option<NodeId>> {
    let mut position = Position::new(filename);
    let program = arena.create_at(NodeKind::Program, &position);
    let top = arena.create_at(NodeKind::DirectiveList, &position);
    arena.append_child(program, top)?;
    let mut scopes = vec![top];

    for (n, line) in source.lines().enumerate() {
        if n > 0 {
            position.new_line();
        }
        let mut words: Vec<&str> = line.split_whitespace().collect();
        let mut attributes = Vec::new();
        while let Some(attribute) = words.first().and_then(|w| match *w {
            "private" => Some(Attribute::Private),
            "internal" => Some(Attribute::Internal),
            "public" => Some(Attribute::Public),
            "false" => Some(Attribute::False),
            _ => None,
        }) {
            attributes.push(attribute);
            words.remove(0);
        }

        let current = scopes[scopes.len() - 1];
        let declared = match words.as_slice() {
            [] => continue,
            ["}"] => {
                anyhow::ensure!(scopes.len() > 1, "{filename}:{}: unbalanced '}}'", n + 1);
                scopes.pop();
                continue;
            }
            ["error"] => return Ok(None),
            [keyword @ ("package" | "class"), name] => {
                let kind = if *keyword == "package" {
                    NodeKind::Package
                } else {
                    NodeKind::Class
                };
                let node = arena.create_at(kind, &position);
                arena.set_string(node, *name)?;
                arena.append_child(current, node)?;
                let body = arena.create_at(NodeKind::DirectiveList, &position);
                arena.append_child(node, body)?;
                scopes.push(body);
                node
            }
            [keyword @ ("function" | "getter" | "setter"), name] => {
                let func = arena.create_at(NodeKind::Function, &position);
                let name = match *keyword {
                    "getter" => {
                        arena.set_flag(func, Flag::FunctionGetter, true)?;
                        format!("->{name}")
                    }
                    "setter" => {
                        arena.set_flag(func, Flag::FunctionSetter, true)?;
                        format!("<-{name}")
                    }
                    _ => (*name).to_string(),
                };
                arena.set_string(func, name)?;
                arena.set_flag(func, Flag::FunctionVoid, true)?;
                arena.append_child(current, func)?;
                func
            }
            ["var", name] => {
                let var = arena.create_at(NodeKind::Var, &position);
                let variable = arena.create_at(NodeKind::Variable, &position);
                arena.set_string(variable, *name)?;
                arena.append_child(var, variable)?;
                arena.append_child(current, var)?;
                variable
            }
            _ => anyhow::bail!("{filename}:{}: cannot parse \"{line}\"", n + 1),
        };
        for attribute in attributes {
            arena.set_attribute(declared, attribute, true)?;
        }
    }

    anyhow::ensure!(scopes.len() == 1, "{filename}: unclosed scope");
    Ok(Some(program))
}

pub(crate) struct Fixture {
    pub compiler: Compiler,
    pub sink: Rc<RefCell<CollectingSink>>,
    pub program: NodeId,
    /// Directive list of `program`.
    pub list: NodeId,
    natives: Vec<(&'static str, NodeId)>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_options(options: ResourceConfig) -> Self {
        Self::build(Some(options))
    }

    fn build(options: Option<ResourceConfig>) -> Self {
        let sink = Rc::new(RefCell::new(CollectingSink::new()));
        let mut ctx = CompilationContext::new(parse_lines)
            .with_diagnostics(Diagnostics::new(Box::new(sink.clone())));
        if let Some(options) = options {
            ctx = ctx.with_options(options);
        }

        let position = Position::new("test.js");
        let program = ctx.arena.create_at(NodeKind::Program, &position);
        let list = ctx.arena.create_at(NodeKind::DirectiveList, &position);
        ctx.arena.append_child(program, list).unwrap();
        ctx.set_program(Some(program));

        Self {
            compiler: Compiler::new(ctx),
            sink,
            program,
            list,
            natives: Vec::new(),
        }
    }

    pub fn detached(&mut self, kind: NodeKind, name: &str) -> NodeId {
        let arena = self.compiler.arena_mut();
        let id = arena.create_at(kind, &Position::new("test.js"));
        if !name.is_empty() {
            arena.set_string(id, name).unwrap();
        }
        id
    }

    pub fn detached_identifier(&mut self, name: &str) -> NodeId {
        self.detached(NodeKind::Identifier, name)
    }

    pub fn add(&mut self, parent: NodeId, kind: NodeKind, name: &str) -> NodeId {
        let id = self.detached(kind, name);
        self.compiler.arena_mut().append_child(parent, id).unwrap();
        id
    }

    pub fn identifier(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.add(parent, NodeKind::Identifier, name)
    }

    /// `var name;`, returns the `VARIABLE`.
    pub fn var(&mut self, parent: NodeId, name: &str) -> NodeId {
        let var = self.add(parent, NodeKind::Var, "");
        self.add(var, NodeKind::Variable, name)
    }

    /// A function without parameters nor body, flagged `VOID`.
    pub fn function(&mut self, parent: NodeId, name: &str) -> NodeId {
        let func = self.add(parent, NodeKind::Function, name);
        self.compiler
            .arena_mut()
            .set_flag(func, Flag::FunctionVoid, true)
            .unwrap();
        func
    }

    pub fn function_with_body(&mut self, parent: NodeId, name: &str) -> (NodeId, NodeId) {
        self.add_scope(parent, NodeKind::Function, name)
    }

    /// `function name(p1: T1, p2: T2, ...)` without a body.
    pub fn function_with_params(
        &mut self,
        parent: NodeId,
        name: &str,
        params: &[(&str, &str)],
    ) -> NodeId {
        let func = self.add(parent, NodeKind::Function, name);
        let parameters = self.add(func, NodeKind::Parameters, "");
        for (param, ty) in params {
            let param = self.add(parameters, NodeKind::Param, param);
            self.identifier(param, ty);
        }
        func
    }

    pub fn class(&mut self, parent: NodeId, name: &str) -> (NodeId, NodeId) {
        self.add_scope(parent, NodeKind::Class, name)
    }

    /// A named node with a directive list as its body.
    pub fn add_scope(&mut self, parent: NodeId, kind: NodeKind, name: &str) -> (NodeId, NodeId) {
        let node = self.add(parent, kind, name);
        let body = self.add(node, NodeKind::DirectiveList, "");
        (node, body)
    }

    pub fn extends(&mut self, class: NodeId, name: &str) -> NodeId {
        let extends = self.add(class, NodeKind::Extends, "");
        self.identifier(extends, name)
    }

    /// `name(...)`: returns the called identifier and the empty argument
    /// list.
    pub fn call(&mut self, parent: NodeId, name: &str) -> (NodeId, NodeId) {
        let call = self.add(parent, NodeKind::Call, "");
        let id = self.identifier(call, name);
        let params = self.add(call, NodeKind::List, "");
        (id, params)
    }

    /// Installs a native import declaring the basic classes.
    pub fn install_native(&mut self) {
        let position = Position::new("native.js");
        let arena = self.compiler.arena_mut();
        let program = arena.create_at(NodeKind::Program, &position);
        let list = arena.create_at(NodeKind::DirectiveList, &position);
        arena.append_child(program, list).unwrap();
        for name in NATIVE_CLASSES {
            let (class, _) = self.class(list, name);
            self.natives.push((*name, class));
        }
        self.compiler
            .context_mut()
            .set_native_import(Some(program));
    }

    pub fn native_class(&self, name: &str) -> NodeId {
        self.natives
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| *id)
            .unwrap_or_else(|| panic!("no native class {name}"))
    }
}
