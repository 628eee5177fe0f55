use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use as2js_ast::{Arena, Attribute, CollectingSink, Diagnostics, Flag, NodeId, NodeKind, Position};
use as2js_compiler::{CompilationContext, Compiler, ResourceConfig};
use rustc_hash::FxHashMap;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Routes the `tracing` output of the crates to the test harness. Set
/// `RUST_LOG=debug` to see it.
pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Minimal module parser used in place of the real one.
///
/// Each line declares one item: `package NAME` and `class NAME` open a
/// scope closed by a line holding `}`; `function NAME` and `var NAME`
/// declare leaves. A leading `private` or `internal` marks the item. A
/// line reading `error` makes the parser reject the whole source.
pub(crate) fn declarations(
    arena: &mut Arena,
    source: &str,
    filename: &str,
) -> anyhow::Result<Option<NodeId>> {
    let mut position = Position::new(filename);
    let program = arena.create_at(NodeKind::Program, &position);
    let list = arena.create_at(NodeKind::DirectiveList, &position);
    arena.append_child(program, list)?;
    let mut scopes = vec![list];

    for (n, line) in source.lines().enumerate() {
        if n > 0 {
            position.new_line();
        }
        let (attribute, rest) = match line.trim().split_once(' ') {
            Some(("private", rest)) => (Some(Attribute::Private), rest),
            Some(("internal", rest)) => (Some(Attribute::Internal), rest),
            _ => (None, line.trim()),
        };
        let parent = *scopes.last().unwrap_or(&list);
        let item = match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
            [] => continue,
            ["error"] => return Ok(None),
            ["}"] => {
                anyhow::ensure!(scopes.len() > 1, "{filename}:{}: nothing to close", n + 1);
                scopes.pop();
                continue;
            }
            [keyword @ ("package" | "class"), name] => {
                let kind = if *keyword == "package" {
                    NodeKind::Package
                } else {
                    NodeKind::Class
                };
                let node = arena.create_at(kind, &position);
                arena.set_string(node, *name)?;
                arena.append_child(parent, node)?;
                let body = arena.create_at(NodeKind::DirectiveList, &position);
                arena.append_child(node, body)?;
                scopes.push(body);
                node
            }
            ["function", name] => {
                let function = arena.create_at(NodeKind::Function, &position);
                arena.set_string(function, *name)?;
                arena.set_flag(function, Flag::FunctionVoid, true)?;
                arena.append_child(parent, function)?;
                function
            }
            ["var", name] => {
                let var = arena.create_at(NodeKind::Var, &position);
                let variable = arena.create_at(NodeKind::Variable, &position);
                arena.set_string(variable, *name)?;
                arena.append_child(var, variable)?;
                arena.append_child(parent, var)?;
                variable
            }
            _ => anyhow::bail!("{filename}:{}: unknown declaration \"{line}\"", n + 1),
        };
        if let Some(attribute) = attribute {
            arena.set_attribute(item, attribute, true)?;
        }
    }

    anyhow::ensure!(scopes.len() == 1, "{filename}: a scope is not closed");
    Ok(Some(program))
}

/// A compiler over an empty `PROGRAM` with every message kept in `sink`.
pub(crate) struct Session {
    pub compiler: Compiler,
    pub sink: Rc<RefCell<CollectingSink>>,
    /// Directive list of the program being compiled.
    pub list: NodeId,
}

impl Session {
    pub fn new(options: ResourceConfig) -> Self {
        Self::from_context(CompilationContext::new(declarations).with_options(options))
    }

    /// Module sources are looked up in `sources` before the disk.
    pub fn with_sources(options: ResourceConfig, sources: FxHashMap<String, String>) -> Self {
        Self::from_context(
            CompilationContext::new(declarations)
                .with_options(options)
                .with_input_retriever(sources),
        )
    }

    fn from_context(ctx: CompilationContext) -> Self {
        init_logging();
        let sink = Rc::new(RefCell::new(CollectingSink::new()));
        let mut ctx = ctx.with_diagnostics(Diagnostics::new(Box::new(sink.clone())));
        let position = Position::new("main.js");
        let program = ctx.arena.create_at(NodeKind::Program, &position);
        let list = ctx.arena.create_at(NodeKind::DirectiveList, &position);
        ctx.arena.append_child(program, list).unwrap();
        ctx.set_program(Some(program));
        Self {
            compiler: Compiler::new(ctx),
            sink,
            list,
        }
    }

    pub fn arena(&mut self) -> &mut Arena {
        self.compiler.arena_mut()
    }

    /// Appends a new node under `parent`; `name` is ignored when empty.
    pub fn add(&mut self, parent: NodeId, kind: NodeKind, name: &str) -> NodeId {
        let arena = self.arena();
        let id = arena.create_at(kind, &Position::new("main.js"));
        if !name.is_empty() {
            arena.set_string(id, name).unwrap();
        }
        arena.append_child(parent, id).unwrap();
        id
    }

    /// A named node with a directive list body; returns both.
    pub fn scope(&mut self, parent: NodeId, kind: NodeKind, name: &str) -> (NodeId, NodeId) {
        let node = self.add(parent, kind, name);
        let body = self.add(node, NodeKind::DirectiveList, "");
        (node, body)
    }

    /// `var name`, returning the `VARIABLE`.
    pub fn var(&mut self, parent: NodeId, name: &str) -> NodeId {
        let var = self.add(parent, NodeKind::Var, "");
        self.add(var, NodeKind::Variable, name)
    }

    /// `function name(p1: T1, ...)` without a body.
    pub fn function(&mut self, parent: NodeId, name: &str, params: &[(&str, &str)]) -> NodeId {
        let function = self.add(parent, NodeKind::Function, name);
        let parameters = self.add(function, NodeKind::Parameters, "");
        for (param, ty) in params {
            let param = self.add(parameters, NodeKind::Param, param);
            self.add(param, NodeKind::Identifier, ty);
        }
        function
    }

    /// `name(...)`; returns the called identifier and its argument list.
    pub fn call(&mut self, parent: NodeId, name: &str) -> (NodeId, NodeId) {
        let call = self.add(parent, NodeKind::Call, "");
        let id = self.add(call, NodeKind::Identifier, name);
        let params = self.add(call, NodeKind::List, "");
        (id, params)
    }

    pub fn resolve(&mut self, id: NodeId) -> Option<NodeId> {
        self.compiler.resolve_name(id, id, None, 0).unwrap()
    }
}

/// A scripts directory with `native/<name>` for every module given, and a
/// configuration pointing at it and at a database next to it.
pub(crate) fn installation(modules: &[(&str, &str)]) -> (TempDir, ResourceConfig) {
    let dir = tempfile::tempdir().unwrap();
    let native = dir.path().join("scripts").join("native");
    fs::create_dir_all(&native).unwrap();
    for (name, source) in modules {
        fs::write(native.join(name), source).unwrap();
    }
    let options = config_in(dir.path());
    (dir, options)
}

pub(crate) fn config_in(dir: &Path) -> ResourceConfig {
    ResourceConfig {
        scripts: dir.join("scripts").display().to_string(),
        db: dir.join("packages.db").display().to_string(),
        ..ResourceConfig::default()
    }
}

/// Native classes every function prototype relies on.
pub(crate) const AS_INIT: &str = "class Object\n}\nclass String\n}\nclass Integer\n}\nclass Double\n}\nclass Boolean\n}\nclass Array\n}\n";
