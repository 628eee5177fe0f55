//! Effective attributes of a declaration.
//!
//! A node's own attribute bits are completed with the identifiers and
//! keywords found under its attribute node and with what it inherits from
//! its parents. The result is cached in the context instead of being written
//! back, so it can be computed for nodes sitting in locked lists.

use as2js_ast::attributes::exclusive_attributes_message;
use as2js_ast::{Attribute, AttributeSet, ErrorCode, NodeError, NodeId, NodeKind, NodeLock};

use super::{Compiler, SEARCH_FLAG_NO_PARSING};
use crate::errors::CompileResult;

/// Attribute named by an identifier in an attribute list.
fn attribute_from_name(name: &str) -> Option<Attribute> {
    Some(match name {
        "abstract" => Attribute::Abstract,
        "array" => Attribute::Array,
        "autobreak" => Attribute::Autobreak,
        "constructor" => Attribute::Constructor,
        "deprecated" => Attribute::Deprecated,
        "dynamic" => Attribute::Dynamic,
        "enumerable" => Attribute::Enumerable,
        "final" => Attribute::Final,
        "foreach" => Attribute::Foreach,
        "internal" => Attribute::Internal,
        "native" => Attribute::Native,
        "nobreak" => Attribute::Nobreak,
        "protected" => Attribute::Protected,
        "static" => Attribute::Static,
        "unsafe" => Attribute::Unsafe,
        "unused" => Attribute::Unused,
        "virtual" => Attribute::Virtual,
        _ => return None,
    })
}

/// Attribute a keyword node stands for.
fn attribute_from_keyword(kind: NodeKind) -> Option<Attribute> {
    Some(match kind {
        NodeKind::Abstract => Attribute::Abstract,
        NodeKind::False => Attribute::False,
        NodeKind::Final => Attribute::Final,
        NodeKind::Inline => Attribute::Inline,
        NodeKind::Native => Attribute::Native,
        NodeKind::Private => Attribute::Private,
        NodeKind::Protected => Attribute::Protected,
        NodeKind::Public => Attribute::Public,
        NodeKind::Static => Attribute::Static,
        NodeKind::Transient => Attribute::Transient,
        NodeKind::True => Attribute::True,
        NodeKind::Volatile => Attribute::Volatile,
        _ => return None,
    })
}

const VISIBILITY: &[Attribute] = &[Attribute::Public, Attribute::Private, Attribute::Protected];
const MEMBER_KIND: &[Attribute] = &[Attribute::Static, Attribute::Abstract, Attribute::Virtual];

impl Compiler {
    /// Whether `node` has attribute `a`, inherited attributes included.
    ///
    /// # Errors
    ///
    /// Attribute lists naming an attribute the node kind does not accept and
    /// failures of the lookups of dynamic attribute variables.
    pub fn get_attribute(&mut self, node: NodeId, a: Attribute) -> CompileResult<bool> {
        Ok(self.prepare_attributes(node)?.contains(a))
    }

    pub fn prepare_attributes(&mut self, node: NodeId) -> CompileResult<AttributeSet> {
        if let Some(attrs) = self.ctx.attributes.get(&node) {
            return Ok(*attrs);
        }

        // cached first: a node is prepared once even when errors occur
        let kind = self.ctx.arena.kind(node);
        let mut attrs = self.ctx.arena.attributes(node);
        self.ctx.attributes.insert(node, attrs);
        if kind == NodeKind::Program {
            return Ok(attrs);
        }

        if let Some(list) = self.ctx.arena.attribute_node(node) {
            let _lock = NodeLock::new(&self.ctx.arena, list);
            for child in self.ctx.arena.children(list).to_vec() {
                self.node_to_attrs(node, child, &mut attrs)?;
            }
        }

        let direct_native = attrs.contains(Attribute::Native);

        if kind != NodeKind::Package
            && let Some(parent) = self.ctx.arena.parent(node)
        {
            let inherited = self.prepare_attributes(parent)?;
            if !attrs.any(VISIBILITY) {
                for a in VISIBILITY {
                    attrs.set(*a, inherited.contains(*a));
                }
            }
            if !attrs.any(MEMBER_KIND) {
                for a in MEMBER_KIND {
                    attrs.set(*a, inherited.contains(*a));
                }
            }
            for a in [Attribute::Native, Attribute::Enumerable] {
                if inherited.contains(a) {
                    attrs.set(a, true);
                }
            }
            if inherited.contains(Attribute::False) {
                attrs.set(Attribute::False, true);
                attrs.set(Attribute::True, false);
            }
            if self.ctx.arena.kind(parent) != NodeKind::Class {
                for a in [Attribute::Dynamic, Attribute::Final] {
                    if inherited.contains(a) {
                        attrs.set(a, true);
                    }
                }
            }
        }

        if attrs.contains(Attribute::Native) && kind == NodeKind::Function {
            let has_body = self
                .ctx
                .arena
                .children(node)
                .iter()
                .any(|c| self.ctx.arena.kind(*c) == NodeKind::DirectiveList);
            if has_body {
                // inherited native silently stops at functions with a body
                if direct_native {
                    self.error(
                        ErrorCode::Native,
                        node,
                        "'native' is not permitted on a function with a body.",
                    );
                }
                attrs.set(Attribute::Native, false);
            }
        }

        self.ctx.attributes.insert(node, attrs);
        Ok(attrs)
    }

    fn set_attr(&mut self, node: NodeId, attrs: &mut AttributeSet, a: Attribute) -> CompileResult<()> {
        let kind = self.ctx.arena.kind(node);
        if !a.accepts(kind) {
            return Err(NodeError::IllegalAttribute {
                attribute: a.name(),
                kind: kind.name(),
            }
            .into());
        }
        match attrs.exclusive_conflict(a) {
            Some(group) => self.error(
                ErrorCode::InvalidAttributes,
                node,
                exclusive_attributes_message(group),
            ),
            None => attrs.set(a, true),
        }
        Ok(())
    }

    fn node_to_attrs(&mut self, node: NodeId, a: NodeId, attrs: &mut AttributeSet) -> CompileResult<()> {
        let kind = self.ctx.arena.kind(a);
        if kind == NodeKind::Identifier {
            return self.identifier_to_attrs(node, a, attrs);
        }
        match attribute_from_keyword(kind) {
            Some(attribute) => self.set_attr(node, attrs, attribute),
            None => {
                self.error(
                    ErrorCode::NotSupported,
                    node,
                    "unsupported attribute data type, dynamic expressions for attributes need to be resolved as constants.",
                );
                Ok(())
            }
        }
    }

    /// A named attribute, or a variable holding a list of attributes.
    fn identifier_to_attrs(
        &mut self,
        node: NodeId,
        a: NodeId,
        attrs: &mut AttributeSet,
    ) -> CompileResult<()> {
        let name = self.name_of(a);
        if let Some(attribute) = attribute_from_name(&name) {
            return self.set_attr(node, attrs, attribute);
        }

        let resolution = if self.ctx.arena.parent(node).is_some() {
            self.resolve_name(node, a, None, SEARCH_FLAG_NO_PARSING)?
        } else {
            None
        };
        let Some(variable) = resolution else {
            self.error(
                ErrorCode::NotFound,
                node,
                format!("cannot find a variable named '{name}'."),
            );
            return Ok(());
        };
        if !matches!(
            self.ctx.arena.kind(variable),
            NodeKind::Variable | NodeKind::VarAttributes
        ) {
            self.error(
                ErrorCode::Dynamic,
                node,
                format!("a dynamic attribute name can only reference a variable and '{name}' is not one."),
            );
            return Ok(());
        }
        if !self.ctx.expanding_attributes.insert(variable) {
            self.error(
                ErrorCode::LoopingReference,
                node,
                format!("the dynamic attribute variable '{name}' is used circularly (it loops)."),
            );
            return Ok(());
        }

        let lock = NodeLock::new(&self.ctx.arena, variable);
        let mut result = Ok(());
        for child in self.ctx.arena.children(variable).to_vec() {
            result = self.variable_to_attrs(node, child, attrs);
            if result.is_err() {
                break;
            }
        }
        drop(lock);
        self.ctx.expanding_attributes.remove(&variable);
        result
    }

    fn variable_to_attrs(
        &mut self,
        node: NodeId,
        value: NodeId,
        attrs: &mut AttributeSet,
    ) -> CompileResult<()> {
        let first = (self.ctx.arena.kind(value) == NodeKind::Set)
            .then(|| self.ctx.arena.children(value).first().copied())
            .flatten();
        let Some(a) = first else {
            self.error(
                ErrorCode::InvalidVariable,
                node,
                "an attribute variable has to be given a value.",
            );
            return Ok(());
        };

        let kind = self.ctx.arena.kind(a);
        if kind == NodeKind::Identifier || attribute_from_keyword(kind).is_some() {
            return self.node_to_attrs(node, a, attrs);
        }
        // expressions are only accepted once compiled down to true or false
        self.error(
            ErrorCode::InvalidExpression,
            node,
            "an attribute which is an expression needs to result in a boolean value (true or false).",
        );
        Ok(())
    }
}
