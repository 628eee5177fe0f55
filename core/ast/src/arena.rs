//! Storage for every node of every tree loaded by a compilation.
//!
//! Nodes live in a single vector and are addressed by [`NodeId`]. The
//! `children` list is the only owning relation; every other link (parent,
//! instance, type node, goto targets, variables, labels) is a plain id that
//! may point to a node which has since been [discarded](Arena::discard).
//! Readers of such links get `None` back in that case.

use std::cell::RefCell;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::attributes::{Attribute, AttributeSet};
use crate::errors::NodeError;
use crate::flags::{Flag, FlagSet};
use crate::kind::NodeKind;
use crate::position::Position;
use crate::values::{Float64, Int64};

/// Depth value of a parameter match that was not found.
pub const MATCH_NOT_FOUND: i32 = 0;
/// Depth value of an exact parameter type match.
pub const MATCH_HIGHEST_DEPTH: i32 = 1;
/// Depth value of a parameter accepting anything.
pub const MATCH_LOWEST_DEPTH: i32 = i32::MAX / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) flags: FlagSet,
    pub(crate) attributes: AttributeSet,
    pub(crate) switch_operator: NodeKind,
    pub(crate) position: Position,
    pub(crate) int: Int64,
    pub(crate) float: Float64,
    pub(crate) string: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) instance: Option<NodeId>,
    pub(crate) type_node: Option<NodeId>,
    pub(crate) goto_enter: Option<NodeId>,
    pub(crate) goto_exit: Option<NodeId>,
    pub(crate) attribute_node: Option<NodeId>,
    pub(crate) variables: Vec<NodeId>,
    pub(crate) labels: FxHashMap<String, NodeId>,
    pub(crate) param_depth: Vec<i32>,
    pub(crate) param_index: Vec<usize>,
    pub(crate) alive: bool,
}

impl NodeData {
    fn new(kind: NodeKind, position: Position) -> Self {
        Self {
            kind,
            flags: FlagSet::default(),
            attributes: AttributeSet::default(),
            switch_operator: NodeKind::Unknown,
            position,
            int: Int64::default(),
            float: Float64::default(),
            string: String::new(),
            parent: None,
            children: Vec::new(),
            instance: None,
            type_node: None,
            goto_enter: None,
            goto_exit: None,
            attribute_node: None,
            variables: Vec::new(),
            labels: FxHashMap::default(),
            param_depth: Vec::new(),
            param_index: Vec::new(),
            alive: true,
        }
    }
}

/// Lock counters, shared with the [`crate::lock::NodeLock`] guards so a
/// guard does not need to borrow the arena.
pub(crate) type LockTable = Rc<RefCell<Vec<u32>>>;

#[derive(Debug, Default)]
pub struct Arena {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) locks: LockTable,
}

fn string_kind(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Break
            | NodeKind::Class
            | NodeKind::Continue
            | NodeKind::Enum
            | NodeKind::Function
            | NodeKind::Goto
            | NodeKind::Identifier
            | NodeKind::Import
            | NodeKind::Interface
            | NodeKind::Label
            | NodeKind::Name
            | NodeKind::Namespace
            | NodeKind::Package
            | NodeKind::Param
            | NodeKind::RegularExpression
            | NodeKind::String
            | NodeKind::Variable
            | NodeKind::VarAttributes
            | NodeKind::Videntifier
    )
}

impl Arena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached node at the default position.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.create_at(kind, &Position::default())
    }

    pub fn create_at(&mut self, kind: NodeKind, position: &Position) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(NodeData::new(kind, position.clone()));
        self.locks.borrow_mut().push(0);
        id
    }

    /// New detached node of `kind` carrying the position of `id`.
    pub fn create_replacement(&mut self, id: NodeId, kind: NodeKind) -> NodeId {
        let position = self.nodes[id.index()].position.clone();
        self.create_at(kind, &position)
    }

    /// Copies a literal node (payload, flags, attributes and links, but not
    /// the children nor the parent).
    ///
    /// # Errors
    ///
    /// Only `TRUE`, `FALSE`, `NULL`, `UNDEFINED`, `INT64`, `FLOAT64`, `STRING`
    /// and `REGULAR_EXPRESSION` nodes can be cloned.
    pub fn clone_basic_node(&mut self, id: NodeId) -> Result<NodeId, NodeError> {
        let source = &self.nodes[id.index()];
        if !matches!(
            source.kind,
            NodeKind::False
                | NodeKind::True
                | NodeKind::Null
                | NodeKind::Undefined
                | NodeKind::Float64
                | NodeKind::Int64
                | NodeKind::String
                | NodeKind::RegularExpression
        ) {
            return Err(NodeError::InvalidData {
                accessor: "clone_basic_node",
                kind: source.kind.name(),
            });
        }
        let mut data = NodeData::new(source.kind, source.position.clone());
        data.type_node = source.type_node;
        data.flags = source.flags;
        data.attribute_node = source.attribute_node;
        data.attributes = source.attributes;
        data.switch_operator = source.switch_operator;
        data.instance = source.instance;
        data.goto_enter = source.goto_enter;
        data.goto_exit = source.goto_exit;
        data.variables.clone_from(&source.variables);
        data.labels.clone_from(&source.labels);
        data.int = source.int;
        data.float = source.float;
        data.string.clone_from(&source.string);
        let clone = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(data);
        self.locks.borrow_mut().push(0);
        Ok(clone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(|n| n.alive)
    }

    fn live(&self, id: Option<NodeId>) -> Option<NodeId> {
        id.filter(|id| self.is_alive(*id))
    }

    /// Retires a detached subtree. Weak links that point into it read as
    /// absent from now on.
    ///
    /// # Errors
    ///
    /// The node must not have a parent and no node of the subtree may be
    /// locked.
    pub fn discard(&mut self, id: NodeId) -> Result<(), NodeError> {
        if !self.is_alive(id) {
            return Ok(());
        }
        if self.nodes[id.index()].parent.is_some() {
            return Err(NodeError::InvalidData {
                accessor: "discard",
                kind: self.kind_name(id),
            });
        }
        let mut stack = vec![id];
        let mut subtree = Vec::new();
        while let Some(current) = stack.pop() {
            if self.is_locked(current) {
                return Err(NodeError::Locked {
                    node: current,
                    kind: self.kind_name(current),
                });
            }
            let data = &self.nodes[current.index()];
            if !data.alive {
                continue;
            }
            stack.extend(data.children.iter().copied());
            stack.extend(data.attribute_node);
            subtree.push(current);
        }
        for node in subtree {
            self.nodes[node.index()].alive = false;
        }
        tracing::trace!(node = %id, "discarded subtree");
        Ok(())
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    /// Verifies that `id` may be modified.
    ///
    /// # Errors
    ///
    /// [`NodeError::DeadNode`] when discarded, [`NodeError::Locked`] when
    /// the lock counter is not zero.
    pub fn modifying(&self, id: NodeId) -> Result<(), NodeError> {
        if !self.is_alive(id) {
            return Err(NodeError::DeadNode { node: id });
        }
        if self.is_locked(id) {
            tracing::debug!(node = %id, kind = self.kind_name(id), "attempt to modify a locked node");
            return Err(NodeError::Locked {
                node: id,
                kind: self.kind_name(id),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    #[must_use]
    pub fn kind_name(&self, id: NodeId) -> &'static str {
        self.kind(id).name()
    }

    /// Changes the kind of a node, dropping the flags and attributes the new
    /// kind does not accept.
    pub(crate) fn recast(&mut self, id: NodeId, kind: NodeKind) {
        let data = &mut self.nodes[id.index()];
        data.kind = kind;
        data.flags = data.flags.retain_legal(kind);
        data.attributes = data.attributes.retain_legal(kind);
    }

    #[must_use]
    pub fn position(&self, id: NodeId) -> &Position {
        &self.nodes[id.index()].position
    }

    pub fn set_position(&mut self, id: NodeId, position: Position) {
        self.nodes[id.index()].position = position;
    }

    // flags

    /// # Errors
    ///
    /// [`NodeError::IllegalFlag`] when the kind does not accept `flag`.
    pub fn flag(&self, id: NodeId, flag: Flag) -> Result<bool, NodeError> {
        self.verify_flag(id, flag)?;
        Ok(self.nodes[id.index()].flags.contains(flag))
    }

    /// # Errors
    ///
    /// [`NodeError::IllegalFlag`] when the kind does not accept `flag`,
    /// [`NodeError::Locked`] when the node is locked.
    pub fn set_flag(&mut self, id: NodeId, flag: Flag, value: bool) -> Result<(), NodeError> {
        self.verify_flag(id, flag)?;
        self.modifying(id)?;
        self.nodes[id.index()].flags.set(flag, value);
        Ok(())
    }

    fn verify_flag(&self, id: NodeId, flag: Flag) -> Result<(), NodeError> {
        let kind = self.kind(id);
        if flag.accepts(kind) {
            Ok(())
        } else {
            Err(NodeError::IllegalFlag {
                flag: flag.name(),
                kind: kind.name(),
            })
        }
    }

    #[must_use]
    pub fn flags(&self, id: NodeId) -> FlagSet {
        self.nodes[id.index()].flags
    }

    #[must_use]
    pub fn compare_all_flags(&self, id: NodeId, flags: FlagSet) -> bool {
        self.nodes[id.index()].flags == flags
    }

    // attributes

    /// # Errors
    ///
    /// [`NodeError::IllegalAttribute`] when the kind does not accept it.
    pub fn attribute(&self, id: NodeId, attribute: Attribute) -> Result<bool, NodeError> {
        self.verify_attribute(id, attribute)?;
        Ok(self.nodes[id.index()].attributes.contains(attribute))
    }

    /// Sets or clears an attribute.
    ///
    /// Returns `Ok(false)` without changing anything when the attribute
    /// belongs to an exclusive group that already has a member set. The
    /// caller decides how to report it, see
    /// [`crate::attributes::exclusive_attributes_message`].
    ///
    /// # Errors
    ///
    /// [`NodeError::IllegalAttribute`] or [`NodeError::Locked`].
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        attribute: Attribute,
        value: bool,
    ) -> Result<bool, NodeError> {
        self.verify_attribute(id, attribute)?;
        self.modifying(id)?;
        let data = &mut self.nodes[id.index()];
        if value && data.attributes.exclusive_conflict(attribute).is_some() {
            return Ok(false);
        }
        data.attributes.set(attribute, value);
        Ok(true)
    }

    /// Applies [`Arena::set_attribute`] to `id` and all its descendants.
    /// Returns `false` if any node rejected the attribute as exclusive.
    ///
    /// # Errors
    ///
    /// Stops at the first illegal or locked node.
    pub fn set_attribute_tree(
        &mut self,
        id: NodeId,
        attribute: Attribute,
        value: bool,
    ) -> Result<bool, NodeError> {
        let mut all = self.set_attribute(id, attribute, value)?;
        let children = self.nodes[id.index()].children.clone();
        for child in children {
            all &= self.set_attribute_tree(child, attribute, value)?;
        }
        Ok(all)
    }

    fn verify_attribute(&self, id: NodeId, attribute: Attribute) -> Result<(), NodeError> {
        let kind = self.kind(id);
        if attribute.accepts(kind) {
            Ok(())
        } else {
            Err(NodeError::IllegalAttribute {
                attribute: attribute.name(),
                kind: kind.name(),
            })
        }
    }

    #[must_use]
    pub fn attributes(&self, id: NodeId) -> AttributeSet {
        self.nodes[id.index()].attributes
    }

    #[must_use]
    pub fn compare_all_attributes(&self, id: NodeId, attributes: AttributeSet) -> bool {
        self.nodes[id.index()].attributes == attributes
    }

    #[must_use]
    pub fn attribute_node(&self, id: NodeId) -> Option<NodeId> {
        self.live(self.nodes[id.index()].attribute_node)
    }

    /// # Errors
    ///
    /// [`NodeError::Locked`] when the node is locked.
    pub fn set_attribute_node(
        &mut self,
        id: NodeId,
        node: Option<NodeId>,
    ) -> Result<(), NodeError> {
        self.modifying(id)?;
        self.nodes[id.index()].attribute_node = node;
        Ok(())
    }

    // payload

    /// # Errors
    ///
    /// [`NodeError::InvalidData`] unless the node is `TRUE` or `FALSE`.
    pub fn boolean(&self, id: NodeId) -> Result<bool, NodeError> {
        match self.kind(id) {
            NodeKind::True => Ok(true),
            NodeKind::False => Ok(false),
            kind => Err(NodeError::InvalidData {
                accessor: "get_boolean",
                kind: kind.name(),
            }),
        }
    }

    /// Turns a `TRUE` node into `FALSE` or the other way around.
    ///
    /// # Errors
    ///
    /// [`NodeError::InvalidData`] unless the node is `TRUE` or `FALSE`.
    pub fn set_boolean(&mut self, id: NodeId, value: bool) -> Result<(), NodeError> {
        self.boolean(id).map_err(|_| NodeError::InvalidData {
            accessor: "set_boolean",
            kind: self.kind_name(id),
        })?;
        self.modifying(id)?;
        self.recast(id, if value { NodeKind::True } else { NodeKind::False });
        Ok(())
    }

    /// # Errors
    ///
    /// [`NodeError::InvalidData`] unless the node is `INT64`.
    pub fn int64(&self, id: NodeId) -> Result<Int64, NodeError> {
        self.expect_kind(id, NodeKind::Int64, "get_int64")?;
        Ok(self.nodes[id.index()].int)
    }

    /// # Errors
    ///
    /// [`NodeError::InvalidData`] unless the node is `INT64`.
    pub fn set_int64(&mut self, id: NodeId, value: Int64) -> Result<(), NodeError> {
        self.expect_kind(id, NodeKind::Int64, "set_int64")?;
        self.modifying(id)?;
        self.nodes[id.index()].int = value;
        Ok(())
    }

    /// # Errors
    ///
    /// [`NodeError::InvalidData`] unless the node is `FLOAT64`.
    pub fn float64(&self, id: NodeId) -> Result<Float64, NodeError> {
        self.expect_kind(id, NodeKind::Float64, "get_float64")?;
        Ok(self.nodes[id.index()].float)
    }

    /// # Errors
    ///
    /// [`NodeError::InvalidData`] unless the node is `FLOAT64`.
    pub fn set_float64(&mut self, id: NodeId, value: Float64) -> Result<(), NodeError> {
        self.expect_kind(id, NodeKind::Float64, "set_float64")?;
        self.modifying(id)?;
        self.nodes[id.index()].float = value;
        Ok(())
    }

    /// Name or text carried by the node.
    ///
    /// # Errors
    ///
    /// [`NodeError::InvalidData`] for kinds without a string (see
    /// [`Arena::has_string`]).
    pub fn string(&self, id: NodeId) -> Result<&str, NodeError> {
        let kind = self.kind(id);
        if !string_kind(kind) {
            return Err(NodeError::InvalidData {
                accessor: "get_string",
                kind: kind.name(),
            });
        }
        Ok(&self.nodes[id.index()].string)
    }

    /// # Errors
    ///
    /// [`NodeError::InvalidData`] for kinds without a string.
    pub fn set_string(&mut self, id: NodeId, value: impl Into<String>) -> Result<(), NodeError> {
        let kind = self.kind(id);
        if !string_kind(kind) {
            return Err(NodeError::InvalidData {
                accessor: "set_string",
                kind: kind.name(),
            });
        }
        self.modifying(id)?;
        self.nodes[id.index()].string = value.into();
        Ok(())
    }

    #[must_use]
    pub fn has_string(&self, id: NodeId) -> bool {
        string_kind(self.kind(id))
    }

    /// Whether the node carries a string equal to `name`.
    #[must_use]
    pub fn string_is(&self, id: NodeId, name: &str) -> bool {
        self.string(id).is_ok_and(|s| s == name)
    }

    fn expect_kind(
        &self,
        id: NodeId,
        expected: NodeKind,
        accessor: &'static str,
    ) -> Result<(), NodeError> {
        let kind = self.kind(id);
        if kind == expected {
            Ok(())
        } else {
            Err(NodeError::InvalidData {
                accessor,
                kind: kind.name(),
            })
        }
    }

    /// # Errors
    ///
    /// [`NodeError::InvalidData`] unless the node is a `SWITCH`.
    pub fn switch_operator(&self, id: NodeId) -> Result<NodeKind, NodeError> {
        self.expect_kind(id, NodeKind::Switch, "get_switch_operator")?;
        Ok(self.nodes[id.index()].switch_operator)
    }

    /// # Errors
    ///
    /// [`NodeError::InvalidData`] unless the node is a `SWITCH` and `op` is
    /// a comparison usable by a `switch` statement.
    pub fn set_switch_operator(&mut self, id: NodeId, op: NodeKind) -> Result<(), NodeError> {
        self.expect_kind(id, NodeKind::Switch, "set_switch_operator")?;
        if !matches!(
            op,
            NodeKind::Unknown
                | NodeKind::StrictlyEqual
                | NodeKind::Equal
                | NodeKind::NotEqual
                | NodeKind::StrictlyNotEqual
                | NodeKind::Match
                | NodeKind::In
                | NodeKind::Is
                | NodeKind::As
                | NodeKind::Instanceof
                | NodeKind::Less
                | NodeKind::LessEqual
                | NodeKind::Greater
                | NodeKind::GreaterEqual
                | NodeKind::Default
        ) {
            return Err(NodeError::InvalidData {
                accessor: "set_switch_operator",
                kind: op.name(),
            });
        }
        self.modifying(id)?;
        self.nodes[id.index()].switch_operator = op;
        Ok(())
    }

    // weak links

    #[must_use]
    pub fn instance(&self, id: NodeId) -> Option<NodeId> {
        self.live(self.nodes[id.index()].instance)
    }

    pub fn set_instance(&mut self, id: NodeId, node: Option<NodeId>) {
        self.nodes[id.index()].instance = node;
    }

    #[must_use]
    pub fn type_node(&self, id: NodeId) -> Option<NodeId> {
        self.live(self.nodes[id.index()].type_node)
    }

    pub fn set_type_node(&mut self, id: NodeId, node: Option<NodeId>) {
        self.nodes[id.index()].type_node = node;
    }

    #[must_use]
    pub fn goto_enter(&self, id: NodeId) -> Option<NodeId> {
        self.live(self.nodes[id.index()].goto_enter)
    }

    pub fn set_goto_enter(&mut self, id: NodeId, node: Option<NodeId>) {
        self.nodes[id.index()].goto_enter = node;
    }

    #[must_use]
    pub fn goto_exit(&self, id: NodeId) -> Option<NodeId> {
        self.live(self.nodes[id.index()].goto_exit)
    }

    pub fn set_goto_exit(&mut self, id: NodeId, node: Option<NodeId>) {
        self.nodes[id.index()].goto_exit = node;
    }

    /// # Errors
    ///
    /// [`NodeError::IncompatibleChild`] unless `variable` is a `VARIABLE`.
    pub fn add_variable(&mut self, id: NodeId, variable: NodeId) -> Result<(), NodeError> {
        let kind = self.kind(variable);
        if kind != NodeKind::Variable {
            return Err(NodeError::IncompatibleChild { kind: kind.name() });
        }
        self.nodes[id.index()].variables.push(variable);
        Ok(())
    }

    #[must_use]
    pub fn variables_size(&self, id: NodeId) -> usize {
        self.nodes[id.index()].variables.len()
    }

    /// Variable at `index`; `Ok(None)` when that variable was discarded.
    ///
    /// # Errors
    ///
    /// [`NodeError::IndexOutOfRange`].
    pub fn variable(&self, id: NodeId, index: usize) -> Result<Option<NodeId>, NodeError> {
        let variables = &self.nodes[id.index()].variables;
        let variable = variables
            .get(index)
            .copied()
            .ok_or(NodeError::IndexOutOfRange {
                node: id,
                index,
                size: variables.len(),
            })?;
        Ok(self.live(Some(variable)))
    }

    /// Registers a `LABEL` with a function, package or program.
    ///
    /// # Errors
    ///
    /// The owner must be a `FUNCTION`, `PACKAGE` or `PROGRAM`, the label a
    /// named `LABEL` not yet registered.
    pub fn add_label(&mut self, id: NodeId, label: NodeId) -> Result<(), NodeError> {
        let owner = self.kind(id);
        if self.kind(label) != NodeKind::Label
            || !matches!(
                owner,
                NodeKind::Function | NodeKind::Package | NodeKind::Program
            )
        {
            return Err(NodeError::IncompatibleParent {
                parent: owner.name(),
                child: self.kind_name(label),
            });
        }
        let name = self.nodes[label.index()].string.clone();
        if name.is_empty() {
            return Err(NodeError::InvalidData {
                accessor: "add_label",
                kind: "LABEL",
            });
        }
        let labels = &mut self.nodes[id.index()].labels;
        if labels.contains_key(&name) {
            return Err(NodeError::InvalidData {
                accessor: "add_label",
                kind: "LABEL",
            });
        }
        labels.insert(name, label);
        Ok(())
    }

    #[must_use]
    pub fn find_label(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.live(self.nodes[id.index()].labels.get(name).copied())
    }

    // parameter match tables

    /// Allocates the depth and index tables of a `PARAM_MATCH` node.
    ///
    /// # Errors
    ///
    /// [`NodeError::ParamMatch`] when the node is not a `PARAM_MATCH`, the
    /// tables already exist or `size` is zero.
    pub fn set_param_size(&mut self, id: NodeId, size: usize) -> Result<(), NodeError> {
        let data = &mut self.nodes[id.index()];
        if data.kind != NodeKind::ParamMatch {
            return Err(NodeError::ParamMatch {
                reason: "set_param_size() called with a node other than a PARAM_MATCH",
            });
        }
        if !data.param_depth.is_empty() {
            return Err(NodeError::ParamMatch {
                reason: "set_param_size() called twice",
            });
        }
        if size == 0 {
            return Err(NodeError::ParamMatch {
                reason: "set_param_size() was called with a size of zero",
            });
        }
        data.param_depth = vec![MATCH_NOT_FOUND; size];
        data.param_index = vec![0; size];
        Ok(())
    }

    #[must_use]
    pub fn param_size(&self, id: NodeId) -> usize {
        self.nodes[id.index()].param_depth.len()
    }

    /// # Errors
    ///
    /// [`NodeError::IndexOutOfRange`].
    pub fn param_depth(&self, id: NodeId, j: usize) -> Result<i32, NodeError> {
        let depth = &self.nodes[id.index()].param_depth;
        depth.get(j).copied().ok_or(NodeError::IndexOutOfRange {
            node: id,
            index: j,
            size: depth.len(),
        })
    }

    /// # Errors
    ///
    /// [`NodeError::IndexOutOfRange`].
    pub fn set_param_depth(&mut self, id: NodeId, j: usize, depth: i32) -> Result<(), NodeError> {
        let table = &mut self.nodes[id.index()].param_depth;
        let size = table.len();
        let slot = table.get_mut(j).ok_or(NodeError::IndexOutOfRange {
            node: id,
            index: j,
            size,
        })?;
        *slot = depth;
        Ok(())
    }

    /// # Errors
    ///
    /// [`NodeError::IndexOutOfRange`].
    pub fn param_index(&self, id: NodeId, idx: usize) -> Result<usize, NodeError> {
        let index = &self.nodes[id.index()].param_index;
        index.get(idx).copied().ok_or(NodeError::IndexOutOfRange {
            node: id,
            index: idx,
            size: index.len(),
        })
    }

    /// Records that argument `idx` goes to parameter `j`.
    ///
    /// # Errors
    ///
    /// [`NodeError::IndexOutOfRange`] when either index is outside the
    /// table.
    pub fn set_param_index(&mut self, id: NodeId, idx: usize, j: usize) -> Result<(), NodeError> {
        let table = &mut self.nodes[id.index()].param_index;
        let size = table.len();
        if idx >= size || j >= size {
            return Err(NodeError::IndexOutOfRange {
                node: id,
                index: idx.max(j),
                size,
            });
        }
        table[idx] = j;
        Ok(())
    }

    // locks

    #[must_use]
    pub fn is_locked(&self, id: NodeId) -> bool {
        self.lock_count(id) != 0
    }

    #[must_use]
    pub fn lock_count(&self, id: NodeId) -> u32 {
        self.locks.borrow().get(id.index()).copied().unwrap_or(0)
    }

    pub fn lock(&self, id: NodeId) {
        if let Some(count) = self.locks.borrow_mut().get_mut(id.index()) {
            *count += 1;
        }
    }

    /// # Errors
    ///
    /// [`NodeError::UnlockUnlocked`] when the counter is already zero.
    pub fn unlock(&self, id: NodeId) -> Result<(), NodeError> {
        unlock_in(&self.locks, id)
    }
}

pub(crate) fn unlock_in(locks: &LockTable, id: NodeId) -> Result<(), NodeError> {
    let mut locks = locks.borrow_mut();
    match locks.get_mut(id.index()) {
        Some(count) if *count > 0 => {
            *count -= 1;
            Ok(())
        }
        _ => Err(NodeError::UnlockUnlocked { node: id }),
    }
}
