//! Error types for the node tree.
//!
//! Every variant describes a programmer error: the tree was used in a way its
//! invariants forbid. User-facing problems (bad attributes in the source,
//! unresolved names, ...) are reported through [`crate::message`] instead.

use thiserror::Error;

use crate::arena::NodeId;

/// Invariant violations raised by node tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum NodeError {
    /// A locked node was about to be modified.
    #[error("trying to modify locked node {node} ({kind})")]
    Locked { node: NodeId, kind: &'static str },

    /// `unlock()` was called more times than `lock()`.
    #[error("unlock() called on node {node} whose lock counter is zero")]
    UnlockUnlocked { node: NodeId },

    /// The flag does not belong to the node kind.
    #[error("flag {flag} / type mismatch ({kind})")]
    IllegalFlag {
        flag: &'static str,
        kind: &'static str,
    },

    /// The attribute is not accepted by the node kind.
    #[error("node {kind} does not like attribute {attribute}")]
    IllegalAttribute {
        attribute: &'static str,
        kind: &'static str,
    },

    /// A child index was out of bounds.
    #[error("index {index} out of range for node {node} with {size} children")]
    IndexOutOfRange {
        node: NodeId,
        index: usize,
        size: usize,
    },

    /// The parent kind cannot own children.
    #[error("invalid type: \"{parent}\" used as a parent node of child with type: \"{child}\"")]
    IncompatibleParent {
        parent: &'static str,
        child: &'static str,
    },

    /// The node kind cannot be attached as a child.
    #[error("invalid type \"{kind}\" used as a child node")]
    IncompatibleChild { kind: &'static str },

    /// The operation requires a parent and the node has none.
    #[error("{operation} only works against nodes that have a parent")]
    NoParent { operation: &'static str },

    /// A payload accessor was used on a node kind without that payload.
    #[error("{accessor}() called with a node of type {kind}")]
    InvalidData {
        accessor: &'static str,
        kind: &'static str,
    },

    /// The node was discarded and can no longer be mutated.
    #[error("node {node} was discarded")]
    DeadNode { node: NodeId },

    /// `Position::reset_counters` was given a line below 1.
    #[error("the line parameter of the position object cannot be less than 1 (got {line})")]
    InvalidLine { line: i32 },

    /// Misuse of the parameter match tables of a `PARAM_MATCH` node.
    #[error("parameter match error: {reason}")]
    ParamMatch { reason: &'static str },
}
