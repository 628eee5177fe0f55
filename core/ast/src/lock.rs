//! Scoped locking of a node.
//!
//! While a node is locked, its flags, attributes, payload and children
//! cannot change. Locks nest; a node is writable again once every lock on
//! it was released.

use std::fmt;

use crate::arena::{Arena, LockTable, NodeId, unlock_in};
use crate::errors::NodeError;

/// Holds a lock on one node until dropped or [unlocked](NodeLock::unlock).
#[must_use = "the node is unlocked as soon as the guard is dropped"]
pub struct NodeLock {
    locks: LockTable,
    node: Option<NodeId>,
}

impl NodeLock {
    /// Locks `node`. The guard does not borrow the arena.
    pub fn new(arena: &Arena, node: NodeId) -> Self {
        arena.lock(node);
        Self {
            locks: arena.locks.clone(),
            node: Some(node),
        }
    }

    /// Releases the lock early. Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// [`NodeError::UnlockUnlocked`] if the counter was reset behind the
    /// guard's back.
    pub fn unlock(&mut self) -> Result<(), NodeError> {
        match self.node.take() {
            Some(node) => unlock_in(&self.locks, node),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

impl Drop for NodeLock {
    fn drop(&mut self) {
        if let Some(node) = self.node.take()
            && let Err(err) = unlock_in(&self.locks, node)
        {
            tracing::error!(%err, "node lock released twice");
        }
    }
}

impl fmt::Debug for NodeLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeLock").field("node", &self.node).finish()
    }
}
