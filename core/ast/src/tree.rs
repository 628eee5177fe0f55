//! Parent/child structure of the arena.
//!
//! A node has at most one parent and appears exactly once in that parent's
//! children list. All structural changes go through [`Arena::set_parent`].

use crate::arena::{Arena, NodeId};
use crate::errors::NodeError;
use crate::kind::NodeKind;

impl Arena {
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    /// Moves `child` under `parent` (at `index`, or at the end), or detaches
    /// it when `parent` is `None`.
    ///
    /// Re-parenting a node to its current parent without an index is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// The child, the new parent and the old parent must all be unlocked.
    /// The new parent must accept children and the child must be allowed
    /// under a parent. An index past the end of the new parent's children
    /// is rejected.
    pub fn set_parent(
        &mut self,
        child: NodeId,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<(), NodeError> {
        self.modifying(child)?;
        if let Some(parent) = parent {
            self.modifying(parent)?;
        }
        let old = self.data(child).parent;
        if let Some(old) = old.filter(|old| Some(*old) != parent) {
            self.modifying(old)?;
        }

        if parent == old && index.is_none() {
            return Ok(());
        }

        if let Some(parent) = parent {
            let parent_kind = self.kind(parent);
            if !parent_kind.can_be_parent() {
                if let Some(grand) = self.data(parent).parent {
                    tracing::debug!(parent = %grand, kind = self.kind_name(grand), "rejected parent lives under");
                }
                return Err(NodeError::IncompatibleParent {
                    parent: parent_kind.name(),
                    child: self.kind_name(child),
                });
            }
        }
        let child_kind = self.kind(child);
        if !child_kind.can_be_child() {
            return Err(NodeError::IncompatibleChild {
                kind: child_kind.name(),
            });
        }

        // validate the index before touching anything
        if let (Some(parent), Some(index)) = (parent, index) {
            let mut size = self.data(parent).children.len();
            if old == Some(parent) {
                size -= 1;
            }
            if index > size {
                return Err(NodeError::IndexOutOfRange {
                    node: parent,
                    index,
                    size,
                });
            }
        }

        if let Some(old) = old {
            let children = &mut self.nodes[old.index()].children;
            if let Some(offset) = children.iter().position(|c| *c == child) {
                children.remove(offset);
            }
            self.nodes[child.index()].parent = None;
        }

        if let Some(parent) = parent {
            let children = &mut self.nodes[parent.index()].children;
            match index {
                Some(index) => children.insert(index, child),
                None => children.push(child),
            }
            self.nodes[child.index()].parent = Some(parent);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Arena::set_parent`].
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), NodeError> {
        self.set_parent(child, Some(parent), None)
    }

    /// # Errors
    ///
    /// See [`Arena::set_parent`].
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), NodeError> {
        self.set_parent(child, Some(parent), Some(index))
    }

    /// Detaches the child at `index`. The child stays alive and can be
    /// attached elsewhere.
    ///
    /// # Errors
    ///
    /// [`NodeError::IndexOutOfRange`] or a lock error.
    pub fn delete_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId, NodeError> {
        let child = self.child(parent, index)?;
        self.set_parent(child, None, None)?;
        Ok(child)
    }

    /// Replaces the child at `index` with `child`; returns the detached one.
    /// On error the children of `parent` are left unchanged.
    ///
    /// # Errors
    ///
    /// See [`Arena::delete_child`] and [`Arena::insert_child`].
    pub fn set_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<NodeId, NodeError> {
        let previous = self.delete_child(parent, index)?;
        if let Err(err) = self.insert_child(parent, index, child) {
            self.insert_child(parent, index, previous)?;
            return Err(err);
        }
        Ok(previous)
    }

    /// Puts `replacement` where `id` is in its parent. The parent may be
    /// locked: the number of children does not change.
    ///
    /// # Errors
    ///
    /// [`NodeError::NoParent`] when `id` is detached.
    pub fn replace_with(&mut self, id: NodeId, replacement: NodeId) -> Result<(), NodeError> {
        let parent = self.parent(id).ok_or(NodeError::NoParent {
            operation: "replace_with()",
        })?;
        let offset = self.offset(id)?;
        let saved = std::mem::take(&mut self.locks.borrow_mut()[parent.index()]);
        let result = self.set_child(parent, offset, replacement);
        self.locks.borrow_mut()[parent.index()] = saved;
        result.map(|_| ())
    }

    #[must_use]
    pub fn children_size(&self, id: NodeId) -> usize {
        self.data(id).children.len()
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    /// # Errors
    ///
    /// [`NodeError::IndexOutOfRange`].
    pub fn child(&self, id: NodeId, index: usize) -> Result<NodeId, NodeError> {
        let children = &self.data(id).children;
        children
            .get(index)
            .copied()
            .ok_or(NodeError::IndexOutOfRange {
                node: id,
                index,
                size: children.len(),
            })
    }

    #[must_use]
    pub fn find_first_child(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.find_next_child(id, None, kind)
    }

    /// First child of `kind` found after `start` (or from the beginning
    /// when `start` is `None`).
    #[must_use]
    pub fn find_next_child(
        &self,
        id: NodeId,
        start: Option<NodeId>,
        kind: NodeKind,
    ) -> Option<NodeId> {
        let children = &self.data(id).children;
        let from = match start {
            Some(start) => children.iter().position(|c| *c == start)? + 1,
            None => 0,
        };
        children[from..]
            .iter()
            .copied()
            .find(|c| self.kind(*c) == kind)
    }

    /// Removes every `UNKNOWN` node from the subtree, discarding them.
    ///
    /// # Errors
    ///
    /// Stops at the first locked node that needed a change.
    pub fn clean_tree(&mut self, id: NodeId) -> Result<(), NodeError> {
        let mut idx = self.children_size(id);
        while idx > 0 {
            idx -= 1;
            let child = self.data(id).children[idx];
            if self.kind(child) == NodeKind::Unknown {
                self.delete_child(id, idx)?;
                self.discard(child)?;
            } else {
                self.clean_tree(child)?;
            }
        }
        Ok(())
    }

    /// Index of `id` in its parent.
    ///
    /// # Errors
    ///
    /// [`NodeError::NoParent`] when `id` is detached.
    pub fn offset(&self, id: NodeId) -> Result<usize, NodeError> {
        let no_parent = NodeError::NoParent {
            operation: "get_offset()",
        };
        let parent = self.parent(id).ok_or(no_parent.clone())?;
        self.data(parent)
            .children
            .iter()
            .position(|c| *c == id)
            .ok_or(no_parent)
    }

    /// Walks up from `id` (excluding it) until a node of one of the `kinds`
    /// is found.
    #[must_use]
    pub fn find_ancestor(&self, id: NodeId, kinds: &[NodeKind]) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if kinds.contains(&self.kind(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }
}
