//! Structural navigation over a built tree
//!
//!     Nodes only know their parent's id. [`ParentIndex`] maps ids back to nodes for one
//!     tree, so contextual questions ("which function encloses this call?") can walk upwards
//!     without the tree holding back-pointers.
//!
//!     The free functions work top-down and need no index.

use super::node::NodeId;
use super::statement::StatementKind;
use super::traits::NodeRef;
use std::collections::HashMap;

/// Find the node with `id` in the subtree under `root`
pub fn find_by_id<'a>(root: NodeRef<'a>, id: NodeId) -> Option<NodeRef<'a>> {
    if root.id() == id {
        return Some(root);
    }
    root.children()
        .into_iter()
        .find_map(|child| find_by_id(child, id))
}

/// The innermost node whose span contains `offset`
pub fn node_at_offset(root: NodeRef<'_>, offset: usize) -> Option<NodeRef<'_>> {
    if !root.info().contains_offset(offset) {
        return None;
    }
    let inner = root
        .children()
        .into_iter()
        .find_map(|child| node_at_offset(child, offset));
    Some(inner.unwrap_or(root))
}

/// Id-to-node index of one tree
#[derive(Debug)]
pub struct ParentIndex<'a> {
    nodes: HashMap<NodeId, NodeRef<'a>>,
}

impl<'a> ParentIndex<'a> {
    pub fn build(root: NodeRef<'a>) -> Self {
        let mut nodes = HashMap::new();
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            nodes.insert(node.id(), node);
            pending.extend(node.children());
        }
        Self { nodes }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'a>> {
        self.nodes.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, node: NodeRef<'a>) -> Option<NodeRef<'a>> {
        node.info().parent().and_then(|id| self.get(id))
    }

    /// Parent, grandparent, ... up to the root
    pub fn ancestors(&self, node: NodeRef<'a>) -> Vec<NodeRef<'a>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            ancestors.push(ancestor);
            current = self.parent(ancestor);
        }
        ancestors
    }

    /// Nearest function declaration above `node`, closures included
    pub fn enclosing_function(&self, node: NodeRef<'a>) -> Option<NodeRef<'a>> {
        self.ancestors(node).into_iter().find(|ancestor| {
            matches!(
                ancestor.as_statement().map(|statement| &statement.kind),
                Some(StatementKind::FunctionDecl(_))
            )
        })
    }
}
