//! The position record embedded in every AST node
//!
//!     Every expression and statement carries a [`NodeInfo`]: where the node starts (byte
//!     offset plus line:column), where it ends, the text of the token it originated from, a
//!     per-parse [`NodeId`], and a non-owning back-reference to its parent.
//!
//!     Position fields are fixed at construction. The parent edge is the only thing that
//!     changes afterwards and it can be set once: the builder links every child to its parent
//!     in one pass after the tree is complete. The edge is an id, never a pointer, so the tree keeps strict
//!     ownership. Resolving an id back to a node goes through [`lookup`](super::lookup).

use super::range::Position;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// Identity of a node within one parse. Ids are assigned in creation order and restart
/// from zero on every parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    id: NodeId,
    span: ByteRange<usize>,
    position: Position,
    token: String,
    parent: OnceCell<NodeId>,
}

impl NodeInfo {
    pub fn new(id: NodeId, span: ByteRange<usize>, position: Position, token: impl Into<String>) -> Self {
        Self {
            id,
            span,
            position,
            token: token.into(),
            parent: OnceCell::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Byte offset of the first character of the node
    pub fn offset(&self) -> usize {
        self.span.start
    }

    /// Byte offset one past the last character of the node
    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn span(&self) -> &ByteRange<usize> {
        &self.span
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    /// Text of the token the node originated from
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent.get().copied()
    }

    /// Record the parent edge. Returns `false` if a parent was already set; the first
    /// attachment wins.
    pub fn attach_to(&self, parent: NodeId) -> bool {
        self.parent.set(parent).is_ok()
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.span.start <= offset && offset < self.span.end.max(self.span.start + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_is_set_once() {
        let info = NodeInfo::new(NodeId(3), 0..4, Position::new(1, 0), "a");
        assert_eq!(info.parent(), None);
        assert!(info.attach_to(NodeId(7)));
        assert!(!info.attach_to(NodeId(9)));
        assert_eq!(info.parent(), Some(NodeId(7)));
    }

    #[test]
    fn test_accessors() {
        let info = NodeInfo::new(NodeId(0), 4..9, Position::new(2, 1), "foo");
        assert_eq!(info.offset(), 4);
        assert_eq!(info.end(), 9);
        assert_eq!(info.line(), 2);
        assert_eq!(info.column(), 1);
        assert_eq!(info.token(), "foo");
        assert!(info.contains_offset(4));
        assert!(!info.contains_offset(9));
    }
}
