//! AST traits - Common interfaces for uniform node access
//!
//! This module defines the interface every node satisfies, whichever hierarchy it belongs
//! to: identity and position, a kind tag, structural children, and decompilation.

use super::error::DecompileResult;
use super::expression::Expression;
use super::node::{NodeId, NodeInfo};
use super::range::Position;
use super::statement::Statement;

/// Visitor trait for traversing the AST
///
/// Default implementations are empty, so you only need to override the methods you care
/// about. Children are visited in source order between `visit_*` and `leave_*`.
///
/// # Example
///
/// ```ignore
/// struct CallCounter(usize);
///
/// impl Visitor for CallCounter {
///     fn visit_expression(&mut self, expr: &Expression) {
///         if matches!(expr.kind, ExpressionKind::FunctionCall(_)) {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait Visitor {
    fn visit_expression(&mut self, _expression: &Expression) {}
    fn leave_expression(&mut self, _expression: &Expression) {}

    fn visit_statement(&mut self, _statement: &Statement) {}
    fn leave_statement(&mut self, _statement: &Statement) {}
}

/// Common interface for all AST nodes
pub trait AstNode {
    fn info(&self) -> &NodeInfo;

    /// Kind tag, e.g. `"Binary"` or `"TryCatch"`
    fn node_type(&self) -> &'static str;

    /// Regenerate source text for this subtree. `indent` is the nesting level of the node;
    /// the first line is never indented, continuation lines are.
    fn decompile(&self, indent: usize) -> DecompileResult;

    fn expression_children(&self) -> Vec<&Expression>;

    fn statement_children(&self) -> Vec<&Statement>;

    fn accept(&self, visitor: &mut dyn Visitor);

    fn id(&self) -> NodeId {
        self.info().id()
    }

    fn position(&self) -> Position {
        self.info().position()
    }

    /// All direct children of both hierarchies, in source order
    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children: Vec<NodeRef<'_>> = self
            .expression_children()
            .into_iter()
            .map(NodeRef::Expression)
            .chain(self.statement_children().into_iter().map(NodeRef::Statement))
            .collect();
        children.sort_by_key(|child| child.info().offset());
        children
    }
}

/// A borrowed node of either hierarchy
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Expression(&'a Expression),
    Statement(&'a Statement),
}

impl<'a> NodeRef<'a> {
    pub fn info(&self) -> &'a NodeInfo {
        match self {
            NodeRef::Expression(e) => e.info(),
            NodeRef::Statement(s) => s.info(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.info().id()
    }

    pub fn node_type(&self) -> &'static str {
        match self {
            NodeRef::Expression(e) => e.node_type(),
            NodeRef::Statement(s) => s.node_type(),
        }
    }

    pub fn decompile(&self, indent: usize) -> DecompileResult {
        match self {
            NodeRef::Expression(e) => e.decompile(indent),
            NodeRef::Statement(s) => s.decompile(indent),
        }
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match self {
            NodeRef::Expression(e) => e.children(),
            NodeRef::Statement(s) => s.children(),
        }
    }

    pub fn accept(&self, visitor: &mut dyn Visitor) {
        match self {
            NodeRef::Expression(e) => e.accept(visitor),
            NodeRef::Statement(s) => s.accept(visitor),
        }
    }

    pub fn as_expression(&self) -> Option<&'a Expression> {
        match self {
            NodeRef::Expression(e) => Some(e),
            NodeRef::Statement(_) => None,
        }
    }

    pub fn as_statement(&self) -> Option<&'a Statement> {
        match self {
            NodeRef::Statement(s) => Some(s),
            NodeRef::Expression(_) => None,
        }
    }
}

/// Point every direct child's parent edge at `node`
pub(crate) fn adopt_children<N: AstNode + ?Sized>(node: &N) {
    let parent = node.id();
    for child in node.children() {
        let attached = child.info().attach_to(parent);
        debug_assert!(attached, "node {} already had a parent", child.id());
    }
}
