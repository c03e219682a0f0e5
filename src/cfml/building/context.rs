//! Per-parse building state

use super::expressions::ExpressionVisitor;
use super::statements::StatementVisitor;
use crate::cfml::ast::error::MalformedConstruct;
use crate::cfml::ast::expression::Expression;
use crate::cfml::ast::node::{NodeId, NodeInfo};
use crate::cfml::ast::range::{Position, SourceLocation};
use crate::cfml::ast::statement::Statement;
use crate::cfml::ast::traits::{adopt_children, NodeRef};
use crate::cfml::grammar::dictionary::SyntaxDictionary;
use crate::cfml::grammar::tree::ParseNode;
use std::ops::Range;
use std::sync::Arc;
use tracing::trace;

/// State shared by both visitors during one build
///
/// The id counter and the line index are memoized across calls and cleared by
/// [`AstBuilder::reset`]. The line index is rebuilt automatically when the source changes.
pub struct AstBuilder {
    next_id: u32,
    location: Option<SourceLocation>,
    dictionary: Option<Arc<dyn SyntaxDictionary>>,
    validate_tag_attributes: bool,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AstBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstBuilder")
            .field("next_id", &self.next_id)
            .field("has_dictionary", &self.dictionary.is_some())
            .field("validate_tag_attributes", &self.validate_tag_attributes)
            .finish()
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            location: None,
            dictionary: None,
            validate_tag_attributes: true,
        }
    }

    pub fn with_dictionary(mut self, dictionary: Arc<dyn SyntaxDictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn set_validate_tag_attributes(&mut self, validate: bool) {
        self.validate_tag_attributes = validate;
    }

    pub fn dictionary(&self) -> Option<&dyn SyntaxDictionary> {
        self.dictionary.as_deref()
    }

    /// Whether generic tag statements are checked against the dictionary
    pub fn validates_tags(&self) -> bool {
        self.validate_tag_attributes && self.dictionary.is_some()
    }

    /// Forget the id counter and the cached line index
    pub fn reset(&mut self) {
        trace!(ids = self.next_id, "resetting ast builder");
        self.next_id = 0;
        self.location = None;
    }

    pub fn build_expression(&mut self, source: &str, tree: &ParseNode) -> Result<Expression, MalformedConstruct> {
        self.prepare(source);
        let expression = ExpressionVisitor::new(self).visit(tree)?;
        link(NodeRef::Expression(&expression));
        Ok(expression)
    }

    /// Build the root compound statement of a script
    pub fn build_script(&mut self, source: &str, tree: &ParseNode) -> Result<Statement, MalformedConstruct> {
        self.prepare(source);
        let script = StatementVisitor::new(self).visit_script(tree)?;
        link(NodeRef::Statement(&script));
        Ok(script)
    }

    fn prepare(&mut self, source: &str) {
        let current = self
            .location
            .as_ref()
            .is_some_and(|location| location.is_for(source));
        if !current {
            self.location = Some(SourceLocation::new(source));
        }
    }

    pub(crate) fn position(&self, offset: usize) -> Position {
        self.location
            .as_ref()
            .map_or_else(Position::default, |location| location.byte_to_position(offset))
    }

    /// Info for a node built from `node`, taking its token text when it has one
    pub(crate) fn info(&mut self, node: &ParseNode) -> NodeInfo {
        match &node.token {
            Some(token) => {
                let token = token.clone();
                self.info_at(node.span.clone(), token)
            }
            None => self.info_for_span(node.span.clone()),
        }
    }

    /// Info for a synthesized node, using the first word of its source text as token
    pub(crate) fn info_for_span(&mut self, span: Range<usize>) -> NodeInfo {
        let token = self
            .location
            .as_ref()
            .and_then(|location| location.slice(&span).split_whitespace().next())
            .unwrap_or("")
            .to_string();
        self.info_at(span, token)
    }

    pub(crate) fn info_at(&mut self, span: Range<usize>, token: impl Into<String>) -> NodeInfo {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let position = self.position(span.start);
        NodeInfo::new(id, span, position, token)
    }
}

/// Point every node's parent edge at the node that owns it
fn link(node: NodeRef<'_>) {
    match node {
        NodeRef::Expression(expression) => adopt_children(expression),
        NodeRef::Statement(statement) => adopt_children(statement),
    }
    for child in node.children() {
        link(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfml::ast::traits::AstNode;
    use crate::cfml::grammar::tree::NodeKind;

    fn identifier(name: &str, span: Range<usize>) -> ParseNode {
        ParseNode::new(NodeKind::Identifier, span).with_token(name)
    }

    #[test]
    fn test_ids_restart_after_reset() {
        let mut builder = AstBuilder::new();
        let first = builder.build_expression("a", &identifier("a", 0..1)).unwrap();
        let second = builder.build_expression("a", &identifier("a", 0..1)).unwrap();
        assert_eq!(first.id(), NodeId(0));
        assert_eq!(second.id(), NodeId(1));

        builder.reset();
        let third = builder.build_expression("a", &identifier("a", 0..1)).unwrap();
        assert_eq!(third.id(), NodeId(0));
    }

    #[test]
    fn test_line_index_follows_the_source() {
        let mut builder = AstBuilder::new();
        let first = builder.build_expression("\nb", &identifier("b", 1..2)).unwrap();
        assert_eq!(first.position(), Position::new(2, 0));

        let second = builder.build_expression("  b", &identifier("b", 2..3)).unwrap();
        assert_eq!(second.position(), Position::new(1, 2));
    }

    #[test]
    fn test_children_are_linked_to_parents() {
        let source = "a + b";
        let tree = ParseNode::new(NodeKind::BinaryExpression, 0..5)
            .with_token("+")
            .with_children(vec![identifier("a", 0..1), identifier("b", 4..5)]);
        let expression = AstBuilder::new().build_expression(source, &tree).unwrap();
        assert_eq!(expression.info().parent(), None);
        for child in expression.children() {
            assert_eq!(child.info().parent(), Some(expression.id()));
        }
    }
}
