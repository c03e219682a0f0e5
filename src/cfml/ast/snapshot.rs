//! AST Snapshot - a normalized, serializable view of the tree
//!
//! The snapshot captures node types, labels, positions, kind-specific attributes and
//! children in plain data, so tooling and tests can compare or print trees without walking
//! the typed AST themselves. Attributes are kept in a sorted map so the JSON rendering is
//! stable.

use super::elements::ClosureStyle;
use super::expression::{Expression, ExpressionKind};
use super::statement::{Statement, StatementKind};
use super::traits::NodeRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstSnapshot {
    /// The kind of node (e.g. "Binary", "TryCatch")
    pub node_type: String,

    /// Originating token text
    pub label: String,

    pub id: u32,
    pub parent: Option<u32>,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,

    /// Kind-specific fields
    pub attributes: BTreeMap<String, String>,

    pub children: Vec<AstSnapshot>,
}

impl AstSnapshot {
    fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Depth-first count of nodes in the snapshot
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(AstSnapshot::node_count).sum::<usize>()
    }
}

pub fn snapshot_expression(expression: &Expression) -> AstSnapshot {
    snapshot_node(NodeRef::Expression(expression))
}

pub fn snapshot_statement(statement: &Statement) -> AstSnapshot {
    snapshot_node(NodeRef::Statement(statement))
}

pub fn snapshot_node(node: NodeRef<'_>) -> AstSnapshot {
    let info = node.info();
    let base = AstSnapshot {
        node_type: node.node_type().to_string(),
        label: info.token().to_string(),
        id: info.id().0,
        parent: info.parent().map(|parent| parent.0),
        line: info.line(),
        column: info.column(),
        start: info.offset(),
        end: info.end(),
        attributes: BTreeMap::new(),
        children: node.children().into_iter().map(snapshot_node).collect(),
    };
    match node {
        NodeRef::Expression(expression) => expression_attributes(base, expression),
        NodeRef::Statement(statement) => statement_attributes(base, statement),
    }
}

fn expression_attributes(snapshot: AstSnapshot, expression: &Expression) -> AstSnapshot {
    match &expression.kind {
        ExpressionKind::Literal(literal) => snapshot
            .with_attribute("kind", literal.kind.as_str())
            .with_attribute("value", &literal.raw),
        ExpressionKind::Identifier(identifier) => {
            let snapshot = snapshot.with_attribute("name", &identifier.name);
            match &identifier.scope {
                Some(scope) => snapshot.with_attribute("scope", scope),
                None => snapshot,
            }
        }
        ExpressionKind::Binary(binary) => snapshot.with_attribute("operator", &binary.operator),
        ExpressionKind::Unary(unary) => snapshot
            .with_attribute("operator", &unary.operator)
            .with_attribute("postfix", unary.postfix),
        ExpressionKind::Assignment(assignment) => snapshot
            .with_attribute("operator", &assignment.operator)
            .with_attribute("targets", assignment.targets().len()),
        ExpressionKind::VarDecl(declaration) => {
            snapshot.with_attribute("targets", declaration.chain.len() + 1)
        }
        ExpressionKind::FunctionCall(call) => {
            let named: Vec<&str> = call
                .arguments
                .iter()
                .filter_map(|argument| argument.name.as_deref())
                .collect();
            snapshot
                .with_attribute("arguments", call.arguments.len())
                .with_attribute("named", named.join(","))
        }
        ExpressionKind::AnonymousFunction(function) => snapshot.with_attribute(
            "style",
            match function.style {
                ClosureStyle::Function => "function",
                ClosureStyle::Arrow => "arrow",
                ClosureStyle::ArrowExpression => "arrow-expression",
            },
        ),
        _ => snapshot,
    }
}

fn statement_attributes(snapshot: AstSnapshot, statement: &Statement) -> AstSnapshot {
    if let Some(tagged) = statement.kind.as_attribute_statement() {
        let names: Vec<String> = tagged
            .attributes
            .sorted()
            .into_iter()
            .map(|attribute| attribute.name.to_ascii_lowercase())
            .collect();
        return snapshot
            .with_attribute("keyword", &tagged.keyword)
            .with_attribute("attributes", names.join(","))
            .with_attribute("body", tagged.body.is_some());
    }
    match &statement.kind {
        StatementKind::Compound(compound) => snapshot.with_attribute("braced", compound.braced),
        StatementKind::Case(case) => snapshot.with_attribute("default", case.is_default()),
        StatementKind::Catch(catch) => snapshot
            .with_attribute("type", &catch.exception_type)
            .with_attribute("variable", &catch.variable),
        StatementKind::FunctionDecl(function) => {
            let snapshot = snapshot
                .with_attribute("name", &function.name)
                .with_attribute("access", function.effective_access());
            match &function.return_type {
                Some(return_type) => snapshot.with_attribute("returns", return_type),
                None => snapshot,
            }
        }
        StatementKind::ForIn(for_in) => snapshot.with_attribute("declared", for_in.declared),
        StatementKind::Import(import) => snapshot.with_attribute("path", &import.path),
        _ => snapshot,
    }
}
