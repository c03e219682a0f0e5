//! Fluent assertion API for AST nodes

use crate::cfml::ast::traits::{AstNode, NodeRef};
use crate::cfml::ast::{Expression, ExpressionKind, Statement, StatementKind};

// ============================================================================
// Entry Points
// ============================================================================

/// Create an assertion builder for an expression
pub fn assert_expr(expression: &Expression) -> ExpressionAssertion<'_> {
    ExpressionAssertion {
        expression,
        context: "expr".to_string(),
    }
}

/// Create an assertion builder for a statement
pub fn assert_stmt(statement: &Statement) -> StatementAssertion<'_> {
    StatementAssertion {
        statement,
        context: "stmt".to_string(),
    }
}

fn assert_decompiles(node: NodeRef<'_>, expected: &str, context: &str) {
    match node.decompile(0) {
        Ok(actual) => assert_eq!(
            actual, expected,
            "{}: expected decompilation {:?}, found {:?}",
            context, expected, actual
        ),
        Err(error) => panic!("{}: decompilation failed: {}", context, error),
    }
}

fn assert_position(node: NodeRef<'_>, line: usize, column: usize, context: &str) {
    let position = node.info().position();
    assert_eq!(
        (position.line, position.column),
        (line, column),
        "{}: expected {} to start at {}:{}, found {}",
        context,
        node.node_type(),
        line,
        column,
        position
    );
}

// ============================================================================
// Expression Assertions
// ============================================================================

pub struct ExpressionAssertion<'a> {
    expression: &'a Expression,
    context: String,
}

impl<'a> ExpressionAssertion<'a> {
    /// Assert the node kind, e.g. `"Binary"` or `"FullVar"`
    pub fn kind(self, expected: &str) -> Self {
        assert_eq!(
            self.expression.node_type(),
            expected,
            "{}: expected {}, found {}",
            self.context,
            expected,
            self.expression.node_type()
        );
        self
    }

    pub fn decompiles_to(self, expected: &str) -> Self {
        assert_decompiles(NodeRef::Expression(self.expression), expected, &self.context);
        self
    }

    pub fn at(self, line: usize, column: usize) -> Self {
        assert_position(NodeRef::Expression(self.expression), line, column, &self.context);
        self
    }

    pub fn token(self, expected: &str) -> Self {
        assert_eq!(
            self.expression.info().token(),
            expected,
            "{}: unexpected token text",
            self.context
        );
        self
    }

    /// Assert the node is an identifier with this name
    pub fn identifier(self, expected: &str) -> Self {
        match &self.expression.kind {
            ExpressionKind::Identifier(identifier) => assert_eq!(
                identifier.name, expected,
                "{}: unexpected identifier name",
                self.context
            ),
            _ => panic!(
                "{}: expected Identifier, found {}",
                self.context,
                self.expression.node_type()
            ),
        }
        self
    }

    pub fn scope(self, expected: Option<&str>) -> Self {
        match &self.expression.kind {
            ExpressionKind::Identifier(identifier) => assert_eq!(
                identifier.scope.as_deref(),
                expected,
                "{}: unexpected scope",
                self.context
            ),
            _ => panic!(
                "{}: expected Identifier, found {}",
                self.context,
                self.expression.node_type()
            ),
        }
        self
    }

    /// Assert the node is a multipart identifier with these segment names
    pub fn parts(self, expected: &[&str]) -> Self {
        match &self.expression.kind {
            ExpressionKind::MultipartIdentifier(multipart) => {
                assert_eq!(multipart.names(), expected, "{}: unexpected parts", self.context)
            }
            _ => panic!(
                "{}: expected MultipartIdentifier, found {}",
                self.context,
                self.expression.node_type()
            ),
        }
        self
    }

    /// Assert the node is a literal of the given kind (`int`, `float`, `string`, `bool`)
    pub fn literal(self, kind: &str, raw: &str) -> Self {
        match &self.expression.kind {
            ExpressionKind::Literal(literal) => {
                assert_eq!(literal.kind.as_str(), kind, "{}: unexpected literal kind", self.context);
                assert_eq!(literal.raw, raw, "{}: unexpected literal value", self.context);
            }
            _ => panic!(
                "{}: expected Literal, found {}",
                self.context,
                self.expression.node_type()
            ),
        }
        self
    }

    /// Assert the operator of a binary, unary or assignment node
    pub fn operator(self, expected: &str) -> Self {
        let actual = match &self.expression.kind {
            ExpressionKind::Binary(binary) => &binary.operator,
            ExpressionKind::Unary(unary) => &unary.operator,
            ExpressionKind::Assignment(assignment) => &assignment.operator,
            _ => panic!(
                "{}: {} has no operator",
                self.context,
                self.expression.node_type()
            ),
        };
        assert_eq!(actual, expected, "{}: unexpected operator", self.context);
        self
    }

    /// Assert the number of chained targets of an assignment or declaration
    pub fn chain_len(self, expected: usize) -> Self {
        let actual = match &self.expression.kind {
            ExpressionKind::Assignment(assignment) => assignment.chain.len(),
            ExpressionKind::VarDecl(declaration) => declaration.chain.len(),
            _ => panic!(
                "{}: {} has no chain",
                self.context,
                self.expression.node_type()
            ),
        };
        assert_eq!(actual, expected, "{}: unexpected chain length", self.context);
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        let actual = self.expression.children().len();
        assert_eq!(
            actual, expected,
            "{}: expected {} children, found {}",
            self.context, expected, actual
        );
        self
    }

    /// Assert on an expression child by index
    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ExpressionAssertion<'a>),
    {
        let children = self.expression.expression_children();
        assert!(
            index < children.len(),
            "{}: child index {} out of bounds ({} expression children)",
            self.context,
            index,
            children.len()
        );
        assertion(ExpressionAssertion {
            expression: children[index],
            context: format!("{}.{}[{}]", self.context, self.expression.node_type(), index),
        });
        self
    }

    /// Assert on the declaration wrapped by an anonymous function
    pub fn function<F>(self, assertion: F) -> Self
    where
        F: FnOnce(StatementAssertion<'a>),
    {
        match &self.expression.kind {
            ExpressionKind::AnonymousFunction(closure) => assertion(StatementAssertion {
                statement: &closure.declaration,
                context: format!("{}.function", self.context),
            }),
            _ => panic!(
                "{}: expected AnonymousFunction, found {}",
                self.context,
                self.expression.node_type()
            ),
        }
        self
    }
}

// ============================================================================
// Statement Assertions
// ============================================================================

pub struct StatementAssertion<'a> {
    statement: &'a Statement,
    context: String,
}

impl<'a> StatementAssertion<'a> {
    /// Assert the node kind, e.g. `"If"` or `"Lock"`
    pub fn kind(self, expected: &str) -> Self {
        assert_eq!(
            self.statement.node_type(),
            expected,
            "{}: expected {}, found {}",
            self.context,
            expected,
            self.statement.node_type()
        );
        self
    }

    pub fn decompiles_to(self, expected: &str) -> Self {
        assert_decompiles(NodeRef::Statement(self.statement), expected, &self.context);
        self
    }

    pub fn at(self, line: usize, column: usize) -> Self {
        assert_position(NodeRef::Statement(self.statement), line, column, &self.context);
        self
    }

    /// Assert the number of statements in a compound
    pub fn statement_count(self, expected: usize) -> Self {
        let actual = self.compound().len();
        assert_eq!(
            actual,
            expected,
            "{}: expected {} statements, found {}: [{}]",
            self.context,
            expected,
            actual,
            summarize(self.compound())
        );
        self
    }

    /// Assert on a statement of a compound by index
    pub fn statement<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(StatementAssertion<'a>),
    {
        let statements = self.compound();
        assert!(
            index < statements.len(),
            "{}: statement index {} out of bounds ({} statements)",
            self.context,
            index,
            statements.len()
        );
        assertion(StatementAssertion {
            statement: &statements[index],
            context: format!("{}[{}]", self.context, index),
        });
        self
    }

    /// Assert on a statement child by index, in structural order
    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(StatementAssertion<'a>),
    {
        let children = self.statement.statement_children();
        assert!(
            index < children.len(),
            "{}: child index {} out of bounds ({} statement children)",
            self.context,
            index,
            children.len()
        );
        assertion(StatementAssertion {
            statement: children[index],
            context: format!("{}.{}[{}]", self.context, self.statement.node_type(), index),
        });
        self
    }

    /// Assert on the expression of an expression statement
    pub fn expression<F>(self, assertion: F) -> Self
    where
        F: FnOnce(ExpressionAssertion<'a>),
    {
        match self.statement.as_expression() {
            Some(expression) => assertion(ExpressionAssertion {
                expression,
                context: format!("{}.expr", self.context),
            }),
            None => panic!(
                "{}: expected ExpressionStatement, found {}",
                self.context,
                self.statement.node_type()
            ),
        }
        self
    }

    /// Assert an attribute of a tag-style statement decompiles to `expected`
    pub fn attribute(self, name: &str, expected: &str) -> Self {
        let Some(statement) = self.statement.kind.as_attribute_statement() else {
            panic!(
                "{}: {} carries no attributes",
                self.context,
                self.statement.node_type()
            );
        };
        match statement.attributes.get(name) {
            Some(value) => assert_decompiles(NodeRef::Expression(value), expected, &self.context),
            None => panic!(
                "{}: attribute '{}' missing, found [{}]",
                self.context,
                name,
                statement.attributes.names().join(", ")
            ),
        }
        self
    }

    /// Assert the name and parameter names of a function declaration
    pub fn function(self, name: &str, parameters: &[&str]) -> Self {
        let Some(function) = self.statement.as_function() else {
            panic!(
                "{}: expected FunctionDecl, found {}",
                self.context,
                self.statement.node_type()
            );
        };
        assert_eq!(function.name, name, "{}: unexpected function name", self.context);
        let actual: Vec<&str> = function.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(actual, parameters, "{}: unexpected parameters", self.context);
        self
    }

    fn compound(&self) -> &'a [Statement] {
        match &self.statement.kind {
            StatementKind::Compound(compound) => &compound.statements,
            _ => panic!(
                "{}: expected Compound, found {}",
                self.context,
                self.statement.node_type()
            ),
        }
    }
}

fn summarize(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|statement| statement.node_type())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfml::testing::{parse_expr, parse_script};

    #[test]
    fn test_expression_assertions() {
        assert_expr(&parse_expr("a.b.c"))
            .kind("MultipartIdentifier")
            .parts(&["a", "b", "c"])
            .decompiles_to("a.b.c");

        assert_expr(&parse_expr("1 + 'x'"))
            .operator("+")
            .child(0, |left| {
                left.literal("int", "1");
            })
            .child(1, |right| {
                right.literal("string", "x");
            });
    }

    #[test]
    fn test_statement_assertions() {
        let script = parse_script("x = 1;\nlock name='a' timeout=5 { y(); }");
        assert_stmt(&script)
            .statement_count(2)
            .statement(0, |first| {
                first.kind("ExpressionStatement").expression(|expr| {
                    expr.kind("Assignment").at(1, 0);
                });
            })
            .statement(1, |second| {
                second.kind("Lock").at(2, 0).attribute("timeout", "5");
            });
    }

    #[test]
    #[should_panic(expected = "expected Binary, found Identifier")]
    fn test_failures_name_the_found_kind() {
        assert_expr(&parse_expr("a")).kind("Binary");
    }
}
