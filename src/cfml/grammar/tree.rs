//! Parse-tree IR
//!
//! The tree a grammar engine hands to the visitors: a closed set of node kinds, each node
//! with an optional token text, its byte span and ordered children. It carries no semantic
//! folding; `a.b(1)` is an access path of a primary and two suffixes, and it is up to the
//! visitors to turn that into the right AST node.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Literals and names
    IntegerLiteral,
    FloatLiteral,
    /// Token is the unescaped value
    StringLiteral,
    BooleanLiteral,
    Identifier,

    // Access paths: first child is the primary, the rest are suffixes
    AccessPath,
    /// Token is the member name; the span covers the name, not the dot
    DotSuffix,
    IndexSuffix,
    /// Children are `Argument`s
    CallSuffix,
    /// Token is the argument name when named
    Argument,

    // Operators; token is the operator text
    BinaryExpression,
    PrefixExpression,
    PostfixExpression,
    TernaryExpression,
    ElvisExpression,
    AssignmentExpression,
    /// Children: name, optional initializer
    VarDeclaration,
    ParenthesizedExpression,
    NestedExpression,

    // Collections and construction
    ArrayLiteral,
    StructLiteral,
    /// Children: key, value
    StructEntry,
    /// Children: type path, then `Argument`s
    NewExpression,
    /// Token is the closure style; children: parameter list, attributes, body
    FunctionExpression,

    // Statements
    ScriptBlock,
    Block,
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    /// Children: `ForInit`, `ForCondition`, `ForStep`, body
    ForStatement,
    ForInit,
    ForCondition,
    ForStep,
    /// Token is `var` when the variable is declared; children: variable, collection, body
    ForInStatement,
    SwitchStatement,
    Case,
    DefaultCase,
    TryStatement,
    /// Token is the exception type; children: variable identifier, body
    Catch,
    Finally,
    /// Token is the name
    FunctionDeclaration,
    Modifier,
    TypeName,
    ParameterList,
    /// Token is the name
    Parameter,
    ParameterRequired,
    ParameterDefault,
    /// Token is the name; child is the value
    Attribute,
    /// Token is `component` or `interface`
    ComponentDeclaration,
    /// Token is the statement keyword; children: attributes, optional body
    TagStatement,
    /// Token is the dotted path
    ImportStatement,
    IncludeStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    AbortStatement,
    ExitStatement,
    ThrowStatement,
    EmptyStatement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    pub kind: NodeKind,
    pub token: Option<String>,
    pub span: Range<usize>,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn new(kind: NodeKind, span: Range<usize>) -> Self {
        Self {
            kind,
            token: None,
            span,
            children: Vec::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_children(mut self, children: Vec<ParseNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: ParseNode) -> Self {
        self.children.push(child);
        self
    }

    /// Token text, empty when the node has none
    pub fn text(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }

    pub fn child(&self, index: usize) -> Option<&ParseNode> {
        self.children.get(index)
    }

    pub fn first_of(&self, kind: NodeKind) -> Option<&ParseNode> {
        self.children.iter().find(|child| child.kind == kind)
    }

    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &ParseNode> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ParseNode::size).sum::<usize>()
    }
}
