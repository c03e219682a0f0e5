//! The expression hierarchy

use super::decompile::precedence;
use super::elements::{
    AnonymousFunction, ArrayLiteral, Assignment, Binary, ClosureStyle, Element, Elvis, FullVar,
    FunctionCall, Identifier, Literal, Member, MultipartIdentifier, Nested, New, StructLiteral,
    Ternary, Unary, VarDecl,
};
use super::error::{DecompileResult, MalformedConstruct};
use super::node::NodeInfo;
use super::statement::Statement;
use super::traits::{AstNode, Visitor};

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(Literal),
    Identifier(Identifier),
    MultipartIdentifier(MultipartIdentifier),
    FullVar(FullVar),
    Member(Member),
    Binary(Binary),
    Unary(Unary),
    Ternary(Ternary),
    Elvis(Elvis),
    Assignment(Assignment),
    VarDecl(VarDecl),
    Array(ArrayLiteral),
    Struct(StructLiteral),
    FunctionCall(FunctionCall),
    AnonymousFunction(AnonymousFunction),
    New(New),
    Nested(Nested),
}

macro_rules! with_element {
    ($kind:expr, $element:ident => $body:expr) => {
        match $kind {
            ExpressionKind::Literal($element) => $body,
            ExpressionKind::Identifier($element) => $body,
            ExpressionKind::MultipartIdentifier($element) => $body,
            ExpressionKind::FullVar($element) => $body,
            ExpressionKind::Member($element) => $body,
            ExpressionKind::Binary($element) => $body,
            ExpressionKind::Unary($element) => $body,
            ExpressionKind::Ternary($element) => $body,
            ExpressionKind::Elvis($element) => $body,
            ExpressionKind::Assignment($element) => $body,
            ExpressionKind::VarDecl($element) => $body,
            ExpressionKind::Array($element) => $body,
            ExpressionKind::Struct($element) => $body,
            ExpressionKind::FunctionCall($element) => $body,
            ExpressionKind::AnonymousFunction($element) => $body,
            ExpressionKind::New($element) => $body,
            ExpressionKind::Nested($element) => $body,
        }
    };
}

impl ExpressionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExpressionKind::Literal(_) => "Literal",
            ExpressionKind::Identifier(_) => "Identifier",
            ExpressionKind::MultipartIdentifier(_) => "MultipartIdentifier",
            ExpressionKind::FullVar(_) => "FullVar",
            ExpressionKind::Member(_) => "Member",
            ExpressionKind::Binary(_) => "Binary",
            ExpressionKind::Unary(_) => "Unary",
            ExpressionKind::Ternary(_) => "Ternary",
            ExpressionKind::Elvis(_) => "Elvis",
            ExpressionKind::Assignment(_) => "Assignment",
            ExpressionKind::VarDecl(_) => "VarDecl",
            ExpressionKind::Array(_) => "Array",
            ExpressionKind::Struct(_) => "Struct",
            ExpressionKind::FunctionCall(_) => "FunctionCall",
            ExpressionKind::AnonymousFunction(_) => "AnonymousFunction",
            ExpressionKind::New(_) => "New",
            ExpressionKind::Nested(_) => "Nested",
        }
    }
}

/// An expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    info: NodeInfo,
    pub kind: ExpressionKind,
}

impl Expression {
    pub fn new(info: NodeInfo, kind: ExpressionKind) -> Self {
        Self { info, kind }
    }

    pub(crate) fn into_parts(self) -> (NodeInfo, ExpressionKind) {
        (self.info, self.kind)
    }

    /// How tightly the expression binds; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match &self.kind {
            ExpressionKind::Binary(binary) => binary.precedence(),
            ExpressionKind::Unary(unary) => unary.precedence(),
            ExpressionKind::Ternary(_) | ExpressionKind::Elvis(_) => precedence::TERNARY,
            ExpressionKind::Assignment(_) | ExpressionKind::VarDecl(_) => precedence::ASSIGNMENT,
            ExpressionKind::AnonymousFunction(function)
                if function.style == ClosureStyle::ArrowExpression =>
            {
                precedence::ASSIGNMENT
            }
            _ => precedence::PRIMARY,
        }
    }

    /// Structural checks run when the node is built
    pub fn validate(&self) -> Result<(), MalformedConstruct> {
        let position = self.info.position();
        match &self.kind {
            ExpressionKind::MultipartIdentifier(multipart) => multipart.validate(position),
            ExpressionKind::FullVar(full_var) if full_var.segments.is_empty() => {
                Err(MalformedConstruct::TooFewSegments {
                    kind: "FullVar",
                    minimum: 1,
                    found: 0,
                    position,
                })
            }
            _ => Ok(()),
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match &self.kind {
            ExpressionKind::Identifier(identifier) => Some(identifier),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExpressionKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&FunctionCall> {
        match &self.kind {
            ExpressionKind::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    /// An identifier or a dotted chain of identifiers
    pub fn is_name(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::Identifier(_) | ExpressionKind::MultipartIdentifier(_)
        )
    }
}

impl AstNode for Expression {
    fn info(&self) -> &NodeInfo {
        &self.info
    }

    fn node_type(&self) -> &'static str {
        self.kind.name()
    }

    fn decompile(&self, indent: usize) -> DecompileResult {
        let position = self.info.position();
        with_element!(&self.kind, element => element.render(position, indent))
    }

    fn expression_children(&self) -> Vec<&Expression> {
        with_element!(&self.kind, element => element.expressions())
    }

    fn statement_children(&self) -> Vec<&Statement> {
        with_element!(&self.kind, element => element.statements())
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_expression(self);
        for child in self.children() {
            child.accept(visitor);
        }
        visitor.leave_expression(self);
    }
}
