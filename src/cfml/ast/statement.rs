//! The statement hierarchy

use super::elements::{
    AttributeStatement, Case, Catch, Component, Compound, DoWhile, Element, For, ForIn,
    FunctionDecl, If, Import, Include, JumpStatement, Switch, TryCatch, While,
};
use super::error::{DecompileResult, MalformedConstruct};
use super::expression::Expression;
use super::node::NodeInfo;
use super::traits::{AstNode, Visitor};

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Expression(Expression),
    Compound(Compound),
    If(If),
    While(While),
    DoWhile(DoWhile),
    For(For),
    ForIn(ForIn),
    Switch(Switch),
    Case(Case),
    TryCatch(TryCatch),
    Catch(Catch),
    FunctionDecl(FunctionDecl),
    Component(Component),
    Interface(Component),
    Property(AttributeStatement),
    Import(Import),
    Include(Include),
    Lock(AttributeStatement),
    Thread(AttributeStatement),
    Transaction(AttributeStatement),
    Param(AttributeStatement),
    Admin(AttributeStatement),
    Tag(AttributeStatement),
    Abort(JumpStatement),
    Break,
    Continue,
    Return(JumpStatement),
    Throw(JumpStatement),
    Exit(JumpStatement),
    Empty,
}

impl StatementKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatementKind::Expression(_) => "ExpressionStatement",
            StatementKind::Compound(_) => "Compound",
            StatementKind::If(_) => "If",
            StatementKind::While(_) => "While",
            StatementKind::DoWhile(_) => "DoWhile",
            StatementKind::For(_) => "For",
            StatementKind::ForIn(_) => "ForIn",
            StatementKind::Switch(_) => "Switch",
            StatementKind::Case(_) => "Case",
            StatementKind::TryCatch(_) => "TryCatch",
            StatementKind::Catch(_) => "Catch",
            StatementKind::FunctionDecl(_) => "FunctionDecl",
            StatementKind::Component(_) => "Component",
            StatementKind::Interface(_) => "Interface",
            StatementKind::Property(_) => "Property",
            StatementKind::Import(_) => "Import",
            StatementKind::Include(_) => "Include",
            StatementKind::Lock(_) => "Lock",
            StatementKind::Thread(_) => "Thread",
            StatementKind::Transaction(_) => "Transaction",
            StatementKind::Param(_) => "Param",
            StatementKind::Admin(_) => "Admin",
            StatementKind::Tag(_) => "Tag",
            StatementKind::Abort(_) => "Abort",
            StatementKind::Break => "Break",
            StatementKind::Continue => "Continue",
            StatementKind::Return(_) => "Return",
            StatementKind::Throw(_) => "Throw",
            StatementKind::Exit(_) => "Exit",
            StatementKind::Empty => "Empty",
        }
    }

    /// Payload of the tag-style statement kinds
    pub fn as_attribute_statement(&self) -> Option<&AttributeStatement> {
        match self {
            StatementKind::Property(statement)
            | StatementKind::Lock(statement)
            | StatementKind::Thread(statement)
            | StatementKind::Transaction(statement)
            | StatementKind::Param(statement)
            | StatementKind::Admin(statement)
            | StatementKind::Tag(statement) => Some(statement),
            _ => None,
        }
    }

    fn element(&self) -> Option<&dyn Element> {
        let element: &dyn Element = match self {
            StatementKind::Compound(e) => e,
            StatementKind::If(e) => e,
            StatementKind::While(e) => e,
            StatementKind::DoWhile(e) => e,
            StatementKind::For(e) => e,
            StatementKind::ForIn(e) => e,
            StatementKind::Switch(e) => e,
            StatementKind::Case(e) => e,
            StatementKind::TryCatch(e) => e,
            StatementKind::Catch(e) => e,
            StatementKind::FunctionDecl(e) => e,
            StatementKind::Component(e) | StatementKind::Interface(e) => e,
            StatementKind::Import(e) => e,
            StatementKind::Include(e) => e,
            StatementKind::Property(e)
            | StatementKind::Lock(e)
            | StatementKind::Thread(e)
            | StatementKind::Transaction(e)
            | StatementKind::Param(e)
            | StatementKind::Admin(e)
            | StatementKind::Tag(e) => e,
            _ => return None,
        };
        Some(element)
    }

    fn jump(&self) -> Option<(&'static str, &JumpStatement)> {
        match self {
            StatementKind::Abort(jump) => Some(("abort", jump)),
            StatementKind::Return(jump) => Some(("return", jump)),
            StatementKind::Throw(jump) => Some(("throw", jump)),
            StatementKind::Exit(jump) => Some(("exit", jump)),
            _ => None,
        }
    }
}

/// A statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    info: NodeInfo,
    pub kind: StatementKind,
}

impl Statement {
    pub fn new(info: NodeInfo, kind: StatementKind) -> Self {
        Self { info, kind }
    }

    /// Structural checks run when the node is built
    pub fn validate(&self) -> Result<(), MalformedConstruct> {
        let position = self.info.position();
        match &self.kind {
            StatementKind::TryCatch(try_catch) => try_catch.validate(position),
            StatementKind::Switch(switch) => switch.validate(position),
            StatementKind::Lock(statement)
            | StatementKind::Transaction(statement)
            | StatementKind::Param(statement) => statement.validate(position),
            _ => Ok(()),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            StatementKind::FunctionDecl(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match &self.kind {
            StatementKind::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    /// The expression of an expression statement
    pub fn as_expression(&self) -> Option<&Expression> {
        match &self.kind {
            StatementKind::Expression(expression) => Some(expression),
            _ => None,
        }
    }
}

impl AstNode for Statement {
    fn info(&self) -> &NodeInfo {
        &self.info
    }

    fn node_type(&self) -> &'static str {
        self.kind.name()
    }

    fn decompile(&self, indent: usize) -> DecompileResult {
        if let Some(element) = self.kind.element() {
            return element.render(self.info.position(), indent);
        }
        if let Some((keyword, jump)) = self.kind.jump() {
            return jump.render(keyword, indent);
        }
        match &self.kind {
            StatementKind::Expression(expression) => Ok(format!("{};", expression.decompile(indent)?)),
            StatementKind::Break => Ok("break;".to_string()),
            StatementKind::Continue => Ok("continue;".to_string()),
            _ => Ok(";".to_string()),
        }
    }

    fn expression_children(&self) -> Vec<&Expression> {
        if let Some(element) = self.kind.element() {
            return element.expressions();
        }
        if let Some((_, jump)) = self.kind.jump() {
            return jump.expressions();
        }
        match &self.kind {
            StatementKind::Expression(expression) => vec![expression],
            _ => Vec::new(),
        }
    }

    fn statement_children(&self) -> Vec<&Statement> {
        self.kind
            .element()
            .map(|element| element.statements())
            .unwrap_or_default()
    }

    fn accept(&self, visitor: &mut dyn Visitor) {
        visitor.visit_statement(self);
        for child in self.children() {
            child.accept(visitor);
        }
        visitor.leave_statement(self);
    }
}
