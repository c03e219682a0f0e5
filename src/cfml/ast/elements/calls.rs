//! Calls, closures, `new` and `#nested#` expressions

use super::function::FunctionDecl;
use super::Element;
use crate::cfml::ast::decompile::{operand, precedence};
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::expression::{Expression, ExpressionKind};
use crate::cfml::ast::range::Position;
use crate::cfml::ast::statement::{Statement, StatementKind};
use crate::cfml::ast::traits::AstNode;

/// Render an element of a comma-separated list. Assignments are parenthesized so they are
/// not read back as named arguments; closures never need it.
pub(crate) fn list_item(expression: &Expression, indent: usize) -> DecompileResult {
    match expression.kind {
        ExpressionKind::AnonymousFunction(_) => expression.decompile(indent),
        _ => operand(expression, precedence::TERNARY, indent),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expression,
}

impl Argument {
    pub fn positional(value: Expression) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Expression) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    fn render(&self, indent: usize) -> DecompileResult {
        let value = list_item(&self.value, indent)?;
        Ok(match &self.name {
            Some(name) => format!("{}={}", name, value),
            None => value,
        })
    }
}

fn render_arguments(arguments: &[Argument], indent: usize) -> DecompileResult {
    let arguments = arguments
        .iter()
        .map(|argument| argument.render(indent))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(arguments.join(","))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub callee: Box<Expression>,
    pub arguments: Vec<Argument>,
}

impl FunctionCall {
    /// Callee name when the callee is a plain identifier
    pub fn simple_name(&self) -> Option<&str> {
        match &self.callee.kind {
            ExpressionKind::Identifier(identifier) if identifier.scope.is_none() => {
                Some(identifier.name.as_str())
            }
            _ => None,
        }
    }

    pub fn has_only_named_arguments(&self) -> bool {
        self.arguments.iter().all(|argument| argument.name.is_some())
    }
}

impl Element for FunctionCall {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!(
            "{}({})",
            operand(&self.callee, precedence::PRIMARY, indent)?,
            render_arguments(&self.arguments, indent)?
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        std::iter::once(self.callee.as_ref())
            .chain(self.arguments.iter().map(|argument| &argument.value))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureStyle {
    /// `function(a) { ... }`
    Function,
    /// `(a) => { ... }`
    Arrow,
    /// `(a) => expression`
    ArrowExpression,
}

/// A function literal. The declaration is a nameless function declaration statement; for
/// [`ClosureStyle::ArrowExpression`] its body is a single return statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousFunction {
    pub declaration: Box<Statement>,
    pub style: ClosureStyle,
}

impl AnonymousFunction {
    pub fn function(&self) -> Option<&FunctionDecl> {
        match &self.declaration.kind {
            StatementKind::FunctionDecl(function) => Some(function),
            _ => None,
        }
    }
}

impl Element for AnonymousFunction {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        let function = self.function().ok_or_else(|| {
            MalformedConstruct::invalid(
                "AnonymousFunction",
                format!("wraps a {} statement", self.declaration.node_type()),
                position,
            )
        })?;
        match self.style {
            ClosureStyle::Function => Ok(format!(
                "function({}){} {}",
                function.render_parameters(indent)?,
                function.attributes.render_suffix(indent)?,
                function.body.decompile(indent)?
            )),
            ClosureStyle::Arrow => Ok(format!(
                "({})=>{}",
                function.render_parameters(indent)?,
                function.body.decompile(indent)?
            )),
            ClosureStyle::ArrowExpression => {
                let value = match &function.body.kind {
                    StatementKind::Return(jump) => jump.value.as_ref(),
                    _ => None,
                };
                let value = value.ok_or_else(|| {
                    MalformedConstruct::invalid(
                        "AnonymousFunction",
                        "arrow expression body must return a value",
                        position,
                    )
                })?;
                Ok(format!(
                    "({})=>{}",
                    function.render_parameters(indent)?,
                    operand(value, precedence::ASSIGNMENT, indent)?
                ))
            }
        }
    }

    fn statements(&self) -> Vec<&Statement> {
        vec![&self.declaration]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct New {
    /// Dotted type path or string literal
    pub class: Box<Expression>,
    pub arguments: Vec<Argument>,
}

impl Element for New {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!(
            "new {}({})",
            self.class.decompile(indent)?,
            render_arguments(&self.arguments, indent)?
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        std::iter::once(self.class.as_ref())
            .chain(self.arguments.iter().map(|argument| &argument.value))
            .collect()
    }
}

/// `#expression#`
#[derive(Debug, Clone, PartialEq)]
pub struct Nested {
    pub inner: Box<Expression>,
}

impl Element for Nested {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!("#{}#", self.inner.decompile(indent)?))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.inner]
    }
}
