//! Exception handling

use super::Element;
use crate::cfml::ast::decompile::{body, quote_string};
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::range::Position;
use crate::cfml::ast::statement::{Statement, StatementKind};
use crate::cfml::ast::traits::AstNode;

#[derive(Debug, Clone, PartialEq)]
pub struct TryCatch {
    pub body: Box<Statement>,
    /// Catch clause statements in declared order
    pub catches: Vec<Statement>,
    pub finally: Option<Box<Statement>>,
}

impl TryCatch {
    pub(crate) fn validate(&self, position: Position) -> Result<(), MalformedConstruct> {
        if self.catches.is_empty() && self.finally.is_none() {
            return Err(MalformedConstruct::MissingCatchOrFinally { position });
        }
        if let Some(other) = self
            .catches
            .iter()
            .find(|clause| !matches!(clause.kind, StatementKind::Catch(_)))
        {
            return Err(MalformedConstruct::invalid(
                "TryCatch",
                format!("{} statement in place of a catch clause", other.node_type()),
                position,
            ));
        }
        Ok(())
    }
}

impl Element for TryCatch {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        self.validate(position)?;
        let mut out = format!("try {}", body(&self.body, indent)?);
        for clause in &self.catches {
            out.push(' ');
            out.push_str(&clause.decompile(indent)?);
        }
        if let Some(finally) = &self.finally {
            out.push_str(" finally ");
            out.push_str(&body(finally, indent)?);
        }
        Ok(out)
    }

    fn statements(&self) -> Vec<&Statement> {
        let mut children = vec![self.body.as_ref()];
        children.extend(self.catches.iter());
        children.extend(self.finally.as_deref());
        children
    }
}

/// `catch (type variable) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    pub exception_type: String,
    pub variable: String,
    pub body: Box<Statement>,
}

impl Catch {
    pub fn catches_any(&self) -> bool {
        self.exception_type.eq_ignore_ascii_case("any")
    }

    fn render_type(&self) -> String {
        let is_path = !self.exception_type.is_empty()
            && self
                .exception_type
                .split('.')
                .all(|part| {
                    part.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
                        && part.chars().all(|c| c.is_alphanumeric() || c == '_')
                });
        if is_path {
            self.exception_type.clone()
        } else {
            quote_string(&self.exception_type)
        }
    }
}

impl Element for Catch {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!(
            "catch ({} {}) {}",
            self.render_type(),
            self.variable,
            body(&self.body, indent)?
        ))
    }

    fn statements(&self) -> Vec<&Statement> {
        vec![&self.body]
    }
}
