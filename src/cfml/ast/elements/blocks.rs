//! Statement sequences

use super::Element;
use crate::cfml::ast::decompile::{braced, indentation};
use crate::cfml::ast::error::DecompileResult;
use crate::cfml::ast::range::Position;
use crate::cfml::ast::statement::{Statement, StatementKind};
use crate::cfml::ast::traits::AstNode;

/// A sequence of statements: a `{ }` block, or the unbraced root of a script
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    pub statements: Vec<Statement>,
    pub braced: bool,
}

impl Compound {
    pub fn block() -> Self {
        Self {
            statements: Vec::new(),
            braced: true,
        }
    }

    pub fn root() -> Self {
        Self {
            statements: Vec::new(),
            braced: false,
        }
    }

    /// Append a statement. Function declarations are hoisted in front of every other
    /// statement, after the declarations hoisted before them.
    pub fn aggregate(&mut self, statement: Statement) {
        if matches!(statement.kind, StatementKind::FunctionDecl(_)) {
            let hoisted = self
                .statements
                .iter()
                .take_while(|existing| matches!(existing.kind, StatementKind::FunctionDecl(_)))
                .count();
            self.statements.insert(hoisted, statement);
        } else {
            self.statements.push(statement);
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Element for Compound {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        if self.braced {
            return braced(&self.statements, indent);
        }
        let separator = format!("\n{}", indentation(indent));
        let statements = self
            .statements
            .iter()
            .map(|statement| statement.decompile(indent))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statements.join(&separator))
    }

    fn statements(&self) -> Vec<&Statement> {
        self.statements.iter().collect()
    }
}
