//! Statements leaving the current flow: `return`, `throw`, `abort` and `exit`

use crate::cfml::ast::error::DecompileResult;
use crate::cfml::ast::expression::Expression;
use crate::cfml::ast::traits::AstNode;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JumpStatement {
    pub value: Option<Expression>,
}

impl JumpStatement {
    pub fn new(value: Option<Expression>) -> Self {
        Self { value }
    }

    pub(crate) fn render(&self, keyword: &str, indent: usize) -> DecompileResult {
        match &self.value {
            Some(value) => Ok(format!("{} {};", keyword, value.decompile(indent)?)),
            None => Ok(format!("{};", keyword)),
        }
    }

    pub(crate) fn expressions(&self) -> Vec<&Expression> {
        self.value.iter().collect()
    }
}
