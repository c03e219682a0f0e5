//! Assignments and `var` declarations
//!
//!     `a = b = c = 1` is one [`Assignment`] whose chain holds the middle targets in source
//!     order, rather than assignments nested on the right. The same applies to declarations:
//!
//!         var yy = var zz = qq = 1
//!
//!     is a [`VarDecl`] for `yy` whose chain is `[var zz, qq]` and whose initializer is `1`.
//!     Only the plain `=` operator chains; compound operators (`+=`, `&=`, ...) never do.

use super::Element;
use crate::cfml::ast::decompile::{operand, precedence};
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::expression::Expression;
use crate::cfml::ast::range::Position;
use crate::cfml::ast::traits::AstNode;

/// A middle target in an assignment chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainTarget {
    /// Written with `var`
    pub declared: bool,
    pub target: Expression,
}

impl ChainTarget {
    fn render(&self, indent: usize) -> DecompileResult {
        let target = self.target.decompile(indent)?;
        Ok(if self.declared {
            format!("var {}", target)
        } else {
            target
        })
    }
}

fn render_chain(chain: &[ChainTarget], indent: usize) -> DecompileResult {
    let mut out = String::new();
    for target in chain {
        out.push_str(" = ");
        out.push_str(&target.render(indent)?);
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub operator: String,
    pub left: Box<Expression>,
    pub chain: Vec<ChainTarget>,
    pub right: Box<Expression>,
}

impl Assignment {
    pub fn is_chainable(&self) -> bool {
        self.operator == "="
    }

    /// Every assigned target, leftmost first
    pub fn targets(&self) -> Vec<&Expression> {
        std::iter::once(self.left.as_ref())
            .chain(self.chain.iter().map(|target| &target.target))
            .collect()
    }
}

impl Element for Assignment {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        if !self.chain.is_empty() && !self.is_chainable() {
            return Err(MalformedConstruct::invalid(
                "Assignment",
                format!("operator '{}' cannot assign a chain", self.operator),
                position,
            ));
        }
        Ok(format!(
            "{}{} {} {}",
            self.left.decompile(indent)?,
            render_chain(&self.chain, indent)?,
            self.operator,
            operand(&self.right, precedence::ASSIGNMENT, indent)?,
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        let mut children = self.targets();
        children.push(&self.right);
        children
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Box<Expression>,
    pub chain: Vec<ChainTarget>,
    pub initializer: Option<Box<Expression>>,
}

impl VarDecl {
    /// The declared name as written, e.g. `local.x`
    pub fn declared_name(&self) -> String {
        self.name.decompile(0).unwrap_or_else(|_| self.name.info().token().to_string())
    }
}

impl Element for VarDecl {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        let mut out = format!("var {}", self.name.decompile(indent)?);
        match &self.initializer {
            Some(initializer) => {
                out.push_str(&render_chain(&self.chain, indent)?);
                out.push_str(" = ");
                out.push_str(&operand(initializer, precedence::ASSIGNMENT, indent)?);
            }
            None if !self.chain.is_empty() => {
                return Err(MalformedConstruct::invalid(
                    "VarDecl",
                    "chained declaration without an initializer",
                    position,
                ));
            }
            None => {}
        }
        Ok(out)
    }

    fn expressions(&self) -> Vec<&Expression> {
        let mut children = vec![self.name.as_ref()];
        children.extend(self.chain.iter().map(|target| &target.target));
        if let Some(initializer) = &self.initializer {
            children.push(initializer);
        }
        children
    }
}
