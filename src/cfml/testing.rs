//! Testing utilities for AST assertions
//!
//! # Parser Testing Guidelines
//!
//! Parser tests check the shape of the AST and its canonical decompilation, not generalities
//! like node counts. This module provides the two tools they are written with:
//!
//! 1. **[parse_expr] / [parse_script]** - parse through a default driver, panicking with the
//!    error on failure
//! 2. **[assert_expr] / [assert_stmt]** - fluent assertions over the resulting nodes
//!
//! ### The Problem with Manual Testing
//!
//! Checking a nested ternary by hand looks like this:
//!
//! ```rust-example
//! match &expr.kind {
//!     ExpressionKind::Ternary(ternary) => {
//!         match &ternary.then_branch.kind {
//!             ExpressionKind::Ternary(inner) => { /* ... */ }
//!             _ => panic!("expected ternary"),
//!         }
//!     }
//!     _ => panic!("expected ternary"),
//! }
//! ```
//!
//! ### The Solution: Fluent Assertion API
//!
//! ```rust-example
//! use cfml_parser::cfml::testing::{assert_expr, parse_expr};
//!
//! assert_expr(&parse_expr("a == b ? c > a ? 'x' : 'y' : 'z'"))
//!     .kind("Ternary")
//!     .child(1, |then_branch| {
//!         then_branch.kind("Ternary");
//!     })
//!     .decompiles_to("a==b?c>a?'x':'y':'z'");
//! ```
//!
//! Children are addressed the way generic traversal sees them: expression children first,
//! then statement children, in structural order.

mod assertions;

pub use assertions::{assert_expr, assert_stmt, ExpressionAssertion, StatementAssertion};

use crate::cfml::ast::{Expression, Statement};
use crate::cfml::parsing::ParseDriver;

/// Parse a single expression, panicking on failure
pub fn parse_expr(source: &str) -> Expression {
    match ParseDriver::default().parse_expression(source) {
        Ok(expression) => expression,
        Err(error) => panic!("failed to parse expression {:?}: {}", source, error),
    }
}

/// Parse a script, panicking on failure
pub fn parse_script(source: &str) -> Statement {
    match ParseDriver::default().parse_script(source) {
        Ok(script) => script,
        Err(error) => panic!("failed to parse script {:?}: {}", source, error),
    }
}
