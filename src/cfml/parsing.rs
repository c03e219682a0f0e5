//! Parsing module for CFML script
//!
//! This module ties the grammar engine and the visitors together:
//! 1. **Grammar**: the engine turns source text into a parse tree, FAST first, FULL on failure
//! 2. **Building**: the visitors fold the parse tree into an AST
//! 3. **Diagnostics**: grammar errors and structural violations accumulate on the driver
//!
//! ## Terminology
//!
//! - **parse**: colloquial term for the whole process (grammar + building)
//! - **pass**: one run of the grammar engine in a given prediction mode
//! - **build**: the AST construction phase specifically
//!
//! ## Testing
//!
//! See the [testing module](crate::cfml::testing) for the fluent assertion API used by the
//! parser tests.

pub mod driver;
pub mod listener;

pub use driver::{DriverMisuse, ParseDriver, ParseError, ParseStats, ParsedRoot};
pub use listener::CollectingListener;

use crate::cfml::ast::{Expression, Statement};
use crate::cfml::config::ParserConfig;

/// Parse a single expression with a default-configured driver
pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    ParseDriver::new(ParserConfig::default()).parse_expression(source)
}

/// Parse a script with a default-configured driver
pub fn parse_script(source: &str) -> Result<Statement, ParseError> {
    ParseDriver::new(ParserConfig::default()).parse_script(source)
}
