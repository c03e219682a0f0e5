//! Shared helpers for the per-node decompile rules
//!
//! Canonical layout:
//!
//!     - string literals use single quotes; `'` and `#` are doubled inside them
//!     - symbolic operators are written tight (`a==b`), keyword operators get one space on
//!       each side (`a AND b`)
//!     - list-like syntax is comma-joined without spaces or a trailing comma
//!     - attribute maps are sorted by name, ignoring case
//!     - nested lines are indented with one tab per level
//!
//! Precedence is restored by parenthesizing a child whose precedence is lower than its
//! position requires; the parse tree does not keep the source's own parentheses.

use super::error::DecompileResult;
use super::expression::Expression;
use super::statement::Statement;
use super::traits::AstNode;

pub const INDENT_UNIT: &str = "\t";

/// Operator precedence levels, lowest binding first
pub mod precedence {
    pub const ASSIGNMENT: u8 = 1;
    pub const TERNARY: u8 = 2;
    pub const IMP: u8 = 3;
    pub const EQV: u8 = 4;
    pub const XOR: u8 = 5;
    pub const OR: u8 = 6;
    pub const AND: u8 = 7;
    pub const NOT: u8 = 8;
    pub const COMPARISON: u8 = 9;
    pub const CONCAT: u8 = 10;
    pub const ADDITIVE: u8 = 11;
    pub const MODULUS: u8 = 12;
    pub const INT_DIVISION: u8 = 13;
    pub const MULTIPLICATIVE: u8 = 14;
    pub const SIGN: u8 = 15;
    pub const POWER: u8 = 16;
    pub const INCREMENT: u8 = 17;
    pub const PRIMARY: u8 = 20;
}

pub fn indentation(level: usize) -> String {
    INDENT_UNIT.repeat(level)
}

/// Render a string value as a single-quoted literal
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '#' => out.push_str("##"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// Word operators (`AND`, `EQ`, `IS NOT`) as opposed to symbolic ones (`&&`, `==`, `%`)
pub fn is_keyword_operator(operator: &str) -> bool {
    !operator.is_empty() && operator.chars().all(|c| c.is_ascii_alphabetic() || c == ' ')
}

/// Join an operator and its operands with the spacing canonical for that operator
pub fn spaced_operator(operator: &str) -> String {
    if is_keyword_operator(operator) {
        format!(" {} ", operator)
    } else {
        operator.to_string()
    }
}

/// Decompile `expression`, wrapping it in parentheses when it binds looser than `minimum`
pub fn operand(expression: &Expression, minimum: u8, indent: usize) -> DecompileResult {
    let text = expression.decompile(indent)?;
    if expression.precedence() < minimum {
        Ok(format!("({})", text))
    } else {
        Ok(text)
    }
}

/// Parenthesize `text` when gluing it after a `+`/`-` would create `++`/`--`
pub fn guard_sign(operator: &str, text: String) -> String {
    let ends_with_sign = operator.ends_with('+') || operator.ends_with('-');
    let starts_with_sign = text.starts_with('+') || text.starts_with('-');
    if ends_with_sign && starts_with_sign {
        format!("({})", text)
    } else {
        text
    }
}

pub fn join_expressions(expressions: &[Expression], separator: &str, indent: usize) -> DecompileResult {
    let parts = expressions
        .iter()
        .map(|expression| expression.decompile(indent))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(separator))
}

/// Render a statement used as the body of a control-flow construct
pub fn body(statement: &Statement, indent: usize) -> DecompileResult {
    statement.decompile(indent)
}

/// Render the children of a braced block
pub fn braced(statements: &[Statement], indent: usize) -> DecompileResult {
    let mut out = String::from("{\n");
    let inner = indentation(indent + 1);
    for statement in statements {
        out.push_str(&inner);
        out.push_str(&statement.decompile(indent + 1)?);
        out.push('\n');
    }
    out.push_str(&indentation(indent));
    out.push('}');
    Ok(out)
}
