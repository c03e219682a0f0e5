//! Operator expressions
//!
//! Operator text is kept as written (`AND`, `and`, `&&` stay distinct). Precedence drives
//! where parentheses are reinserted on decompile.

use super::Element;
use crate::cfml::ast::decompile::{guard_sign, is_keyword_operator, operand, precedence, spaced_operator};
use crate::cfml::ast::error::DecompileResult;
use crate::cfml::ast::expression::Expression;
use crate::cfml::ast::range::Position;

/// Precedence level of a binary operator, `None` when the text is not an operator
pub fn binary_precedence(operator: &str) -> Option<u8> {
    let level = match operator.to_ascii_uppercase().as_str() {
        "IMP" => precedence::IMP,
        "EQV" => precedence::EQV,
        "XOR" => precedence::XOR,
        "OR" | "||" => precedence::OR,
        "AND" | "&&" => precedence::AND,
        "==" | "===" | "!=" | "!==" | "<>" | "<" | "<=" | ">" | ">=" | "EQ" | "NEQ" | "IS"
        | "IS NOT" | "GT" | "GTE" | "GE" | "LT" | "LTE" | "LE" | "CONTAINS"
        | "DOES NOT CONTAIN" => precedence::COMPARISON,
        "&" => precedence::CONCAT,
        "+" | "-" => precedence::ADDITIVE,
        "MOD" | "%" => precedence::MODULUS,
        "\\" => precedence::INT_DIVISION,
        "*" | "/" => precedence::MULTIPLICATIVE,
        "^" => precedence::POWER,
        _ => return None,
    };
    Some(level)
}

pub fn is_right_associative(operator: &str) -> bool {
    operator == "^"
}

pub fn unary_precedence(operator: &str) -> u8 {
    match operator {
        "++" | "--" => precedence::INCREMENT,
        "+" | "-" => precedence::SIGN,
        _ => precedence::NOT,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl Binary {
    pub fn precedence(&self) -> u8 {
        binary_precedence(&self.operator).unwrap_or(precedence::COMPARISON)
    }
}

impl Element for Binary {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        let level = self.precedence();
        let (left_min, right_min) = if is_right_associative(&self.operator) {
            (level + 1, level)
        } else {
            (level, level + 1)
        };
        let left = operand(&self.left, left_min, indent)?;
        let right = guard_sign(&self.operator, operand(&self.right, right_min, indent)?);
        Ok(format!("{}{}{}", left, spaced_operator(&self.operator), right))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.left, &self.right]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub operator: String,
    pub operand: Box<Expression>,
    pub postfix: bool,
}

impl Unary {
    pub fn precedence(&self) -> u8 {
        if self.postfix {
            precedence::INCREMENT
        } else {
            unary_precedence(&self.operator)
        }
    }
}

impl Element for Unary {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        let level = self.precedence();
        if self.postfix {
            // the operand of a postfix operator is always a path
            let text = operand(&self.operand, precedence::PRIMARY, indent)?;
            return Ok(format!("{}{}", text, self.operator));
        }
        let text = operand(&self.operand, level, indent)?;
        if is_keyword_operator(&self.operator) {
            Ok(format!("{} {}", self.operator, text))
        } else {
            Ok(format!("{}{}", self.operator, guard_sign(&self.operator, text)))
        }
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.operand]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ternary {
    pub condition: Box<Expression>,
    pub then_branch: Box<Expression>,
    pub else_branch: Box<Expression>,
}

impl Element for Ternary {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!(
            "{}?{}:{}",
            operand(&self.condition, precedence::TERNARY + 1, indent)?,
            operand(&self.then_branch, precedence::TERNARY, indent)?,
            operand(&self.else_branch, precedence::TERNARY, indent)?,
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.condition, &self.then_branch, &self.else_branch]
    }
}

/// `left ?: fallback`
#[derive(Debug, Clone, PartialEq)]
pub struct Elvis {
    pub left: Box<Expression>,
    pub fallback: Box<Expression>,
}

impl Element for Elvis {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!(
            "{}?:{}",
            operand(&self.left, precedence::TERNARY + 1, indent)?,
            operand(&self.fallback, precedence::TERNARY, indent)?,
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.left, &self.fallback]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_precedence_table() {
        assert_eq!(binary_precedence("and"), Some(precedence::AND));
        assert_eq!(binary_precedence("Is Not"), Some(precedence::COMPARISON));
        assert_eq!(binary_precedence("^"), Some(precedence::POWER));
        assert!(binary_precedence("*").unwrap() > binary_precedence("+").unwrap());
        assert!(binary_precedence("&").unwrap() < binary_precedence("-").unwrap());
        assert_eq!(binary_precedence("=>"), None);
    }

    #[test]
    fn test_unary_precedence() {
        assert_eq!(unary_precedence("NOT"), precedence::NOT);
        assert_eq!(unary_precedence("!"), precedence::NOT);
        assert_eq!(unary_precedence("-"), precedence::SIGN);
        assert_eq!(unary_precedence("++"), precedence::INCREMENT);
    }
}
