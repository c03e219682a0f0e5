//! Literal values

use super::Element;
use crate::cfml::ast::decompile::quote_string;
use crate::cfml::ast::error::DecompileResult;
use crate::cfml::ast::range::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Boolean,
}

impl LiteralKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiteralKind::Integer => "int",
            LiteralKind::Float => "float",
            LiteralKind::String => "string",
            LiteralKind::Boolean => "bool",
        }
    }
}

/// A literal value. `raw` is the number or boolean as written, or the unescaped content of
/// a string.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub raw: String,
}

impl Literal {
    pub fn new(kind: LiteralKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(LiteralKind::String, value)
    }

    pub fn is_string(&self) -> bool {
        self.kind == LiteralKind::String
    }
}

impl Element for Literal {
    fn render(&self, _position: Position, _indent: usize) -> DecompileResult {
        Ok(match self.kind {
            LiteralKind::String => quote_string(&self.raw),
            _ => self.raw.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_render_single_quoted() {
        let literal = Literal::string("say \"hi\" #now#");
        assert_eq!(
            literal.render(Position::default(), 0).unwrap(),
            "'say \"hi\" ##now##'"
        );
    }

    #[test]
    fn test_numbers_render_as_written() {
        let literal = Literal::new(LiteralKind::Float, "1.50");
        assert_eq!(literal.render(Position::default(), 0).unwrap(), "1.50");
    }
}
