//! Array and struct literals

use super::calls::list_item;
use super::Element;
use crate::cfml::ast::decompile::quote_string;
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::expression::{Expression, ExpressionKind};
use crate::cfml::ast::range::Position;
use crate::cfml::ast::traits::AstNode;

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
}

impl Element for ArrayLiteral {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        let elements = self
            .elements
            .iter()
            .map(|element| list_item(element, indent))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("[{}]", elements.join(",")))
    }

    fn expressions(&self) -> Vec<&Expression> {
        self.elements.iter().collect()
    }
}

/// One `key: value` pair. The key is an identifier or a string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StructEntry {
    pub key: Expression,
    pub value: Expression,
}

impl StructEntry {
    pub fn key_name(&self) -> String {
        match &self.key.kind {
            ExpressionKind::Literal(literal) => literal.raw.clone(),
            ExpressionKind::Identifier(identifier) => identifier.qualified_name(),
            _ => self.key.info().token().to_string(),
        }
    }

    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        let key = match &self.key.kind {
            ExpressionKind::Identifier(identifier) if identifier.scope.is_none() => {
                identifier.name.clone()
            }
            ExpressionKind::Literal(literal) if literal.is_string() => quote_string(&literal.raw),
            ExpressionKind::Literal(literal) => literal.raw.clone(),
            _ => {
                return Err(MalformedConstruct::invalid(
                    "Struct",
                    format!("'{}' cannot be used as a struct key", self.key.info().token()),
                    position,
                ))
            }
        };
        Ok(format!("{}:{}", key, list_item(&self.value, indent)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructLiteral {
    pub entries: Vec<StructEntry>,
}

impl StructLiteral {
    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.entries
            .iter()
            .find(|entry| entry.key_name().eq_ignore_ascii_case(key))
            .map(|entry| &entry.value)
    }
}

impl Element for StructLiteral {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        let entries = self
            .entries
            .iter()
            .map(|entry| entry.render(position, indent))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("{{{}}}", entries.join(",")))
    }

    fn expressions(&self) -> Vec<&Expression> {
        self.entries
            .iter()
            .flat_map(|entry| [&entry.key, &entry.value])
            .collect()
    }
}
