//! Tag-style statements
//!
//!     The script form of a tag: a keyword, an attribute map and an optional body.
//!
//!         lock name="cache" timeout=5 { ... }
//!         param name="url.id" default=0;
//!         http url="https://example.com" method="get";
//!
//!     Lock, thread, transaction, param, admin and property statements as well as generic
//!     tag statements share this payload; the statement kind says which one it is.

use super::Element;
use crate::cfml::ast::attributes::{AttributeMap, AttributeRules};
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::expression::Expression;
use crate::cfml::ast::range::Position;
use crate::cfml::ast::statement::Statement;
use crate::cfml::ast::traits::AstNode;

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeStatement {
    pub keyword: String,
    pub attributes: AttributeMap,
    pub body: Option<Box<Statement>>,
}

impl AttributeStatement {
    pub fn new(keyword: impl Into<String>, attributes: AttributeMap, body: Option<Statement>) -> Self {
        Self {
            keyword: keyword.into(),
            attributes,
            body: body.map(Box::new),
        }
    }

    /// Check the fixed attribute rules of the keyword, if it has any
    pub fn validate(&self, position: Position) -> Result<(), MalformedConstruct> {
        match AttributeRules::for_keyword(&self.keyword) {
            Some(rules) => rules.check(&self.attributes, position),
            None => Ok(()),
        }
    }
}

impl Element for AttributeStatement {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        self.validate(position)?;
        let head = format!("{}{}", self.keyword, self.attributes.render_suffix(indent)?);
        match &self.body {
            Some(body) => Ok(format!("{} {}", head, body.decompile(indent)?)),
            None => Ok(format!("{};", head)),
        }
    }

    fn expressions(&self) -> Vec<&Expression> {
        self.attributes.values()
    }

    fn statements(&self) -> Vec<&Statement> {
        self.body.as_deref().into_iter().collect()
    }
}
