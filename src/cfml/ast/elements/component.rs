//! Component-level declarations

use super::Element;
use crate::cfml::ast::attributes::AttributeMap;
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::expression::Expression;
use crate::cfml::ast::range::Position;
use crate::cfml::ast::statement::Statement;
use crate::cfml::ast::traits::AstNode;

/// `component [attributes] { ... }` or `interface [attributes] { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub interface: bool,
    pub attributes: AttributeMap,
    pub body: Box<Statement>,
}

impl Component {
    pub fn keyword(&self) -> &'static str {
        if self.interface {
            "interface"
        } else {
            "component"
        }
    }

    pub fn extends(&self) -> Option<&str> {
        self.attributes.string_value("extends")
    }
}

impl Element for Component {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!(
            "{}{} {}",
            self.keyword(),
            self.attributes.render_suffix(indent)?,
            self.body.decompile(indent)?
        ))
    }

    fn expressions(&self) -> Vec<&Expression> {
        self.attributes.values()
    }

    fn statements(&self) -> Vec<&Statement> {
        vec![&self.body]
    }
}

/// `import some.package.*;`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
}

impl Element for Import {
    fn render(&self, position: Position, _indent: usize) -> DecompileResult {
        if self.path.is_empty() {
            return Err(MalformedConstruct::invalid("Import", "empty import path", position));
        }
        Ok(format!("import {};", self.path))
    }
}

/// `include 'template.cfm';`
#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub template: Expression,
}

impl Element for Include {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!("include {};", self.template.decompile(indent)?))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.template]
    }
}
