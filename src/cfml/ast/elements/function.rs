//! Function declarations
//!
//!     A declaration renders as
//!
//!         <access> [<return type>] function <name>(<parameters>) [<attributes>] <body>
//!
//!     with the access keyword defaulting to `public`. Closures reuse the same payload with an
//!     empty name (see [`AnonymousFunction`](super::AnonymousFunction)).
//!
//!     [`FunctionSignature`] is the callable descriptor derived from a declaration, for
//!     tooling that needs the shape of a function without its body.

use super::Element;
use crate::cfml::ast::attributes::AttributeMap;
use crate::cfml::ast::decompile::{operand, precedence};
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::expression::Expression;
use crate::cfml::ast::range::Position;
use crate::cfml::ast::statement::Statement;
use crate::cfml::ast::traits::AstNode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Public,
    Private,
    Package,
    Remote,
}

impl Access {
    pub fn parse(keyword: &str) -> Option<Access> {
        match keyword.to_ascii_lowercase().as_str() {
            "public" => Some(Access::Public),
            "private" => Some(Access::Private),
            "package" => Some(Access::Package),
            "remote" => Some(Access::Remote),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
            Access::Package => "package",
            Access::Remote => "remote",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub required: bool,
    pub type_name: Option<String>,
    pub name: String,
    pub default: Option<Expression>,
}

impl Parameter {
    fn render(&self, indent: usize) -> DecompileResult {
        let mut out = String::new();
        if self.required {
            out.push_str("required ");
        }
        if let Some(type_name) = &self.type_name {
            out.push_str(type_name);
            out.push(' ');
        }
        out.push_str(&self.name);
        if let Some(default) = &self.default {
            out.push('=');
            out.push_str(&operand(default, precedence::TERNARY, indent)?);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub access: Option<Access>,
    pub return_type: Option<String>,
    /// Empty for closures
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub attributes: AttributeMap,
    pub body: Box<Statement>,
}

impl FunctionDecl {
    pub fn effective_access(&self) -> Access {
        self.access.unwrap_or_default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name.eq_ignore_ascii_case(name))
    }

    pub fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            name: self.name.clone(),
            access: self.effective_access(),
            return_type: self.return_type.clone(),
            parameters: self
                .parameters
                .iter()
                .map(|parameter| ParameterSignature {
                    name: parameter.name.clone(),
                    type_name: parameter.type_name.clone(),
                    required: parameter.required,
                    has_default: parameter.default.is_some(),
                })
                .collect(),
        }
    }

    pub(crate) fn render_parameters(&self, indent: usize) -> DecompileResult {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| parameter.render(indent))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parameters.join(","))
    }
}

impl Element for FunctionDecl {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        if self.is_anonymous() {
            return Err(MalformedConstruct::invalid(
                "FunctionDecl",
                "declared function has no name",
                position,
            ));
        }
        let mut out = format!("{} ", self.effective_access());
        if let Some(return_type) = &self.return_type {
            out.push_str(return_type);
            out.push(' ');
        }
        out.push_str(&format!(
            "function {}({}){} {}",
            self.name,
            self.render_parameters(indent)?,
            self.attributes.render_suffix(indent)?,
            self.body.decompile(indent)?
        ));
        Ok(out)
    }

    fn expressions(&self) -> Vec<&Expression> {
        let mut children: Vec<&Expression> = self
            .parameters
            .iter()
            .filter_map(|parameter| parameter.default.as_ref())
            .collect();
        children.extend(self.attributes.values());
        children
    }

    fn statements(&self) -> Vec<&Statement> {
        vec![&self.body]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSignature {
    pub name: String,
    pub type_name: Option<String>,
    pub required: bool,
    pub has_default: bool,
}

/// Callable shape of a declared function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub access: Access,
    pub return_type: Option<String>,
    pub parameters: Vec<ParameterSignature>,
}

impl FunctionSignature {
    /// Fewest arguments a call must pass
    pub fn min_arity(&self) -> usize {
        self.parameters
            .iter()
            .filter(|parameter| parameter.required && !parameter.has_default)
            .count()
    }

    pub fn max_arity(&self) -> usize {
        self.parameters.len()
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.access)?;
        if let Some(return_type) = &self.return_type {
            write!(f, "{} ", return_type)?;
        }
        write!(f, "{}(", self.name)?;
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            let optional = !parameter.required || parameter.has_default;
            if optional {
                f.write_str("[")?;
            }
            if let Some(type_name) = &parameter.type_name {
                write!(f, "{} ", type_name)?;
            }
            f.write_str(&parameter.name)?;
            if optional {
                f.write_str("]")?;
            }
        }
        f.write_str(")")
    }
}
