//! Names and access paths
//!
//!     A bare name is an [`Identifier`], optionally qualified by a scope (`local.x`). Dotted
//!     chains of bare names are one [`MultipartIdentifier`] (`a.b.c`), never nested. As soon as
//!     a path contains an index or a call it becomes a [`FullVar`], whose segments are rendered
//!     with `.` between them except before an index ([`Member`]) suffix.

use super::Element;
use crate::cfml::ast::decompile::{operand, precedence};
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::expression::{Expression, ExpressionKind};
use crate::cfml::ast::range::Position;
use crate::cfml::ast::traits::AstNode;

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub scope: Option<String>,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
        }
    }

    pub fn scoped(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: Some(scope.into()),
        }
    }

    /// Name with its scope prefix, as written
    pub fn qualified_name(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{}.{}", scope, self.name),
            None => self.name.clone(),
        }
    }
}

impl Element for Identifier {
    fn render(&self, _position: Position, _indent: usize) -> DecompileResult {
        Ok(self.qualified_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipartIdentifier {
    pub parts: Vec<Expression>,
}

impl MultipartIdentifier {
    pub const MINIMUM_PARTS: usize = 2;

    pub fn new(parts: Vec<Expression>) -> Self {
        Self { parts }
    }

    pub fn names(&self) -> Vec<String> {
        self.parts
            .iter()
            .map(|part| match &part.kind {
                ExpressionKind::Identifier(identifier) => identifier.qualified_name(),
                _ => part.info().token().to_string(),
            })
            .collect()
    }

    pub(crate) fn validate(&self, position: Position) -> Result<(), MalformedConstruct> {
        if self.parts.len() < Self::MINIMUM_PARTS {
            return Err(MalformedConstruct::TooFewSegments {
                kind: "MultipartIdentifier",
                minimum: Self::MINIMUM_PARTS,
                found: self.parts.len(),
                position,
            });
        }
        if let Some(part) = self
            .parts
            .iter()
            .find(|part| !matches!(part.kind, ExpressionKind::Identifier(_)))
        {
            return Err(MalformedConstruct::invalid(
                "MultipartIdentifier",
                format!("segment '{}' is not an identifier", part.info().token()),
                position,
            ));
        }
        Ok(())
    }
}

impl Element for MultipartIdentifier {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        self.validate(position)?;
        let parts = self
            .parts
            .iter()
            .map(|part| part.decompile(indent))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join("."))
    }

    fn expressions(&self) -> Vec<&Expression> {
        self.parts.iter().collect()
    }
}

/// Index suffix `[index]` inside a [`FullVar`]
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub index: Box<Expression>,
}

impl Element for Member {
    fn render(&self, _position: Position, indent: usize) -> DecompileResult {
        Ok(format!("[{}]", self.index.decompile(indent)?))
    }

    fn expressions(&self) -> Vec<&Expression> {
        vec![&self.index]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullVar {
    pub segments: Vec<Expression>,
}

impl FullVar {
    pub fn new(segments: Vec<Expression>) -> Self {
        Self { segments }
    }
}

impl Element for FullVar {
    fn render(&self, position: Position, indent: usize) -> DecompileResult {
        let Some((first, rest)) = self.segments.split_first() else {
            return Err(MalformedConstruct::TooFewSegments {
                kind: "FullVar",
                minimum: 1,
                found: 0,
                position,
            });
        };

        let mut out = operand(first, precedence::PRIMARY, indent)?;
        for segment in rest {
            if !matches!(segment.kind, ExpressionKind::Member(_)) {
                out.push('.');
            }
            out.push_str(&segment.decompile(indent)?);
        }
        Ok(out)
    }

    fn expressions(&self) -> Vec<&Expression> {
        self.segments.iter().collect()
    }
}
