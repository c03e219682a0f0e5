//! Uniform diagnostic records
//!
//! Syntax errors reported by the grammar engine, attribute-validation violations, and
//! structural violations all end up as a [`Diagnostic`] with the same shape: where it
//! happened (line, column, byte offsets), the offending text, and a message.
//!
//! A diagnostic marked `fatal` makes the driver's had-fatal flag stick. Grammar errors are
//! non-fatal unless the driver configuration says otherwise; structural violations are
//! always fatal.

use super::error::MalformedConstruct;
use crate::cfml::grammar::GrammarError;
use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// Where a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Lexical or grammar error reported by the grammar engine
    Syntax,
    /// Unknown, missing or conflicting attributes on an attribute-restricted statement
    Attribute,
    /// Any other broken AST invariant
    Structural,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Syntax => write!(f, "syntax"),
            DiagnosticKind::Attribute => write!(f, "attribute"),
            DiagnosticKind::Structural => write!(f, "structural"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub fatal: bool,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
    pub offending: String,
    pub message: String,
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        span: ByteRange<usize>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: DiagnosticSeverity::Error,
            fatal: false,
            line,
            column,
            start: span.start,
            end: span.end,
            offending: String::new(),
            message: message.into(),
            code: None,
        }
    }

    /// Diagnostic for an error reported by the grammar engine
    pub fn from_grammar_error(error: &GrammarError) -> Self {
        Self::new(
            DiagnosticKind::Syntax,
            error.span.clone(),
            error.line,
            error.column,
            error.message.clone(),
        )
        .with_offending(error.offending.clone())
        .with_code("syntax-error")
    }

    /// Diagnostic for a structural violation; always fatal
    pub fn from_violation(
        violation: &MalformedConstruct,
        span: ByteRange<usize>,
        offending: impl Into<String>,
    ) -> Self {
        let position = violation.position();
        let (kind, code) = if violation.is_attribute_violation() {
            (DiagnosticKind::Attribute, "invalid-attributes")
        } else {
            (DiagnosticKind::Structural, "malformed-construct")
        };
        Self::new(kind, span, position.line, position.column, violation.to_string())
            .with_offending(offending)
            .with_code(code)
            .fatal()
    }

    pub fn with_offending(mut self, offending: impl Into<String>) -> Self {
        self.offending = offending.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_severity(mut self, severity: DiagnosticSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} at {}:{}",
            self.severity, self.kind, self.message, self.line, self.column
        )?;
        if !self.offending.is_empty() {
            write!(f, " near '{}'", self.offending)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfml::ast::range::Position;

    #[test]
    fn test_violation_diagnostic_is_fatal() {
        let violation = MalformedConstruct::ConflictingAttributes {
            statement: "lock".to_string(),
            first: "name".to_string(),
            second: "scope".to_string(),
            position: Position::new(2, 4),
        };
        let diag = Diagnostic::from_violation(&violation, 10..30, "lock");
        assert!(diag.fatal);
        assert_eq!(diag.kind, DiagnosticKind::Attribute);
        assert_eq!((diag.line, diag.column), (2, 4));
        assert_eq!((diag.start, diag.end), (10, 30));
        assert_eq!(diag.code.as_deref(), Some("invalid-attributes"));
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::new(DiagnosticKind::Syntax, 0..1, 1, 0, "unexpected ';'")
            .with_offending(";");
        assert_eq!(diag.to_string(), "error [syntax]: unexpected ';' at 1:0 near ';'");
    }
}
