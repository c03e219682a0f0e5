//! Error types for AST construction and decompilation

use super::range::Position;
use thiserror::Error;

/// A structural invariant of the AST is broken.
///
/// Raised when a node is assembled or decompiled, never deferred: it means the program is
/// malformed, not that the grammar was ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedConstruct {
    #[error("try statement at {position} has neither catch clauses nor a finally block")]
    MissingCatchOrFinally { position: Position },

    #[error("{statement} statement at {position} cannot combine attributes '{first}' and '{second}'")]
    ConflictingAttributes {
        statement: String,
        first: String,
        second: String,
        position: Position,
    },

    #[error("{statement} statement at {position} requires one of: {}", .expected.join(", "))]
    MissingAttribute {
        statement: String,
        expected: Vec<String>,
        position: Position,
    },

    #[error("{statement} statement at {position} does not accept attribute '{attribute}'")]
    UnknownAttribute {
        statement: String,
        attribute: String,
        position: Position,
    },

    #[error("unknown tag '{name}' at {position}")]
    UnknownTag { name: String, position: Position },

    #[error("tag '{name}' at {position} does not accept a body")]
    UnexpectedBody { name: String, position: Position },

    #[error("{kind} at {position} needs at least {minimum} segments, found {found}")]
    TooFewSegments {
        kind: &'static str,
        minimum: usize,
        found: usize,
        position: Position,
    },

    #[error("{kind} at {position}: {message}")]
    Invalid {
        kind: &'static str,
        message: String,
        position: Position,
    },
}

impl MalformedConstruct {
    pub fn position(&self) -> Position {
        match self {
            MalformedConstruct::MissingCatchOrFinally { position }
            | MalformedConstruct::ConflictingAttributes { position, .. }
            | MalformedConstruct::MissingAttribute { position, .. }
            | MalformedConstruct::UnknownAttribute { position, .. }
            | MalformedConstruct::UnknownTag { position, .. }
            | MalformedConstruct::UnexpectedBody { position, .. }
            | MalformedConstruct::TooFewSegments { position, .. }
            | MalformedConstruct::Invalid { position, .. } => *position,
        }
    }

    /// Whether the violation concerns an attribute map rather than tree shape
    pub fn is_attribute_violation(&self) -> bool {
        matches!(
            self,
            MalformedConstruct::ConflictingAttributes { .. }
                | MalformedConstruct::MissingAttribute { .. }
                | MalformedConstruct::UnknownAttribute { .. }
        )
    }

    pub(crate) fn invalid(kind: &'static str, message: impl Into<String>, position: Position) -> Self {
        MalformedConstruct::Invalid {
            kind,
            message: message.into(),
            position,
        }
    }
}

/// Result of decompiling a node
pub type DecompileResult = Result<String, MalformedConstruct>;
