//! AST definitions and utilities for CFML script
//!
//!     The tree has two closed hierarchies. [`Expression`] nodes compute values, [`Statement`]
//!     nodes sequence them. Each node is a shared [`NodeInfo`] record plus a kind enum carrying
//!     the fields specific to that kind:
//!
//!         Expression { info, kind: ExpressionKind::Binary(Binary { operator, left, right }) }
//!         Statement  { info, kind: StatementKind::While(While { condition, body }) }
//!
//!     Both implement [`AstNode`]: a kind tag, the direct children of either hierarchy, and
//!     `decompile(indent)`, which regenerates valid source text for the subtree in a canonical
//!     layout. Decompilation is not a separate pass; every node kind carries its own rule in
//!     the `elements` module next to the struct it renders.
//!
//! Ownership
//!
//!     The tree owns its children strictly: boxes and vectors, no sharing. The only edge
//!     pointing upwards is the parent id in `NodeInfo`, set once when the node is linked into
//!     its parent. Navigating upwards goes through [`lookup::ParentIndex`].
//!
//! Validation
//!
//!     A node kind with structural rules (a try without catch or finally, a lock with
//!     conflicting attributes, a multipart identifier with one segment) is checked when the
//!     visitors build it and again when it is decompiled. A violation is a
//!     [`MalformedConstruct`], never silently rendered.

pub mod attributes;
pub mod decompile;
pub mod diagnostics;
pub mod elements;
pub mod error;
pub mod expression;
pub mod lookup;
pub mod node;
pub mod range;
pub mod snapshot;
pub mod statement;
pub mod traits;

pub use attributes::{Attribute, AttributeMap};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSeverity};
pub use elements::{
    Access, AnonymousFunction, Argument, ArrayLiteral, Assignment, AttributeStatement, Binary,
    Case, Catch, ChainTarget, ClosureStyle, Component, Compound, DoWhile, Elvis, For, ForIn,
    FullVar, FunctionCall, FunctionDecl, FunctionSignature, Identifier, If, Import, Include,
    JumpStatement, Literal, LiteralKind, Member, MultipartIdentifier, Nested, New, Parameter,
    ParameterSignature, StructEntry, StructLiteral, Switch, Ternary, TryCatch, Unary, VarDecl,
    While,
};
pub use error::{DecompileResult, MalformedConstruct};
pub use expression::{Expression, ExpressionKind};
pub use lookup::ParentIndex;
pub use node::{NodeId, NodeInfo};
pub use range::{Position, SourceLocation};
pub use snapshot::{snapshot_expression, snapshot_statement, AstSnapshot};
pub use statement::{Statement, StatementKind};
pub use traits::{AstNode, NodeRef, Visitor};
