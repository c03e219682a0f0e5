//! # cfml-parser
//!
//! Front end for CFML script: builds a typed AST from a grammar engine's parse tree and
//! regenerates canonical source from it.
//!
//! File Layout
//!
//!     The grammar engine is a collaborator reached through a trait, so the crate is split
//!     along the same seams the data flows through:
//!
//! src/cfml
//!   ├── grammar     Parse-tree IR, engine trait, reference logos/recursive-descent grammar
//!   ├── building    Expression and statement visitors (parse tree → AST)
//!   ├── ast         Node model, decompiler, lookup, snapshots, diagnostics
//!   ├── parsing     Two-stage parse driver
//!   └── config      Caller-owned driver configuration
//!
//! For testing guidelines, see the [testing module](cfml::testing).

pub mod cfml;

pub use cfml::ast::{AstNode, Expression, ExpressionKind, Statement, StatementKind};
pub use cfml::config::ParserConfig;
pub use cfml::grammar::EntryPoint;
pub use cfml::parsing::{ParseDriver, ParseError, ParsedRoot};
