//! Tree-to-AST building
//!
//!     This module turns the parse tree a grammar engine produced into AST nodes. The parse
//!     tree is faithful to the grammar and nothing else: a dotted name is an access path of a
//!     primary and suffixes, `a = b = 1` is nested assignments, and a `cfhttp(url=x)` call is
//!     just a call. During building, important things happen:
//!
//!         1. Every node gets a per-parse id, its byte span and its line:column position.
//!         2. Identifier chains merge into one multipart identifier; index and call suffixes
//!            fold into full-var paths and calls.
//!         3. `=` chains flatten into a single assignment (or declaration) with a chain list.
//!         4. Function declarations are hoisted to the front of their block.
//!         5. Structural rules are checked as each node is assembled.
//!         6. Once the tree is complete, every child is linked to its parent.
//!
//! Two Visitors
//!
//!     [`ExpressionVisitor`] handles expression kinds and [`StatementVisitor`] handles
//!     statement kinds. They borrow the same [`AstBuilder`], which owns the per-parse state
//!     (id counter, line index, syntax dictionary), and hand sub-regions to each other:
//!     closure bodies go to the statement visitor, conditions and initializers to the
//!     expression visitor.
//!
//!     Callers normally go through [`ParseDriver`](crate::cfml::parsing::ParseDriver); the
//!     builder is public for engines that produce parse trees on their own.

pub mod context;
pub mod expressions;
pub mod statements;

pub use context::AstBuilder;
pub use expressions::ExpressionVisitor;
pub use statements::StatementVisitor;
