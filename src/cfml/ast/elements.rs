//! Per-kind node payloads and their decompile rules
//!
//!     Each file holds the payload structs of a family of node kinds together with the rule
//!     that renders them back to source:
//!
//!         - literal, identifier: leaves and dotted names ([literal], [identifier])
//!         - operators, assignment: binary/unary/ternary/elvis and assignment chains
//!           ([operators], [assignment])
//!         - collections, calls: array and struct literals, calls, `new`, `#nested#`
//!           ([collections], [calls])
//!         - blocks, control_flow, try_catch: sequencing and branching statements
//!           ([blocks], [control_flow], [try_catch])
//!         - function, component: declarations with attribute maps ([function], [component])
//!         - tagged, jumps: attribute-bearing statements and flow exits ([tagged], [jumps])
//!
//!     Payloads never carry position data; that lives in the [`NodeInfo`] of the enclosing
//!     `Expression` or `Statement`, which is why the rendering functions take the node's
//!     position for error reporting.
//!
//! [`NodeInfo`]: super::node::NodeInfo

pub mod assignment;
pub mod blocks;
pub mod calls;
pub mod collections;
pub mod component;
pub mod control_flow;
pub mod function;
pub mod identifier;
pub mod jumps;
pub mod literal;
pub mod operators;
pub mod tagged;
pub mod try_catch;

pub use assignment::{Assignment, ChainTarget, VarDecl};
pub use blocks::Compound;
pub use calls::{AnonymousFunction, Argument, ClosureStyle, FunctionCall, Nested, New};
pub use collections::{ArrayLiteral, StructEntry, StructLiteral};
pub use component::{Component, Import, Include};
pub use control_flow::{Case, DoWhile, For, ForIn, If, Switch, While};
pub use function::{Access, FunctionDecl, FunctionSignature, Parameter, ParameterSignature};
pub use identifier::{FullVar, Identifier, Member, MultipartIdentifier};
pub use jumps::JumpStatement;
pub use literal::{Literal, LiteralKind};
pub use operators::{Binary, Elvis, Ternary, Unary};
pub use tagged::AttributeStatement;
pub use try_catch::{Catch, TryCatch};

use super::error::DecompileResult;
use super::expression::Expression;
use super::range::Position;
use super::statement::Statement;

/// Rendering and child enumeration shared by every payload
pub(crate) trait Element {
    fn render(&self, position: Position, indent: usize) -> DecompileResult;

    fn expressions(&self) -> Vec<&Expression> {
        Vec::new()
    }

    fn statements(&self) -> Vec<&Statement> {
        Vec::new()
    }
}
