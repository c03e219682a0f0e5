//! Grammar layer
//!
//!     Everything upstream of the AST: the token set, the rewindable token stream, the
//!     parse-tree IR the visitors consume, and the [`GrammarEngine`] seam the driver drives.
//!
//!         token          logos token set and keyword tables
//!         stream         rewindable cursor over lexed tokens
//!         tree           [`ParseNode`] / [`NodeKind`], the parse-tree IR
//!         interpolation  `#expr#` splitting inside string literals
//!         engine         [`GrammarEngine`], prediction modes, listeners, errors
//!         parser         [`ScriptGrammar`], the reference engine
//!         dictionary     [`SyntaxDictionary`], caller-supplied tag knowledge
//!
//!     Other engines can be plugged into the driver as long as they produce the same
//!     [`NodeKind`] shapes.

pub mod dictionary;
pub mod engine;
pub mod interpolation;
pub mod parser;
pub mod stream;
pub mod token;
pub mod tree;

pub use dictionary::{resolve_tag, StaticDictionary, SyntaxDictionary, TagSyntax};
pub use engine::{
    DiagnosticListener, EntryPoint, GrammarEngine, GrammarError, PredictionMode, SharedListener,
};
pub use parser::ScriptGrammar;
pub use tree::{NodeKind, ParseNode};
