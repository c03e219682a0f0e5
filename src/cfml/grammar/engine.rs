//! The grammar engine seam
//!
//!     The driver talks to a grammar engine only through [`GrammarEngine`]: feed it source,
//!     pick a prediction mode, ask for a parse tree from an entry point, and rewind or reset
//!     it between attempts. Engines report problems to installed [`DiagnosticListener`]s.
//!
//!     Prediction modes:
//!
//!         FAST  commit to the first viable alternative at each decision; stop at the first
//!               error without telling listeners
//!         FULL  try alternatives in order, rewinding on failure, reporting full-context and
//!               ambiguity events; recover from errors and report each one

use super::tree::ParseNode;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// A single expression spanning the whole input
    Expression,
    /// A sequence of statements
    ScriptBlock,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPoint::Expression => f.write_str("expression"),
            EntryPoint::ScriptBlock => f.write_str("scriptBlock"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PredictionMode {
    #[default]
    Fast,
    Full,
}

impl fmt::Display for PredictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionMode::Fast => f.write_str("FAST"),
            PredictionMode::Full => f.write_str("FULL"),
        }
    }
}

/// A lexical or grammar error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {line}:{column}")]
pub struct GrammarError {
    pub message: String,
    pub span: Range<usize>,
    pub line: usize,
    pub column: usize,
    /// Source text of the offending token, empty at end of input
    pub offending: String,
}

/// Receives the events a grammar engine reports while parsing
pub trait DiagnosticListener {
    fn syntax_error(&self, error: &GrammarError);

    /// An alternative other than the first one succeeded at a decision point
    fn report_ambiguity(&self, _span: Range<usize>, _decision: &str) {}

    /// The first alternative failed and the engine fell back to trying the others
    fn report_full_context(&self, _span: Range<usize>, _decision: &str) {}
}

pub type SharedListener = Rc<dyn DiagnosticListener>;

pub trait GrammarEngine {
    fn set_input(&mut self, source: &str);

    fn parse(&mut self, entry: EntryPoint) -> Result<ParseNode, GrammarError>;

    fn set_prediction_mode(&mut self, mode: PredictionMode);

    fn prediction_mode(&self) -> PredictionMode;

    /// Clear per-parse state (speculation depth, pending errors); keeps the input
    fn reset(&mut self);

    /// Move the token stream back to the start of the input
    fn rewind(&mut self);

    fn add_error_listener(&mut self, listener: SharedListener);

    fn remove_error_listeners(&mut self);

    /// Speculative alternative attempts since the last reset
    fn speculations(&self) -> usize {
        0
    }
}
