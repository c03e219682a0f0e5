//! Two-stage parse driver
//!
//!     The driver owns a grammar engine and an [`AstBuilder`] and runs every parse through the
//!     same two states:
//!
//!         FAST  the engine runs in FAST prediction mode with no listeners installed. On
//!               success the tree goes to the visitors; on failure the driver moves to FULL.
//!         FULL  the token stream is rewound, engine state is reset, prediction switches to
//!               FULL and the listeners are installed. The result of this pass is final.
//!
//!     [`ParserConfig::strategy`] can pin the driver to one of the two states instead.
//!
//!     Grammar errors reported during FULL are collected as diagnostics. A structural
//!     violation raised while building fails the call and leaves a fatal diagnostic. Fatal
//!     diagnostics set a had-fatal flag that stays set until [`ParseDriver::reset`].
//!
//!     A driver is single-threaded and non-reentrant; `&mut self` enforces that. A call that
//!     unwinds halfway (a panic in the engine or a caller listener) poisons the instance, and
//!     every later call fails with [`DriverMisuse::Poisoned`].

use super::listener::CollectingListener;
use crate::cfml::ast::diagnostics::Diagnostic;
use crate::cfml::ast::error::{DecompileResult, MalformedConstruct};
use crate::cfml::ast::range::SourceLocation;
use crate::cfml::ast::traits::{AstNode, NodeRef};
use crate::cfml::ast::{Expression, Statement};
use crate::cfml::building::AstBuilder;
use crate::cfml::config::{ParserConfig, PredictionStrategy};
use crate::cfml::grammar::{
    EntryPoint, GrammarEngine, GrammarError, ParseNode, PredictionMode, ScriptGrammar, SharedListener,
    SyntaxDictionary,
};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverMisuse {
    #[error("parse driver was poisoned by an interrupted parse and must be discarded")]
    Poisoned,

    #[error("grammar engine answered the {entry} entry point with a {found} root")]
    UnexpectedRoot { entry: EntryPoint, found: &'static str },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("malformed construct: {0}")]
    Structural(#[from] MalformedConstruct),
    #[error(transparent)]
    Misuse(#[from] DriverMisuse),
}

/// The root node of one parse
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRoot {
    Expression(Expression),
    Script(Statement),
}

impl ParsedRoot {
    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            ParsedRoot::Expression(expression) => NodeRef::Expression(expression),
            ParsedRoot::Script(script) => NodeRef::Statement(script),
        }
    }

    pub fn decompile(&self, indent: usize) -> DecompileResult {
        match self {
            ParsedRoot::Expression(expression) => expression.decompile(indent),
            ParsedRoot::Script(script) => script.decompile(indent),
        }
    }

    pub fn into_expression(self) -> Option<Expression> {
        match self {
            ParsedRoot::Expression(expression) => Some(expression),
            ParsedRoot::Script(_) => None,
        }
    }

    pub fn into_script(self) -> Option<Statement> {
        match self {
            ParsedRoot::Script(script) => Some(script),
            ParsedRoot::Expression(_) => None,
        }
    }
}

/// Counters for the most recent call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseStats {
    pub fast_passes: usize,
    pub full_passes: usize,
    pub ambiguity_reports: usize,
    pub full_context_reports: usize,
    /// Alternatives the FULL pass tried speculatively
    pub speculations: usize,
}

impl ParseStats {
    pub fn used_full(&self) -> bool {
        self.full_passes > 0
    }
}

pub struct ParseDriver<G: GrammarEngine = ScriptGrammar> {
    engine: G,
    builder: AstBuilder,
    config: ParserConfig,
    collector: Rc<CollectingListener>,
    listener: Option<SharedListener>,
    diagnostics: Vec<Diagnostic>,
    had_fatal: bool,
    stats: ParseStats,
    in_progress: bool,
}

impl<G: GrammarEngine> std::fmt::Debug for ParseDriver<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseDriver")
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics.len())
            .field("had_fatal", &self.had_fatal)
            .field("stats", &self.stats)
            .field("poisoned", &self.in_progress)
            .finish()
    }
}

impl ParseDriver<ScriptGrammar> {
    /// A driver over the bundled script grammar
    pub fn new(config: ParserConfig) -> Self {
        Self::with_engine(ScriptGrammar::new(), config)
    }
}

impl Default for ParseDriver<ScriptGrammar> {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl<G: GrammarEngine> ParseDriver<G> {
    pub fn with_engine(engine: G, config: ParserConfig) -> Self {
        let mut builder = AstBuilder::new();
        builder.set_validate_tag_attributes(config.validate_tag_attributes);
        Self {
            engine,
            builder,
            config,
            collector: Rc::new(CollectingListener::new()),
            listener: None,
            diagnostics: Vec::new(),
            had_fatal: false,
            stats: ParseStats::default(),
            in_progress: false,
        }
    }

    /// Dictionary consulted for generic tag statements and `cf<name>(...)` calls
    pub fn with_dictionary(mut self, dictionary: Arc<dyn SyntaxDictionary>) -> Self {
        self.builder = std::mem::take(&mut self.builder).with_dictionary(dictionary);
        self.builder
            .set_validate_tag_attributes(self.config.validate_tag_attributes);
        self
    }

    /// Listener forwarded every event of a FULL pass
    pub fn with_listener(mut self, listener: SharedListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn set_listener(&mut self, listener: Option<SharedListener>) {
        self.listener = listener;
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn engine(&self) -> &G {
        &self.engine
    }

    /// Diagnostics of the most recent call
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether any call since construction or the last reset produced a fatal diagnostic
    pub fn had_fatal(&self) -> bool {
        self.had_fatal
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    pub fn is_poisoned(&self) -> bool {
        self.in_progress
    }

    /// Clear the visitor memoization, the diagnostics and the had-fatal flag
    pub fn reset(&mut self) {
        self.builder.reset();
        self.engine.reset();
        self.diagnostics.clear();
        self.had_fatal = false;
        self.stats = ParseStats::default();
    }

    pub fn parse_expression(&mut self, source: &str) -> Result<Expression, ParseError> {
        match self.parse(source, EntryPoint::Expression)? {
            ParsedRoot::Expression(expression) => Ok(expression),
            ParsedRoot::Script(_) => Err(DriverMisuse::UnexpectedRoot {
                entry: EntryPoint::Expression,
                found: "script",
            }
            .into()),
        }
    }

    pub fn parse_script(&mut self, source: &str) -> Result<Statement, ParseError> {
        match self.parse(source, EntryPoint::ScriptBlock)? {
            ParsedRoot::Script(script) => Ok(script),
            ParsedRoot::Expression(_) => Err(DriverMisuse::UnexpectedRoot {
                entry: EntryPoint::ScriptBlock,
                found: "expression",
            }
            .into()),
        }
    }

    pub fn parse(&mut self, source: &str, entry: EntryPoint) -> Result<ParsedRoot, ParseError> {
        if self.in_progress {
            return Err(DriverMisuse::Poisoned.into());
        }
        self.in_progress = true;
        let result = self.run(source, entry);
        self.in_progress = false;
        result
    }

    fn run(&mut self, source: &str, entry: EntryPoint) -> Result<ParsedRoot, ParseError> {
        self.diagnostics.clear();
        self.stats = ParseStats::default();
        self.builder.reset();
        self.engine.set_input(source);

        let tree = match self.config.strategy {
            PredictionStrategy::TwoStage => match self.fast_pass(entry) {
                Ok(tree) => tree,
                Err(error) => {
                    debug!(%entry, %error, "FAST pass failed, retrying in FULL mode");
                    self.full_pass(entry)?
                }
            },
            PredictionStrategy::FastOnly => match self.fast_pass(entry) {
                Ok(tree) => tree,
                Err(error) => {
                    let diagnostic = self.syntax_diagnostic(&error);
                    self.record(diagnostic);
                    return Err(ParseError::Grammar(error));
                }
            },
            PredictionStrategy::FullOnly => self.full_pass(entry)?,
        };
        self.build(source, entry, &tree)
    }

    fn fast_pass(&mut self, entry: EntryPoint) -> Result<ParseNode, GrammarError> {
        self.stats.fast_passes += 1;
        self.engine.remove_error_listeners();
        self.engine.set_prediction_mode(PredictionMode::Fast);
        self.engine.reset();
        let result = self.engine.parse(entry);
        if result.is_ok() {
            debug!(%entry, "FAST pass succeeded");
        }
        result
    }

    fn full_pass(&mut self, entry: EntryPoint) -> Result<ParseNode, ParseError> {
        self.stats.full_passes += 1;
        self.engine.rewind();
        self.engine.reset();
        self.engine.set_prediction_mode(PredictionMode::Full);
        self.engine.remove_error_listeners();
        self.collector.clear();
        self.engine.add_error_listener(self.collector.clone());
        if let Some(listener) = &self.listener {
            self.engine.add_error_listener(listener.clone());
        }

        let result = self.engine.parse(entry);
        self.engine.remove_error_listeners();

        self.stats.ambiguity_reports = self.collector.ambiguities();
        self.stats.full_context_reports = self.collector.full_contexts();
        self.stats.speculations = self.engine.speculations();
        let errors = self.collector.take_errors();
        debug!(
            %entry,
            errors = errors.len(),
            ambiguities = self.stats.ambiguity_reports,
            ok = result.is_ok(),
            "FULL pass finished"
        );
        for error in &errors {
            let diagnostic = self.syntax_diagnostic(error);
            self.record(diagnostic);
        }
        result.map_err(ParseError::Grammar)
    }

    fn build(&mut self, source: &str, entry: EntryPoint, tree: &ParseNode) -> Result<ParsedRoot, ParseError> {
        let built = match entry {
            EntryPoint::Expression => self.builder.build_expression(source, tree).map(ParsedRoot::Expression),
            EntryPoint::ScriptBlock => self.builder.build_script(source, tree).map(ParsedRoot::Script),
        };
        built.map_err(|violation| {
            warn!(%violation, "structural violation while building the AST");
            self.record(violation_diagnostic(source, &violation));
            ParseError::Structural(violation)
        })
    }

    fn syntax_diagnostic(&self, error: &GrammarError) -> Diagnostic {
        let diagnostic = Diagnostic::from_grammar_error(error);
        if self.config.syntax_errors_fatal {
            diagnostic.fatal()
        } else {
            diagnostic
        }
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        self.had_fatal |= diagnostic.fatal;
        let full = self
            .config
            .max_diagnostics
            .is_some_and(|max| self.diagnostics.len() >= max);
        if !full {
            self.diagnostics.push(diagnostic);
        }
    }
}

/// Diagnostic for a violation, spanning the first word at its position
fn violation_diagnostic(source: &str, violation: &MalformedConstruct) -> Diagnostic {
    let location = SourceLocation::new(source);
    let start = location.position_to_byte(violation.position()).min(source.len());
    let offending = source[start..]
        .split_whitespace()
        .next()
        .unwrap_or("");
    let end = start + offending.len();
    Diagnostic::from_violation(violation, start..end, offending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfml::ast::diagnostics::DiagnosticKind;
    use crate::cfml::grammar::DiagnosticListener;
    use std::cell::RefCell;
    use std::ops::Range;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl DiagnosticListener for Recorder {
        fn syntax_error(&self, error: &GrammarError) {
            self.events.borrow_mut().push(format!("error:{}", error.message));
        }

        fn report_ambiguity(&self, _span: Range<usize>, decision: &str) {
            self.events.borrow_mut().push(format!("ambiguity:{}", decision));
        }

        fn report_full_context(&self, _span: Range<usize>, decision: &str) {
            self.events.borrow_mut().push(format!("full-context:{}", decision));
        }
    }

    #[test]
    fn test_fast_success_skips_full() {
        let mut driver = ParseDriver::default();
        driver.parse_script("x = a + b;").unwrap();
        assert_eq!(driver.stats().fast_passes, 1);
        assert!(!driver.stats().used_full());
        assert!(driver.diagnostics().is_empty());
    }

    #[test]
    fn test_fast_failure_falls_back_once() {
        let recorder = Rc::new(Recorder::default());
        let mut driver = ParseDriver::default().with_listener(recorder.clone());
        let script = driver.parse_script("x = (a, b) => a + b;").unwrap();
        assert_eq!(driver.stats().fast_passes, 1);
        assert_eq!(driver.stats().full_passes, 1);
        assert_eq!(driver.stats().ambiguity_reports, 1);
        assert_eq!(script.decompile(0).unwrap(), "x = (a,b)=>a+b;");
        assert!(recorder
            .events
            .borrow()
            .contains(&"ambiguity:parenthesized-or-arrow".to_string()));
    }

    #[test]
    fn test_fast_only_reports_the_failure() {
        let config = ParserConfig::default().with_strategy(PredictionStrategy::FastOnly);
        let mut driver = ParseDriver::new(config);
        let error = driver.parse_script("x = (a) => a;").unwrap_err();
        assert!(matches!(error, ParseError::Grammar(_)));
        assert_eq!(driver.stats().full_passes, 0);
        assert_eq!(driver.diagnostics().len(), 1);
        assert!(!driver.had_fatal());
    }

    #[test]
    fn test_structural_violation_is_fatal() {
        let mut driver = ParseDriver::default();
        let error = driver.parse_script("x = 1;\ntry { a(); }").unwrap_err();
        assert!(matches!(error, ParseError::Structural(MalformedConstruct::MissingCatchOrFinally { .. })));
        assert!(driver.had_fatal());
        let diagnostic = &driver.diagnostics()[0];
        assert_eq!(diagnostic.kind, DiagnosticKind::Structural);
        assert_eq!((diagnostic.line, diagnostic.column), (2, 0));
        assert_eq!(diagnostic.offending, "try");

        driver.parse_script("y = 2;").unwrap();
        assert!(driver.had_fatal());
        driver.reset();
        assert!(!driver.had_fatal());
    }

    #[test]
    fn test_diagnostics_are_capped() {
        let config = ParserConfig::default().with_max_diagnostics(1);
        let mut driver = ParseDriver::new(config);
        let script = driver.parse_script("a = ;\nb = ;\nc = 3;").unwrap();
        assert_eq!(script.as_compound().unwrap().len(), 1);
        assert_eq!(driver.diagnostics().len(), 1);
    }

    #[test]
    fn test_fatal_syntax_errors() {
        let config = ParserConfig::default().with_fatal_syntax_errors(true);
        let mut driver = ParseDriver::new(config);
        driver.parse_script("a = ;").unwrap();
        assert!(driver.had_fatal());
        assert!(driver.diagnostics()[0].fatal);
    }

    #[test]
    fn test_poisoned_driver_refuses_work() {
        struct Panicking;

        impl DiagnosticListener for Panicking {
            fn syntax_error(&self, _error: &GrammarError) {
                panic!("listener failure");
            }
        }

        let mut driver = ParseDriver::default().with_listener(Rc::new(Panicking));
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = driver.parse_script("a = ;");
        }));
        assert!(outcome.is_err());
        assert!(driver.is_poisoned());
        let error = driver.parse_script("a = 1;").unwrap_err();
        assert_eq!(error, ParseError::Misuse(DriverMisuse::Poisoned));
    }
}
