//! Reference grammar engine for CFML script
//!
//!     [`ScriptGrammar`] is a recursive-descent parser over a [`TokenStream`]. Most of the
//!     grammar is LL(k) with small lookahead; four decision points are genuinely ambiguous
//!     without trying an alternative:
//!
//!         parenthesized-or-arrow      `(a)` vs `(a) => a`
//!         tag-or-expression           `param name="x";` vs `param = 5;`
//!         block-or-struct             `{ x; }` vs `{ a: 1 };`
//!         declaration-or-closure      `function f() {}` vs `function() {};`
//!
//!     Each one goes through [`ScriptGrammar::decide`]. In FAST mode it commits to the first
//!     alternative and any error ends the parse. In FULL mode the first alternative is tried
//!     speculatively; when it fails the stream is rewound, a full-context event is reported
//!     and the second alternative is tried, reporting an ambiguity event if it succeeds. When
//!     both fail the first alternative is re-run for real so the error it reports is the
//!     expected one.
//!
//!     The outcome of every FULL decision is memoized by decision and source offset until the
//!     next reset. Revisiting a decision (an enclosing speculation failed and is being re-run)
//!     replays the recorded alternative instead of speculating again, so nested decisions
//!     cost a bounded number of attempts each rather than doubling per nesting level.
//!
//! Error recovery
//!
//!     Only in FULL mode and never while speculating: a statement that fails to parse is
//!     reported to the listeners, tokens are skipped up to and including the next `;` (or up
//!     to the next `}`), and parsing continues with the next statement. Events raised while
//!     speculating are buffered and only delivered if the speculative branch is kept.

mod expressions;
mod statements;

use super::engine::{EntryPoint, GrammarEngine, GrammarError, PredictionMode, SharedListener};
use super::stream::{Lexeme, TokenStream};
use super::token::Token;
use super::tree::{NodeKind, ParseNode};
use crate::cfml::ast::range::SourceLocation;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

type ParseResult<T = ParseNode> = Result<T, GrammarError>;
type Alternative = fn(&mut ScriptGrammar) -> ParseResult;

#[derive(Debug, Clone)]
enum Event {
    Ambiguity(Range<usize>, &'static str),
    FullContext(Range<usize>, &'static str),
}

/// Recorded result of the speculative attempts at one decision
#[derive(Debug, Clone)]
enum Outcome {
    First,
    Second,
    /// Both failed; keeps the first alternative's error
    Neither(GrammarError),
}

pub struct ScriptGrammar {
    source: Rc<str>,
    stream: TokenStream,
    location: SourceLocation,
    mode: PredictionMode,
    speculating: usize,
    pending: Vec<Event>,
    listeners: Vec<SharedListener>,
    outcomes: HashMap<(&'static str, usize), Outcome>,
    speculations: usize,
}

impl Default for ScriptGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScriptGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptGrammar")
            .field("mode", &self.mode)
            .field("tokens", &self.stream.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl ScriptGrammar {
    pub fn new() -> Self {
        let source: Rc<str> = Rc::from("");
        Self {
            stream: TokenStream::new(source.clone()),
            location: SourceLocation::new(""),
            source,
            mode: PredictionMode::Fast,
            speculating: 0,
            pending: Vec::new(),
            listeners: Vec::new(),
            outcomes: HashMap::new(),
            speculations: 0,
        }
    }

    // ------------------------------------------------------------------
    // Decisions and speculation
    // ------------------------------------------------------------------

    fn decide(&mut self, decision: &'static str, first: Alternative, second: Alternative) -> ParseResult {
        if self.mode == PredictionMode::Fast {
            return first(self);
        }

        let mark = self.stream.mark();
        let span = self.current_span();
        let key = (decision, span.start);
        if let Some(outcome) = self.outcomes.get(&key).cloned() {
            return self.replay(outcome, span, decision, first, second);
        }

        let first_error = match self.speculate(first) {
            Ok(node) => {
                self.outcomes.insert(key, Outcome::First);
                return Ok(node);
            }
            Err(error) => error,
        };

        self.stream.seek(mark);
        self.notify(Event::FullContext(span.clone(), decision));
        if let Ok(node) = self.speculate(second) {
            self.outcomes.insert(key, Outcome::Second);
            self.notify(Event::Ambiguity(span, decision));
            return Ok(node);
        }

        self.outcomes.insert(key, Outcome::Neither(first_error.clone()));
        self.stream.seek(mark);
        if self.speculating > 0 {
            // a speculative re-run of the first alternative fails the same way
            return Err(first_error);
        }
        first(self)
    }

    /// Take the alternative a previous visit of this decision settled on
    fn replay(
        &mut self,
        outcome: Outcome,
        span: Range<usize>,
        decision: &'static str,
        first: Alternative,
        second: Alternative,
    ) -> ParseResult {
        match outcome {
            Outcome::First => first(self),
            Outcome::Second => {
                self.notify(Event::FullContext(span.clone(), decision));
                let node = second(self)?;
                self.notify(Event::Ambiguity(span, decision));
                Ok(node)
            }
            Outcome::Neither(error) if self.speculating > 0 => Err(error),
            Outcome::Neither(_) => {
                self.notify(Event::FullContext(span, decision));
                first(self)
            }
        }
    }

    fn speculate(&mut self, alternative: Alternative) -> ParseResult {
        let buffered = self.pending.len();
        self.speculations += 1;
        self.speculating += 1;
        let result = alternative(self);
        self.speculating -= 1;
        match &result {
            Ok(_) if self.speculating == 0 => self.flush_events(),
            Ok(_) => {}
            Err(_) => self.pending.truncate(buffered),
        }
        result
    }

    fn notify(&mut self, event: Event) {
        self.pending.push(event);
        if self.speculating == 0 {
            self.flush_events();
        }
    }

    fn flush_events(&mut self) {
        for event in std::mem::take(&mut self.pending) {
            for listener in &self.listeners {
                match &event {
                    Event::Ambiguity(span, decision) => listener.report_ambiguity(span.clone(), decision),
                    Event::FullContext(span, decision) => {
                        listener.report_full_context(span.clone(), decision)
                    }
                }
            }
        }
    }

    fn can_recover(&self) -> bool {
        self.mode == PredictionMode::Full && self.speculating == 0
    }

    fn report(&self, error: &GrammarError) {
        if !self.can_recover() {
            return;
        }
        for listener in &self.listeners {
            listener.syntax_error(error);
        }
    }

    /// Skip to the next statement boundary, always making progress
    fn synchronize(&mut self, start: usize) {
        while let Some(token) = self.stream.peek_token() {
            match token {
                Token::Semicolon => {
                    self.stream.advance();
                    break;
                }
                Token::RightBrace => break,
                _ => {
                    self.stream.advance();
                }
            }
        }
        if self.stream.mark() == start {
            self.stream.advance();
        }
    }

    // ------------------------------------------------------------------
    // Errors and token helpers
    // ------------------------------------------------------------------

    fn error_at(&self, span: Range<usize>, message: impl Into<String>) -> GrammarError {
        let position = self.location.byte_to_position(span.start);
        GrammarError {
            message: message.into(),
            offending: self.source.get(span.clone()).unwrap_or("").to_string(),
            span,
            line: position.line,
            column: position.column,
        }
    }

    fn unexpected(&self, expected: &str) -> GrammarError {
        match self.stream.peek() {
            Some(lexeme) => {
                let text = self.stream.text(lexeme).to_string();
                self.error_at(
                    lexeme.span.clone(),
                    format!("expected {}, found '{}'", expected, text),
                )
            }
            None => {
                let end = self.stream.offset();
                self.error_at(end..end, format!("expected {}, found end of input", expected))
            }
        }
    }

    fn current_span(&self) -> Range<usize> {
        self.stream.peek().map_or_else(
            || {
                let end = self.stream.offset();
                end..end
            },
            |lexeme| lexeme.span.clone(),
        )
    }

    fn check(&self, token: Token) -> bool {
        self.stream.peek_token() == Some(token)
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.stream.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<Lexeme> {
        if self.check(token) {
            if let Some(lexeme) = self.stream.advance() {
                return Ok(lexeme);
            }
        }
        Err(self.unexpected(&token.to_string()))
    }

    fn expect_word(&mut self, word: &str) -> ParseResult<Lexeme> {
        if self.stream.nth_is_word(0, word) {
            if let Some(lexeme) = self.stream.advance() {
                return Ok(lexeme);
            }
        }
        Err(self.unexpected(&format!("'{}'", word)))
    }

    fn expect_identifier(&mut self) -> ParseResult<(String, Range<usize>)> {
        match self.stream.peek() {
            Some(lexeme) if lexeme.token == Token::Identifier => {
                let text = self.stream.text(lexeme).to_string();
                let span = lexeme.span.clone();
                self.stream.advance();
                Ok((text, span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// `a.b.c` as text
    fn dotted_name(&mut self) -> ParseResult<(String, Range<usize>)> {
        let (mut name, span) = self.expect_identifier()?;
        let start = span.start;
        while self.check(Token::Dot) && self.stream.nth_token(1) == Some(Token::Identifier) {
            self.stream.advance();
            let (part, _) = self.expect_identifier()?;
            name.push('.');
            name.push_str(&part);
        }
        Ok((name, start..self.stream.previous_end()))
    }

    /// Span from `start` to the end of the last consumed token
    fn span_from(&self, start: usize) -> Range<usize> {
        start..self.stream.previous_end().max(start)
    }

    fn node(&self, kind: NodeKind, start: usize) -> ParseNode {
        ParseNode::new(kind, self.span_from(start))
    }

    /// A statement terminator: `;`, or nothing before `}` and at the end of input
    fn end_statement(&mut self) -> ParseResult<()> {
        if self.eat(Token::Semicolon) || self.check(Token::RightBrace) || self.stream.at_end() {
            return Ok(());
        }
        Err(self.unexpected("';'"))
    }

    fn check_lex_errors(&self, stream: &TokenStream) -> ParseResult<()> {
        for span in stream.lex_errors() {
            let error = self.error_at(span.clone(), "unrecognized input");
            if !self.can_recover() {
                return Err(error);
            }
            self.report(&error);
        }
        Ok(())
    }

    fn parse_entry(&mut self, entry: EntryPoint) -> ParseResult {
        self.check_lex_errors(&self.stream)?;
        match entry {
            EntryPoint::Expression => {
                let expression = self.parse_expression()?;
                if !self.stream.at_end() {
                    return Err(self.unexpected("end of input"));
                }
                Ok(expression)
            }
            EntryPoint::ScriptBlock => {
                let statements = self.parse_statements(|_| false)?;
                Ok(ParseNode::new(NodeKind::ScriptBlock, 0..self.source.len()).with_children(statements))
            }
        }
    }
}

impl GrammarEngine for ScriptGrammar {
    fn set_input(&mut self, source: &str) {
        self.source = Rc::from(source);
        self.stream = TokenStream::new(self.source.clone());
        self.location = SourceLocation::new(source);
        self.reset();
    }

    fn parse(&mut self, entry: EntryPoint) -> Result<ParseNode, GrammarError> {
        let result = self.parse_entry(entry);
        if let Err(error) = &result {
            self.report(error);
        }
        result
    }

    fn set_prediction_mode(&mut self, mode: PredictionMode) {
        self.mode = mode;
    }

    fn prediction_mode(&self) -> PredictionMode {
        self.mode
    }

    fn reset(&mut self) {
        self.speculating = 0;
        self.speculations = 0;
        self.pending.clear();
        self.outcomes.clear();
    }

    fn rewind(&mut self) {
        self.stream.rewind();
    }

    fn add_error_listener(&mut self, listener: SharedListener) {
        self.listeners.push(listener);
    }

    fn remove_error_listeners(&mut self) {
        self.listeners.clear();
    }

    fn speculations(&self) -> usize {
        self.speculations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfml::grammar::engine::DiagnosticListener;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        errors: RefCell<Vec<String>>,
        events: RefCell<Vec<String>>,
    }

    impl DiagnosticListener for Recorder {
        fn syntax_error(&self, error: &GrammarError) {
            self.errors.borrow_mut().push(error.message.clone());
        }

        fn report_ambiguity(&self, _span: Range<usize>, decision: &str) {
            self.events.borrow_mut().push(format!("ambiguity:{}", decision));
        }

        fn report_full_context(&self, _span: Range<usize>, decision: &str) {
            self.events.borrow_mut().push(format!("full-context:{}", decision));
        }
    }

    fn grammar(source: &str, mode: PredictionMode) -> (ScriptGrammar, Rc<Recorder>) {
        let recorder = Rc::new(Recorder::default());
        let mut grammar = ScriptGrammar::new();
        grammar.set_input(source);
        grammar.set_prediction_mode(mode);
        grammar.add_error_listener(recorder.clone());
        (grammar, recorder)
    }

    #[test]
    fn test_fast_fails_on_arrow_function() {
        let (mut grammar, recorder) = grammar("x = (a, b) => a + b;", PredictionMode::Fast);
        assert!(grammar.parse(EntryPoint::ScriptBlock).is_err());
        assert!(recorder.errors.borrow().is_empty());
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn test_full_resolves_arrow_function() {
        let (mut grammar, recorder) = grammar("x = (a, b) => a + b;", PredictionMode::Full);
        let tree = grammar.parse(EntryPoint::ScriptBlock).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert!(recorder.errors.borrow().is_empty());
        assert_eq!(
            *recorder.events.borrow(),
            vec![
                "full-context:parenthesized-or-arrow".to_string(),
                "ambiguity:parenthesized-or-arrow".to_string()
            ]
        );
    }

    #[test]
    fn test_full_recovers_at_statement_boundaries() {
        let (mut grammar, recorder) = grammar("a = ;\nb = 2;\nc = 3;", PredictionMode::Full);
        let tree = grammar.parse(EntryPoint::ScriptBlock).unwrap();
        assert_eq!(tree.children.len(), 2);
        assert_eq!(recorder.errors.borrow().len(), 1);
    }

    #[test]
    fn test_nested_decisions_are_not_respeculated() {
        let depth = 24;
        let source = format!("{}a = ;{}", "{".repeat(depth), "}".repeat(depth));
        let (mut grammar, recorder) = grammar(&source, PredictionMode::Full);
        assert!(grammar.parse(EntryPoint::ScriptBlock).is_ok());

        // block then struct once per level, nothing more
        assert_eq!(grammar.speculations(), 2 * depth);
        assert_eq!(recorder.errors.borrow().len(), 1);
        assert_eq!(recorder.events.borrow().len(), depth);
        assert!(recorder
            .events
            .borrow()
            .iter()
            .all(|event| event == "full-context:block-or-struct"));
    }

    #[test]
    fn test_reset_forgets_decisions() {
        let (mut grammar, recorder) = grammar("param = 5;", PredictionMode::Full);
        grammar.parse(EntryPoint::ScriptBlock).unwrap();
        grammar.rewind();
        grammar.reset();
        assert_eq!(grammar.speculations(), 0);
        grammar.parse(EntryPoint::ScriptBlock).unwrap();
        assert_eq!(grammar.speculations(), 2);
        assert_eq!(recorder.events.borrow().len(), 4);
    }

    #[test]
    fn test_rewind_allows_reparse() {
        let (mut grammar, _) = grammar("a.b(1);", PredictionMode::Fast);
        let first = grammar.parse(EntryPoint::ScriptBlock).unwrap();
        grammar.rewind();
        grammar.reset();
        let second = grammar.parse(EntryPoint::ScriptBlock).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_expression_entry_rejects_trailing_input() {
        let (mut grammar, recorder) = grammar("a + b c", PredictionMode::Full);
        let error = grammar.parse(EntryPoint::Expression).unwrap_err();
        assert_eq!(error.offending, "c");
        assert_eq!((error.line, error.column), (1, 6));
        assert_eq!(recorder.errors.borrow().len(), 1);
    }

    #[test]
    fn test_lex_errors() {
        let (mut fast, _) = grammar("a = 1 @ 2;", PredictionMode::Fast);
        assert!(fast.parse(EntryPoint::ScriptBlock).is_err());

        let (mut full, recorder) = grammar("a = 1; @", PredictionMode::Full);
        assert!(full.parse(EntryPoint::ScriptBlock).is_ok());
        assert_eq!(*recorder.errors.borrow(), vec!["unrecognized input".to_string()]);
    }
}
