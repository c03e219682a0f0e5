//! Two-stage prediction: FAST first, FULL exactly once after a FAST failure

use cfml_parser::cfml::config::{ParserConfig, PredictionStrategy};
use cfml_parser::cfml::grammar::{DiagnosticListener, GrammarError};
use cfml_parser::{EntryPoint, ParseDriver, ParseError};
use rstest::rstest;
use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

#[derive(Default)]
struct EventLog {
    events: RefCell<Vec<String>>,
}

impl DiagnosticListener for EventLog {
    fn syntax_error(&self, error: &GrammarError) {
        self.events.borrow_mut().push(format!("error@{}:{}", error.line, error.column));
    }

    fn report_ambiguity(&self, _span: Range<usize>, decision: &str) {
        self.events.borrow_mut().push(format!("ambiguity:{}", decision));
    }

    fn report_full_context(&self, _span: Range<usize>, decision: &str) {
        self.events.borrow_mut().push(format!("full-context:{}", decision));
    }
}

fn full_only() -> ParseDriver {
    ParseDriver::new(ParserConfig::default().with_strategy(PredictionStrategy::FullOnly))
}

#[rstest]
#[case::arrow_function("x = (a, b) => a + b;")]
#[case::single_arrow("f = (a) => a;")]
#[case::tag_keyword_variable("param = 5;")]
#[case::struct_statement("{a: 1};")]
#[case::closure_statement("function() { return 1; };")]
#[case::scope_assignment("thread.x = 1;")]
fn test_fallback_matches_direct_full_parse(#[case] source: &str) {
    let mut two_stage = ParseDriver::default();
    let fallback = two_stage.parse(source, EntryPoint::ScriptBlock).unwrap();
    let stats = two_stage.stats();
    assert_eq!((stats.fast_passes, stats.full_passes), (1, 1), "{}", source);

    let direct = full_only().parse(source, EntryPoint::ScriptBlock).unwrap();
    assert_eq!(fallback, direct, "{}", source);
}

#[rstest]
#[case::plain_assignment("x = a + b;")]
#[case::tag_statement("lock name='a' { x(); }")]
#[case::block("{ x = 1; }")]
#[case::declaration("function f() { }")]
fn test_fast_success_never_enters_full(#[case] source: &str) {
    let log = Rc::new(EventLog::default());
    let mut driver = ParseDriver::default().with_listener(log.clone());
    driver.parse_script(source).unwrap();
    assert!(!driver.stats().used_full(), "{}", source);
    assert!(log.events.borrow().is_empty(), "FAST must not notify listeners");
}

#[test]
fn test_listener_sees_full_mode_events() {
    let log = Rc::new(EventLog::default());
    let mut driver = ParseDriver::default().with_listener(log.clone());
    driver.parse_script("param = 5;").unwrap();

    assert_eq!(
        *log.events.borrow(),
        vec![
            "full-context:tag-or-expression".to_string(),
            "ambiguity:tag-or-expression".to_string(),
        ]
    );
    assert_eq!(driver.stats().ambiguity_reports, 1);
    assert_eq!(driver.stats().full_context_reports, 1);
}

#[test]
fn test_recovered_errors_become_diagnostics() {
    let log = Rc::new(EventLog::default());
    let mut driver = ParseDriver::default().with_listener(log.clone());
    let script = driver.parse_script("a = ;\nb = 2;\nc = ;").unwrap();

    assert_eq!(script.as_compound().unwrap().len(), 1);
    let positions: Vec<_> = driver.diagnostics().iter().map(|d| (d.line, d.column)).collect();
    assert_eq!(positions, vec![(1, 4), (3, 4)]);
    assert_eq!(*log.events.borrow(), vec!["error@1:4".to_string(), "error@3:4".to_string()]);
    assert!(!driver.had_fatal());
}

#[test]
fn test_unrecoverable_expression_fails_with_grammar_error() {
    let mut driver = ParseDriver::default();
    let error = driver.parse_expression("a +").unwrap_err();
    let ParseError::Grammar(error) = error else {
        panic!("expected a grammar error, got {:?}", error);
    };
    assert_eq!(error.offending, "");
    assert_eq!(driver.stats().full_passes, 1);
    assert_eq!(driver.diagnostics().len(), 1);
}

#[test]
fn test_driver_is_reusable() {
    let mut driver = ParseDriver::default();
    let first = driver.parse_script("x = (a) => a;").unwrap();
    let second = driver.parse_script("x = (a) => a;").unwrap();
    assert_eq!(first, second);

    driver.parse_script("y = 1;").unwrap();
    assert!(!driver.stats().used_full());
}

#[test]
fn test_fast_only_never_falls_back() {
    let mut driver = ParseDriver::new(ParserConfig::default().with_strategy(PredictionStrategy::FastOnly));
    assert!(matches!(driver.parse_script("param = 5;"), Err(ParseError::Grammar(_))));
    assert_eq!(driver.stats().full_passes, 0);
    assert!(driver.parse_script("param name='x';").is_ok());
}

fn nested_blocks(depth: usize) -> String {
    format!("{}a = ;{}", "{".repeat(depth), "}".repeat(depth))
}

fn nested_functions(depth: usize) -> String {
    let mut source = String::new();
    for level in 0..depth {
        source.push_str(&format!("function f{}() {{\n", level));
    }
    source.push_str("a = ;\n");
    source.push_str(&"}\n".repeat(depth));
    source
}

#[rstest]
#[case::blocks(nested_blocks(32))]
#[case::functions(nested_functions(32))]
fn test_full_pass_cost_is_linear_in_nesting(#[case] source: String) {
    let depth = 32;
    let mut driver = ParseDriver::default();
    driver.parse_script(&source).unwrap();

    let stats = driver.stats();
    assert_eq!(stats.full_passes, 1);
    assert!(
        stats.speculations <= 2 * depth + 2,
        "{} speculative attempts for {} levels",
        stats.speculations,
        depth
    );
    assert_eq!(stats.full_context_reports, depth);
    assert_eq!(driver.diagnostics().len(), 1);
}

#[test]
fn test_fast_pass_never_speculates() {
    let mut driver = ParseDriver::default();
    driver.parse_script("{ { x = 1; } }").unwrap();
    assert_eq!(driver.stats().speculations, 0);
}
