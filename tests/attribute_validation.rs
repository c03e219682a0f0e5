//! Attribute rules of restricted statements and dictionary-driven tag statements

use cfml_parser::cfml::ast::{DiagnosticKind, MalformedConstruct};
use cfml_parser::cfml::config::ParserConfig;
use cfml_parser::cfml::grammar::{StaticDictionary, TagSyntax};
use cfml_parser::cfml::testing::assert_stmt;
use cfml_parser::{ParseDriver, ParseError};
use rstest::rstest;
use std::sync::Arc;

fn dictionary() -> Arc<StaticDictionary> {
    Arc::new(
        StaticDictionary::new()
            .with_tag("http", TagSyntax::new().with_attributes(["url", "method", "result"]))
            .with_tag("location", TagSyntax::new().single())
            .with_tag("flush", TagSyntax::new().without_parameters().single())
            .with_tag("savecontent", TagSyntax::new()),
    )
}

fn violation(source: &str) -> MalformedConstruct {
    match ParseDriver::default().with_dictionary(dictionary()).parse_script(source) {
        Err(ParseError::Structural(violation)) => violation,
        other => panic!("expected a structural violation for {:?}, got {:?}", source, other),
    }
}

#[rstest]
#[case::name_and_scope("lock NAME='a' SCOPE='session' { }")]
#[case::lowercase_name_and_scope("lock name='a' scope='session' timeout=1 { }")]
fn test_lock_name_and_scope_conflict(#[case] source: &str) {
    assert!(matches!(violation(source), MalformedConstruct::ConflictingAttributes { .. }));
}

#[test]
fn test_lock_requires_name_scope_or_timeout() {
    let MalformedConstruct::MissingAttribute { statement, expected, .. } = violation("lock type='readonly' { }") else {
        panic!("expected a missing attribute");
    };
    assert_eq!(statement, "lock");
    assert_eq!(expected, vec!["name", "scope", "timeout"]);
}

#[rstest]
#[case::lock("lock name='a' color='red' { }", "color")]
#[case::param("param name='a' size=3;", "size")]
#[case::transaction("transaction action='begin' mode='x' { }", "mode")]
fn test_unknown_attributes(#[case] source: &str, #[case] attribute: &str) {
    let MalformedConstruct::UnknownAttribute { attribute: found, .. } = violation(source) else {
        panic!("expected an unknown attribute for {:?}", source);
    };
    assert_eq!(found, attribute);
}

#[test]
fn test_param_requires_a_name() {
    assert!(matches!(
        violation("param default=1;"),
        MalformedConstruct::MissingAttribute { .. }
    ));
}

#[test]
fn test_unrestricted_statements_accept_anything() {
    let mut driver = ParseDriver::default();
    assert!(driver.parse_script("thread name='t' priority='high' { }").is_ok());
    assert!(driver.parse_script("admin action='x' anything=1;").is_ok());
}

#[rstest]
#[case::unknown_tag("mail to='a';", DiagnosticKind::Structural)]
#[case::unknown_attribute("http url='x' port=80;", DiagnosticKind::Attribute)]
#[case::body_on_single_tag("location url='x' { }", DiagnosticKind::Structural)]
#[case::attributes_on_parameterless_tag("flush interval=10;", DiagnosticKind::Attribute)]
fn test_dictionary_violations(#[case] source: &str, #[case] kind: DiagnosticKind) {
    let mut driver = ParseDriver::default().with_dictionary(dictionary());
    assert!(matches!(driver.parse_script(source), Err(ParseError::Structural(_))));
    assert!(driver.had_fatal());
    assert_eq!(driver.diagnostics()[0].kind, kind);
}

#[test]
fn test_attribute_violations_are_attribute_diagnostics() {
    let mut driver = ParseDriver::default();
    assert!(driver.parse_script("x = 1;\n  lock name='a' scope='b' { }").is_err());
    let diagnostic = &driver.diagnostics()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Attribute);
    assert!(diagnostic.fatal);
    assert_eq!((diagnostic.line, diagnostic.column), (2, 2));
    assert_eq!(diagnostic.offending, "lock");
}

#[test]
fn test_known_tags_pass() {
    let mut driver = ParseDriver::default().with_dictionary(dictionary());
    let script = driver
        .parse_script("http url='x' method='get';\nsavecontent variable='out' { x(); }\nflush;")
        .unwrap();
    assert_stmt(&script)
        .statement_count(3)
        .statement(0, |http| {
            http.kind("Tag").attribute("method", "'get'");
        })
        .statement(1, |savecontent| {
            savecontent.kind("Tag");
        });
}

#[test]
fn test_validation_can_be_disabled() {
    let config = ParserConfig::default().with_tag_validation(false);
    let mut driver = ParseDriver::new(config).with_dictionary(dictionary());
    assert!(driver.parse_script("mail to='a';").is_ok());
    // fixed rules still apply
    assert!(driver.parse_script("lock name='a' scope='b' { }").is_err());
}

#[test]
fn test_tag_calls_become_tag_statements() {
    let mut driver = ParseDriver::default().with_dictionary(dictionary());
    let script = driver
        .parse_script("cfhttp(url = 'x', method = 'post');\ncflocation('x');\nunknown(a = 1);")
        .unwrap();
    assert_stmt(&script)
        .statement(0, |first| {
            first.kind("Tag").decompiles_to("http method='post' url='x';");
        })
        .statement(1, |second| {
            second.kind("ExpressionStatement");
        })
        .statement(2, |third| {
            third.kind("ExpressionStatement");
        });
}
