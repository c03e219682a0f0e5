//! Property-based tests for decompilation
//!
//! Decompiled text must parse back to a tree that decompiles to the same text. The inputs are
//! generated fully parenthesized, so the first decompilation exercises parenthesis removal
//! and the second one checks that nothing needed was dropped.

use cfml_parser::{AstNode, ParseDriver};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        "x[0-9]{0,2}",
        "[0-9]{1,3}",
        "'[a-z]{0,4}'",
        Just("true".to_string()),
    ]
}

fn binary_operator() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("/"),
        Just("^"),
        Just("&"),
        Just("=="),
        Just("MOD"),
        Just("AND"),
        Just("OR"),
    ]
}

fn expression() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (inner.clone(), binary_operator(), inner.clone())
                .prop_map(|(left, operator, right)| format!("({} {} {})", left, operator, right)),
            inner.clone().prop_map(|operand| format!("(-{})", operand)),
            inner.clone().prop_map(|operand| format!("(NOT {})", operand)),
            ("x[0-9]?", prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(name, arguments)| format!("{}({})", name, arguments.join(", "))),
            prop::collection::vec(inner, 0..3).prop_map(|items| format!("[{}]", items.join(", "))),
        ]
    })
}

fn top_level() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => expression(),
        1 => (leaf(), expression(), expression())
            .prop_map(|(condition, then_branch, else_branch)| {
                format!("{} ? {} : {}", condition, then_branch, else_branch)
            }),
    ]
}

fn decompile(source: &str) -> Option<String> {
    let expression = ParseDriver::default().parse_expression(source).ok()?;
    expression.decompile(0).ok()
}

proptest! {
    #[test]
    fn decompile_is_a_fixed_point(source in top_level()) {
        let first = decompile(&source);
        prop_assume!(first.is_some());
        let first = first.unwrap();

        let second = decompile(&first);
        prop_assert_eq!(second.as_deref(), Some(first.as_str()), "source: {}", source);
    }

    #[test]
    fn decompiled_text_has_no_redundant_spaces(source in expression()) {
        if let Some(text) = decompile(&source) {
            prop_assert!(!text.contains("  "), "{:?}", text);
            prop_assert!(!text.starts_with(' ') && !text.ends_with(' '));
        }
    }
}
