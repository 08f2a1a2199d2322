// tests/parser_tests.rs

use clove_filter::ast::{
    CompareOperator, Expression, LogicalExpression, LogicalOperator, Number, ValueExpression,
};
use clove_filter::lexer::LexError;
use clove_filter::parser::{BracketKind, ParseOptions, Parser};
use proptest::prelude::*;

fn parse(input: &str) -> Expression {
    Parser::parse_str(input).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", input, e))
}

fn canonical(input: &str) -> String {
    parse(input).to_string()
}

fn error_at(input: &str) -> usize {
    match Parser::parse_str(input) {
        Ok(expr) => panic!("expected {:?} to fail, got {}", input, expr),
        Err(e) => e.offset(),
    }
}

fn key(name: &str) -> ValueExpression {
    ValueExpression::Key(name.to_string())
}

// ============================================================================
// Bare Values
// ============================================================================

#[test]
fn test_bare_values() {
    assert_eq!(parse("age"), Expression::Value(key("age")));
    assert_eq!(parse("null"), Expression::Value(ValueExpression::Null));
    assert_eq!(parse("true"), Expression::Value(ValueExpression::Boolean(true)));
    assert_eq!(
        parse("-42"),
        Expression::Value(ValueExpression::Number(Number::Int32(-42)))
    );
    assert_eq!(
        parse("'Li'"),
        Expression::Value(ValueExpression::String("Li".to_string()))
    );
    assert_eq!(parse("?"), Expression::Value(ValueExpression::Placeholder));
    assert_eq!(parse("(age)"), Expression::Value(key("age")));
}

#[test]
fn test_parse_logical_rejects_bare_value() {
    let err = Parser::parse_logical_str("age").unwrap_err();
    assert_eq!(err.offset(), 0);
    assert!(err.message().contains("bare value"));
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_simple_comparison() {
    let expr = Parser::parse_logical_str("age < 18").unwrap();
    match expr {
        LogicalExpression::Simple(simple) => {
            assert_eq!(simple.left(), &key("age"));
            assert_eq!(simple.op(), CompareOperator::LessThan);
            assert_eq!(simple.right(), &ValueExpression::Number(Number::Int32(18)));
        }
        other => panic!("expected a simple expression, got {:?}", other),
    }
}

#[test]
fn test_every_compare_operator() {
    let test_cases = vec![
        ("a = 1", "a = 1"),
        ("a == 1", "a = 1"),
        ("a != 1", "a != 1"),
        ("a <> 1", "a != 1"),
        ("a < 1", "a < 1"),
        ("a <= 1", "a <= 1"),
        ("a > 1", "a > 1"),
        ("a >= 1", "a >= 1"),
        ("a in (1, 2)", "a IN (1, 2)"),
        ("a like 'x%'", "a LIKE 'x%'"),
        ("a matches '^x'", "a MATCHES '^x'"),
        ("a =~ '^x'", "a MATCHES '^x'"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(canonical(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_lists() {
    assert_eq!(canonical("a IN ()"), "a IN ()");
    assert_eq!(canonical("a IN ('x', null, 2.5, ?)"), "a IN ('x', null, 2.5, ?)");
    assert_eq!(error_at("a IN (1,)"), 8);
    assert_eq!(error_at("a IN (1 2)"), 8);
    assert_eq!(error_at("a IN (b)"), 6);
    assert_eq!(error_at("a IN ((1))"), 6);
    assert_eq!(error_at("a IN (1, 2"), 5);
}

#[test]
fn test_literal_on_the_left() {
    let expr = Parser::parse_logical_str("1 = 1").unwrap();
    assert!(expr.is_always_true());
    let expr = Parser::parse_logical_str("'a' = 'b'").unwrap();
    assert!(expr.is_always_false());
}

// ============================================================================
// Logical Composition
// ============================================================================

#[test]
fn test_logical_operators_fold_left_to_right() {
    let expr = Parser::parse_logical_str("a = 1 OR b = 2 AND c = 3").unwrap();
    match expr {
        LogicalExpression::Multi { left, op, right } => {
            assert_eq!(op, LogicalOperator::And);
            assert_eq!(left.to_string(), "a = 1 OR b = 2");
            assert_eq!(right.to_string(), "c = 3");
        }
        other => panic!("expected a compound expression, got {:?}", other),
    }
}

#[test]
fn test_groups_override_folding() {
    let expr = Parser::parse_logical_str("a = 1 OR (b = 2 AND c = 3)").unwrap();
    match &expr {
        LogicalExpression::Multi { op, right, .. } => {
            assert_eq!(*op, LogicalOperator::Or);
            assert!(matches!(
                right.as_ref(),
                LogicalExpression::Multi { op: LogicalOperator::And, .. }
            ));
        }
        other => panic!("expected a compound expression, got {:?}", other),
    }
    assert_eq!(expr.to_string(), "a = 1 OR (b = 2 AND c = 3)");
}

#[test]
fn test_symbolic_logical_operators() {
    assert_eq!(canonical("a = 1 && b = 2 || !(c = 3)"), "a = 1 AND b = 2 OR NOT (c = 3)");
}

#[test]
fn test_redundant_groups() {
    assert_eq!(parse("((a = 1))"), parse("a = 1"));
    assert_eq!(parse("(a = 1) AND (b = 2)"), parse("a = 1 AND b = 2"));
}

// ============================================================================
// Negation
// ============================================================================

#[test]
fn test_negation_forms() {
    assert_eq!(canonical("NOT a = 1"), "NOT (a = 1)");
    assert_eq!(canonical("NOT (a = 1)"), "NOT (a = 1)");
    assert_eq!(canonical("NOT NOT (a = 1)"), "NOT (NOT (a = 1))");
    assert_eq!(canonical("a NOT IN (1, 2)"), "NOT (a IN (1, 2))");
    assert_eq!(canonical("name NOT LIKE 'Hu%'"), "NOT (name LIKE 'Hu%')");
    assert_eq!(
        canonical("a = 1 AND NOT b = 2"),
        "a = 1 AND NOT (b = 2)"
    );
}

#[test]
fn test_negation_scopes_to_group() {
    let expr = Parser::parse_logical_str("NOT (a = 1 OR b = 2)").unwrap();
    assert!(matches!(expr, LogicalExpression::Non(ref inner)
        if matches!(inner.as_ref(), LogicalExpression::Multi { op: LogicalOperator::Or, .. })));
}

#[test]
fn test_dangling_negations() {
    assert_eq!(error_at("a = 1 NOT"), 6);
    assert_eq!(error_at("NOT age"), 0);
    assert_eq!(error_at("a = NOT 1"), 4);
    assert_eq!(error_at("NOT AND a = 1"), 0);
}

// ============================================================================
// Operator Legality
// ============================================================================

#[test]
fn test_legality_is_checked_at_parse_time() {
    // IN needs a list or placeholder
    assert_eq!(error_at("tag IN 5"), 7);
    assert_eq!(error_at("tag IN 'a'"), 7);
    // Ordering against booleans and null
    assert_eq!(error_at("age < true"), 6);
    assert_eq!(error_at("age >= null"), 7);
    // Patterns need strings
    assert_eq!(error_at("name LIKE 5"), 10);
    assert_eq!(error_at("name MATCHES null"), 13);
    // Lists only with IN
    assert_eq!(error_at("a = (1, 2)"), 4);
    // Keys never on the right
    assert_eq!(error_at("a = b"), 4);
    // Placeholders never on the left
    assert_eq!(error_at("? = 1"), 2);
    // Literal against literal of another family
    assert_eq!(error_at("1 = 'one'"), 4);
    // Invalid regular expression
    assert_eq!(error_at("a MATCHES '('"), 10);
}

#[test]
fn test_placeholders_are_legal_operands() {
    for input in ["a = ?", "a IN ?", "a LIKE ?", "a < ?", "a IN (?, 1)"] {
        let expr = parse(input);
        assert!(expr.size_of_placeholder() >= 1, "Failed for input: {}", input);
    }
}

// ============================================================================
// Structural Errors
// ============================================================================

#[test]
fn test_structural_errors_carry_offsets() {
    let test_cases = vec![
        ("", 0),
        ("()", 1),
        ("(a = 1", 0),
        ("a = 1)", 5),
        ("a = 1 AND", 6),
        ("AND a = 1", 0),
        ("a = 1 AND OR b = 2", 10),
        ("a =", 2),
        ("= 1", 0),
        ("a b", 2),
        ("a = 1 b = 2", 6),
        ("a < 1 < 2", 6),
        ("a = 1, b = 2", 5),
        ("a = 1 AND (b = 2", 10),
    ];

    for (input, offset) in test_cases {
        assert_eq!(error_at(input), offset, "Failed for input: {:?}", input);
    }
}

#[test]
fn test_error_keeps_source_and_cause() {
    let err = Parser::parse_str("a = 'open").unwrap_err();
    assert_eq!(err.text(), "a = 'open");
    assert_eq!(err.offset(), 4);
    assert!(err.lex_error().is_some());

    let err = Parser::parse_str("a = 1)").unwrap_err();
    assert!(err.lex_error().is_none());
    assert_eq!(err.to_string(), "unmatched ')' at offset 5 in 'a = 1)'");
    assert_eq!(err.format_error(), "unmatched ')'\na = 1)\n     ^");
}

// ============================================================================
// Bracket Scopes
// ============================================================================

#[test]
fn test_scope_tree() {
    let parsed = Parser::new("(a IN (1, 2)) OR (b = 1)")
        .unwrap()
        .parse_with_scopes()
        .unwrap();
    let scopes = &parsed.scopes;
    assert_eq!(scopes.len(), 3);

    let roots: Vec<_> = scopes.roots().collect();
    assert_eq!(roots.len(), 2);

    let first = scopes.get(roots[0]).unwrap();
    assert_eq!(first.kind, BracketKind::Group);
    assert_eq!((first.start, first.end), (0, Some(12)));
    assert_eq!(first.children().len(), 1);

    let list_id = first.children()[0];
    let list = scopes.get(list_id).unwrap();
    assert_eq!(list.kind, BracketKind::List);
    assert_eq!((list.start, list.end), (6, Some(11)));
    assert_eq!(list.parent(), Some(roots[0]));
    assert_eq!(scopes.depth(list_id), 1);

    let second = scopes.get(roots[1]).unwrap();
    assert_eq!((second.start, second.end), (17, Some(23)));
}

#[test]
fn test_max_depth() {
    let options = ParseOptions {
        max_depth: 2,
        ..ParseOptions::default()
    };
    assert!(Parser::with_options("((a = 1))", options).unwrap().parse().is_ok());
    let err = Parser::with_options("(((a = 1)))", options)
        .unwrap()
        .parse()
        .unwrap_err();
    assert_eq!(err.offset(), 2);

    let deep = format!("{}a = 1{}", "(".repeat(65), ")".repeat(65));
    assert!(Parser::parse_str(&deep).is_err());
    let ok = format!("{}a = 1{}", "(".repeat(64), ")".repeat(64));
    assert!(Parser::parse_str(&ok).is_ok());
}

#[test]
fn test_negations_count_toward_depth() {
    let options = ParseOptions {
        max_depth: 2,
        ..ParseOptions::default()
    };
    let parse_with = |text: &str| Parser::with_options(text, options).unwrap().parse();

    assert!(parse_with("NOT NOT a = 1").is_ok());
    assert!(parse_with("NOT (a = 1)").is_ok());
    assert_eq!(parse_with("NOT NOT NOT a = 1").unwrap_err().offset(), 8);
    assert!(parse_with("NOT (NOT (a = 1))").is_ok());
    assert_eq!(parse_with("NOT (NOT (NOT (a = 1)))").unwrap_err().offset(), 10);
    assert_eq!(parse_with("((NOT a = 1))").unwrap_err().offset(), 2);
    assert!(parse_with("NOT a IN (1)").is_ok());
    assert_eq!(parse_with("NOT NOT a IN (1)").unwrap_err().offset(), 13);

    let deep = format!("{}a = 1", "NOT ".repeat(20_000));
    let err = Parser::parse_str(&deep).unwrap_err();
    assert_eq!(err.offset(), 64 * 4);
    assert!(err.message().contains("deeper than 64"));
}

#[test]
fn test_long_chains_are_limited() {
    let long = format!("a = 1{}", " AND a = 1".repeat(50_000));
    let err = Parser::parse_str(&long).unwrap_err();
    // The 256th AND would make the tree 257 levels tall
    assert_eq!(err.offset(), 6 + 255 * 10);
    assert!(err.message().contains("deeper than 256"));

    let options = ParseOptions {
        max_expression_depth: 3,
        ..ParseOptions::default()
    };
    let parse_with = |text: &str| Parser::with_options(text, options).unwrap().parse();
    assert!(parse_with("a = 1 OR b = 1 OR c = 1").is_ok());
    assert!(parse_with("NOT (a = 1 OR b = 1)").is_ok());
    assert!(parse_with("NOT (a = 1 OR b = 1) AND c = 1").is_err());
    assert!(parse_with("a = 1 OR b = 1 OR c = 1 OR d = 1").is_err());
}

#[test]
fn test_out_of_range_double_is_rejected() {
    for text in ["a = 1e999", "a = -1e999", "a IN (1, 1e400)"] {
        let err = Parser::parse_str(text).unwrap_err();
        assert!(
            matches!(err.lex_error(), Some(LexError::NumberOutOfRange { .. })),
            "Failed for input: {}",
            text
        );
    }
}

#[test]
fn test_canonical_text_reparses() {
    let inputs = [
        "a = 1 AND (b = 2 OR NOT c IN (1, 2.5, 'x'))",
        "NOT NOT NOT (x LIKE 'a%')",
        "n >= -2147483649 OR n < 1e-30",
        "(a = 1 OR b = 2) AND (c = 3 OR d = 4)",
    ];
    for input in inputs {
        let expr = parse(input);
        assert_eq!(parse(&expr.to_string()), expr, "Failed for input: {}", input);
    }

    let nested = format!("{}a = 1", "NOT ".repeat(64));
    let expr = parse(&nested);
    assert_eq!(parse(&expr.to_string()), expr);
}

// ============================================================================
// Properties
// ============================================================================

const KEYWORDS: [&str; 9] = ["and", "or", "not", "in", "like", "matches", "true", "false", "null"];

fn literal() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z_][A-Za-z0-9_]{0,8}"
            .prop_filter("keyword", |s| !KEYWORDS.contains(&s.to_lowercase().as_str())),
        any::<i64>().prop_map(|n| n.to_string()),
        "'[a-z ]{0,6}'",
        Just("true".to_string()),
        Just("false".to_string()),
        Just("null".to_string()),
        Just("?".to_string()),
    ]
}

proptest! {
    #[test]
    fn prop_whitespace_does_not_change_literals(
        lit in literal(),
        before in "[ \t\n]{0,4}",
        after in "[ \t\n]{0,4}",
    ) {
        let padded = format!("{}{}{}", before, lit, after);
        prop_assert_eq!(Parser::parse_str(&padded).unwrap(), Parser::parse_str(&lit).unwrap());
    }

    #[test]
    fn prop_identifiers_parse_as_keys(name in "[A-Za-z_][A-Za-z0-9_]{0,12}") {
        prop_assume!(!KEYWORDS.contains(&name.to_lowercase().as_str()));
        prop_assert_eq!(
            Parser::parse_str(&name).unwrap(),
            Expression::Value(ValueExpression::Key(name.clone()))
        );
    }

    #[test]
    fn prop_malformed_identifiers_are_not_keys(
        name in prop_oneof![
            "[0-9][A-Za-z0-9_]{1,6}",
            "[A-Za-z_]{1,4} [A-Za-z_]{1,4}",
            "[.$][A-Za-z_]{1,6}",
        ]
    ) {
        let parsed = Parser::parse_str(&name);
        prop_assert!(!matches!(parsed, Ok(Expression::Value(ValueExpression::Key(_)))));
    }

    #[test]
    fn prop_boolean_case_sensitivity(
        word in prop_oneof![Just("true"), Just("false")],
        mask in proptest::collection::vec(any::<bool>(), 5),
    ) {
        let cased: String = word
            .chars()
            .zip(mask)
            .map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c })
            .collect();
        let parsed = Parser::parse_str(&cased);
        if cased == word {
            prop_assert_eq!(
                parsed.unwrap(),
                Expression::Value(ValueExpression::Boolean(word == "true"))
            );
        } else {
            prop_assert!(parsed.is_err());
        }
    }
}
