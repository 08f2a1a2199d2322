// tests/evaluator_tests.rs

use clove_filter::{CompareOperator, EvalError, Getter, Parser, Value};
use std::{borrow::Cow, cell::Cell, cmp::Ordering, collections::HashMap};

fn record(pairs: Vec<(&str, Value)>) -> HashMap<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn fit(expr: &str, pairs: Vec<(&str, Value)>) -> Result<bool, EvalError> {
    Parser::parse_logical_str(expr).unwrap().fit(&record(pairs))
}

struct CountingGetter<'a> {
    inner: HashMap<String, Value>,
    reads: &'a Cell<usize>,
}

impl Getter for CountingGetter<'_> {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        self.reads.set(self.reads.get() + 1);
        self.inner.get(key).map(Cow::Borrowed)
    }
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_numeric_widths_widen() {
    // Int32 literal against an i64 field beyond i32 range
    assert!(fit("n < 5", vec![("n", Value::Integer(-4_000_000_000))]).unwrap());
    // Int64 literal against a small field
    assert!(fit("n < 8589934592", vec![("n", Value::Integer(1))]).unwrap());
    // Double literal against an integer field
    assert!(fit("n = 2.0", vec![("n", Value::Integer(2))]).unwrap());
    assert!(fit("n > 1.5", vec![("n", Value::Integer(2))]).unwrap());
    // Integer literal against a float field
    assert!(fit("n >= 2", vec![("n", Value::Float(2.0))]).unwrap());
    assert!(!fit("n > 2", vec![("n", Value::Float(2.0))]).unwrap());
}

#[test]
fn test_absent_field_policy() {
    assert!(fit("x = null", vec![]).unwrap());
    assert!(!fit("x != null", vec![]).unwrap());
    assert!(!fit("x = 1", vec![]).unwrap());
    assert!(!fit("x != 1", vec![]).unwrap());
    assert!(!fit("x < 1", vec![]).unwrap());
    assert!(!fit("x LIKE 'a%'", vec![]).unwrap());
    assert!(fit("x IN (null, 1)", vec![]).unwrap());
    assert!(!fit("x IN (1, 2)", vec![]).unwrap());
}

#[test]
fn test_present_null() {
    assert!(fit("x = null", vec![("x", Value::Null)]).unwrap());
    assert!(fit("x != 1", vec![("x", Value::Null)]).unwrap());
    assert!(!fit("x > 1", vec![("x", Value::Null)]).unwrap());
}

#[test]
fn test_type_mismatch_is_surfaced() {
    let err = fit("age < 'ten'", vec![("age", Value::Integer(3))]).unwrap_err();
    assert_eq!(
        err,
        EvalError::TypeMismatch {
            op: CompareOperator::LessThan,
            left: "integer",
            right: "string",
        }
    );
    assert!(fit("age LIKE '1%'", vec![("age", Value::Integer(10))]).is_err());
    // Equality across families is just unequal
    assert!(!fit("age = 'ten'", vec![("age", Value::Integer(3))]).unwrap());
}

#[test]
fn test_patterns() {
    let name = vec![("name", Value::from("Li Wei"))];
    assert!(fit("name LIKE 'Li%'", name.clone()).unwrap());
    assert!(fit("name LIKE 'L_ W_i'", name.clone()).unwrap());
    assert!(!fit("name LIKE 'Wei'", name.clone()).unwrap());
    assert!(fit("name MATCHES 'W.i$'", name.clone()).unwrap());
    assert!(fit("name NOT LIKE 'Hu%'", name).unwrap());
}

#[test]
fn test_unbound_placeholder() {
    let expr = Parser::parse_logical_str("age < ?").unwrap();
    assert!(matches!(
        expr.fit(&record(vec![])),
        Err(EvalError::UnboundPlaceholder { .. })
    ));
}

#[test]
fn test_short_circuit_skips_right_side() {
    let reads = Cell::new(0);
    let getter = CountingGetter {
        inner: record(vec![("a", Value::Integer(0)), ("b", Value::Integer(0))]),
        reads: &reads,
    };

    let and = Parser::parse_logical_str("a = 1 AND b = 0").unwrap();
    assert!(!and.fit(&getter).unwrap());
    assert_eq!(reads.get(), 1);

    reads.set(0);
    let or = Parser::parse_logical_str("a = 0 OR b = 0").unwrap();
    assert!(or.fit(&getter).unwrap());
    assert_eq!(reads.get(), 1);

    reads.set(0);
    let both = Parser::parse_logical_str("a = 0 AND b = 0").unwrap();
    assert!(both.fit(&getter).unwrap());
    assert_eq!(reads.get(), 2);
}

#[test]
fn test_longest_accepted_chain_evaluates() {
    // 255 folds over 256 comparisons is the tallest tree the parser accepts
    let text = format!("a = 1{}", " AND a = 1".repeat(255));
    let expr = Parser::parse_logical_str(&text).unwrap();
    assert_eq!(expr.depth(), 256);
    assert!(expr.fit(&record(vec![("a", Value::Integer(1))])).unwrap());
    assert!(!expr.fit(&record(vec![])).unwrap());
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_number_widening() {
    assert_eq!(
        Value::Integer(3).compare_numbers(&Value::Float(3.5)),
        Some(Ordering::Less)
    );
    assert_eq!(
        Value::Integer(i64::MAX).compare_numbers(&Value::Integer(i64::MAX - 1)),
        Some(Ordering::Greater)
    );
    assert_eq!(Value::from("3").compare_numbers(&Value::Integer(3)), None);
}

#[test]
fn test_json_round_trip_keeps_integers() {
    let json = serde_json::json!({"age": 12, "ratio": 0.5, "tags": ["a"]});
    let value = Value::from(json.clone());
    match &value {
        Value::Object(map) => {
            assert_eq!(map.get("age"), Some(&Value::Integer(12)));
            assert_eq!(map.get("ratio"), Some(&Value::Float(0.5)));
        }
        other => panic!("expected object, got {:?}", other),
    }
    assert_eq!(serde_json::Value::from(value), json);
}

#[test]
fn test_absent_and_null_are_distinct() {
    let mut record = HashMap::new();
    record.insert("spouse".to_string(), Value::Null);
    assert_eq!(Getter::get(&record, "spouse").as_deref(), Some(&Value::Null));
    assert!(Getter::get(&record, "children").is_none());
}

#[test]
fn test_json_getter_converts_on_read() {
    let record = serde_json::json!({"name": "Li", "age": 12});
    assert_eq!(
        Getter::get(&record, "age").as_deref(),
        Some(&Value::Integer(12))
    );
    assert!(Getter::get(&serde_json::json!([1, 2]), "age").is_none());
}
