use std::{borrow::Cow, cmp::Ordering};

use thiserror::Error;

use crate::{
    ast::{CompareOperator, LogicalExpression, Number, SimpleExpression, ValueExpression},
    record::Getter,
    value::Value,
};

/// Errors that can occur while testing an expression against a record.
///
/// An absent field is not an error: comparisons against it are simply
/// false, except `= null` which is true.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A `?` was never bound to a parameter
    #[error("placeholder in '{expression}' must be bound before evaluation")]
    UnboundPlaceholder { expression: String },

    /// The record value has a type the operator can not compare with the literal
    #[error("can not apply {op} to {left} and {right}")]
    TypeMismatch {
        op: CompareOperator,
        left: &'static str,
        right: &'static str,
    },
}

impl LogicalExpression {
    /// Tests this expression against one record.
    ///
    /// `AND` stops at the first false left side and `OR` at the first true
    /// one; the right side is not evaluated in either case. Double
    /// negations are peeled before evaluating the inner expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use clove_filter::{Parser, Value};
    /// use std::collections::HashMap;
    ///
    /// let expr = Parser::parse_logical_str("age < 18").unwrap();
    ///
    /// let mut li = HashMap::new();
    /// li.insert("age".to_string(), Value::Integer(12));
    /// assert!(expr.fit(&li).unwrap());
    /// ```
    pub fn fit<G: Getter + ?Sized>(&self, getter: &G) -> Result<bool, EvalError> {
        match self {
            LogicalExpression::Simple(simple) => fit_simple(simple, getter),
            LogicalExpression::Non(inner) => match inner.as_ref() {
                LogicalExpression::Non(twice) => twice.fit(getter),
                other => Ok(!other.fit(getter)?),
            },
            LogicalExpression::Multi { left, op, right } => {
                let left = left.fit(getter)?;
                if left == op.short_circuits_on() {
                    return Ok(left);
                }
                Ok(op.apply(left, right.fit(getter)?))
            }
        }
    }
}

fn fit_simple<G: Getter + ?Sized>(
    simple: &SimpleExpression,
    getter: &G,
) -> Result<bool, EvalError> {
    if simple.right().size_of_placeholder() > 0 {
        return Err(EvalError::UnboundPlaceholder {
            expression: simple.to_string(),
        });
    }

    let left = match simple.left() {
        ValueExpression::Key(name) => getter.get(name),
        literal => literal_value(literal).map(Cow::Owned),
    };

    compare(simple, left.as_deref())
}

/// Converts a literal to the record-side representation.
///
/// `Int32` and `Int64` widen to `Integer`, `Double` to `Float`.
pub(crate) fn literal_value(literal: &ValueExpression) -> Option<Value> {
    match literal {
        ValueExpression::Null => Some(Value::Null),
        ValueExpression::Boolean(b) => Some(Value::Boolean(*b)),
        ValueExpression::Number(Number::Double(n)) => Some(Value::Float(*n)),
        ValueExpression::Number(n) => n.as_i64().map(Value::Integer),
        ValueExpression::String(s) => Some(Value::String(s.clone())),
        ValueExpression::List(items) => items
            .iter()
            .map(literal_value)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        ValueExpression::Key(_) | ValueExpression::Placeholder => None,
    }
}

fn compare(simple: &SimpleExpression, left: Option<&Value>) -> Result<bool, EvalError> {
    let right = simple.right();
    let op = simple.op();

    match op {
        CompareOperator::Equal => Ok(match left {
            None => matches!(right, ValueExpression::Null),
            Some(value) => equals(value, right),
        }),
        CompareOperator::NotEqual => Ok(match left {
            None => false,
            Some(value) => !equals(value, right),
        }),
        CompareOperator::In => {
            let ValueExpression::List(items) = right else {
                return Err(mismatch(op, left, right));
            };
            Ok(match left {
                None => items.contains(&ValueExpression::Null),
                Some(value) => items.iter().any(|item| equals(value, item)),
            })
        }
        CompareOperator::LessThan
        | CompareOperator::LessEqual
        | CompareOperator::GreaterThan
        | CompareOperator::GreaterEqual => {
            let Some(ordering) = order(op, left, right)? else {
                return Ok(false);
            };
            Ok(match op {
                CompareOperator::LessThan => ordering == Ordering::Less,
                CompareOperator::LessEqual => ordering != Ordering::Greater,
                CompareOperator::GreaterThan => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
        CompareOperator::Like | CompareOperator::Matches => match left {
            None | Some(Value::Null) => Ok(false),
            Some(Value::String(text)) => match simple.matcher() {
                Some(matcher) => Ok(matcher.is_match(text)),
                None => Err(mismatch(op, left, right)),
            },
            Some(_) => Err(mismatch(op, left, right)),
        },
    }
}

/// Equality under `=` semantics; values of different families are unequal.
fn equals(value: &Value, literal: &ValueExpression) -> bool {
    match (value, literal) {
        (Value::Null, ValueExpression::Null) => true,
        (Value::Boolean(a), ValueExpression::Boolean(b)) => a == b,
        (Value::String(a), ValueExpression::String(b)) => a == b,
        (v, ValueExpression::Number(_)) if v.is_number() => literal_value(literal)
            .and_then(|n| v.compare_numbers(&n))
            .is_some_and(|o| o == Ordering::Equal),
        _ => false,
    }
}

/// Ordering between a record value and a literal.
///
/// `Ok(None)` means a non-match (absent, null, or NaN involved).
fn order(
    op: CompareOperator,
    left: Option<&Value>,
    right: &ValueExpression,
) -> Result<Option<Ordering>, EvalError> {
    match (left, right) {
        (None, _) | (Some(Value::Null), _) => Ok(None),
        (Some(v), ValueExpression::Number(_)) if v.is_number() => {
            Ok(literal_value(right).and_then(|n| v.compare_numbers(&n)))
        }
        (Some(Value::String(a)), ValueExpression::String(b)) => Ok(Some(a.as_str().cmp(b))),
        (l, r) => Err(mismatch(op, l, r)),
    }
}

fn mismatch(op: CompareOperator, left: Option<&Value>, right: &ValueExpression) -> EvalError {
    EvalError::TypeMismatch {
        op,
        left: left.map(Value::type_name).unwrap_or("absent"),
        right: right.value_type().name(),
    }
}
