use std::{
    fmt,
    hash::{Hash, Hasher},
    slice,
};

use regex::Regex;
use thiserror::Error;

use crate::{
    ast::{CompareOperator, LogicalOperator, Number, ValueExpression},
    record::EmptyRecord,
    value::Value,
};

/// Errors raised while binding positional parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    #[error("expected {expected} parameters, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("{0} values can not be bound to a placeholder")]
    Unbindable(&'static str),

    #[error("illegal parameter: {0}")]
    Illegal(String),
}

/// Compiled pattern for `LIKE` and `MATCHES`, compared by its source.
#[derive(Debug, Clone)]
pub(crate) struct Matcher(Regex);

impl Matcher {
    fn compile(op: CompareOperator, pattern: &str) -> Result<Self, String> {
        let source = match op {
            CompareOperator::Like => like_to_regex(pattern),
            _ => pattern.to_string(),
        };
        Regex::new(&source)
            .map(Matcher)
            .map_err(|e| format!("invalid pattern '{}': {}", pattern, e))
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl Eq for Matcher {}

impl Hash for Matcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_str().hash(state);
    }
}

/// Translates `%` and `_` wildcards into an anchored regular expression.
fn like_to_regex(pattern: &str) -> String {
    let mut source = String::from("(?s)^");
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '%' | '_' => {
                source.push_str(&regex::escape(&literal));
                literal.clear();
                source.push_str(if ch == '%' { ".*" } else { "." });
            }
            c => literal.push(c),
        }
    }
    source.push_str(&regex::escape(&literal));
    source.push('$');
    source
}

/// Leaf predicate: `left op right`.
///
/// Construction validates operand legality, so every instance in a tree
/// is well-typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleExpression {
    left: ValueExpression,
    op: CompareOperator,
    right: ValueExpression,
    matcher: Option<Matcher>,
}

impl SimpleExpression {
    pub fn new(
        left: ValueExpression,
        op: CompareOperator,
        right: ValueExpression,
    ) -> Result<Self, String> {
        if let Some(message) = left.check_by(op) {
            return Err(message);
        }
        if let Some(message) = right.check_right_by(op) {
            return Err(message);
        }
        if !left.is_key()
            && op != CompareOperator::In
            && right.size_of_placeholder() == 0
            && !left.value_type().same_family(right.value_type())
        {
            return Err(format!(
                "can not compare {} with {}",
                left.value_type(),
                right.value_type()
            ));
        }

        let matcher = match (&right, op.is_pattern()) {
            (ValueExpression::String(pattern), true) => Some(Matcher::compile(op, pattern)?),
            _ => None,
        };

        Ok(SimpleExpression {
            left,
            op,
            right,
            matcher,
        })
    }

    pub fn left(&self) -> &ValueExpression {
        &self.left
    }

    pub fn op(&self) -> CompareOperator {
        self.op
    }

    pub fn right(&self) -> &ValueExpression {
        &self.right
    }

    pub(crate) fn matcher(&self) -> Option<&Matcher> {
        self.matcher.as_ref()
    }

    fn bind_with(&self, params: &mut slice::Iter<'_, Value>) -> Result<Self, BindError> {
        if self.right.size_of_placeholder() == 0 {
            return Ok(self.clone());
        }
        let right = bind_value(&self.right, params)?;
        SimpleExpression::new(self.left.clone(), self.op, right).map_err(BindError::Illegal)
    }
}

impl fmt::Display for SimpleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

fn bind_value(
    value: &ValueExpression,
    params: &mut slice::Iter<'_, Value>,
) -> Result<ValueExpression, BindError> {
    match value {
        ValueExpression::Placeholder => match params.next() {
            Some(param) => ValueExpression::try_from(param),
            None => Err(BindError::Illegal("ran out of parameters".to_string())),
        },
        ValueExpression::List(items) => items
            .iter()
            .map(|item| bind_value(item, params))
            .collect::<Result<Vec<_>, _>>()
            .map(ValueExpression::List),
        other => Ok(other.clone()),
    }
}

impl TryFrom<&Value> for ValueExpression {
    type Error = BindError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(ValueExpression::Null),
            Value::Boolean(b) => Ok(ValueExpression::Boolean(*b)),
            Value::Integer(n) => Ok(ValueExpression::Number(Number::from_i64(*n))),
            Value::Float(n) if !n.is_finite() => Err(BindError::Unbindable("non-finite float")),
            Value::Float(n) => Ok(ValueExpression::Number(Number::Double(*n))),
            Value::String(s) => Ok(ValueExpression::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(ValueExpression::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(ValueExpression::List),
            Value::Object(_) => Err(BindError::Unbindable("object")),
        }
    }
}

/// Boolean-producing node of a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalExpression {
    /// Comparison leaf
    ///
    /// # Example
    /// ```text
    /// age < 18
    /// ```
    Simple(SimpleExpression),

    /// Negation
    ///
    /// The parser never collapses `NOT NOT x`; each negation wraps again.
    Non(Box<LogicalExpression>),

    /// Conjunction or disjunction, folded left-associatively
    ///
    /// # Example
    /// ```text
    /// a = 1 AND b = 2 OR c = 3   // Multi(Multi(a = 1, AND, b = 2), OR, c = 3)
    /// ```
    Multi {
        left: Box<LogicalExpression>,
        op: LogicalOperator,
        right: Box<LogicalExpression>,
    },
}

impl LogicalExpression {
    /// Builds and validates a comparison leaf.
    pub fn simple(
        left: ValueExpression,
        op: CompareOperator,
        right: ValueExpression,
    ) -> Result<Self, String> {
        SimpleExpression::new(left, op, right).map(LogicalExpression::Simple)
    }

    pub fn negate(self) -> Self {
        LogicalExpression::Non(Box::new(self))
    }

    pub fn and(self, other: LogicalExpression) -> Self {
        self.join(LogicalOperator::And, other)
    }

    pub fn or(self, other: LogicalExpression) -> Self {
        self.join(LogicalOperator::Or, other)
    }

    pub fn join(self, op: LogicalOperator, other: LogicalExpression) -> Self {
        LogicalExpression::Multi {
            left: Box::new(self),
            op,
            right: Box::new(other),
        }
    }

    /// Height of the tree: 1 for a comparison, plus one per negation or
    /// `AND`/`OR` level above it.
    pub fn depth(&self) -> usize {
        match self {
            LogicalExpression::Simple(_) => 1,
            LogicalExpression::Non(inner) => inner.depth() + 1,
            LogicalExpression::Multi { left, right, .. } => left.depth().max(right.depth()) + 1,
        }
    }

    pub fn size_of_placeholder(&self) -> usize {
        match self {
            LogicalExpression::Simple(simple) => simple.right.size_of_placeholder(),
            LogicalExpression::Non(inner) => inner.size_of_placeholder(),
            LogicalExpression::Multi { left, right, .. } => {
                left.size_of_placeholder() + right.size_of_placeholder()
            }
        }
    }

    /// True when the expression holds for every record, decided without a
    /// getter. Only literal-only comparisons such as `1 = 1` are folded;
    /// anything touching a key is conservatively `false`.
    pub fn is_always_true(&self) -> bool {
        match self {
            LogicalExpression::Simple(simple) => simple.constant_value() == Some(true),
            LogicalExpression::Non(inner) => inner.is_always_false(),
            LogicalExpression::Multi { left, op, right } => match op {
                LogicalOperator::And => left.is_always_true() && right.is_always_true(),
                LogicalOperator::Or => left.is_always_true() || right.is_always_true(),
            },
        }
    }

    /// Mirror of [`is_always_true`](Self::is_always_true).
    pub fn is_always_false(&self) -> bool {
        match self {
            LogicalExpression::Simple(simple) => simple.constant_value() == Some(false),
            LogicalExpression::Non(inner) => inner.is_always_true(),
            LogicalExpression::Multi { left, op, right } => match op {
                LogicalOperator::And => left.is_always_false() || right.is_always_false(),
                LogicalOperator::Or => left.is_always_false() && right.is_always_false(),
            },
        }
    }

    /// Replaces placeholders with `params` in encounter order.
    pub fn bind(&self, params: &[Value]) -> Result<Self, BindError> {
        let expected = self.size_of_placeholder();
        if expected != params.len() {
            return Err(BindError::Arity {
                expected,
                got: params.len(),
            });
        }
        self.bind_with(&mut params.iter())
    }

    fn bind_with(&self, params: &mut slice::Iter<'_, Value>) -> Result<Self, BindError> {
        match self {
            LogicalExpression::Simple(simple) => {
                simple.bind_with(params).map(LogicalExpression::Simple)
            }
            LogicalExpression::Non(inner) => Ok(inner.bind_with(params)?.negate()),
            LogicalExpression::Multi { left, op, right } => {
                let left = left.bind_with(params)?;
                let right = right.bind_with(params)?;
                Ok(left.join(*op, right))
            }
        }
    }
}

impl SimpleExpression {
    fn constant_value(&self) -> Option<bool> {
        if self.left.is_key() || self.right.size_of_placeholder() > 0 {
            return None;
        }
        LogicalExpression::Simple(self.clone()).fit(&EmptyRecord).ok()
    }
}

impl fmt::Display for LogicalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalExpression::Simple(simple) => write!(f, "{}", simple),
            LogicalExpression::Non(inner) => write!(f, "NOT ({})", inner),
            LogicalExpression::Multi { left, op, right } => match right.as_ref() {
                // Folding is left-associative, so only a compound right side needs grouping
                LogicalExpression::Multi { .. } => write!(f, "{} {} ({})", left, op, right),
                _ => write!(f, "{} {} {}", left, op, right),
            },
        }
    }
}

/// Result of a parse: a bare value or a logical expression.
///
/// Callers decide whether a bare value (e.g. a single key) is acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Value(ValueExpression),
    Logical(LogicalExpression),
}

impl Expression {
    pub fn as_logical(&self) -> Option<&LogicalExpression> {
        match self {
            Expression::Logical(logical) => Some(logical),
            Expression::Value(_) => None,
        }
    }

    pub fn into_logical(self) -> Option<LogicalExpression> {
        match self {
            Expression::Logical(logical) => Some(logical),
            Expression::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&ValueExpression> {
        match self {
            Expression::Value(value) => Some(value),
            Expression::Logical(_) => None,
        }
    }

    pub fn size_of_placeholder(&self) -> usize {
        match self {
            Expression::Value(value) => value.size_of_placeholder(),
            Expression::Logical(logical) => logical.size_of_placeholder(),
        }
    }

    pub fn bind(&self, params: &[Value]) -> Result<Self, BindError> {
        match self {
            Expression::Logical(logical) => logical.bind(params).map(Expression::Logical),
            Expression::Value(value) => {
                let expected = value.size_of_placeholder();
                if expected != params.len() {
                    return Err(BindError::Arity {
                        expected,
                        got: params.len(),
                    });
                }
                bind_value(value, &mut params.iter()).map(Expression::Value)
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Value(value) => write!(f, "{}", value),
            Expression::Logical(logical) => write!(f, "{}", logical),
        }
    }
}

impl From<LogicalExpression> for Expression {
    fn from(logical: LogicalExpression) -> Self {
        Expression::Logical(logical)
    }
}

impl From<ValueExpression> for Expression {
    fn from(value: ValueExpression) -> Self {
        Expression::Value(value)
    }
}

#[test]
fn test_like_translation() {
    assert_eq!(like_to_regex("a%"), "(?s)^a.*$");
    assert_eq!(like_to_regex("_.x"), "(?s)^.\\.x$");
}
