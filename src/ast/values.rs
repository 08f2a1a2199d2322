use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::ast::CompareOperator;

/// Width of a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumberType {
    Int32,
    Int64,
    Double,
}

/// Type tag carried by every value expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Key,
    Null,
    Boolean,
    Number(NumberType),
    String,
    List,
    Placeholder,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Key => "key",
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number(NumberType::Int32) => "int32",
            ValueType::Number(NumberType::Int64) => "int64",
            ValueType::Number(NumberType::Double) => "double",
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Placeholder => "placeholder",
        }
    }

    /// Types that never compare with each other as literals share no family.
    pub(crate) fn same_family(self, other: ValueType) -> bool {
        match (self, other) {
            (ValueType::Number(_), ValueType::Number(_)) => true,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric literal, kept at the narrowest width that holds it.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int32(i32),
    Int64(i64),
    Double(f64),
}

impl Number {
    /// Narrows an integer to `Int32` when it fits.
    pub fn from_i64(n: i64) -> Self {
        match i32::try_from(n) {
            Ok(small) => Number::Int32(small),
            Err(_) => Number::Int64(n),
        }
    }

    pub fn number_type(&self) -> NumberType {
        match self {
            Number::Int32(_) => NumberType::Int32,
            Number::Int64(_) => NumberType::Int64,
            Number::Double(_) => NumberType::Double,
        }
    }

    /// Integer view; `None` for doubles.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int32(n) => Some(i64::from(*n)),
            Number::Int64(n) => Some(*n),
            Number::Double(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int32(n) => f64::from(*n),
            Number::Int64(n) => *n as f64,
            Number::Double(n) => *n,
        }
    }
}

// Structural: `Int32(1)` and `Int64(1)` are different literals.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int32(a), Number::Int32(b)) => a == b,
            (Number::Int64(a), Number::Int64(b)) => a == b,
            (Number::Double(a), Number::Double(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.number_type().hash(state);
        match self {
            Number::Int32(n) => n.hash(state),
            Number::Int64(n) => n.hash(state),
            Number::Double(n) => n.to_bits().hash(state),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int32(n) => write!(f, "{}", n),
            Number::Int64(n) => write!(f, "{}", n),
            // Debug keeps the fraction ("1.0"), so the text lexes back as a double
            Number::Double(n) => write!(f, "{:?}", n),
        }
    }
}

/// A typed literal or field reference in a filter expression.
///
/// Value expressions are immutable; binding placeholders produces a new
/// expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueExpression {
    /// Record field reference
    ///
    /// # Example
    /// ```text
    /// age
    /// ```
    Key(String),

    /// Null literal
    Null,

    /// Boolean literal
    Boolean(bool),

    /// Numeric literal
    Number(Number),

    /// String literal
    String(String),

    /// Parenthesized list literal, the right operand of `IN`
    ///
    /// # Example
    /// ```text
    /// (1, 2, 3)
    /// ```
    List(Vec<ValueExpression>),

    /// Unbound positional parameter (`?`)
    Placeholder,
}

impl ValueExpression {
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueExpression::Key(_) => ValueType::Key,
            ValueExpression::Null => ValueType::Null,
            ValueExpression::Boolean(_) => ValueType::Boolean,
            ValueExpression::Number(n) => ValueType::Number(n.number_type()),
            ValueExpression::String(_) => ValueType::String,
            ValueExpression::List(_) => ValueType::List,
            ValueExpression::Placeholder => ValueType::Placeholder,
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, ValueExpression::Key(_))
    }

    /// Number of unbound placeholders, counting inside lists.
    pub fn size_of_placeholder(&self) -> usize {
        match self {
            ValueExpression::Placeholder => 1,
            ValueExpression::List(items) => items.iter().map(|v| v.size_of_placeholder()).sum(),
            _ => 0,
        }
    }

    /// Checks this value as the left operand of `op`.
    ///
    /// Returns `None` when the pairing is legal, otherwise a message
    /// describing why it is not.
    pub fn check_by(&self, op: CompareOperator) -> Option<String> {
        match self {
            ValueExpression::Key(_) => None,
            ValueExpression::List(_) => Some(format!(
                "a list can not be the left operand of {}",
                op
            )),
            _ if self.size_of_placeholder() > 0 => Some(format!(
                "a placeholder can not be the left operand of {}",
                op
            )),
            _ if op == CompareOperator::In => None,
            _ => self.check_scalar_by(op),
        }
    }

    /// Checks this value as the right operand of `op`.
    pub fn check_right_by(&self, op: CompareOperator) -> Option<String> {
        match (self, op) {
            (ValueExpression::Key(name), _) => Some(format!(
                "key '{}' can not be the right operand of {}",
                name, op
            )),
            (ValueExpression::Placeholder, _) => None,
            (ValueExpression::List(items), CompareOperator::In) => items
                .iter()
                .find_map(|item| match item {
                    ValueExpression::Key(name) => {
                        Some(format!("key '{}' can not be a list element", name))
                    }
                    ValueExpression::List(_) => Some("lists can not be nested".to_string()),
                    _ => None,
                }),
            (_, CompareOperator::In) => Some(format!(
                "{} requires a list operand, got {}",
                op,
                self.value_type()
            )),
            (ValueExpression::List(_), _) => Some(format!(
                "a list operand is only legal with IN, got {}",
                op
            )),
            _ => self.check_scalar_by(op),
        }
    }

    fn check_scalar_by(&self, op: CompareOperator) -> Option<String> {
        let legal = match self.value_type() {
            ValueType::Null | ValueType::Boolean => op.is_equality(),
            ValueType::Number(_) => op.is_equality() || op.is_ordering(),
            ValueType::String => true,
            ValueType::Key | ValueType::Placeholder => true,
            ValueType::List => false,
        };
        if legal {
            None
        } else {
            Some(format!(
                "operator {} can not be applied to {}",
                op,
                self.value_type()
            ))
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for ch in s.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("'")
}

impl fmt::Display for ValueExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueExpression::Key(name) => f.write_str(name),
            ValueExpression::Null => f.write_str("null"),
            ValueExpression::Boolean(b) => write!(f, "{}", b),
            ValueExpression::Number(n) => write!(f, "{}", n),
            ValueExpression::String(s) => write_quoted(f, s),
            ValueExpression::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            ValueExpression::Placeholder => f.write_str("?"),
        }
    }
}
