use std::fmt;

/// Comparison operators joining a left and a right value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOperator {
    /// Equal (`=` or `==`)
    Equal,
    /// Not equal (`!=` or `<>`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Membership
    /// List membership (`IN`)
    In,

    // Pattern matching
    /// SQL-style wildcard match (`LIKE`), `%` is any run and `_` any char
    Like,
    /// Regular expression search (`MATCHES` or `=~`)
    Matches,
}

impl CompareOperator {
    /// Canonical spelling used when printing expressions.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOperator::Equal => "=",
            CompareOperator::NotEqual => "!=",
            CompareOperator::LessThan => "<",
            CompareOperator::LessEqual => "<=",
            CompareOperator::GreaterThan => ">",
            CompareOperator::GreaterEqual => ">=",
            CompareOperator::In => "IN",
            CompareOperator::Like => "LIKE",
            CompareOperator::Matches => "MATCHES",
        }
    }

    /// `<`, `<=`, `>` and `>=`.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            CompareOperator::LessThan
                | CompareOperator::LessEqual
                | CompareOperator::GreaterThan
                | CompareOperator::GreaterEqual
        )
    }

    /// `=` and `!=`.
    pub fn is_equality(self) -> bool {
        matches!(self, CompareOperator::Equal | CompareOperator::NotEqual)
    }

    /// `LIKE` and `MATCHES`, whose right operand is a pattern string.
    pub fn is_pattern(self) -> bool {
        matches!(self, CompareOperator::Like | CompareOperator::Matches)
    }
}

impl fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Binary logical operators.
///
/// Evaluation is always left before right, so the right side of a
/// short-circuited operator is never looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    /// Logical AND (`AND` or `&&`)
    And,
    /// Logical OR (`OR` or `||`)
    Or,
}

impl LogicalOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }

    /// Applies the truth table to two already evaluated sides.
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            LogicalOperator::And => left && right,
            LogicalOperator::Or => left || right,
        }
    }

    /// The left value that decides the result on its own, if any.
    pub(crate) fn short_circuits_on(self) -> bool {
        match self {
            LogicalOperator::And => false,
            LogicalOperator::Or => true,
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
