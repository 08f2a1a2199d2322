use crate::ast::{CompareOperator, LogicalOperator, Number};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Null value
    ///
    /// Only the lowercase spelling is a literal.
    Null,

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// true
    /// false
    /// ```
    Boolean(bool),

    /// Integer or decimal number, already narrowed to its width
    ///
    /// # Examples
    /// ```text
    /// 42            // Int32
    /// 8589934592    // Int64
    /// -1.5          // Double
    /// ```
    Number(Number),

    /// String literal enclosed in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// 'Li'
    /// "item #1"
    /// ```
    String(String),

    /// Positional parameter, bound before evaluation
    Placeholder,

    // Identifiers
    /// Record field reference
    ///
    /// Must start with an ASCII letter or underscore, followed by ASCII
    /// letters, digits or underscores.
    ///
    /// # Examples
    /// ```text
    /// age
    /// first_name
    /// _internal
    /// ```
    Key(String),

    // Operators
    /// Comparison operator (`=`, `<`, `IN`, `LIKE`, ...)
    Compare(CompareOperator),

    /// Logical operator (`AND`, `OR`)
    ///
    /// # Examples
    /// ```text
    /// age > 18 AND verified = true
    /// role = 'admin' || role = 'mod'
    /// ```
    Logical(LogicalOperator),

    /// Negation (`NOT` or `!`)
    Not,

    // Delimiters
    /// Left parenthesis for grouping or list literals
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma separating list elements
    Comma,

    /// End of input
    Eof,
}

/// A token together with the character offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub offset: usize,
}

impl SpannedToken {
    pub fn new(token: Token, offset: usize) -> Self {
        SpannedToken { token, offset }
    }
}
