//! Filter expression parser.
//!
//! A single left-to-right scan folds tokens into an [`Expression`] using an
//! explicit operand/operator stack per bracket region (see [`stack`]). A
//! `(` either opens a list, when a compare operator is waiting for its right
//! operand, or a group, which is parsed as an independent region and pushed
//! into the enclosing stack as one unit.
//!
//! There is no precedence between `AND` and `OR`; both fold left to right
//! in encounter order.

mod scope;
mod stack;

pub use scope::{BracketKind, BracketScope, ScopeId, ScopeTree};

use log::{debug, trace};
use thiserror::Error;

use crate::{
    ast::{Expression, LogicalExpression, SpannedToken, Token, ValueExpression},
    lexer::{LexError, Lexer},
};
use stack::ParserStack;

/// A failed parse, pointing at the offending character.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at offset {offset} in '{text}'")]
pub struct ParseError {
    text: String,
    offset: usize,
    message: String,
    #[source]
    cause: Option<LexError>,
}

impl ParseError {
    pub fn new(text: &str, offset: usize, message: impl Into<String>) -> Self {
        ParseError {
            text: text.to_string(),
            offset,
            message: message.into(),
            cause: None,
        }
    }

    pub fn lexical(text: &str, cause: LexError) -> Self {
        ParseError {
            text: text.to_string(),
            offset: cause.offset(),
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    /// The source text that failed to parse.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Zero-based character offset of the failure.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn lex_error(&self) -> Option<&LexError> {
        self.cause.as_ref()
    }

    /// Renders the source with a caret under the failing character.
    pub fn format_error(&self) -> String {
        let pointer = " ".repeat(self.offset) + "^";
        format!("{}\n{}\n{}", self.message, self.text, pointer)
    }
}

/// Parser configuration.
///
/// Both limits keep evaluation, printing and dropping of the parsed tree
/// within a bounded recursion depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest nesting accepted, counting brackets and stacked negations
    pub max_depth: usize,
    /// Tallest expression tree accepted; each comparison is one level and
    /// every `AND`/`OR` fold or negation above it adds one
    pub max_expression_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: 64,
            max_expression_depth: 256,
        }
    }
}

/// An expression together with the bracket scopes found in its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub expression: Expression,
    pub scopes: ScopeTree,
}

/// Parses one expression. A parser is consumed by the parse.
pub struct Parser<'s> {
    text: &'s str,
    lexer: Lexer,
    current_token: SpannedToken,
    options: ParseOptions,
    scopes: ScopeTree,
}

impl<'s> Parser<'s> {
    pub fn new(text: &'s str) -> Result<Self, ParseError> {
        Self::with_options(text, ParseOptions::default())
    }

    pub fn with_options(text: &'s str, options: ParseOptions) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(text);
        let current_token = lexer
            .next_token()
            .map_err(|e| ParseError::lexical(text, e))?;
        Ok(Parser {
            text,
            lexer,
            current_token,
            options,
            scopes: ScopeTree::new(),
        })
    }

    /// Parses `text` into a bare value or a logical expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use clove_filter::{Expression, Parser};
    ///
    /// let expr = Parser::parse_str("  age  ").unwrap();
    /// assert!(matches!(expr, Expression::Value(v) if v.is_key()));
    /// ```
    pub fn parse_str(text: &str) -> Result<Expression, ParseError> {
        Parser::new(text)?.parse()
    }

    /// Parses `text`, rejecting a bare value.
    pub fn parse_logical_str(text: &str) -> Result<LogicalExpression, ParseError> {
        Parser::new(text)?.parse_logical()
    }

    pub fn parse(self) -> Result<Expression, ParseError> {
        self.parse_with_scopes().map(|parsed| parsed.expression)
    }

    pub fn parse_logical(self) -> Result<LogicalExpression, ParseError> {
        let text = self.text;
        match self.parse()? {
            Expression::Logical(expr) => Ok(expr),
            Expression::Value(value) => Err(ParseError::new(
                text,
                0,
                format!("expected a logical expression, got the bare value '{}'", value),
            )),
        }
    }

    pub fn parse_with_scopes(mut self) -> Result<Parsed, ParseError> {
        debug!("parsing '{}'", self.text);
        let expression = self.parse_region(None, 0)?;
        debug!("parsed '{}' into {}", self.text, expression);
        Ok(Parsed {
            expression,
            scopes: self.scopes,
        })
    }

    /// Moves to the next token and returns the one just consumed.
    fn advance(&mut self) -> Result<SpannedToken, ParseError> {
        let next = self
            .lexer
            .next_token()
            .map_err(|e| ParseError::lexical(self.text, e))?;
        let consumed = std::mem::replace(&mut self.current_token, next);
        trace!("token {:?} at {}", consumed.token, consumed.offset);
        Ok(consumed)
    }

    fn open_scope(
        &mut self,
        kind: BracketKind,
        parent: Option<ScopeId>,
        start: usize,
        depth: usize,
    ) -> Result<ScopeId, ParseError> {
        if depth > self.options.max_depth {
            return Err(ParseError::new(
                self.text,
                start,
                format!("brackets and negations nested deeper than {}", self.options.max_depth),
            ));
        }
        Ok(self.scopes.open(kind, parent, start))
    }

    fn unclosed(&self, id: ScopeId) -> ParseError {
        let start = self.scopes.get(id).map(|s| s.start).unwrap_or(0);
        ParseError::new(self.text, start, "unclosed '('")
    }

    /// Parses until the closing `)` of `scope`, or the end of input at the top level.
    fn parse_region(&mut self, scope: Option<ScopeId>, depth: usize) -> Result<Expression, ParseError> {
        let mut stack = ParserStack::new(self.text, depth, self.options);

        loop {
            let SpannedToken { token, offset } = self.advance()?;
            match token {
                Token::Compare(op) => stack.push_compare(op, offset)?,
                Token::Logical(op) => stack.push_logical_op(op, offset)?,
                Token::Not => stack.push_not(offset)?,
                Token::LParen if stack.expects_operand() => {
                    let list = self.parse_list(scope, offset, stack.nesting() + 1)?;
                    stack.push_value(list, offset)?;
                }
                Token::LParen => {
                    let nested = stack.group_nesting();
                    let id = self.open_scope(BracketKind::Group, scope, offset, nested)?;
                    match self.parse_region(Some(id), nested)? {
                        Expression::Logical(expr) => stack.push_logical(expr, offset)?,
                        Expression::Value(value) => stack.push_value(value, offset)?,
                    }
                }
                Token::RParen => {
                    let Some(id) = scope else {
                        return Err(ParseError::new(self.text, offset, "unmatched ')'"));
                    };
                    self.scopes.close(id, offset);
                    return stack.get(offset);
                }
                Token::Comma => {
                    return Err(ParseError::new(
                        self.text,
                        offset,
                        "unexpected ',' outside of a list",
                    ));
                }
                Token::Eof => {
                    return match scope {
                        Some(id) => Err(self.unclosed(id)),
                        None => stack.get(offset),
                    };
                }
                value_token => match literal(value_token) {
                    Some(value) => stack.push_value(value, offset)?,
                    None => unreachable!("every remaining token is a value"),
                },
            }
        }
    }

    fn parse_list(
        &mut self,
        parent: Option<ScopeId>,
        start: usize,
        depth: usize,
    ) -> Result<ValueExpression, ParseError> {
        let id = self.open_scope(BracketKind::List, parent, start, depth)?;
        let mut items = Vec::new();
        let mut expect_item = true;

        loop {
            let SpannedToken { token, offset } = self.advance()?;
            match token {
                Token::RParen if items.is_empty() || !expect_item => {
                    self.scopes.close(id, offset);
                    return Ok(ValueExpression::List(items));
                }
                Token::Comma if !expect_item => expect_item = true,
                Token::Key(name) => {
                    return Err(ParseError::new(
                        self.text,
                        offset,
                        format!("key '{}' can not be a list element", name),
                    ));
                }
                Token::LParen => {
                    return Err(ParseError::new(self.text, offset, "lists can not be nested"));
                }
                Token::Eof => return Err(self.unclosed(id)),
                token if expect_item => match literal(token) {
                    Some(value) => {
                        items.push(value);
                        expect_item = false;
                    }
                    None => {
                        return Err(ParseError::new(self.text, offset, "expected a list element"));
                    }
                },
                _ => {
                    return Err(ParseError::new(self.text, offset, "expected ',' or ')' in list"));
                }
            }
        }
    }
}

/// The value a literal, key or placeholder token stands for.
fn literal(token: Token) -> Option<ValueExpression> {
    match token {
        Token::Null => Some(ValueExpression::Null),
        Token::Boolean(b) => Some(ValueExpression::Boolean(b)),
        Token::Number(n) => Some(ValueExpression::Number(n)),
        Token::String(s) => Some(ValueExpression::String(s)),
        Token::Key(name) => Some(ValueExpression::Key(name)),
        Token::Placeholder => Some(ValueExpression::Placeholder),
        _ => None,
    }
}
