use thiserror::Error;

use crate::ast::{CompareOperator, LogicalOperator, Number, SpannedToken, Token};

/// Lexical errors, each carrying the character offset where it was found.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence '\\{ch}' at offset {offset}")]
    InvalidEscape { ch: char, offset: usize },

    #[error("identifier can not start with a digit at offset {offset}")]
    InvalidIdentifier { offset: usize },

    #[error("malformed number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("number '{text}' at offset {offset} is out of range")]
    NumberOutOfRange { text: String, offset: usize },

    #[error("literal '{text}' at offset {offset} must be written in lowercase")]
    LiteralCase { text: String, offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedChar { offset, .. }
            | LexError::UnterminatedString { offset }
            | LexError::InvalidEscape { offset, .. }
            | LexError::InvalidIdentifier { offset }
            | LexError::InvalidNumber { offset, .. }
            | LexError::NumberOutOfRange { offset, .. }
            | LexError::LiteralCase { offset, .. } => *offset,
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Lexes the whole input, ending with [`Token::Eof`].
    pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, LexError> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token.token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(ch) => {
                            return Err(LexError::InvalidEscape {
                                ch,
                                offset: self.position - 1,
                            });
                        }
                        None => return Err(LexError::UnterminatedString { offset: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { offset: start })
    }

    fn read_digits(&mut self, number: &mut String) -> usize {
        let mut count = 0;
        while let Some(ch) = self.current_char().filter(|c| c.is_ascii_digit()) {
            number.push(ch);
            self.advance();
            count += 1;
        }
        count
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }
        self.read_digits(&mut number);

        if self.current_char() == Some('.') {
            is_float = true;
            number.push('.');
            self.advance();
            if self.read_digits(&mut number) == 0 {
                return Err(LexError::InvalidNumber {
                    text: number,
                    offset: start,
                });
            }
        }

        if let Some(e) = self.current_char().filter(|c| *c == 'e' || *c == 'E')
            && self
                .peek_char(1)
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            is_float = true;
            number.push(e);
            self.advance();
            if let Some(sign) = self.current_char().filter(|c| *c == '+' || *c == '-') {
                number.push(sign);
                self.advance();
            }
            if self.read_digits(&mut number) == 0 {
                return Err(LexError::InvalidNumber {
                    text: number,
                    offset: start,
                });
            }
        }

        // `12abc` is an identifier starting with a digit, not a number
        if self
            .current_char()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            return Err(LexError::InvalidIdentifier { offset: start });
        }

        if is_float {
            match number.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Token::Number(Number::Double(n))),
                // `1e999` overflows to infinity, which has no literal form
                Ok(_) => Err(LexError::NumberOutOfRange {
                    text: number,
                    offset: start,
                }),
                Err(_) => Err(LexError::InvalidNumber {
                    text: number,
                    offset: start,
                }),
            }
        } else {
            number
                .parse::<i64>()
                .map(|n| Token::Number(Number::from_i64(n)))
                .map_err(|_| LexError::NumberOutOfRange {
                    text: number.clone(),
                    offset: start,
                })
        }
    }

    fn read_word(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let ident = self.read_identifier();

        match ident.as_str() {
            "true" => return Ok(Token::Boolean(true)),
            "false" => return Ok(Token::Boolean(false)),
            "null" => return Ok(Token::Null),
            _ => {}
        }

        let upper = ident.to_ascii_uppercase();
        match upper.as_str() {
            "TRUE" | "FALSE" | "NULL" => Err(LexError::LiteralCase {
                text: ident,
                offset: start,
            }),
            "AND" => Ok(Token::Logical(LogicalOperator::And)),
            "OR" => Ok(Token::Logical(LogicalOperator::Or)),
            "NOT" => Ok(Token::Not),
            "IN" => Ok(Token::Compare(CompareOperator::In)),
            "LIKE" => Ok(Token::Compare(CompareOperator::Like)),
            "MATCHES" => Ok(Token::Compare(CompareOperator::Matches)),
            _ => Ok(Token::Key(ident)),
        }
    }

    /// Consumes one char, or two when the second one is `next`.
    fn one_or_two(&mut self, next: char, single: Token, double: Token) -> Token {
        self.advance();
        if self.current_char() == Some(next) {
            self.advance();
            double
        } else {
            single
        }
    }

    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        self.skip_whitespace();
        let offset = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('?') => {
                self.advance();
                Token::Placeholder
            }
            Some('=') => match self.peek_char(1) {
                Some('=') => {
                    self.position += 2;
                    Token::Compare(CompareOperator::Equal)
                }
                Some('~') => {
                    self.position += 2;
                    Token::Compare(CompareOperator::Matches)
                }
                _ => {
                    self.advance();
                    Token::Compare(CompareOperator::Equal)
                }
            },
            Some('!') => self.one_or_two(
                '=',
                Token::Not,
                Token::Compare(CompareOperator::NotEqual),
            ),
            Some('<') => match self.peek_char(1) {
                Some('=') => {
                    self.position += 2;
                    Token::Compare(CompareOperator::LessEqual)
                }
                Some('>') => {
                    self.position += 2;
                    Token::Compare(CompareOperator::NotEqual)
                }
                _ => {
                    self.advance();
                    Token::Compare(CompareOperator::LessThan)
                }
            },
            Some('>') => self.one_or_two(
                '=',
                Token::Compare(CompareOperator::GreaterThan),
                Token::Compare(CompareOperator::GreaterEqual),
            ),
            Some('&') if self.peek_char(1) == Some('&') => {
                self.position += 2;
                Token::Logical(LogicalOperator::And)
            }
            Some('|') if self.peek_char(1) == Some('|') => {
                self.position += 2;
                Token::Logical(LogicalOperator::Or)
            }
            Some('"') => Token::String(self.read_string('"')?),
            Some('\'') => Token::String(self.read_string('\'')?),
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.read_word()?,
            Some(ch) => return Err(LexError::UnexpectedChar { ch, offset }),
        };

        Ok(SpannedToken::new(token, offset))
    }
}

#[cfg(test)]
fn kinds(input: &str) -> Vec<Token> {
    Lexer::tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.token)
        .collect()
}

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("and OR Not in like MATCHES true false null"),
        vec![
            Token::Logical(LogicalOperator::And),
            Token::Logical(LogicalOperator::Or),
            Token::Not,
            Token::Compare(CompareOperator::In),
            Token::Compare(CompareOperator::Like),
            Token::Compare(CompareOperator::Matches),
            Token::Boolean(true),
            Token::Boolean(false),
            Token::Null,
            Token::Eof,
        ]
    );
}

#[test]
fn test_comparison_with_offsets() {
    let tokens = Lexer::tokenize("age <= 18").unwrap();
    assert_eq!(tokens[0], SpannedToken::new(Token::Key("age".into()), 0));
    assert_eq!(
        tokens[1],
        SpannedToken::new(Token::Compare(CompareOperator::LessEqual), 4)
    );
    assert_eq!(
        tokens[2],
        SpannedToken::new(Token::Number(Number::Int32(18)), 7)
    );
    assert_eq!(tokens[3], SpannedToken::new(Token::Eof, 9));
}

#[test]
fn test_negative_and_exponent_numbers() {
    assert_eq!(
        kinds("-5 1e3 -2.5E-1"),
        vec![
            Token::Number(Number::Int32(-5)),
            Token::Number(Number::Double(1000.0)),
            Token::Number(Number::Double(-0.25)),
            Token::Eof,
        ]
    );
}

#[test]
fn test_digit_led_identifier_is_rejected() {
    assert_eq!(
        Lexer::tokenize("a = 12abc"),
        Err(LexError::InvalidIdentifier { offset: 4 })
    );
}
