// tests/lexer_tests.rs

use clove_filter::ast::{CompareOperator, LogicalOperator, Number, Token};
use clove_filter::lexer::{LexError, Lexer};

fn kinds(input: &str) -> Vec<Token> {
    Lexer::tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.token)
        .collect()
}

// ============================================================================
// Punctuation and Operators
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("(", Token::LParen),
        (")", Token::RParen),
        (",", Token::Comma),
        ("?", Token::Placeholder),
        ("!", Token::Not),
        ("=", Token::Compare(CompareOperator::Equal)),
        ("<", Token::Compare(CompareOperator::LessThan)),
        (">", Token::Compare(CompareOperator::GreaterThan)),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.token, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap().token, Token::Eof);
    }
}

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        ("==", Token::Compare(CompareOperator::Equal)),
        ("!=", Token::Compare(CompareOperator::NotEqual)),
        ("<>", Token::Compare(CompareOperator::NotEqual)),
        ("<=", Token::Compare(CompareOperator::LessEqual)),
        (">=", Token::Compare(CompareOperator::GreaterEqual)),
        ("=~", Token::Compare(CompareOperator::Matches)),
        ("&&", Token::Logical(LogicalOperator::And)),
        ("||", Token::Logical(LogicalOperator::Or)),
    ];

    for (input, expected) in test_cases {
        assert_eq!(kinds(input), vec![expected, Token::Eof], "Failed for input: {}", input);
    }
}

#[test]
fn test_lone_ampersand_and_pipe_are_rejected() {
    assert_eq!(
        Lexer::tokenize("a & b"),
        Err(LexError::UnexpectedChar { ch: '&', offset: 2 })
    );
    assert_eq!(
        Lexer::tokenize("a | b"),
        Err(LexError::UnexpectedChar { ch: '|', offset: 2 })
    );
}

// ============================================================================
// Keywords and Literals
// ============================================================================

#[test]
fn test_keywords_are_case_insensitive() {
    for input in ["and", "AND", "And", "aNd"] {
        assert_eq!(kinds(input)[0], Token::Logical(LogicalOperator::And));
    }
    for input in ["like", "LIKE", "Like"] {
        assert_eq!(kinds(input)[0], Token::Compare(CompareOperator::Like));
    }
    assert_eq!(kinds("not")[0], Token::Not);
    assert_eq!(kinds("Matches")[0], Token::Compare(CompareOperator::Matches));
}

#[test]
fn test_literals_must_be_lowercase() {
    assert_eq!(kinds("true")[0], Token::Boolean(true));
    assert_eq!(kinds("false")[0], Token::Boolean(false));
    assert_eq!(kinds("null")[0], Token::Null);

    for input in ["TRUE", "True", "fAlse", "NULL", "Null"] {
        assert!(
            matches!(Lexer::tokenize(input), Err(LexError::LiteralCase { offset: 0, .. })),
            "Expected a case error for {}",
            input
        );
    }
}

#[test]
fn test_keyword_prefixes_are_keys() {
    assert_eq!(kinds("android")[0], Token::Key("android".to_string()));
    assert_eq!(kinds("nullable")[0], Token::Key("nullable".to_string()));
    assert_eq!(kinds("_in")[0], Token::Key("_in".to_string()));
}

#[test]
fn test_strings() {
    assert_eq!(kinds("'single'")[0], Token::String("single".to_string()));
    assert_eq!(kinds("\"double\"")[0], Token::String("double".to_string()));
    assert_eq!(kinds(r#"'it\'s'"#)[0], Token::String("it's".to_string()));
    assert_eq!(kinds(r#""a\tb\\""#)[0], Token::String("a\tb\\".to_string()));
    assert_eq!(kinds("'say \"hi\"'")[0], Token::String("say \"hi\"".to_string()));
}

#[test]
fn test_string_errors() {
    assert_eq!(
        Lexer::tokenize("name = 'Li"),
        Err(LexError::UnterminatedString { offset: 7 })
    );
    assert_eq!(
        Lexer::tokenize(r"'a\qb'"),
        Err(LexError::InvalidEscape { ch: 'q', offset: 2 })
    );
}

#[test]
fn test_numbers_narrow() {
    assert_eq!(
        kinds("0 2147483647 2147483648 -2147483648 -2147483649 1.0"),
        vec![
            Token::Number(Number::Int32(0)),
            Token::Number(Number::Int32(i32::MAX)),
            Token::Number(Number::Int64(2_147_483_648)),
            Token::Number(Number::Int32(i32::MIN)),
            Token::Number(Number::Int64(-2_147_483_649)),
            Token::Number(Number::Double(1.0)),
            Token::Eof,
        ]
    );
}

#[test]
fn test_number_errors() {
    assert!(matches!(
        Lexer::tokenize("99999999999999999999"),
        Err(LexError::NumberOutOfRange { offset: 0, .. })
    ));
    assert_eq!(
        Lexer::tokenize("a < 1e999"),
        Err(LexError::NumberOutOfRange {
            text: "1e999".to_string(),
            offset: 4,
        })
    );
    assert!(matches!(
        Lexer::tokenize("-2e308"),
        Err(LexError::NumberOutOfRange { offset: 0, .. })
    ));
    assert!(matches!(
        Lexer::tokenize("a = 1."),
        Err(LexError::InvalidNumber { offset: 4, .. })
    ));
    assert_eq!(
        Lexer::tokenize("9lives"),
        Err(LexError::InvalidIdentifier { offset: 0 })
    );
}

// ============================================================================
// Offsets
// ============================================================================

#[test]
fn test_offsets_count_characters() {
    let tokens = Lexer::tokenize("name = 'é' AND age > 1").unwrap();
    let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
    assert_eq!(offsets, vec![0, 5, 7, 11, 15, 19, 21, 22]);
}

#[test]
fn test_error_offset_accessor() {
    let err = Lexer::tokenize("a = $b").unwrap_err();
    assert_eq!(err.offset(), 4);
    assert_eq!(err.to_string(), "unexpected character '$' at offset 4");
}
