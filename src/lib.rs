pub mod ast;
pub mod cli;
pub mod cursor;
pub mod evaluator;
pub mod lexer;
pub mod linq;
pub mod parser;
pub mod record;
pub mod value;

pub use ast::{
    BindError, CompareOperator, Expression, LogicalExpression, LogicalOperator, Number, NumberType,
    SimpleExpression, SpannedToken, Token, ValueExpression, ValueType,
};
pub use cursor::{
    BoxCursor, ConvertCursor, Cursor, CursorError, CursorGuard, CursorIter, Cursorable, EmptyCursor,
    IterCursor, MultiCursor, PredicateCursor, SharedVecCursor, SuperCursor, traverse,
};
pub use evaluator::EvalError;
pub use lexer::{LexError, Lexer};
pub use linq::Linq;
pub use parser::{ParseError, ParseOptions, Parsed, Parser};
pub use record::{EmptyRecord, FnGetter, Getter};
pub use value::Value;
