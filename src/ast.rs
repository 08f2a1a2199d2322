//! # Clove Filter Language - Abstract Syntax Tree
//!
//! This module defines the typed expression tree for clove filter
//! expressions, a SQL-`WHERE`-like mini-language tested against key/value
//! records.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[values]** - Value expressions (keys, literals, lists, placeholders) and their type tags
//! - **[expressions]** - Logical expressions (comparison, negation, conjunction/disjunction)
//! - **[operators]** - Compare and logical operator tables
//!
//! ## Quick Start
//!
//! ```text
//! (age < 18) AND NOT (name = 'Li')
//! ```
//!
//! This expression keeps minors whose name is not `Li`.
//!
//! ## Core Concepts
//!
//! ### Left and Right Operands
//!
//! A comparison reads `left op right`. The left operand is normally a key
//! naming a record field; literals are allowed there too, which is how
//! constant comparisons like `1 = 1` are written. Keys are never legal on
//! the right, lists and placeholders never on the left.
//!
//! ### Folding Order
//!
//! `AND` and `OR` share one precedence level and fold strictly left to
//! right. Parentheses are the only way to regroup:
//!
//! ```text
//! a = 1 OR b = 2 AND c = 3     // (a = 1 OR b = 2) AND c = 3
//! a = 1 OR (b = 2 AND c = 3)
//! ```
//!
//! ### Type Legality
//!
//! Every operator declares which operand types it accepts. Illegal pairings
//! are rejected while parsing, never at evaluation time:
//!
//! ```text
//! age IN 3          // error: IN requires a list operand
//! flag > true       // error: operator > can not be applied to boolean
//! ```
//!
//! ### Placeholders
//!
//! `?` marks a positional parameter on the right side. Placeholders are
//! bound in encounter order before evaluation:
//!
//! ```text
//! age >= ? AND city IN ?
//! ```
pub mod tokens;
pub mod values;
pub mod expressions;
pub mod operators;

pub use tokens::{SpannedToken, Token};
pub use values::{Number, NumberType, ValueExpression, ValueType};
pub use expressions::{BindError, Expression, LogicalExpression, SimpleExpression};
pub use operators::{CompareOperator, LogicalOperator};
