//! CLI support for clove-filter
//!
//! Provides programmatic access to the `check` and `doc` commands so other
//! tools can embed them.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

use crate::{BindError, CursorError, ParseError};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] CursorError),

    #[error("Binding error: {0}")]
    Bind(#[from] BindError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Expected a JSON object or an array of objects, got {0}")]
    UnsupportedInput(&'static str),

    #[error("Unknown category: '{0}'\nRun 'clove-filter docs' to see available categories.")]
    UnknownCategory(String),
}

impl From<crate::EvalError> for CliError {
    fn from(e: crate::EvalError) -> Self {
        CliError::Eval(CursorError::Eval(e))
    }
}
