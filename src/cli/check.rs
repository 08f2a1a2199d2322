//! Test filter expressions against JSON input

use log::{debug, info};

use super::CliError;
use crate::{Expression, Linq, Parser, Value};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The filter expression
    pub expression: String,
    /// JSON input string
    pub input: Option<String>,
    /// JSON values bound to `?` placeholders, in order
    pub params: Vec<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
    /// Print the number of matching records instead of the records
    pub count: bool,
}

/// Result of a check operation
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Syntax is valid; carries the canonical form of the expression
    SyntaxValid(String),
    /// Whether a single record fits
    Fit(bool),
    /// Records of an array input that fit
    Matches(serde_json::Value),
    /// Number of records of an array input that fit
    Count(usize),
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let parsed = Parser::parse_str(&options.expression)?;

    let params = options
        .params
        .iter()
        .map(|p| serde_json::from_str::<serde_json::Value>(p).map(Value::from))
        .collect::<Result<Vec<_>, _>>()?;
    let expression = if params.is_empty() && parsed.size_of_placeholder() == 0 {
        parsed
    } else {
        parsed.bind(&params)?
    };

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid(expression.to_string()));
    }

    let logical = match expression {
        Expression::Logical(logical) => logical,
        Expression::Value(value) => {
            return Ok(CheckResult::SyntaxValid(value.to_string()));
        }
    };

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let input: serde_json::Value = serde_json::from_str(json_str)?;

    match input {
        serde_json::Value::Object(record) => {
            let fit = logical.fit(&record)?;
            info!("record fits: {}", fit);
            Ok(CheckResult::Fit(fit))
        }
        serde_json::Value::Array(records) => {
            debug!("filtering {} records", records.len());
            let matching = Linq::from(&records).where_expr(logical);
            if options.count {
                Ok(CheckResult::Count(matching.count()?))
            } else {
                Ok(CheckResult::Matches(serde_json::Value::Array(matching.to_vec()?)))
            }
        }
        other => Err(CliError::UnsupportedInput(Value::from(other).type_name())),
    }
}
