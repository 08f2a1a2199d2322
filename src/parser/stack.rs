//! Shift-reduce working state for one parse region.
//!
//! The state is split into two independent slots:
//!
//! - the logical accumulator ([`Pending`]): nothing yet, a folded
//!   expression, or a folded expression waiting for its right side;
//! - the comparison in progress ([`Operand`]): nothing yet, a left value,
//!   or a left value with its compare operator.
//!
//! A value that arrives is not committed right away. It waits in a one-slot
//! lookahead until the next token shows whether it is a left operand, a
//! right operand, or a bare result. Every non-value token flushes the slot
//! first, except negation, which only flushes when the buffered value would
//! complete a comparison (so `a NOT IN (1, 2)` negates the comparison that
//! follows).

use std::mem;

use log::trace;

use crate::{
    ast::{CompareOperator, Expression, LogicalExpression, LogicalOperator, ValueExpression},
    parser::{ParseError, ParseOptions},
};

/// Folded expressions carry their tree depth.
enum Pending {
    Empty,
    Expr(LogicalExpression, usize),
    Joined(LogicalExpression, usize, LogicalOperator, usize),
}

enum Operand {
    Empty,
    Left(ValueExpression, usize),
    Compare(ValueExpression, CompareOperator, usize),
}

pub(crate) struct ParserStack<'s> {
    text: &'s str,
    /// Bracket depth of this region
    depth: usize,
    options: ParseOptions,
    pending: Pending,
    operand: Operand,
    /// Offsets of negations not yet applied
    negations: Vec<usize>,
    lookahead: Option<(ValueExpression, usize)>,
}

impl<'s> ParserStack<'s> {
    pub(crate) fn new(text: &'s str, depth: usize, options: ParseOptions) -> Self {
        ParserStack {
            text,
            depth,
            options,
            pending: Pending::Empty,
            operand: Operand::Empty,
            negations: Vec::new(),
            lookahead: None,
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.text, offset, message)
    }

    /// Nesting at this point: enclosing brackets plus unapplied negations.
    pub(crate) fn nesting(&self) -> usize {
        self.depth + self.negations.len()
    }

    /// Nesting of a group opened here. A group right after `NOT` shares the
    /// negation's level, so `NOT (x)` is as deep as `NOT x`.
    pub(crate) fn group_nesting(&self) -> usize {
        self.depth + self.negations.len().max(1)
    }

    /// True when the next value is the right operand of a pending comparison.
    pub(crate) fn expects_operand(&self) -> bool {
        self.lookahead.is_none() && matches!(self.operand, Operand::Compare(..))
    }

    pub(crate) fn push_value(&mut self, value: ValueExpression, offset: usize) -> Result<(), ParseError> {
        trace!("shift value {} at {}", value, offset);
        self.flush()?;
        self.lookahead = Some((value, offset));
        Ok(())
    }

    pub(crate) fn push_compare(&mut self, op: CompareOperator, offset: usize) -> Result<(), ParseError> {
        trace!("shift {} at {}", op, offset);
        self.flush()?;
        match mem::replace(&mut self.operand, Operand::Empty) {
            Operand::Left(left, _) => {
                if let Some(message) = left.check_by(op) {
                    return Err(self.error(offset, message));
                }
                self.operand = Operand::Compare(left, op, offset);
                Ok(())
            }
            Operand::Empty => Err(self.error(offset, format!("{} has no left operand", op))),
            Operand::Compare(_, pending, _) => Err(self.error(
                offset,
                format!("{} can not follow {}", op, pending),
            )),
        }
    }

    pub(crate) fn push_logical_op(&mut self, op: LogicalOperator, offset: usize) -> Result<(), ParseError> {
        trace!("shift {} at {}", op, offset);
        self.flush()?;
        match &self.operand {
            Operand::Empty => {}
            Operand::Left(left, _) => {
                return Err(self.error(
                    offset,
                    format!("incomplete comparison: '{}' needs a compare operator before {}", left, op),
                ));
            }
            Operand::Compare(_, pending, pending_offset) => {
                return Err(self.error(
                    *pending_offset,
                    format!("{} is missing its right operand", pending),
                ));
            }
        }
        if let Some(&negation) = self.negations.first() {
            return Err(self.error(negation, "negation must precede a comparison or a group"));
        }
        match mem::replace(&mut self.pending, Pending::Empty) {
            Pending::Expr(left, depth) => {
                self.pending = Pending::Joined(left, depth, op, offset);
                Ok(())
            }
            Pending::Empty => Err(self.error(offset, format!("{} has no left expression", op))),
            Pending::Joined(_, _, pending, _) => Err(self.error(
                offset,
                format!("{} can not follow {}", op, pending),
            )),
        }
    }

    pub(crate) fn push_not(&mut self, offset: usize) -> Result<(), ParseError> {
        trace!("shift NOT at {}", offset);
        let completes = self.lookahead.is_some() && matches!(self.operand, Operand::Compare(..));
        if completes {
            self.flush()?;
        } else if let Operand::Compare(_, op, _) = &self.operand {
            return Err(self.error(offset, format!("negation can not follow {}", op)));
        }
        if self.nesting() + 1 > self.options.max_depth {
            return Err(self.error(
                offset,
                format!("negations nested deeper than {}", self.options.max_depth),
            ));
        }
        self.negations.push(offset);
        Ok(())
    }

    /// Pushes a completed group as a single logical unit.
    pub(crate) fn push_logical(&mut self, expr: LogicalExpression, offset: usize) -> Result<(), ParseError> {
        trace!("shift group {} at {}", expr, offset);
        self.flush()?;
        match &self.operand {
            Operand::Empty => {}
            Operand::Left(left, _) => {
                return Err(self.error(
                    offset,
                    format!("expected a compare operator after '{}'", left),
                ));
            }
            Operand::Compare(_, op, _) => {
                return Err(self.error(
                    offset,
                    format!("{} expects a value, not a logical expression", op),
                ));
            }
        }
        let depth = expr.depth();
        self.reduce(expr, depth, offset)
    }

    fn flush(&mut self) -> Result<(), ParseError> {
        match self.lookahead.take() {
            Some((value, offset)) => self.commit(value, offset),
            None => Ok(()),
        }
    }

    fn commit(&mut self, value: ValueExpression, offset: usize) -> Result<(), ParseError> {
        match mem::replace(&mut self.operand, Operand::Empty) {
            Operand::Empty => {
                // A folded expression followed by a value would leave both
                // slots filled with nothing joining them
                if let Pending::Expr(..) = self.pending {
                    return Err(self.error(offset, format!("expected a logical operator before '{}'", value)));
                }
                self.operand = Operand::Left(value, offset);
                Ok(())
            }
            Operand::Left(left, _) => Err(self.error(
                offset,
                format!("expected a compare operator between '{}' and '{}'", left, value),
            )),
            Operand::Compare(left, op, _) => {
                let simple = LogicalExpression::simple(left, op, value)
                    .map_err(|message| self.error(offset, message))?;
                trace!("reduce {}", simple);
                self.reduce(simple, 1, offset)
            }
        }
    }

    /// Applies outstanding negations, then folds into the accumulator.
    ///
    /// `depth` is the tree depth of `expr`. A fold that would grow the tree
    /// past `max_expression_depth` is rejected before the tree is built.
    fn reduce(&mut self, mut expr: LogicalExpression, depth: usize, offset: usize) -> Result<(), ParseError> {
        let depth = depth + self.negations.len();
        self.check_depth(depth, offset)?;
        for _ in self.negations.drain(..) {
            expr = expr.negate();
        }
        match mem::replace(&mut self.pending, Pending::Empty) {
            Pending::Empty => {
                self.pending = Pending::Expr(expr, depth);
                Ok(())
            }
            Pending::Expr(left, _) => Err(self.error(
                offset,
                format!("expected a logical operator between '{}' and '{}'", left, expr),
            )),
            Pending::Joined(left, left_depth, op, op_offset) => {
                let depth = left_depth.max(depth) + 1;
                self.check_depth(depth, op_offset)?;
                let joined = left.join(op, expr);
                trace!("fold {} at depth {}", op, depth);
                self.pending = Pending::Expr(joined, depth);
                Ok(())
            }
        }
    }

    fn check_depth(&self, depth: usize, offset: usize) -> Result<(), ParseError> {
        if depth > self.options.max_expression_depth {
            return Err(self.error(
                offset,
                format!(
                    "expression nests deeper than {} levels",
                    self.options.max_expression_depth
                ),
            ));
        }
        Ok(())
    }

    /// Finishes the region, `end` being the offset of its closing token.
    pub(crate) fn get(mut self, end: usize) -> Result<Expression, ParseError> {
        self.flush()?;
        let operand = mem::replace(&mut self.operand, Operand::Empty);
        let pending = mem::replace(&mut self.pending, Pending::Empty);

        match (operand, pending) {
            (Operand::Compare(_, op, offset), _) => {
                Err(self.error(offset, format!("{} is missing its right operand", op)))
            }
            (Operand::Left(left, _), Pending::Empty) => match self.negations.first() {
                Some(&negation) => Err(self.error(
                    negation,
                    format!("negation needs a comparison, got the bare value '{}'", left),
                )),
                None => Ok(Expression::Value(left)),
            },
            (Operand::Left(left, offset), _) => Err(self.error(
                offset,
                format!("incomplete comparison: '{}' needs a compare operator", left),
            )),
            (Operand::Empty, Pending::Joined(_, _, op, offset)) => {
                Err(self.error(offset, format!("{} is missing its right operand", op)))
            }
            (Operand::Empty, _) if !self.negations.is_empty() => Err(self.error(
                self.negations[0],
                "negation is not applied to any comparison",
            )),
            (Operand::Empty, Pending::Expr(expr, _)) => Ok(Expression::Logical(expr)),
            (Operand::Empty, Pending::Empty) => Err(self.error(end, "empty expression")),
        }
    }
}

#[cfg(test)]
fn key(name: &str) -> ValueExpression {
    ValueExpression::Key(name.to_string())
}

#[cfg(test)]
fn int(n: i32) -> ValueExpression {
    ValueExpression::Number(crate::ast::Number::Int32(n))
}

#[cfg(test)]
fn new_stack(text: &str) -> ParserStack<'_> {
    ParserStack::new(text, 0, ParseOptions::default())
}

#[test]
fn test_bare_value_is_deferred_then_returned() {
    let mut stack = new_stack("age");
    stack.push_value(key("age"), 0).unwrap();
    assert_eq!(stack.get(3).unwrap(), Expression::Value(key("age")));
}

#[test]
fn test_comparison_folds_with_pending_logical() {
    let mut stack = new_stack("a = 1 OR b = 2");
    stack.push_value(key("a"), 0).unwrap();
    stack.push_compare(CompareOperator::Equal, 2).unwrap();
    stack.push_value(int(1), 4).unwrap();
    stack.push_logical_op(LogicalOperator::Or, 6).unwrap();
    stack.push_value(key("b"), 9).unwrap();
    stack.push_compare(CompareOperator::Equal, 11).unwrap();
    stack.push_value(int(2), 13).unwrap();

    let expr = stack.get(14).unwrap();
    assert_eq!(expr.to_string(), "a = 1 OR b = 2");
}

#[test]
fn test_expression_followed_by_value_is_rejected() {
    // Folded `a = 1` and a new left value may never coexist
    let mut stack = new_stack("a = 1 b");
    stack.push_value(key("a"), 0).unwrap();
    stack.push_compare(CompareOperator::Equal, 2).unwrap();
    stack.push_value(int(1), 4).unwrap();
    stack.push_value(key("b"), 6).unwrap();
    let err = stack.get(7).unwrap_err();
    assert_eq!(err.offset(), 6);
}

#[test]
fn test_negation_waits_for_comparison() {
    let mut stack = new_stack("a NOT IN (1)");
    stack.push_value(key("a"), 0).unwrap();
    stack.push_not(2).unwrap();
    assert_eq!(stack.nesting(), 1);
    stack.push_compare(CompareOperator::In, 6).unwrap();
    assert!(stack.expects_operand());
    stack.push_value(ValueExpression::List(vec![int(1)]), 9).unwrap();
    let expr = stack.get(12).unwrap();
    assert_eq!(expr.to_string(), "NOT (a IN (1))");
}

#[test]
fn test_missing_operand_points_at_operator() {
    let mut stack = new_stack("a = 1 OR");
    stack.push_value(key("a"), 0).unwrap();
    stack.push_compare(CompareOperator::Equal, 2).unwrap();
    stack.push_value(int(1), 4).unwrap();
    stack.push_logical_op(LogicalOperator::Or, 6).unwrap();
    assert_eq!(stack.get(8).unwrap_err().offset(), 6);

    let mut stack = new_stack("a <");
    stack.push_value(key("a"), 0).unwrap();
    stack.push_compare(CompareOperator::LessThan, 2).unwrap();
    assert_eq!(stack.get(3).unwrap_err().offset(), 2);
}

#[test]
fn test_fold_depth_is_limited() {
    let options = ParseOptions {
        max_expression_depth: 2,
        ..ParseOptions::default()
    };
    let mut stack = ParserStack::new("a = 1 OR b = 2 OR c = 3", 0, options);
    stack.push_value(key("a"), 0).unwrap();
    stack.push_compare(CompareOperator::Equal, 2).unwrap();
    stack.push_value(int(1), 4).unwrap();
    stack.push_logical_op(LogicalOperator::Or, 6).unwrap();
    stack.push_value(key("b"), 9).unwrap();
    stack.push_compare(CompareOperator::Equal, 11).unwrap();
    stack.push_value(int(2), 13).unwrap();
    stack.push_logical_op(LogicalOperator::Or, 15).unwrap();
    stack.push_value(key("c"), 18).unwrap();
    stack.push_compare(CompareOperator::Equal, 20).unwrap();
    stack.push_value(int(3), 22).unwrap();

    let err = stack.get(23).unwrap_err();
    assert_eq!(err.offset(), 15);
    assert!(err.message().contains("deeper than 2"));
}
