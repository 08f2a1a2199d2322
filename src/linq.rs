//! Deferred query composition over a [`Cursorable`] source.
//!
//! Nothing runs when a pipeline is built. Every traversal opens a fresh
//! cursor on the source, wraps it in one [`PredicateCursor`] per `where_`
//! call (first registered innermost) and maps the survivors through the
//! selector last. A pipeline therefore always reflects the current contents
//! of its source.
//!
//! ```
//! use clove_filter::{Linq, Parser, Value};
//! use std::collections::HashMap;
//!
//! let people: Vec<HashMap<String, Value>> = vec![
//!     HashMap::from([("age".to_string(), Value::Integer(12))]),
//!     HashMap::from([("age".to_string(), Value::Integer(30))]),
//! ];
//! let minors = Linq::from(&people)
//!     .where_expr(Parser::parse_logical_str("age < 18").unwrap());
//! assert_eq!(minors.count().unwrap(), 1);
//! ```

use log::debug;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    ast::LogicalExpression,
    cursor::{BoxCursor, ConvertCursor, Cursor, CursorError, CursorGuard, Cursorable, PredicateCursor},
    evaluator::EvalError,
    record::Getter,
    value::Value,
};

type Filter<'a, T> = Box<dyn Fn(&T) -> Result<bool, EvalError> + 'a>;
type Selector<'a, T, U> = Box<dyn Fn(T) -> U + 'a>;

/// A lazily evaluated `from`/`where`/`select` pipeline.
///
/// `T` is the source element type and `U` the selected one. Predicates
/// always see source elements; the selector runs after all of them.
pub struct Linq<'a, T, U = T> {
    source: Box<dyn Cursorable<Item = T> + 'a>,
    filters: Vec<Filter<'a, T>>,
    selector: Selector<'a, T, U>,
}

impl<'a, T: 'a> Linq<'a, T, T> {
    pub fn from<S>(source: S) -> Self
    where
        S: Cursorable<Item = T> + 'a,
    {
        Linq {
            source: Box::new(source),
            filters: Vec::new(),
            selector: Box::new(|item| item),
        }
    }
}

impl<'a, T: 'a, U: 'a> Linq<'a, T, U> {
    /// Adds a predicate; multiple predicates must all hold.
    pub fn where_<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'a,
    {
        self.filters.push(Box::new(move |item| Ok(predicate(item))));
        self
    }

    /// Adds a filter expression tested against each source record.
    ///
    /// An evaluation error is reported by the cursor in place of the
    /// record that caused it.
    pub fn where_expr(mut self, expr: LogicalExpression) -> Self
    where
        T: Getter,
    {
        self.filters.push(Box::new(move |item| expr.fit(item)));
        self
    }

    /// Replaces the output mapping, composed after any earlier selector.
    pub fn select<V, F>(self, mapper: F) -> Linq<'a, T, V>
    where
        F: Fn(U) -> V + 'a,
        V: 'a,
    {
        let previous = self.selector;
        Linq {
            source: self.source,
            filters: self.filters,
            selector: Box::new(move |item| mapper(previous(item))),
        }
    }

    fn guarded(&self) -> CursorGuard<BoxCursor<'_, U>> {
        CursorGuard::new(self.cursor())
    }

    pub fn count(&self) -> Result<usize, CursorError> {
        let mut cursor = self.guarded();
        let mut count = 0;
        while cursor.has_next() {
            cursor.next()?;
            count += 1;
        }
        Ok(count)
    }

    pub fn first(&self) -> Result<Option<U>, CursorError> {
        let mut cursor = self.guarded();
        if cursor.has_next() {
            cursor.next().map(Some)
        } else {
            Ok(None)
        }
    }

    /// True if any element satisfies `predicate`; stops at the first one.
    pub fn any<F>(&self, predicate: F) -> Result<bool, CursorError>
    where
        F: Fn(&U) -> bool,
    {
        let mut cursor = self.guarded();
        while cursor.has_next() {
            if predicate(&cursor.next()?) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True if every element satisfies `predicate`; stops at the first that doesn't.
    pub fn all<F>(&self, predicate: F) -> Result<bool, CursorError>
    where
        F: Fn(&U) -> bool,
    {
        let mut cursor = self.guarded();
        while cursor.has_next() {
            if !predicate(&cursor.next()?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn min(&self) -> Result<Option<U>, CursorError>
    where
        U: PartialOrd,
    {
        self.extreme(|candidate, best| candidate < best)
    }

    pub fn max(&self) -> Result<Option<U>, CursorError>
    where
        U: PartialOrd,
    {
        self.extreme(|candidate, best| candidate > best)
    }

    fn extreme<F>(&self, better: F) -> Result<Option<U>, CursorError>
    where
        F: Fn(&U, &U) -> bool,
    {
        let mut cursor = self.guarded();
        let mut best: Option<U> = None;
        while cursor.has_next() {
            let item = cursor.next()?;
            let replace = match &best {
                Some(current) => better(&item, current),
                None => true,
            };
            if replace {
                best = Some(item);
            }
        }
        Ok(best)
    }

    /// Exact sum of numeric elements.
    ///
    /// Integers and floats are accumulated as decimals; the result is an
    /// `Integer` when it is whole and fits, a `Float` otherwise. A float the
    /// decimal can not hold exactly (such as `1e-30` or `1e30`), or a total
    /// past its range, switches the whole sum to `f64` arithmetic. Nulls are
    /// skipped and an empty pipeline sums to `Integer(0)`.
    pub fn sum(&self) -> Result<Value, CursorError>
    where
        U: Into<Value>,
    {
        let mut cursor = self.guarded();
        let mut exact = Some(Decimal::ZERO);
        let mut approx = 0.0_f64;
        while cursor.has_next() {
            let value: Value = cursor.next()?.into();
            let (addend, float) = match value {
                Value::Integer(n) => (Some(Decimal::from(n)), n as f64),
                Value::Float(f) if !f.is_finite() => {
                    return Err(CursorError::NotNumeric("non-finite float"));
                }
                Value::Float(f) => (exact_decimal(f), f),
                Value::Null => continue,
                other => return Err(CursorError::NotNumeric(other.type_name())),
            };
            approx += float;
            exact = exact
                .zip(addend)
                .and_then(|(total, addend)| total.checked_add(addend));
        }

        match exact {
            Some(total) => {
                if total.fract().is_zero()
                    && let Some(n) = total.to_i64()
                {
                    return Ok(Value::Integer(n));
                }
                total.to_f64().map(Value::Float).ok_or(CursorError::Overflow)
            }
            None if approx.is_finite() => Ok(Value::Float(approx)),
            None => Err(CursorError::Overflow),
        }
    }

    pub fn to_vec(&self) -> Result<Vec<U>, CursorError> {
        let mut cursor = self.guarded();
        let mut items = Vec::new();
        while cursor.has_next() {
            items.push(cursor.next()?);
        }
        Ok(items)
    }
}

/// `f` as a decimal, when the conversion loses nothing.
fn exact_decimal(f: f64) -> Option<Decimal> {
    Decimal::from_f64(f).filter(|d| d.to_f64() == Some(f))
}

impl<'a, T: 'a, U: 'a> Cursorable for Linq<'a, T, U> {
    type Item = U;

    fn cursor(&self) -> BoxCursor<'_, U> {
        debug!("opening pipeline cursor with {} filters", self.filters.len());
        let mut cursor = self.source.cursor();
        for filter in &self.filters {
            cursor = Box::new(PredicateCursor::fallible(cursor, move |item: &T| filter(item)));
        }
        Box::new(ConvertCursor::new(cursor, move |item: T| (self.selector)(item)))
    }
}
