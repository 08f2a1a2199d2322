//! Cursors built on top of other cursors.
//!
//! Every wrapper forwards `close` to what it wraps.

use std::marker::PhantomData;

use log::trace;

use super::{BoxCursor, Cursor, CursorError};
use crate::evaluator::EvalError;

type Predicate<'a, T> = Box<dyn FnMut(&T) -> Result<bool, EvalError> + 'a>;

/// Yields only the inner elements that pass a test.
///
/// A test that fails with an error is reported as an element: `has_next`
/// returns true and the following `next` returns the error.
pub struct PredicateCursor<'a, C: Cursor> {
    inner: C,
    predicate: Predicate<'a, C::Item>,
    peeked: Option<Result<C::Item, CursorError>>,
}

impl<'a, C: Cursor> PredicateCursor<'a, C> {
    pub fn new<F>(inner: C, mut predicate: F) -> Self
    where
        F: FnMut(&C::Item) -> bool + 'a,
    {
        Self::fallible(inner, move |item| Ok(predicate(item)))
    }

    pub fn fallible<F>(inner: C, predicate: F) -> Self
    where
        F: FnMut(&C::Item) -> Result<bool, EvalError> + 'a,
    {
        PredicateCursor {
            inner,
            predicate: Box::new(predicate),
            peeked: None,
        }
    }
}

impl<C: Cursor> Cursor for PredicateCursor<'_, C> {
    type Item = C::Item;

    fn has_next(&mut self) -> bool {
        if self.peeked.is_some() {
            return true;
        }
        while self.inner.has_next() {
            let item = match self.inner.next() {
                Ok(item) => item,
                Err(e) => {
                    self.peeked = Some(Err(e));
                    return true;
                }
            };
            match (self.predicate)(&item) {
                Ok(true) => {
                    self.peeked = Some(Ok(item));
                    return true;
                }
                Ok(false) => {}
                Err(e) => {
                    self.peeked = Some(Err(e.into()));
                    return true;
                }
            }
        }
        false
    }

    fn next(&mut self) -> Result<C::Item, CursorError> {
        if !self.has_next() {
            return Err(CursorError::Exhausted);
        }
        self.peeked.take().unwrap_or(Err(CursorError::Exhausted))
    }

    fn close(&mut self) {
        self.peeked = None;
        self.inner.close();
    }
}

/// Maps each inner element when it is pulled.
pub struct ConvertCursor<C, F> {
    inner: C,
    convert: F,
}

impl<C, F, U> ConvertCursor<C, F>
where
    C: Cursor,
    F: FnMut(C::Item) -> U,
{
    pub fn new(inner: C, convert: F) -> Self {
        ConvertCursor { inner, convert }
    }
}

impl<C, F, U> Cursor for ConvertCursor<C, F>
where
    C: Cursor,
    F: FnMut(C::Item) -> U,
{
    type Item = U;

    fn has_next(&mut self) -> bool {
        self.inner.has_next()
    }

    fn next(&mut self) -> Result<U, CursorError> {
        self.inner.next().map(&mut self.convert)
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        self.inner.remove()
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

/// Concatenates cursors in order.
///
/// `close` closes every member, drained or not. `remove` goes to the member
/// that returned the last element, even after `has_next` has moved on.
pub struct MultiCursor<'a, T> {
    cursors: Vec<BoxCursor<'a, T>>,
    current: usize,
    last: Option<usize>,
}

impl<'a, T> MultiCursor<'a, T> {
    pub fn new(cursors: Vec<BoxCursor<'a, T>>) -> Self {
        MultiCursor {
            cursors,
            current: 0,
            last: None,
        }
    }

    pub fn push(&mut self, cursor: BoxCursor<'a, T>) {
        self.cursors.push(cursor);
    }
}

impl<T> Cursor for MultiCursor<'_, T> {
    type Item = T;

    fn has_next(&mut self) -> bool {
        while let Some(cursor) = self.cursors.get_mut(self.current) {
            if cursor.has_next() {
                return true;
            }
            self.current += 1;
        }
        false
    }

    fn next(&mut self) -> Result<T, CursorError> {
        if !self.has_next() {
            return Err(CursorError::Exhausted);
        }
        let item = match self.cursors.get_mut(self.current) {
            Some(cursor) => cursor.next(),
            None => Err(CursorError::Exhausted),
        };
        self.last = item.is_ok().then_some(self.current);
        item
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        match self.last.and_then(|index| self.cursors.get_mut(index)) {
            Some(cursor) => cursor.remove(),
            None => Err(CursorError::NoCurrent),
        }
    }

    fn close(&mut self) {
        trace!("closing {} concatenated cursors", self.cursors.len());
        for cursor in &mut self.cursors {
            cursor.close();
        }
    }
}

/// Widens the element type through [`Into`].
pub struct SuperCursor<C, U> {
    inner: C,
    _marker: PhantomData<fn() -> U>,
}

impl<C, U> SuperCursor<C, U>
where
    C: Cursor,
    C::Item: Into<U>,
{
    pub fn new(inner: C) -> Self {
        SuperCursor {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<C, U> Cursor for SuperCursor<C, U>
where
    C: Cursor,
    C::Item: Into<U>,
{
    type Item = U;

    fn has_next(&mut self) -> bool {
        self.inner.has_next()
    }

    fn next(&mut self) -> Result<U, CursorError> {
        self.inner.next().map(Into::into)
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        self.inner.remove()
    }

    fn close(&mut self) {
        self.inner.close();
    }
}
