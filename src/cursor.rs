//! Lazy, single-pass, closeable sequences.
//!
//! A [`Cursor`] is pulled with `has_next`/`next` and owns whatever it reads
//! from until `close` is called. A [`Cursorable`] hands out fresh,
//! independent cursors over the same source, so it can be traversed any
//! number of times.
//!
//! ```
//! use clove_filter::{Cursor, CursorError, Cursorable, PredicateCursor};
//!
//! let source = vec![1, 2, 3, 4];
//! let mut evens = PredicateCursor::new(source.cursor(), |n: &i32| n % 2 == 0);
//! assert_eq!(evens.next().unwrap(), 2);
//! assert_eq!(evens.next().unwrap(), 4);
//! assert!(matches!(evens.next(), Err(CursorError::Exhausted)));
//! evens.close();
//! ```

mod compose;
mod source;

pub use compose::{ConvertCursor, MultiCursor, PredicateCursor, SuperCursor};
pub use source::{EmptyCursor, IterCursor, SharedVecCursor};

use std::ops::{Deref, DerefMut};

use log::trace;
use thiserror::Error;

use crate::evaluator::EvalError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CursorError {
    #[error("cursor has no more elements")]
    Exhausted,

    #[error("{0} is not supported by this cursor")]
    Unsupported(&'static str),

    /// `remove` was called before `next`, or twice for the same element
    #[error("no current element to remove")]
    NoCurrent,

    #[error("can not sum a {0} value")]
    NotNumeric(&'static str),

    #[error("sum overflowed")]
    Overflow,

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// A single-owner, single-traversal lazy sequence.
///
/// `close` must be idempotent and may be called at any point, including
/// before the first `next` or after exhaustion.
pub trait Cursor {
    type Item;

    fn has_next(&mut self) -> bool;

    /// Returns the next element, or [`CursorError::Exhausted`].
    fn next(&mut self) -> Result<Self::Item, CursorError>;

    /// Removes the element last returned by `next` from the source.
    fn remove(&mut self) -> Result<(), CursorError> {
        Err(CursorError::Unsupported("remove"))
    }

    fn close(&mut self);
}

pub type BoxCursor<'a, T> = Box<dyn Cursor<Item = T> + 'a>;

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Item = C::Item;

    fn has_next(&mut self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<Self::Item, CursorError> {
        (**self).next()
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        (**self).remove()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// A repeatable source of cursors.
pub trait Cursorable {
    type Item;

    fn cursor(&self) -> BoxCursor<'_, Self::Item>;

    /// Visits every element. The cursor is closed on every exit path.
    fn for_each<F>(&self, mut f: F) -> Result<(), CursorError>
    where
        Self: Sized,
        F: FnMut(Self::Item),
    {
        let mut guard = CursorGuard::new(self.cursor());
        traverse(&mut *guard, |item| {
            f(item);
            true
        })
    }

    /// Visits elements until `f` returns false.
    fn for_each_while<F>(&self, f: F) -> Result<(), CursorError>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> bool,
    {
        let mut guard = CursorGuard::new(self.cursor());
        traverse(&mut *guard, f)
    }

    fn try_for_each<F, E>(&self, mut f: F) -> Result<(), E>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> Result<(), E>,
        E: From<CursorError>,
    {
        let mut guard = CursorGuard::new(self.cursor());
        while guard.has_next() {
            f(guard.next()?)?;
        }
        Ok(())
    }

    /// An [`Iterator`] over a fresh cursor, closed when the iterator drops.
    fn cursor_iter(&self) -> CursorIter<BoxCursor<'_, Self::Item>> {
        CursorIter::new(self.cursor())
    }
}

impl<C: Cursorable + ?Sized> Cursorable for &C {
    type Item = C::Item;

    fn cursor(&self) -> BoxCursor<'_, Self::Item> {
        (**self).cursor()
    }
}

/// Pulls from `cursor` until it is exhausted or `f` returns false.
///
/// The cursor is left open; closing it is up to the caller.
pub fn traverse<C, F>(cursor: &mut C, mut f: F) -> Result<(), CursorError>
where
    C: Cursor + ?Sized,
    F: FnMut(C::Item) -> bool,
{
    while cursor.has_next() {
        if !f(cursor.next()?) {
            break;
        }
    }
    Ok(())
}

/// Closes the wrapped cursor when dropped, including during unwinding.
pub struct CursorGuard<C: Cursor> {
    cursor: C,
}

impl<C: Cursor> CursorGuard<C> {
    pub fn new(cursor: C) -> Self {
        CursorGuard { cursor }
    }
}

impl<C: Cursor> Deref for CursorGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.cursor
    }
}

impl<C: Cursor> DerefMut for CursorGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.cursor
    }
}

impl<C: Cursor> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        trace!("closing guarded cursor");
        self.cursor.close();
    }
}

/// Iterator over a cursor's elements; the cursor closes when this drops.
pub struct CursorIter<C: Cursor> {
    guard: CursorGuard<C>,
}

impl<C: Cursor> CursorIter<C> {
    pub fn new(cursor: C) -> Self {
        CursorIter {
            guard: CursorGuard::new(cursor),
        }
    }
}

impl<C: Cursor> Iterator for CursorIter<C> {
    type Item = Result<C::Item, CursorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.guard.has_next() {
            Some(self.guard.next())
        } else {
            None
        }
    }
}
