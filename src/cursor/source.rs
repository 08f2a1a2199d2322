//! Cursors that read from an underlying source.

use std::{cell::RefCell, iter::Peekable, marker::PhantomData, rc::Rc};

use log::trace;

use super::{BoxCursor, Cursor, CursorError, Cursorable};

/// A cursor with no elements.
pub struct EmptyCursor<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> EmptyCursor<T> {
    pub fn new() -> Self {
        EmptyCursor {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for EmptyCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cursor for EmptyCursor<T> {
    type Item = T;

    fn has_next(&mut self) -> bool {
        false
    }

    fn next(&mut self) -> Result<T, CursorError> {
        Err(CursorError::Exhausted)
    }

    fn close(&mut self) {}
}

/// Adapts an [`Iterator`], with an optional hook run on the first `close`.
pub struct IterCursor<'a, I: Iterator> {
    iter: Peekable<I>,
    on_close: Option<Box<dyn FnOnce() + 'a>>,
    closed: bool,
}

impl<'a, I: Iterator> IterCursor<'a, I> {
    pub fn new(iter: I) -> Self {
        IterCursor {
            iter: iter.peekable(),
            on_close: None,
            closed: false,
        }
    }

    pub fn with_close(iter: I, on_close: impl FnOnce() + 'a) -> Self {
        IterCursor {
            iter: iter.peekable(),
            on_close: Some(Box::new(on_close)),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<I: Iterator> Cursor for IterCursor<'_, I> {
    type Item = I::Item;

    fn has_next(&mut self) -> bool {
        !self.closed && self.iter.peek().is_some()
    }

    fn next(&mut self) -> Result<I::Item, CursorError> {
        if self.closed {
            return Err(CursorError::Exhausted);
        }
        self.iter.next().ok_or(CursorError::Exhausted)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        trace!("closing iterator cursor");
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }
}

/// Index cursor over a shared, mutable vector.
///
/// Each `has_next` re-reads the vector's current length, so elements
/// appended between traversals are seen by the next cursor. Supports
/// `remove`.
pub struct SharedVecCursor<T> {
    source: Rc<RefCell<Vec<T>>>,
    index: usize,
    /// Index of the element last returned by `next`
    current: Option<usize>,
    closed: bool,
}

impl<T: Clone> SharedVecCursor<T> {
    pub fn new(source: Rc<RefCell<Vec<T>>>) -> Self {
        SharedVecCursor {
            source,
            index: 0,
            current: None,
            closed: false,
        }
    }
}

impl<T: Clone> Cursor for SharedVecCursor<T> {
    type Item = T;

    fn has_next(&mut self) -> bool {
        !self.closed && self.index < self.source.borrow().len()
    }

    fn next(&mut self) -> Result<T, CursorError> {
        if self.closed {
            return Err(CursorError::Exhausted);
        }
        let item = self
            .source
            .borrow()
            .get(self.index)
            .cloned()
            .ok_or(CursorError::Exhausted)?;
        self.current = Some(self.index);
        self.index += 1;
        Ok(item)
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        let index = self.current.take().ok_or(CursorError::NoCurrent)?;
        let mut source = self.source.borrow_mut();
        if index >= source.len() {
            return Err(CursorError::NoCurrent);
        }
        source.remove(index);
        self.index = index;
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            trace!("closing shared vector cursor at {}", self.index);
        }
        self.closed = true;
        self.current = None;
    }
}

impl<T: Clone> Cursorable for Vec<T> {
    type Item = T;

    fn cursor(&self) -> BoxCursor<'_, T> {
        Box::new(IterCursor::new(self.iter().cloned()))
    }
}

impl<T: Clone> Cursorable for Rc<RefCell<Vec<T>>> {
    type Item = T;

    fn cursor(&self) -> BoxCursor<'_, T> {
        Box::new(SharedVecCursor::new(Rc::clone(self)))
    }
}
