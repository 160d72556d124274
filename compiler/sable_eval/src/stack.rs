//! The agenda (control stack) and stash (value stack).
//!
//! Both are plain LIFO vectors. They are `Clone` so a continuation can keep
//! an independent copy of each.

use smallvec::SmallVec;

use crate::errors::{stash_underflow, EvalError};
use crate::instr::Item;
use crate::value::Value;

/// Pending work. The last item runs next.
#[derive(Clone, Debug, Default)]
pub struct Agenda {
    items: Vec<Item>,
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Push a sequence so that its first element runs first.
    pub fn extend_rev<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = Item>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.items.extend(items.into_iter().rev());
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Item> {
        self.items.pop()
    }

    #[inline]
    pub fn peek(&self) -> Option<&Item> {
        self.items.last()
    }

    #[inline]
    pub fn peek_mut(&mut self) -> Option<&mut Item> {
        self.items.last_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Top first.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().rev()
    }
}

/// Intermediate values. The last value is the top.
#[derive(Clone, Debug, Default)]
pub struct Stash {
    values: Vec<Value>,
}

impl Stash {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Value, EvalError> {
        self.values.pop().ok_or_else(stash_underflow)
    }

    /// Pop the top `n` values, returned deepest first.
    pub fn pop_n(&mut self, n: usize) -> Result<SmallVec<[Value; 4]>, EvalError> {
        let Some(start) = self.values.len().checked_sub(n) else {
            return Err(stash_underflow());
        };
        Ok(self.values.drain(start..).collect())
    }

    #[inline]
    pub fn peek(&self) -> Result<&Value, EvalError> {
        self.values.last().ok_or_else(stash_underflow)
    }

    #[inline]
    pub fn peek_mut(&mut self) -> Result<&mut Value, EvalError> {
        self.values.last_mut().ok_or_else(stash_underflow)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The top value, if any; does not fail on an empty stash.
    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests use expect for brevity")]
mod tests;
