//! Removal-capable cursor over a mutable bag.

use super::{Bag, MutableBag};
use crate::error::{BagwiseError, Result};

/// Cursor yielding each item of a bag once per occurrence, with the ability to
/// remove the occurrence it last yielded.
///
/// The distinct items and their counts are captured when the cursor is
/// created; the cursor borrows the bag exclusively, so the only mutation it
/// can observe is its own [`remove`](BagCursor::remove).
///
/// ```rust
/// use bagwise::{Bag, HashBag, MutableBag};
///
/// let mut bag = HashBag::new_with([1, 2, 3, 4, 4]);
/// let mut cursor = bag.cursor();
/// while cursor.next().is_some() {
///     cursor.remove().unwrap();
/// }
/// drop(cursor);
/// assert!(bag.is_empty());
/// ```
pub struct BagCursor<'a, B: Bag> {
    bag: &'a mut B,
    pending: std::vec::IntoIter<(B::Item, usize)>,
    current: Option<(B::Item, usize)>,
    remaining: usize,
    removable: bool,
}

impl<'a, B> BagCursor<'a, B>
where
    B: MutableBag,
    B::Item: Clone,
{
    pub(crate) fn new(bag: &'a mut B) -> Self {
        let mut entries = Vec::with_capacity(bag.size_distinct());
        bag.for_each_with_occurrences(|item, count| entries.push((item.clone(), count)));
        let remaining = bag.size();
        Self {
            bag,
            pending: entries.into_iter(),
            current: None,
            remaining,
            removable: false,
        }
    }

    /// Advance to the next occurrence, or `None` once every occurrence was visited
    pub fn next(&mut self) -> Option<&B::Item> {
        loop {
            if let Some((_, left)) = self.current.as_mut() {
                if *left > 0 {
                    *left -= 1;
                    break;
                }
            }
            self.current = Some(self.pending.next()?);
        }
        self.remaining -= 1;
        self.removable = true;
        self.current.as_ref().map(|(item, _)| item)
    }

    /// Like [`next`](BagCursor::next), failing with
    /// [`BagwiseError::NoSuchElement`] when exhausted
    pub fn try_next(&mut self) -> Result<&B::Item> {
        self.next().ok_or(BagwiseError::NoSuchElement)
    }

    /// Remove the occurrence most recently returned by `next`.
    ///
    /// Fails with [`BagwiseError::IllegalState`] when `next` has not been
    /// called, or when this occurrence was already removed.
    pub fn remove(&mut self) -> Result<()> {
        if !self.removable {
            return Err(BagwiseError::illegal_state("remove() must follow a successful next()"));
        }
        let Some((item, _)) = self.current.as_ref() else {
            return Err(BagwiseError::illegal_state("remove() must follow a successful next()"));
        };
        self.bag.remove_occurrences(item, 1)?;
        self.removable = false;
        Ok(())
    }

    /// Number of occurrences not yet visited
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether every occurrence has been visited
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}
