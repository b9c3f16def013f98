//! Read-only facade handed to read-locked sessions.

use crate::bag::{Bag, HashBag, MutableBag, Occurrences, TreeBag};
use crate::error::{BagwiseError, Result};
use std::collections::{btree_map, hash_map};
use std::fmt;
use std::hash::{BuildHasher, Hash};

/// Read-only view of a delegate, valid for one read-locked session.
///
/// Queries delegate to the wrapped collection. Every mutation fails with
/// [`BagwiseError::UnsupportedOperation`] and leaves the delegate untouched.
/// The view borrows the read guard, so neither it nor anything obtained from
/// it can outlive the session.
pub struct ReadOnlyView<'a, C> {
    delegate: &'a C,
}

impl<'a, C> ReadOnlyView<'a, C> {
    pub(crate) fn new(delegate: &'a C) -> Self {
        Self { delegate }
    }

    /// Shared reference to the delegate, bounded by the session
    pub fn delegate(&self) -> &'a C {
        self.delegate
    }
}

impl<'a, T, S> ReadOnlyView<'a, HashBag<T, S>> {
    /// Iterator yielding each item once per occurrence
    pub fn iter(&self) -> Occurrences<'a, T, hash_map::Iter<'a, T, usize>> {
        self.delegate.iter()
    }
}

impl<'a, T: Ord> ReadOnlyView<'a, TreeBag<T>> {
    /// Iterator yielding each item once per occurrence, in ascending order
    pub fn iter(&self) -> Occurrences<'a, T, btree_map::Iter<'a, T, usize>> {
        self.delegate.iter()
    }
}

impl<C: fmt::Debug> fmt::Debug for ReadOnlyView<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadOnlyView").field(self.delegate).finish()
    }
}

impl<B: Bag> Bag for ReadOnlyView<'_, B> {
    type Item = B::Item;

    fn occurrences_of(&self, item: &B::Item) -> usize {
        self.delegate.occurrences_of(item)
    }

    fn size(&self) -> usize {
        self.delegate.size()
    }

    fn size_distinct(&self) -> usize {
        self.delegate.size_distinct()
    }

    fn for_each_with_occurrences<F>(&self, f: F)
    where
        F: FnMut(&B::Item, usize),
    {
        self.delegate.for_each_with_occurrences(f)
    }

    fn ranking_threshold(&self) -> usize {
        self.delegate.ranking_threshold()
    }
}

fn rejected<T>(operation: &str) -> Result<T> {
    Err(BagwiseError::unsupported(format!("{} on a read-only view", operation)))
}

impl<B: Bag> MutableBag for ReadOnlyView<'_, B> {
    fn add_occurrences(&mut self, _item: B::Item, _occurrences: isize) -> Result<usize> {
        rejected("add_occurrences")
    }

    fn remove_occurrences(&mut self, _item: &B::Item, _occurrences: isize) -> Result<bool> {
        rejected("remove_occurrences")
    }

    fn remove_all_occurrences(&mut self, _item: &B::Item) -> Result<bool> {
        rejected("remove_all_occurrences")
    }

    fn set_occurrences(&mut self, _item: B::Item, _occurrences: isize) -> Result<bool> {
        rejected("set_occurrences")
    }

    fn clear(&mut self) -> Result<()> {
        rejected("clear")
    }

    fn retain_by_occurrences<F>(&mut self, _keep: F) -> Result<bool>
    where
        F: FnMut(&Self::Item, usize) -> bool,
    {
        rejected("retain_by_occurrences")
    }

    fn add(&mut self, _item: B::Item) -> Result<()> {
        rejected("add")
    }

    fn remove(&mut self, _item: &B::Item) -> Result<bool> {
        rejected("remove")
    }

    fn add_all<I>(&mut self, _items: I) -> Result<()>
    where
        I: IntoIterator<Item = Self::Item>,
    {
        rejected("add_all")
    }

    fn remove_all_of<'i, I>(&mut self, _items: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'i Self::Item>,
        Self::Item: 'i,
    {
        rejected("remove_all_of")
    }
}

impl<'a, T, S> PartialEq<HashBag<T, S>> for ReadOnlyView<'a, HashBag<T, S>>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &HashBag<T, S>) -> bool {
        self.delegate == other
    }
}
