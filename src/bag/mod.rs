//! Occurrence-counting bags (multisets)
//!
//! A bag maps each distinct item to a positive occurrence count; absent items
//! have an implicit count of zero. The capability is split in two traits:
//!
//! - **[`Bag`]** - read-only occurrence queries and frequency ranking
//! - **[`MutableBag`]** - occurrence-level mutation and the removal-capable [`BagCursor`]
//!
//! Two variants implement both traits:
//!
//! - **[`HashBag<T>`]** - unordered, backed by a hash map with `ahash` hashing
//! - **[`TreeBag<T>`]** - sorted by item, backed by a `BTreeMap`
//!
//! Occurrence arguments are `isize`; negative values are rejected with
//! [`BagwiseError::InvalidArgument`](crate::BagwiseError::InvalidArgument)
//! before any state change.
//!
//! # Examples
//!
//! ```rust
//! use bagwise::{Bag, HashBag, MutableBag};
//!
//! let mut bag = HashBag::new_with(["a", "b", "b", "c", "c", "c"]);
//! bag.add_occurrences("a", 4).unwrap();
//! assert_eq!(bag.occurrences_of(&"a"), 5);
//! assert_eq!(bag.size(), 10);
//! assert_eq!(bag.size_distinct(), 3);
//!
//! let top = bag.top_occurrences(1).unwrap();
//! assert_eq!(top, vec![("a", 5)]);
//! ```

mod cursor;
mod hash_bag;
mod iter;
pub mod ranking;
mod tally;
mod tree_bag;

pub use cursor::BagCursor;
pub use hash_bag::HashBag;
pub use iter::Occurrences;
pub use tree_bag::TreeBag;

use crate::config::bag::DEFAULT_FULL_SORT_THRESHOLD;
use crate::error::{check_occurrences, Result};
use ranking::RankOrder;
use std::collections::HashMap;
use std::hash::Hash;

/// Read capability of a multiset
pub trait Bag {
    /// Element type
    type Item;

    /// Number of occurrences of `item`, or 0 when absent
    fn occurrences_of(&self, item: &Self::Item) -> usize;

    /// Total number of occurrences (the sum of all counts)
    fn size(&self) -> usize;

    /// Number of distinct items
    fn size_distinct(&self) -> usize;

    /// Invoke `f` once per distinct item with its count.
    ///
    /// Traversal order is unspecified but stable for a single traversal.
    fn for_each_with_occurrences<F>(&self, f: F)
    where
        F: FnMut(&Self::Item, usize);

    /// Whether the bag holds no occurrences
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether `item` occurs at least once
    fn contains(&self, item: &Self::Item) -> bool {
        self.occurrences_of(item) > 0
    }

    /// Distinct-item count at or below which rankings use a full sort
    fn ranking_threshold(&self) -> usize {
        DEFAULT_FULL_SORT_THRESHOLD
    }

    /// Up to `count` items with the highest occurrence counts, in descending
    /// count order. Order among equal counts is unspecified.
    fn top_occurrences(&self, count: isize) -> Result<Vec<(Self::Item, usize)>>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        let n = check_occurrences(count, "top_occurrences")?;
        Ok(ranking::rank(self, n, RankOrder::Descending))
    }

    /// Up to `count` items with the lowest occurrence counts, in ascending
    /// count order. Order among equal counts is unspecified.
    fn bottom_occurrences(&self, count: isize) -> Result<Vec<(Self::Item, usize)>>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        let n = check_occurrences(count, "bottom_occurrences")?;
        Ok(ranking::rank(self, n, RankOrder::Ascending))
    }

    /// Every item sharing the highest count; empty for an empty bag
    fn max_occurrences(&self) -> Vec<Self::Item>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        ranking::extremes(self, RankOrder::Descending)
    }

    /// Every item sharing the lowest count; empty for an empty bag
    fn min_occurrences(&self) -> Vec<Self::Item>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        ranking::extremes(self, RankOrder::Ascending)
    }

    /// Snapshot of the item to count mapping
    fn to_map_of_item_to_count(&self) -> HashMap<Self::Item, usize>
    where
        Self::Item: Clone + Hash + Eq,
    {
        let mut map = HashMap::with_capacity(self.size_distinct());
        self.for_each_with_occurrences(|item, count| {
            map.insert(item.clone(), count);
        });
        map
    }

    /// Distinct items, in traversal order
    fn distinct_items(&self) -> Vec<Self::Item>
    where
        Self::Item: Clone,
    {
        let mut items = Vec::with_capacity(self.size_distinct());
        self.for_each_with_occurrences(|item, _| items.push(item.clone()));
        items
    }

    /// New bag holding the items whose count satisfies `predicate`, with
    /// their counts preserved
    fn select_by_occurrences<P>(&self, mut predicate: P) -> HashBag<Self::Item>
    where
        P: FnMut(usize) -> bool,
        Self::Item: Clone + Hash + Eq,
    {
        let mut selected = HashBag::new();
        self.for_each_with_occurrences(|item, count| {
            if predicate(count) {
                selected.insert_counted(item.clone(), count);
            }
        });
        selected
    }
}

/// Write capability of a multiset
///
/// Every mutation validates its arguments before touching state, so an `Err`
/// leaves the bag unchanged.
pub trait MutableBag: Bag {
    /// Add `occurrences` of `item` and return its new count.
    ///
    /// Zero is a no-op that never inserts an entry.
    fn add_occurrences(&mut self, item: Self::Item, occurrences: isize) -> Result<usize>;

    /// Remove up to `occurrences` of `item`, deleting it once its count
    /// reaches zero. Returns whether anything was removed.
    fn remove_occurrences(&mut self, item: &Self::Item, occurrences: isize) -> Result<bool>;

    /// Delete `item` together with every one of its occurrences, whatever
    /// its count. Returns whether it was present.
    fn remove_all_occurrences(&mut self, item: &Self::Item) -> Result<bool>;

    /// Set the count of `item` to exactly `occurrences`; zero deletes it.
    /// Returns whether the contents changed.
    fn set_occurrences(&mut self, item: Self::Item, occurrences: isize) -> Result<bool>;

    /// Remove every occurrence of every item
    fn clear(&mut self) -> Result<()>;

    /// Keep only the items for which `keep(item, count)` holds.
    /// Returns whether anything was removed.
    fn retain_by_occurrences<F>(&mut self, keep: F) -> Result<bool>
    where
        F: FnMut(&Self::Item, usize) -> bool;

    /// Add one occurrence of `item`
    fn add(&mut self, item: Self::Item) -> Result<()> {
        self.add_occurrences(item, 1).map(|_| ())
    }

    /// Remove one occurrence of `item`, returning whether it was present
    fn remove(&mut self, item: &Self::Item) -> Result<bool> {
        self.remove_occurrences(item, 1)
    }

    /// Add one occurrence of each yielded item
    fn add_all<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = Self::Item>,
    {
        for item in items {
            self.add(item)?;
        }
        Ok(())
    }

    /// Remove every occurrence of each given item.
    /// Returns whether anything was removed.
    fn remove_all_of<'i, I>(&mut self, items: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'i Self::Item>,
        Self::Item: 'i,
    {
        let mut changed = false;
        for item in items {
            changed |= self.remove_all_occurrences(item)?;
        }
        Ok(changed)
    }

    /// Cursor yielding each item once per occurrence, with removal support
    fn cursor(&mut self) -> BagCursor<'_, Self>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        BagCursor::new(self)
    }
}
