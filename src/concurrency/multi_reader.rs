//! Multi-reader wrapper: a collection behind a single reader/writer lock
//!
//! [`MultiReader`] owns its delegate exclusively and never hands out a
//! reference that outlives a lock session. Access goes through two scoped
//! entry points:
//!
//! - [`MultiReader::with_read_lock_and_delegate`] runs a callback under the
//!   shared lock with a [`ReadOnlyView`] of the delegate
//! - [`MultiReader::with_write_lock_and_delegate`] runs a callback under the
//!   exclusive lock with `&mut` access to the delegate
//!
//! Every other operation is a single read or write session. The lock is a
//! `parking_lot::RwLock`; its guard releases the lock on every exit path,
//! including unwinding out of a panicking callback, and it never poisons.
//!
//! Calling back into the same wrapper from inside a callback deadlocks.

use super::read_only::ReadOnlyView;
use crate::bag::{Bag, HashBag, MutableBag};
use crate::config::{Config, MultiReaderConfig};
use crate::error::{BagwiseError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A collection shared between threads behind one reader/writer lock.
///
/// Many read sessions may run concurrently; a write session excludes all
/// other sessions. A read session that begins after a write session ends
/// observes every mutation of that write session.
///
/// # Examples
///
/// ```rust
/// use bagwise::{Bag, MultiReaderHashBag, MutableBag};
/// use std::sync::Arc;
/// use std::thread;
///
/// let bag = Arc::new(MultiReaderHashBag::<&str>::new_bag());
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let bag = Arc::clone(&bag);
///         thread::spawn(move || bag.add("hit").unwrap())
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(bag.occurrences_of(&"hit"), 4);
/// let doubled = bag.with_write_lock_and_delegate(|delegate| delegate.add_occurrences("hit", 4));
/// assert_eq!(doubled.unwrap(), 8);
/// assert!(bag.with_read_lock_and_delegate(|mut view| view.add("miss")).is_err());
/// ```
pub struct MultiReader<C> {
    delegate: RwLock<C>,
    trace_sessions: bool,
}

/// [`MultiReader`] around a [`HashBag`]
pub type MultiReaderHashBag<T> = MultiReader<HashBag<T>>;

impl<C> MultiReader<C> {
    /// Take ownership of `delegate`
    pub fn new(delegate: C) -> Self {
        Self { delegate: RwLock::new(delegate), trace_sessions: false }
    }

    /// Take ownership of `delegate`, tracing sessions when configured to
    pub fn with_delegate_and_config(delegate: C, config: &MultiReaderConfig) -> Self {
        Self { delegate: RwLock::new(delegate), trace_sessions: config.trace_sessions }
    }

    /// Run `f` under the shared lock with a read-only view of the delegate.
    ///
    /// Mutations through the view fail with
    /// [`BagwiseError::UnsupportedOperation`]. Blocks while a write session
    /// is active. The lock is released when `f` returns or unwinds.
    pub fn with_read_lock_and_delegate<R, F>(&self, f: F) -> R
    where
        F: FnOnce(ReadOnlyView<'_, C>) -> R,
    {
        self.read(|delegate| f(ReadOnlyView::new(delegate)))
    }

    /// Run `f` under the exclusive lock with mutable access to the delegate.
    ///
    /// Blocks while any other session is active. The lock is released when
    /// `f` returns or unwinds.
    pub fn with_write_lock_and_delegate<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut C) -> R,
    {
        self.write(f)
    }

    /// Consume the wrapper and return the delegate
    pub fn into_inner(self) -> C {
        self.delegate.into_inner()
    }

    fn read<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        let guard = self.delegate.read();
        if self.trace_sessions {
            log::trace!("multi-reader: read session started");
        }
        let result = f(&guard);
        drop(guard);
        if self.trace_sessions {
            log::trace!("multi-reader: read session ended");
        }
        result
    }

    fn write<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        let mut guard = self.delegate.write();
        if self.trace_sessions {
            log::trace!("multi-reader: write session started");
        }
        let result = f(&mut guard);
        drop(guard);
        if self.trace_sessions {
            log::trace!("multi-reader: write session ended");
        }
        result
    }
}

impl<T: Hash + Eq> MultiReader<HashBag<T>> {
    /// Wrap a new empty bag
    pub fn new_bag() -> Self {
        Self::new(HashBag::new())
    }

    /// Wrap a new bag tallying every yielded item
    pub fn new_bag_with<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::new(HashBag::new_with(items))
    }

    /// Wrap a new empty bag built from `config`
    pub fn with_config(config: &MultiReaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_delegate_and_config(HashBag::with_config(&config.bag)?, config))
    }
}

impl<B: Bag> MultiReader<B> {
    /// Unscoped iteration is not supported.
    ///
    /// Always fails with [`BagwiseError::UnsupportedOperation`]; iterate
    /// inside [`with_read_lock_and_delegate`](MultiReader::with_read_lock_and_delegate)
    /// instead.
    pub fn iter(&self) -> Result<std::iter::Empty<B::Item>> {
        Err(BagwiseError::unsupported(
            "iter() on a multi-reader collection; use with_read_lock_and_delegate",
        ))
    }

    /// Invoke `f` once per occurrence under a single read session
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&B::Item),
    {
        self.read(|bag| {
            bag.for_each_with_occurrences(|item, count| {
                for _ in 0..count {
                    f(item);
                }
            })
        })
    }

    /// New bag of the items satisfying `predicate`, with their counts
    pub fn select<P>(&self, mut predicate: P) -> HashBag<B::Item>
    where
        P: FnMut(&B::Item) -> bool,
        B::Item: Clone + Hash + Eq,
    {
        self.read(|bag| {
            let mut selected = HashBag::new();
            bag.for_each_with_occurrences(|item, count| {
                if predicate(item) {
                    selected.insert_counted(item.clone(), count);
                }
            });
            selected
        })
    }

    /// Number of occurrences whose item satisfies `predicate`
    pub fn count<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&B::Item) -> bool,
    {
        self.read(|bag| {
            let mut total = 0;
            bag.for_each_with_occurrences(|item, count| {
                if predicate(item) {
                    total += count;
                }
            });
            total
        })
    }

    /// Whether any item satisfies `predicate`
    pub fn any_satisfy<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&B::Item) -> bool,
    {
        self.read(|bag| {
            let mut found = false;
            bag.for_each_with_occurrences(|item, _| {
                if !found && predicate(item) {
                    found = true;
                }
            });
            found
        })
    }

    /// Owned copy of the delegate taken under a single read session
    pub fn snapshot_bag(&self) -> B
    where
        B: Clone,
    {
        self.read(|bag| bag.clone())
    }
}

impl<B: MutableBag> MultiReader<B> {
    /// Add one occurrence of `item`
    pub fn add(&self, item: B::Item) -> Result<()> {
        self.write(|bag| bag.add(item))
    }

    /// Add `occurrences` of `item`, returning its new count
    pub fn add_occurrences(&self, item: B::Item, occurrences: isize) -> Result<usize> {
        self.write(|bag| bag.add_occurrences(item, occurrences))
    }

    /// Remove one occurrence of `item`
    pub fn remove(&self, item: &B::Item) -> Result<bool> {
        self.write(|bag| bag.remove(item))
    }

    /// Remove up to `occurrences` of `item`
    pub fn remove_occurrences(&self, item: &B::Item, occurrences: isize) -> Result<bool> {
        self.write(|bag| bag.remove_occurrences(item, occurrences))
    }

    /// Remove `item` with all of its occurrences
    pub fn remove_all_occurrences(&self, item: &B::Item) -> Result<bool> {
        self.write(|bag| bag.remove_all_occurrences(item))
    }

    /// Set the count of `item` to exactly `occurrences`
    pub fn set_occurrences(&self, item: B::Item, occurrences: isize) -> Result<bool> {
        self.write(|bag| bag.set_occurrences(item, occurrences))
    }

    /// Remove every occurrence of every item
    pub fn clear(&self) -> Result<()> {
        self.write(|bag| bag.clear())
    }

    /// Add one occurrence of each yielded item within a single write session
    pub fn add_all<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = B::Item>,
    {
        self.write(|bag| bag.add_all(items))
    }
}

impl<B: Bag> Bag for MultiReader<B> {
    type Item = B::Item;

    fn occurrences_of(&self, item: &B::Item) -> usize {
        self.read(|bag| bag.occurrences_of(item))
    }

    fn size(&self) -> usize {
        self.read(|bag| bag.size())
    }

    fn size_distinct(&self) -> usize {
        self.read(|bag| bag.size_distinct())
    }

    fn for_each_with_occurrences<F>(&self, f: F)
    where
        F: FnMut(&B::Item, usize),
    {
        self.read(|bag| bag.for_each_with_occurrences(f))
    }

    fn is_empty(&self) -> bool {
        self.read(|bag| bag.is_empty())
    }

    fn contains(&self, item: &B::Item) -> bool {
        self.read(|bag| bag.contains(item))
    }

    fn ranking_threshold(&self) -> usize {
        self.read(|bag| bag.ranking_threshold())
    }

    fn top_occurrences(&self, count: isize) -> Result<Vec<(B::Item, usize)>>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        self.read(|bag| bag.top_occurrences(count))
    }

    fn bottom_occurrences(&self, count: isize) -> Result<Vec<(B::Item, usize)>>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        self.read(|bag| bag.bottom_occurrences(count))
    }

    fn max_occurrences(&self) -> Vec<B::Item>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        self.read(|bag| bag.max_occurrences())
    }

    fn min_occurrences(&self) -> Vec<B::Item>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        self.read(|bag| bag.min_occurrences())
    }

    fn to_map_of_item_to_count(&self) -> HashMap<B::Item, usize>
    where
        Self::Item: Clone + Hash + Eq,
    {
        self.read(|bag| bag.to_map_of_item_to_count())
    }

    fn distinct_items(&self) -> Vec<B::Item>
    where
        Self::Item: Clone,
    {
        self.read(|bag| bag.distinct_items())
    }

    fn select_by_occurrences<P>(&self, predicate: P) -> HashBag<B::Item>
    where
        P: FnMut(usize) -> bool,
        Self::Item: Clone + Hash + Eq,
    {
        self.read(|bag| bag.select_by_occurrences(predicate))
    }
}

impl<C: Default> Default for MultiReader<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: fmt::Debug> fmt::Debug for MultiReader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.delegate.try_read() {
            Some(guard) => f.debug_tuple("MultiReader").field(&*guard).finish(),
            None => f.write_str("MultiReader(<locked>)"),
        }
    }
}

impl<C: PartialEq + Clone> PartialEq for MultiReader<C> {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        // Compare against a copy so the two locks are never held together.
        let mine = self.read(|delegate| delegate.clone());
        other.read(|delegate| &mine == delegate)
    }
}

impl<C: Eq + Clone> Eq for MultiReader<C> {}

impl<C: Hash> Hash for MultiReader<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.read(|delegate| delegate.hash(state))
    }
}

impl<C: Serialize> Serialize for MultiReader<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.read(|delegate| delegate.serialize(serializer))
    }
}

impl<'de, C: Deserialize<'de>> Deserialize<'de> for MultiReader<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        C::deserialize(deserializer).map(MultiReader::new)
    }
}

impl<C: Serialize> MultiReader<C> {
    /// Encode the delegate as a portable binary snapshot under a read session
    pub fn to_snapshot(&self) -> Result<Vec<u8>> {
        self.read(|delegate| {
            bincode::serialize(delegate)
                .map_err(|e| BagwiseError::serialization(format!("Serialization failed: {}", e)))
        })
    }
}

impl<C> MultiReader<C>
where
    C: for<'de> Deserialize<'de>,
{
    /// Build a new wrapper around a delegate decoded from `data`
    pub fn from_snapshot(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map(MultiReader::new)
            .map_err(|e| BagwiseError::serialization(format!("Deserialization failed: {}", e)))
    }
}
