//! TreeBag: sorted multiset backed by a `BTreeMap`

use super::iter::Occurrences;
use super::{tally, Bag, MutableBag};
use crate::config::{BagConfig, Config};
use crate::error::{BagwiseError, Result};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Multiset whose distinct items are kept in ascending order.
///
/// Operations are O(log d) in the number of distinct items. Iteration yields
/// items in ascending order, each repeated once per occurrence.
///
/// ```rust
/// use bagwise::{Bag, MutableBag, TreeBag};
///
/// let mut bag = TreeBag::new_with(["pear", "apple", "pear"]);
/// bag.add("fig").unwrap();
/// let ordered: Vec<&str> = bag.iter().copied().collect();
/// assert_eq!(ordered, vec!["apple", "fig", "pear", "pear"]);
/// assert_eq!(bag.first(), Some((&"apple", 1)));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TreeBag<T: Ord> {
    items: BTreeMap<T, usize>,
    size: usize,
    full_sort_threshold: ThresholdField,
}

/// Ranking threshold that takes no part in equality or hashing
#[derive(Clone, Copy)]
struct ThresholdField(usize);

impl PartialEq for ThresholdField {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for ThresholdField {}

impl Hash for ThresholdField {
    fn hash<H: Hasher>(&self, _: &mut H) {}
}

impl Default for ThresholdField {
    fn default() -> Self {
        Self(crate::config::bag::DEFAULT_FULL_SORT_THRESHOLD)
    }
}

impl<T: Ord> TreeBag<T> {
    /// Create an empty bag
    pub fn new() -> Self {
        Self { items: BTreeMap::new(), size: 0, full_sort_threshold: ThresholdField::default() }
    }

    /// Create an empty bag from a validated [`BagConfig`].
    ///
    /// `initial_capacity` has no effect on a tree.
    pub fn with_config(config: &BagConfig) -> Result<Self> {
        config.validate()?;
        let mut bag = Self::new();
        bag.full_sort_threshold = ThresholdField(config.full_sort_threshold);
        Ok(bag)
    }

    /// Create a bag tallying every yielded item
    pub fn new_with<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        items.into_iter().collect()
    }

    /// Iterator yielding each item once per occurrence, in ascending order
    pub fn iter(&self) -> Occurrences<'_, T, btree_map::Iter<'_, T, usize>> {
        Occurrences::new(self.items.iter(), self.size)
    }

    /// Iterator over distinct items and their counts, in ascending order
    pub fn iter_distinct(&self) -> impl DoubleEndedIterator<Item = (&T, usize)> + '_ {
        self.items.iter().map(|(item, &count)| (item, count))
    }

    /// Smallest item and its count
    pub fn first(&self) -> Option<(&T, usize)> {
        self.items.iter().next().map(|(item, &count)| (item, count))
    }

    /// Largest item and its count
    pub fn last(&self) -> Option<(&T, usize)> {
        self.items.iter().next_back().map(|(item, &count)| (item, count))
    }

    fn insert_counted(&mut self, item: T, count: usize) {
        tally::insert_saturating(&mut self.items, &mut self.size, item, count);
    }
}

impl<T: Ord + Serialize> TreeBag<T> {
    /// Encode the bag as a portable binary snapshot
    pub fn to_snapshot(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BagwiseError::serialization(format!("Serialization failed: {}", e)))
    }
}

impl<T> TreeBag<T>
where
    T: Ord + for<'de> Deserialize<'de>,
{
    /// Rebuild a bag from a snapshot produced by [`TreeBag::to_snapshot`]
    pub fn from_snapshot(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| BagwiseError::serialization(format!("Deserialization failed: {}", e)))
    }
}

impl<T: Ord> Bag for TreeBag<T> {
    type Item = T;

    fn occurrences_of(&self, item: &T) -> usize {
        self.items.get(item).copied().unwrap_or(0)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn size_distinct(&self) -> usize {
        self.items.len()
    }

    fn for_each_with_occurrences<F>(&self, mut f: F)
    where
        F: FnMut(&T, usize),
    {
        for (item, &count) in &self.items {
            f(item, count);
        }
    }

    fn ranking_threshold(&self) -> usize {
        self.full_sort_threshold.0
    }
}

impl<T: Ord> MutableBag for TreeBag<T> {
    fn add_occurrences(&mut self, item: T, occurrences: isize) -> Result<usize> {
        tally::add(&mut self.items, &mut self.size, item, occurrences)
    }

    fn remove_occurrences(&mut self, item: &T, occurrences: isize) -> Result<bool> {
        tally::remove(&mut self.items, &mut self.size, item, occurrences)
    }

    fn remove_all_occurrences(&mut self, item: &T) -> Result<bool> {
        Ok(tally::remove_all(&mut self.items, &mut self.size, item))
    }

    fn set_occurrences(&mut self, item: T, occurrences: isize) -> Result<bool> {
        tally::set(&mut self.items, &mut self.size, item, occurrences)
    }

    fn clear(&mut self) -> Result<()> {
        tally::clear::<T, _>(&mut self.items, &mut self.size);
        Ok(())
    }

    fn retain_by_occurrences<F>(&mut self, keep: F) -> Result<bool>
    where
        F: FnMut(&T, usize) -> bool,
    {
        Ok(tally::retain(&mut self.items, &mut self.size, keep))
    }
}

impl<T: Ord> Default for TreeBag<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for TreeBag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for TreeBag<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut bag = Self::new();
        bag.extend(iter);
        bag
    }
}

impl<T: Ord> FromIterator<(T, usize)> for TreeBag<T> {
    fn from_iter<I: IntoIterator<Item = (T, usize)>>(iter: I) -> Self {
        let mut bag = Self::new();
        bag.extend(iter);
        bag
    }
}

/// Occurrences beyond a total of `usize::MAX` are dropped.
impl<T: Ord> Extend<T> for TreeBag<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert_counted(item, 1);
        }
    }
}

/// Zero counts are skipped; occurrences beyond a total of `usize::MAX` are dropped.
impl<T: Ord> Extend<(T, usize)> for TreeBag<T> {
    fn extend<I: IntoIterator<Item = (T, usize)>>(&mut self, iter: I) {
        for (item, count) in iter {
            self.insert_counted(item, count);
        }
    }
}

impl<'a, T: Ord> IntoIterator for &'a TreeBag<T> {
    type Item = &'a T;
    type IntoIter = Occurrences<'a, T, btree_map::Iter<'a, T, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Consumes the bag, yielding each distinct item with its count in ascending order
impl<T: Ord> IntoIterator for TreeBag<T> {
    type Item = (T, usize);
    type IntoIter = btree_map::IntoIter<T, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: Ord + Serialize> Serialize for TreeBag<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.items.iter())
    }
}

impl<'de, T> Deserialize<'de> for TreeBag<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(TreeBagVisitor(PhantomData))
    }
}

struct TreeBagVisitor<T>(PhantomData<fn() -> T>);

impl<'de, T> Visitor<'de> for TreeBagVisitor<T>
where
    T: Deserialize<'de> + Ord,
{
    type Value = TreeBag<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of items to positive occurrence counts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut bag = TreeBag::new();
        while let Some((item, count)) = access.next_entry::<T, usize>()? {
            if count == 0 {
                return Err(de::Error::custom("occurrence count must be positive"));
            }
            if !tally::try_insert(&mut bag.items, &mut bag.size, item, count) {
                return Err(de::Error::custom("occurrence total overflows usize"));
            }
        }
        Ok(bag)
    }
}
