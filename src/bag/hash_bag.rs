//! HashBag: unordered multiset backed by a hash map
//!
//! Items map to their occurrence counts in a `HashMap<T, usize, S>`; the
//! default hasher is `ahash`. Lookups, insertions and removals are O(1)
//! amortized, and the total size is cached so `size()` is O(1) as well.

use super::iter::Occurrences;
use super::{tally, Bag, MutableBag};
use crate::config::{BagConfig, Config};
use crate::error::{BagwiseError, Result};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::hash_map::{self, DefaultHasher};
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::marker::PhantomData;

/// Upper bound on the capacity pre-allocated from a deserializer size hint
const MAX_PREALLOCATED_ENTRIES: usize = 4096;

/// Unordered multiset backed by a hash map.
///
/// Two bags are equal when their item to count mappings are equal; the
/// [`Hash`] implementation is independent of iteration order and hasher
/// seed, so equal bags always hash alike.
///
/// # Examples
///
/// ```rust
/// use bagwise::{Bag, HashBag, MutableBag};
///
/// let mut bag = HashBag::new();
/// bag.add("apple").unwrap();
/// bag.add_occurrences("pear", 3).unwrap();
/// assert_eq!(bag.size(), 4);
///
/// assert!(bag.remove_occurrences(&"pear", 10).unwrap());
/// assert_eq!(bag.occurrences_of(&"pear"), 0);
/// assert!(bag.add_occurrences("plum", -1).is_err());
/// ```
#[derive(Clone)]
pub struct HashBag<T, S = ahash::RandomState> {
    items: HashMap<T, usize, S>,
    size: usize,
    full_sort_threshold: usize,
}

impl<T: Hash + Eq> HashBag<T> {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty bag with room for `capacity` distinct items
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, ahash::RandomState::new())
    }

    /// Create an empty bag from a validated [`BagConfig`]
    pub fn with_config(config: &BagConfig) -> Result<Self> {
        config.validate()?;
        let mut bag = Self::with_capacity(config.initial_capacity);
        bag.full_sort_threshold = config.full_sort_threshold;
        Ok(bag)
    }

    /// Create a bag tallying every yielded item
    pub fn new_with<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        items.into_iter().collect()
    }
}

impl<T, S> HashBag<T, S> {
    /// Number of distinct items the bag can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Iterator yielding each item once per occurrence
    pub fn iter(&self) -> Occurrences<'_, T, hash_map::Iter<'_, T, usize>> {
        Occurrences::new(self.items.iter(), self.size)
    }

    /// Iterator over distinct items and their counts
    pub fn iter_distinct(&self) -> impl Iterator<Item = (&T, usize)> + '_ {
        self.items.iter().map(|(item, &count)| (item, count))
    }
}

impl<T, S> HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Create an empty bag using `hash_builder`
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Create an empty bag with room for `capacity` distinct items using `hash_builder`
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            items: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            size: 0,
            full_sort_threshold: crate::config::bag::DEFAULT_FULL_SORT_THRESHOLD,
        }
    }

    /// Reserve space for at least `additional` more distinct items
    pub fn reserve(&mut self, additional: usize) {
        self.items.reserve(additional);
    }

    /// Shrink the backing map to fit the distinct items
    pub fn shrink_to_fit(&mut self) {
        self.items.shrink_to_fit();
    }

    /// Add `count` occurrences without argument validation.
    ///
    /// Occurrences that would push the total past `usize::MAX` are dropped.
    pub(crate) fn insert_counted(&mut self, item: T, count: usize) {
        tally::insert_saturating(&mut self.items, &mut self.size, item, count);
    }
}

impl<T, S> HashBag<T, S>
where
    T: Hash + Eq + Serialize,
{
    /// Encode the bag as a portable binary snapshot
    pub fn to_snapshot(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BagwiseError::serialization(format!("Serialization failed: {}", e)))
    }
}

impl<T, S> HashBag<T, S>
where
    T: Hash + Eq + for<'de> Deserialize<'de>,
    S: BuildHasher + Default,
{
    /// Rebuild a bag from a snapshot produced by [`HashBag::to_snapshot`]
    pub fn from_snapshot(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| BagwiseError::serialization(format!("Deserialization failed: {}", e)))
    }
}

impl<T, S> Bag for HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
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
        self.full_sort_threshold
    }
}

impl<T, S> MutableBag for HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
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

impl<T, S> Default for HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T: fmt::Debug, S> fmt::Debug for HashBag<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items.iter()).finish()
    }
}

impl<T, S> PartialEq for HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self.items.len() == other.items.len()
            && self.items.iter().all(|(item, count)| other.items.get(item) == Some(count))
    }
}

impl<T, S> Eq for HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T: Hash, S> Hash for HashBag<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Entry hashes are combined commutatively with a fixed-key hasher so the
        // result depends only on the item to count mapping.
        let combined = self.items.iter().fold(0u64, |acc, (item, count)| {
            let mut entry = DefaultHasher::new();
            item.hash(&mut entry);
            count.hash(&mut entry);
            acc.wrapping_add(entry.finish())
        });
        state.write_usize(self.items.len());
        state.write_u64(combined);
    }
}

impl<T, S> FromIterator<T> for HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut bag = Self::default();
        bag.extend(iter);
        bag
    }
}

impl<T, S> FromIterator<(T, usize)> for HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (T, usize)>>(iter: I) -> Self {
        let mut bag = Self::default();
        bag.extend(iter);
        bag
    }
}

/// Occurrences beyond a total of `usize::MAX` are dropped.
impl<T, S> Extend<T> for HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert_counted(item, 1);
        }
    }
}

/// Zero counts are skipped; occurrences beyond a total of `usize::MAX` are dropped.
impl<T, S> Extend<(T, usize)> for HashBag<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (T, usize)>>(&mut self, iter: I) {
        for (item, count) in iter {
            self.insert_counted(item, count);
        }
    }
}

impl<'a, T, S> IntoIterator for &'a HashBag<T, S> {
    type Item = &'a T;
    type IntoIter = Occurrences<'a, T, hash_map::Iter<'a, T, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Consumes the bag, yielding each distinct item with its count
impl<T, S> IntoIterator for HashBag<T, S> {
    type Item = (T, usize);
    type IntoIter = hash_map::IntoIter<T, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: Serialize, S> Serialize for HashBag<T, S> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> std::result::Result<Se::Ok, Se::Error> {
        serializer.collect_map(self.items.iter())
    }
}

impl<'de, T, S> Deserialize<'de> for HashBag<T, S>
where
    T: Deserialize<'de> + Hash + Eq,
    S: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(HashBagVisitor(PhantomData))
    }
}

struct HashBagVisitor<T, S>(PhantomData<fn() -> HashBag<T, S>>);

impl<'de, T, S> Visitor<'de> for HashBagVisitor<T, S>
where
    T: Deserialize<'de> + Hash + Eq,
    S: BuildHasher + Default,
{
    type Value = HashBag<T, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of items to positive occurrence counts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let capacity = access.size_hint().unwrap_or(0).min(MAX_PREALLOCATED_ENTRIES);
        let mut bag = HashBag::with_capacity_and_hasher(capacity, S::default());
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_new() {
        let bag: HashBag<String> = HashBag::new();
        assert!(bag.is_empty());
        assert_eq!(bag.size(), 0);
        assert_eq!(bag.size_distinct(), 0);
    }

    #[test]
    fn test_new_with_tallies_duplicates() {
        let bag = HashBag::new_with([1, 2, 2, 3, 3, 3]);
        assert_eq!(bag.size(), 6);
        assert_eq!(bag.size_distinct(), 3);
        assert_eq!(bag.occurrences_of(&1), 1);
        assert_eq!(bag.occurrences_of(&2), 2);
        assert_eq!(bag.occurrences_of(&3), 3);
        assert_eq!(bag.occurrences_of(&4), 0);
    }

    #[test]
    fn test_add_and_add_occurrences() -> Result<()> {
        let mut bag = HashBag::new();
        bag.add("a")?;
        bag.add("a")?;
        assert_eq!(bag.add_occurrences("b", 3)?, 3);
        assert_eq!(bag.add_occurrences("a", 2)?, 4);
        assert_eq!(bag.size(), 7);
        assert_eq!(bag.size_distinct(), 2);
        Ok(())
    }

    #[test]
    fn test_add_zero_occurrences_inserts_nothing() -> Result<()> {
        let mut bag = HashBag::new();
        assert_eq!(bag.add_occurrences("ghost", 0)?, 0);
        assert!(bag.is_empty());
        assert_eq!(bag.size_distinct(), 0);
        assert!(!bag.contains(&"ghost"));
        Ok(())
    }

    #[test]
    fn test_negative_counts_rejected_without_change() -> Result<()> {
        let mut bag = HashBag::new_with(["x", "x", "y"]);
        let before = bag.clone();

        assert!(matches!(bag.add_occurrences("x", -1), Err(BagwiseError::InvalidArgument { .. })));
        assert!(matches!(bag.remove_occurrences(&"x", -1), Err(BagwiseError::InvalidArgument { .. })));
        assert!(matches!(bag.set_occurrences("x", -1), Err(BagwiseError::InvalidArgument { .. })));
        assert!(matches!(bag.top_occurrences(-1), Err(BagwiseError::InvalidArgument { .. })));
        assert!(matches!(bag.bottom_occurrences(-1), Err(BagwiseError::InvalidArgument { .. })));

        assert_eq!(bag, before);
        Ok(())
    }

    #[test]
    fn test_remove_occurrences_is_clamped() -> Result<()> {
        let mut bag = HashBag::new();
        bag.add_occurrences("z", 3)?;

        assert!(bag.remove_occurrences(&"z", 1)?);
        assert_eq!(bag.occurrences_of(&"z"), 2);

        assert!(bag.remove_occurrences(&"z", 100)?);
        assert_eq!(bag.occurrences_of(&"z"), 0);
        assert_eq!(bag.size_distinct(), 0);
        assert_eq!(bag.size(), 0);

        assert!(!bag.remove_occurrences(&"z", 1)?);
        assert!(!bag.remove_occurrences(&"absent", 0)?);
        Ok(())
    }

    #[test]
    fn test_remove_single() -> Result<()> {
        let mut bag = HashBag::new_with(["a", "a"]);
        assert!(bag.remove(&"a")?);
        assert!(bag.remove(&"a")?);
        assert!(!bag.remove(&"a")?);
        assert!(bag.is_empty());
        Ok(())
    }

    #[test]
    fn test_set_occurrences() -> Result<()> {
        let mut bag = HashBag::new();

        assert!(!bag.set_occurrences("a", 0)?);
        assert!(bag.is_empty());

        assert!(bag.set_occurrences("a", 5)?);
        assert_eq!(bag.occurrences_of(&"a"), 5);
        assert_eq!(bag.size(), 5);

        assert!(!bag.set_occurrences("a", 5)?);

        assert!(bag.set_occurrences("a", 2)?);
        assert_eq!(bag.size(), 2);

        assert!(bag.set_occurrences("a", 0)?);
        assert!(!bag.contains(&"a"));
        assert_eq!(bag.size(), 0);
        Ok(())
    }

    #[test]
    fn test_clear_and_retain() -> Result<()> {
        let mut bag = HashBag::new_with(["a", "b", "b", "c", "c", "c"]);
        assert!(bag.retain_by_occurrences(|_, count| count >= 2)?);
        assert_eq!(bag.size(), 5);
        assert_eq!(bag.size_distinct(), 2);
        assert!(!bag.retain_by_occurrences(|_, _| true)?);

        bag.clear()?;
        assert!(bag.is_empty());
        assert_eq!(bag.size_distinct(), 0);
        Ok(())
    }

    #[test]
    fn test_add_all_and_remove_all_of() -> Result<()> {
        let mut bag = HashBag::new();
        bag.add_all(vec![1, 1, 2, 3, 3, 3])?;
        assert_eq!(bag.size(), 6);

        assert!(bag.remove_all_of([&1, &3])?);
        assert_eq!(bag.size(), 1);
        assert_eq!(bag.occurrences_of(&2), 1);
        assert!(!bag.remove_all_of([&9])?);
        Ok(())
    }

    #[test]
    fn test_iter_yields_each_occurrence() {
        let bag = HashBag::new_with(['A', 'A', 'B']);
        let mut seen: Vec<char> = bag.iter().copied().collect();
        seen.sort();
        assert_eq!(seen, vec!['A', 'A', 'B']);
        assert_eq!(bag.iter().len(), 3);

        let mut via_ref = 0;
        for _ in &bag {
            via_ref += 1;
        }
        assert_eq!(via_ref, 3);
    }

    #[test]
    fn test_for_each_with_occurrences_and_map() {
        let bag = HashBag::new_with(["x", "y", "y"]);
        let mut total = 0;
        let mut distinct = 0;
        bag.for_each_with_occurrences(|_, count| {
            total += count;
            distinct += 1;
        });
        assert_eq!(total, 3);
        assert_eq!(distinct, 2);

        let map = bag.to_map_of_item_to_count();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&"y"], 2);
        assert_eq!(map[&"x"], 1);
    }

    #[test]
    fn test_select_and_distinct() {
        let bag = HashBag::new_with([1, 2, 2, 3, 3, 3]);
        let frequent = bag.select_by_occurrences(|count| count > 1);
        assert_eq!(frequent.size(), 5);
        assert_eq!(frequent.occurrences_of(&1), 0);

        let distinct: HashSet<i32> = bag.distinct_items().into_iter().collect();
        assert_eq!(distinct, [1, 2, 3].into_iter().collect::<HashSet<i32>>());

        assert_eq!(bag.max_occurrences(), vec![3]);
        assert_eq!(bag.min_occurrences(), vec![1]);
    }

    #[test]
    fn test_equality_and_hash_ignore_order_and_seed() {
        let a = HashBag::new_with(["one", "two", "two"]);
        let mut b: HashBag<&str> = HashBag::with_hasher(ahash::RandomState::with_seeds(1, 2, 3, 4));
        b.add_occurrences("two", 2).unwrap();
        b.add("one").unwrap();

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        b.add("one").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_counted_pairs_skips_zero() {
        let bag: HashBag<&str> = vec![("a", 2), ("b", 0), ("a", 1)].into_iter().collect();
        assert_eq!(bag.occurrences_of(&"a"), 3);
        assert!(!bag.contains(&"b"));
        assert_eq!(bag.size_distinct(), 1);
    }

    #[test]
    fn test_into_iter_distinct_pairs() {
        let bag = HashBag::new_with(["p", "p", "q"]);
        let mut pairs: Vec<(&str, usize)> = bag.into_iter().collect();
        pairs.sort();
        assert_eq!(pairs, vec![("p", 2), ("q", 1)]);
    }

    #[test]
    fn test_debug_format() {
        let bag = HashBag::new_with(["k"]);
        assert_eq!(format!("{:?}", bag), "{\"k\": 1}");
    }

    #[test]
    fn test_snapshot_round_trip() -> Result<()> {
        let bag = HashBag::new_with(vec!["alpha".to_string(), "beta".to_string(), "beta".to_string()]);
        let bytes = bag.to_snapshot()?;
        let restored: HashBag<String> = HashBag::from_snapshot(&bytes)?;
        assert_eq!(restored, bag);
        assert_eq!(hash_of(&restored), hash_of(&bag));
        Ok(())
    }

    #[test]
    fn test_snapshot_rejects_garbage() {
        let result: Result<HashBag<String>> = HashBag::from_snapshot(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(BagwiseError::Serialization { .. })));
    }

    #[test]
    fn test_deserialize_rejects_zero_count() {
        let result: std::result::Result<HashBag<String>, _> = serde_json::from_str("{\"a\": 0}");
        assert!(result.is_err());
    }

    #[test]
    fn test_with_config() -> Result<()> {
        let config = BagConfig { initial_capacity: 128, full_sort_threshold: 3 };
        let bag: HashBag<u32> = HashBag::with_config(&config)?;
        assert!(bag.capacity() >= 128);
        assert_eq!(bag.ranking_threshold(), 3);
        Ok(())
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = BagConfig { full_sort_threshold: usize::MAX, ..BagConfig::default() };
        let result: Result<HashBag<u32>> = HashBag::with_config(&config);
        assert!(matches!(result, Err(BagwiseError::Configuration { .. })));
    }

    #[test]
    fn test_set_occurrences_size_overflow() -> Result<()> {
        let mut bag = HashBag::new();
        bag.add_occurrences("a", isize::MAX)?;
        bag.add_occurrences("b", isize::MAX)?;
        let before = bag.clone();

        assert!(matches!(bag.set_occurrences("c", isize::MAX), Err(BagwiseError::InvalidArgument { .. })));
        assert_eq!(bag, before);
        assert_eq!(bag.size(), 2 * isize::MAX as usize);

        // Shrinking an existing count still works near the limit.
        assert!(bag.set_occurrences("b", 1)?);
        assert_eq!(bag.size(), isize::MAX as usize + 1);
        Ok(())
    }

    #[test]
    fn test_remove_all_of_count_beyond_isize() -> Result<()> {
        let mut bag = HashBag::new();
        bag.add_occurrences("a", isize::MAX)?;
        bag.add_occurrences("a", 5)?;
        bag.add("b")?;
        assert_eq!(bag.occurrences_of(&"a"), isize::MAX as usize + 5);

        assert!(bag.remove_all_of([&"a"])?);
        assert_eq!(bag.occurrences_of(&"a"), 0);
        assert_eq!(bag.size(), 1);
        assert!(bag.remove_all_occurrences(&"b")?);
        assert!(!bag.remove_all_occurrences(&"b")?);
        assert!(bag.is_empty());
        Ok(())
    }

    #[test]
    fn test_deserialize_rejects_total_overflow() {
        let json = format!("{{\"a\": {}, \"b\": 5}}", usize::MAX);
        let result: std::result::Result<HashBag<String>, _> = serde_json::from_str(&json);
        assert!(result.is_err());

        let json = format!("{{\"a\": {}}}", usize::MAX);
        let bag: HashBag<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(bag.size(), usize::MAX);
    }

    #[test]
    fn test_extend_drops_occurrences_past_usize_max() {
        let mut bag: HashBag<&str> = vec![("a", usize::MAX)].into_iter().collect();
        bag.extend([("b", 5)]);
        bag.extend(["c"]);
        assert_eq!(bag.size(), usize::MAX);
        assert_eq!(bag.size_distinct(), 1);
        assert!(!bag.contains(&"b"));
    }
}
