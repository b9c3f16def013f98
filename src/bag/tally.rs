//! Occurrence accounting shared by the bag variants.
//!
//! Each bag stores a map from item to count plus a cached total. The
//! functions here keep both in step: every stored count is at least 1 and the
//! total always equals the sum of the counts. Arguments are validated and
//! overflow is checked before anything is written.

use crate::error::{check_occurrences, BagwiseError, Result};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Map operations the accounting needs from a backing store
pub(crate) trait CountMap<T> {
    fn count(&self, item: &T) -> usize;
    fn count_mut(&mut self, item: &T) -> Option<&mut usize>;
    fn put(&mut self, item: T, count: usize);
    fn take(&mut self, item: &T) -> Option<usize>;
    fn retain_counts<F: FnMut(&T, usize) -> bool>(&mut self, keep: F);
    fn distinct(&self) -> usize;
    fn clear_counts(&mut self);
}

impl<T: Hash + Eq, S: BuildHasher> CountMap<T> for HashMap<T, usize, S> {
    fn count(&self, item: &T) -> usize {
        self.get(item).copied().unwrap_or(0)
    }

    fn count_mut(&mut self, item: &T) -> Option<&mut usize> {
        self.get_mut(item)
    }

    fn put(&mut self, item: T, count: usize) {
        self.insert(item, count);
    }

    fn take(&mut self, item: &T) -> Option<usize> {
        self.remove(item)
    }

    fn retain_counts<F: FnMut(&T, usize) -> bool>(&mut self, mut keep: F) {
        self.retain(|item, count| keep(item, *count));
    }

    fn distinct(&self) -> usize {
        self.len()
    }

    fn clear_counts(&mut self) {
        self.clear();
    }
}

impl<T: Ord> CountMap<T> for BTreeMap<T, usize> {
    fn count(&self, item: &T) -> usize {
        self.get(item).copied().unwrap_or(0)
    }

    fn count_mut(&mut self, item: &T) -> Option<&mut usize> {
        self.get_mut(item)
    }

    fn put(&mut self, item: T, count: usize) {
        self.insert(item, count);
    }

    fn take(&mut self, item: &T) -> Option<usize> {
        self.remove(item)
    }

    fn retain_counts<F: FnMut(&T, usize) -> bool>(&mut self, mut keep: F) {
        self.retain(|item, count| keep(item, *count));
    }

    fn distinct(&self) -> usize {
        self.len()
    }

    fn clear_counts(&mut self) {
        self.clear();
    }
}

pub(crate) fn add<T, M: CountMap<T>>(map: &mut M, size: &mut usize, item: T, occurrences: isize) -> Result<usize> {
    let n = check_occurrences(occurrences, "add_occurrences")?;
    let current = map.count(&item);
    if n == 0 {
        return Ok(current);
    }
    let updated = current
        .checked_add(n)
        .ok_or_else(|| BagwiseError::invalid_argument("add_occurrences: count overflow"))?;
    let total = size
        .checked_add(n)
        .ok_or_else(|| BagwiseError::invalid_argument("add_occurrences: size overflow"))?;
    map.put(item, updated);
    *size = total;
    Ok(updated)
}

pub(crate) fn remove<T, M: CountMap<T>>(map: &mut M, size: &mut usize, item: &T, occurrences: isize) -> Result<bool> {
    let n = check_occurrences(occurrences, "remove_occurrences")?;
    if n == 0 {
        return Ok(false);
    }
    let Some(count) = map.count_mut(item) else {
        return Ok(false);
    };
    if *count > n {
        *count -= n;
        *size -= n;
    } else {
        let removed = *count;
        map.take(item);
        *size -= removed;
    }
    Ok(true)
}

/// Delete `item` with all of its occurrences, however many there are
pub(crate) fn remove_all<T, M: CountMap<T>>(map: &mut M, size: &mut usize, item: &T) -> bool {
    match map.take(item) {
        Some(count) => {
            *size -= count;
            true
        }
        None => false,
    }
}

pub(crate) fn set<T, M: CountMap<T>>(map: &mut M, size: &mut usize, item: T, occurrences: isize) -> Result<bool> {
    let n = check_occurrences(occurrences, "set_occurrences")?;
    let current = map.count(&item);
    if current == n {
        return Ok(false);
    }
    let total = (*size - current)
        .checked_add(n)
        .ok_or_else(|| BagwiseError::invalid_argument("set_occurrences: size overflow"))?;
    if n == 0 {
        map.take(&item);
    } else {
        map.put(item, n);
    }
    *size = total;
    Ok(true)
}

pub(crate) fn clear<T, M: CountMap<T>>(map: &mut M, size: &mut usize) {
    map.clear_counts();
    *size = 0;
}

pub(crate) fn retain<T, M, F>(map: &mut M, size: &mut usize, mut keep: F) -> bool
where
    M: CountMap<T>,
    F: FnMut(&T, usize) -> bool,
{
    let before = map.distinct();
    let mut removed = 0;
    map.retain_counts(|item, count| {
        let kept = keep(item, count);
        if !kept {
            removed += count;
        }
        kept
    });
    *size -= removed;
    map.distinct() != before
}

/// Add `count` occurrences, dropping whatever would push the total past
/// `usize::MAX`. Returns the number actually added.
pub(crate) fn insert_saturating<T, M: CountMap<T>>(map: &mut M, size: &mut usize, item: T, count: usize) -> usize {
    // Every count is bounded by the total, so clamping the total is enough.
    let added = count.min(usize::MAX - *size);
    if added == 0 {
        return 0;
    }
    let current = map.count(&item);
    map.put(item, current + added);
    *size += added;
    added
}

/// Add `count` occurrences, failing without change when the total would
/// overflow `usize`. Returns whether the occurrences were added.
pub(crate) fn try_insert<T, M: CountMap<T>>(map: &mut M, size: &mut usize, item: T, count: usize) -> bool {
    let Some(total) = size.checked_add(count) else {
        return false;
    };
    if count > 0 {
        let current = map.count(&item);
        map.put(item, current + count);
        *size = total;
    }
    true
}
