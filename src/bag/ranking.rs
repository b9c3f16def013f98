//! Frequency ranking over bags
//!
//! Rankings over at most [`Bag::ranking_threshold`] distinct items collect and
//! sort every entry. Larger bags keep a bounded heap of `n` entries, so a
//! ranking costs O(d log n) for d distinct items and clones at most the items
//! that enter the heap.
//!
//! Items with equal counts are ranked in no particular order.

use super::Bag;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Direction of a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Highest counts first
    Descending,
    /// Lowest counts first
    Ascending,
}

/// Heap entry ordered by count alone
struct Ranked<T> {
    count: usize,
    item: T,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count.cmp(&other.count)
    }
}

/// Up to `n` `(item, count)` pairs of `bag` ranked in `order`
pub fn rank<B>(bag: &B, n: usize, order: RankOrder) -> Vec<(B::Item, usize)>
where
    B: Bag + ?Sized,
    B::Item: Clone,
{
    if n == 0 || bag.size_distinct() == 0 {
        return Vec::new();
    }
    if bag.size_distinct() <= bag.ranking_threshold() {
        sorted_prefix(bag, n, order)
    } else {
        match order {
            RankOrder::Descending => heap_top(bag, n),
            RankOrder::Ascending => heap_bottom(bag, n),
        }
    }
}

fn sorted_prefix<B>(bag: &B, n: usize, order: RankOrder) -> Vec<(B::Item, usize)>
where
    B: Bag + ?Sized,
    B::Item: Clone,
{
    let mut entries = Vec::with_capacity(bag.size_distinct());
    bag.for_each_with_occurrences(|item, count| entries.push((item.clone(), count)));
    match order {
        RankOrder::Descending => entries.sort_unstable_by(|a, b| b.1.cmp(&a.1)),
        RankOrder::Ascending => entries.sort_unstable_by(|a, b| a.1.cmp(&b.1)),
    }
    entries.truncate(n);
    entries
}

fn heap_top<B>(bag: &B, n: usize) -> Vec<(B::Item, usize)>
where
    B: Bag + ?Sized,
    B::Item: Clone,
{
    // Min-heap of the n largest counts seen so far.
    let mut heap: BinaryHeap<Reverse<Ranked<B::Item>>> = BinaryHeap::with_capacity(n + 1);
    bag.for_each_with_occurrences(|item, count| {
        if heap.len() < n {
            heap.push(Reverse(Ranked { count, item: item.clone() }));
        } else if heap.peek().map_or(false, |smallest| count > smallest.0.count) {
            heap.pop();
            heap.push(Reverse(Ranked { count, item: item.clone() }));
        }
    });
    // Ascending order of Reverse is descending order of count.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(ranked)| (ranked.item, ranked.count))
        .collect()
}

fn heap_bottom<B>(bag: &B, n: usize) -> Vec<(B::Item, usize)>
where
    B: Bag + ?Sized,
    B::Item: Clone,
{
    // Max-heap of the n smallest counts seen so far.
    let mut heap: BinaryHeap<Ranked<B::Item>> = BinaryHeap::with_capacity(n + 1);
    bag.for_each_with_occurrences(|item, count| {
        if heap.len() < n {
            heap.push(Ranked { count, item: item.clone() });
        } else if heap.peek().map_or(false, |largest| count < largest.count) {
            heap.pop();
            heap.push(Ranked { count, item: item.clone() });
        }
    });
    heap.into_sorted_vec()
        .into_iter()
        .map(|ranked| (ranked.item, ranked.count))
        .collect()
}

/// Every item whose count equals the extreme count in `order`
pub fn extremes<B>(bag: &B, order: RankOrder) -> Vec<B::Item>
where
    B: Bag + ?Sized,
    B::Item: Clone,
{
    let mut best: Option<usize> = None;
    let mut items = Vec::new();
    bag.for_each_with_occurrences(|item, count| {
        let better = match (best, order) {
            (None, _) => true,
            (Some(b), RankOrder::Descending) => count > b,
            (Some(b), RankOrder::Ascending) => count < b,
        };
        if better {
            best = Some(count);
            items.clear();
            items.push(item.clone());
        } else if best == Some(count) {
            items.push(item.clone());
        }
    });
    items
}
