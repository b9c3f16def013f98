//! Occurrence-expanding iterator shared by the bag variants.

use std::iter::FusedIterator;

/// Iterator yielding each item once per occurrence.
///
/// Created by [`HashBag::iter`](crate::HashBag::iter) and
/// [`TreeBag::iter`](crate::TreeBag::iter).
#[derive(Debug, Clone)]
pub struct Occurrences<'a, T, I> {
    entries: I,
    current: Option<(&'a T, usize)>,
    remaining: usize,
}

impl<'a, T, I> Occurrences<'a, T, I>
where
    I: Iterator<Item = (&'a T, &'a usize)>,
{
    pub(crate) fn new(entries: I, total: usize) -> Self {
        Self { entries, current: None, remaining: total }
    }
}

impl<'a, T, I> Iterator for Occurrences<'a, T, I>
where
    I: Iterator<Item = (&'a T, &'a usize)>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((item, left)) = self.current.as_mut() {
                if *left > 0 {
                    *left -= 1;
                    self.remaining -= 1;
                    return Some(*item);
                }
            }
            let (item, &count) = self.entries.next()?;
            self.current = Some((item, count));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, I> ExactSizeIterator for Occurrences<'a, T, I> where I: Iterator<Item = (&'a T, &'a usize)> {}

impl<'a, T, I> FusedIterator for Occurrences<'a, T, I> where I: FusedIterator<Item = (&'a T, &'a usize)> {}
