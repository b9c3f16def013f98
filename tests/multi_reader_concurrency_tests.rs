//! Concurrency tests for the multi-reader wrapper
//!
//! Checks that concurrent write sessions never lose updates, that write
//! sessions are atomic with respect to readers, and that many readers can
//! hold the shared lock at once.

use bagwise::{Bag, BagwiseError, HashBag, MultiReader, MultiReaderHashBag, MutableBag, TreeBag};
use crossbeam_utils::thread as crossbeam_thread;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

// =============================================================================
// WRITE SESSION TESTS
// =============================================================================

#[test]
fn test_no_lost_updates() {
    let num_threads = 8;
    let bag = Arc::new(MultiReaderHashBag::<u32>::new_bag());
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let bag = Arc::clone(&bag);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..3 {
                    bag.add(1).unwrap();
                }
                bag.with_write_lock_and_delegate(|delegate| -> bagwise::Result<()> {
                    delegate.remove(&1)?;
                    delegate.add(1)?;
                    delegate.add(1)?;
                    Ok(())
                })
                .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(bag.occurrences_of(&1), 4 * num_threads);
    assert_eq!(bag.size(), 4 * num_threads);
}

#[test]
fn test_scoped_threads_add_distinct_items() {
    let bag = MultiReaderHashBag::<usize>::new_bag();

    crossbeam_thread::scope(|s| {
        for worker in 0..6 {
            let bag = &bag;
            s.spawn(move |_| {
                for i in 0..50 {
                    bag.add_occurrences(worker * 1000 + i, (i % 3 + 1) as isize).unwrap();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(bag.size_distinct(), 300);
    let expected_per_worker: usize = (0..50).map(|i| i % 3 + 1).sum();
    assert_eq!(bag.size(), 6 * expected_per_worker);
}

#[test]
fn test_rayon_parallel_adds() {
    let bag = MultiReaderHashBag::<u8>::new_bag();
    (0..10_000u32).into_par_iter().for_each(|i| {
        bag.add((i % 10) as u8).unwrap();
    });

    assert_eq!(bag.size(), 10_000);
    for item in 0..10u8 {
        assert_eq!(bag.occurrences_of(&item), 1_000);
    }
}

#[test]
fn test_write_sessions_are_atomic_to_readers() {
    // Writers move one occurrence between two items per session, so every
    // reader must observe a constant total.
    let bag = Arc::new(MultiReader::new(HashBag::new_with(vec!["left"; 100])));
    let barrier = Arc::new(Barrier::new(4));
    let violations = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for writer in 0..2 {
        let bag = Arc::clone(&bag);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let (from, to) = if writer == 0 { ("left", "right") } else { ("right", "left") };
            for _ in 0..500 {
                bag.with_write_lock_and_delegate(|delegate| {
                    if delegate.remove(&from).unwrap() {
                        delegate.add(to).unwrap();
                    }
                });
            }
        }));
    }
    for _ in 0..2 {
        let bag = Arc::clone(&bag);
        let barrier = Arc::clone(&barrier);
        let violations = Arc::clone(&violations);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..500 {
                let total = bag.with_read_lock_and_delegate(|view| {
                    view.occurrences_of(&"left") + view.occurrences_of(&"right")
                });
                if total != 100 {
                    violations.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(violations.load(Ordering::Relaxed), 0);
    assert_eq!(bag.size(), 100);
}

// =============================================================================
// READ SESSION TESTS
// =============================================================================

#[test]
fn test_readers_share_the_lock() {
    let num_readers = 4;
    let bag = Arc::new(MultiReaderHashBag::new_bag_with(["r", "r", "s"]));
    let inside = Arc::new(Barrier::new(num_readers));

    // Every reader waits on the barrier while holding the read lock; this
    // only completes when all of them are inside a read session together.
    let handles: Vec<_> = (0..num_readers)
        .map(|_| {
            let bag = Arc::clone(&bag);
            let inside = Arc::clone(&inside);
            thread::spawn(move || {
                bag.with_read_lock_and_delegate(|view| {
                    inside.wait();
                    view.occurrences_of(&"r")
                })
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}

#[test]
fn test_read_session_sees_completed_writes() {
    let bag = Arc::new(MultiReaderHashBag::<i64>::new_bag());
    let writer = {
        let bag = Arc::clone(&bag);
        thread::spawn(move || {
            bag.with_write_lock_and_delegate(|delegate| {
                thread::sleep(Duration::from_millis(20));
                delegate.add_occurrences(7, 3).unwrap();
            });
        })
    };
    writer.join().unwrap();

    let seen = bag.with_read_lock_and_delegate(|view| view.occurrences_of(&7));
    assert_eq!(seen, 3);
}

#[test]
fn test_read_session_cannot_mutate_under_contention() {
    let bag = Arc::new(MultiReaderHashBag::new_bag_with(0..20));
    let rejected = AtomicUsize::new(0);

    crossbeam_thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|_| {
                for i in 0..25 {
                    let outcome = bag.with_read_lock_and_delegate(|mut view| view.add(i));
                    if matches!(outcome, Err(BagwiseError::UnsupportedOperation { .. })) {
                        rejected.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    })
    .unwrap();

    assert_eq!(rejected.load(Ordering::Relaxed), 100);
    assert_eq!(bag.size(), 20);
}

#[test]
fn test_tree_bag_delegate_under_parallel_readers() {
    let bag = MultiReader::new(TreeBag::new_with((0..100).map(|i| i % 10)));
    let totals: Vec<usize> = (0..16)
        .into_par_iter()
        .map(|_| bag.with_read_lock_and_delegate(|view| view.iter().count()))
        .collect();
    assert!(totals.iter().all(|&total| total == 100));

    let first = bag.with_read_lock_and_delegate(|view| view.delegate().first().map(|(item, count)| (*item, count)));
    assert_eq!(first, Some((0, 10)));
}
