//! # Bagwise: Occurrence-Counting Bags and Multi-Reader Collections
//!
//! This crate provides multisets ("bags") that track how many times each item
//! occurs, together with a reader/writer-locked wrapper that shares a bag
//! between threads through scoped callback sessions.
//!
//! ## Key Features
//!
//! - **Occurrence accounting**: add, remove, and set occurrences with clamped
//!   removal and up-front argument validation
//! - **Frequency ranking**: top-N and bottom-N queries backed by a bounded heap
//! - **Two variants**: unordered [`HashBag`] and sorted [`TreeBag`] behind the
//!   [`Bag`] and [`MutableBag`] capability traits
//! - **Removal cursor**: [`BagCursor`] visits every occurrence and can remove
//!   the one it last returned
//! - **Multi-reader access**: [`MultiReader`] admits concurrent readers and
//!   exclusive writers without ever leaking a reference past its lock
//! - **Snapshots**: serde support plus bincode snapshots for every collection
//!
//! ## Quick Start
//!
//! ```rust
//! use bagwise::{Bag, HashBag, MultiReader, MutableBag};
//!
//! let mut bag = HashBag::new_with(["red", "green", "red"]);
//! bag.add_occurrences("blue", 5).unwrap();
//! assert_eq!(bag.top_occurrences(1).unwrap(), vec![("blue", 5)]);
//!
//! let shared = MultiReader::new(bag);
//! shared.add("green").unwrap();
//! let greens = shared.with_read_lock_and_delegate(|view| view.occurrences_of(&"green"));
//! assert_eq!(greens, 2);
//! assert!(shared.iter().is_err());
//! ```

#![warn(missing_docs)]

pub mod bag;
pub mod concurrency;
pub mod config;
pub mod error;

pub use bag::{Bag, BagCursor, HashBag, MutableBag, Occurrences, TreeBag};
pub use concurrency::{MultiReader, MultiReaderHashBag, ReadOnlyView};
pub use config::{BagConfig, Config, MultiReaderConfig};
pub use error::{BagwiseError, Result};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently only logs the version)
pub fn init() {
    log::debug!("Initializing bagwise v{}", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        init();
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_version_info() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2);
    }

    #[test]
    fn test_re_exports() {
        let _bag = HashBag::<i32>::new();
        let _tree = TreeBag::<i32>::new();
        let _shared = MultiReaderHashBag::<i32>::new_bag();
        let _config = BagConfig::default();

        let err = BagwiseError::unsupported("iter");
        assert_eq!(err.category(), "unsupported");
        assert!(std::any::type_name::<Result<()>>().contains("BagwiseError"));
    }

    #[test]
    fn test_multiple_init_calls() {
        init();
        init();
    }
}
