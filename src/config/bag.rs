//! Bag configuration.

use super::{parse_env_var, Config};
use crate::error::{BagwiseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound accepted for [`BagConfig::full_sort_threshold`]
pub const MAX_FULL_SORT_THRESHOLD: usize = 1_000_000;

/// Default distinct-item count at or below which ranking sorts everything
pub const DEFAULT_FULL_SORT_THRESHOLD: usize = 64;

/// Configuration for [`HashBag`](crate::HashBag) and [`TreeBag`](crate::TreeBag)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagConfig {
    /// Initial capacity of the backing map, in distinct items
    pub initial_capacity: usize,
    /// Rankings over at most this many distinct items use a full sort;
    /// larger bags use a bounded heap
    pub full_sort_threshold: usize,
}

impl Default for BagConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            full_sort_threshold: DEFAULT_FULL_SORT_THRESHOLD,
        }
    }
}

impl Config for BagConfig {
    fn validate(&self) -> Result<()> {
        if self.full_sort_threshold > MAX_FULL_SORT_THRESHOLD {
            return Err(BagwiseError::configuration(format!(
                "full_sort_threshold must be at most {}, got {}",
                MAX_FULL_SORT_THRESHOLD, self.full_sort_threshold
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.initial_capacity =
            parse_env_var(&format!("{}BAG_INITIAL_CAPACITY", prefix), config.initial_capacity);
        config.full_sort_threshold = parse_env_var(
            &format!("{}BAG_FULL_SORT_THRESHOLD", prefix),
            config.full_sort_threshold,
        );
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self { initial_capacity: 1024, full_sort_threshold: 256 }
    }

    fn memory_preset() -> Self {
        Self { initial_capacity: 0, full_sort_threshold: 16 }
    }

    fn realtime_preset() -> Self {
        Self { initial_capacity: 256, full_sort_threshold: 0 }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| BagwiseError::configuration(format!("Failed to serialize bag config: {}", e)))?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| BagwiseError::configuration(format!("Failed to parse bag config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
