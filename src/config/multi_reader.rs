//! Multi-reader wrapper configuration.

use super::{parse_env_bool, BagConfig, Config};
use crate::error::{BagwiseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for [`MultiReader`](crate::MultiReader)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultiReaderConfig {
    /// Configuration of the wrapped bag
    pub bag: BagConfig,
    /// Emit a `trace` record when a lock session starts and ends
    pub trace_sessions: bool,
}

impl Config for MultiReaderConfig {
    fn validate(&self) -> Result<()> {
        self.bag.validate()
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let config = Self {
            bag: BagConfig::from_env_with_prefix(prefix)?,
            trace_sessions: parse_env_bool(&format!("{}MULTI_READER_TRACE_SESSIONS", prefix), false),
        };
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self { bag: BagConfig::performance_preset(), trace_sessions: false }
    }

    fn memory_preset() -> Self {
        Self { bag: BagConfig::memory_preset(), trace_sessions: false }
    }

    fn realtime_preset() -> Self {
        Self { bag: BagConfig::realtime_preset(), trace_sessions: false }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            BagwiseError::configuration(format!("Failed to serialize multi-reader config: {}", e))
        })?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            BagwiseError::configuration(format!("Failed to parse multi-reader config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
