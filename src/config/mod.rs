//! Configuration APIs for bagwise
//!
//! Configuration types share the [`Config`] trait, which provides validation,
//! initialization from environment variables, presets, and JSON persistence.
//!
//! - [`BagConfig`]: backing-map capacity and ranking strategy for bags
//! - [`MultiReaderConfig`]: delegate configuration and lock-session tracing
//!
//! ```rust
//! use bagwise::config::{BagConfig, Config};
//!
//! let config = BagConfig::performance_preset();
//! assert!(config.validate().is_ok());
//! ```
//!
//! Environment variables use the `BAGWISE_` prefix by default, e.g.
//! `BAGWISE_BAG_INITIAL_CAPACITY=4096`.

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod bag;
pub mod multi_reader;


pub use bag::BagConfig;
pub use multi_reader::MultiReaderConfig;

/// Default prefix for environment variables
pub const ENV_PREFIX: &str = "BAGWISE_";

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables with the
    /// [`ENV_PREFIX`] prefix.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    ///
    /// Unset or unparsable variables fall back to the default value.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset optimized for throughput on large bags.
    fn performance_preset() -> Self;

    /// Preset optimized for a small memory footprint.
    fn memory_preset() -> Self;

    /// Preset optimized for predictable latency.
    fn realtime_preset() -> Self;

    /// Balanced preset, identical to the default.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Parse an environment variable, falling back to `default`.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    match env::var(var_name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparsable value {:?} for {}", raw, var_name);
            default
        }),
        Err(_) => default,
    }
}

/// Parse a boolean environment variable.
///
/// Accepts "true", "1", "yes", "on" (case-insensitive) as true,
/// everything else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}
