//! Engine configuration structures.
//!
//! These structures define the configurable aspects of a TesseraDB
//! storage engine instance.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_POOL_CHUNK_SIZE, DEFAULT_TUPLES_PER_TILEGROUP, MIN_POOL_CHUNK_SIZE};

/// Storage engine configuration.
///
/// # Example
///
/// ```rust
/// use tessera_common::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.tuples_per_tilegroup, 1000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of tuple slots allocated per tile group.
    /// Default: 1000
    pub tuples_per_tilegroup: u32,

    /// Chunk size of the per-tile variable-length pools, in bytes.
    /// Default: 65536 (64 KB)
    pub pool_chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tuples_per_tilegroup: DEFAULT_TUPLES_PER_TILEGROUP,
            pool_chunk_size: DEFAULT_POOL_CHUNK_SIZE,
        }
    }
}

impl EngineConfig {
    /// Creates a minimal configuration for testing.
    ///
    /// Small tile groups so tests exercise the multi-group scan path
    /// without inserting thousands of tuples.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            tuples_per_tilegroup: 4,
            pool_chunk_size: MIN_POOL_CHUNK_SIZE,
        }
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tuples_per_tilegroup == 0 {
            return Err("tuples_per_tilegroup must be greater than 0".to_string());
        }

        if self.pool_chunk_size < MIN_POOL_CHUNK_SIZE {
            return Err(format!(
                "pool_chunk_size must be at least {} bytes",
                MIN_POOL_CHUNK_SIZE
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tuples_per_tilegroup, DEFAULT_TUPLES_PER_TILEGROUP);
    }

    #[test]
    fn test_testing_config() {
        let config = EngineConfig::for_testing();
        assert!(config.validate().is_ok());
        assert!(config.tuples_per_tilegroup < DEFAULT_TUPLES_PER_TILEGROUP);
    }

    #[test]
    fn test_validation() {
        let config = EngineConfig {
            tuples_per_tilegroup: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            pool_chunk_size: 16,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
