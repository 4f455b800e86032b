//! Engine configuration
//!
//! # Example
//!
//! ```rust
//! use abnf_engine::{Engine, EngineConfig};
//!
//! let config = EngineConfig::new()
//!     .with_detailed_errors(true)
//!     .with_cache(true)
//!     .with_cache_size_hint(1 << 12);
//!
//! let engine = Engine::with_config(config);
//! assert!(engine.detailed());
//! assert!(engine.cache().is_enabled());
//! ```

use serde::{Deserialize, Serialize};

use crate::pool::{DEFAULT_IDLE_LIMIT, DEFAULT_MAX_CAPACITY};

/// Default number of nodes reserved when the cache is enabled
pub const DEFAULT_CACHE_SIZE_HINT: usize = 1024;

/// Settings applied when an [`Engine`](crate::Engine) is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Keep full error chains instead of the bare not-matched sentinel
    pub detailed_errors: bool,

    /// Intern nodes in the structural cache
    pub cache_enabled: bool,

    /// Nodes to reserve room for when the cache is enabled
    pub cache_size_hint: usize,

    /// Idle scratch buffers kept per pool bucket
    pub pool_idle_limit: usize,

    /// Scratch buffers that grew beyond this capacity are not pooled
    pub pool_max_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detailed_errors: false,
            cache_enabled: false,
            cache_size_hint: DEFAULT_CACHE_SIZE_HINT,
            pool_idle_limit: DEFAULT_IDLE_LIMIT,
            pool_max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the config as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Set detailed error reporting
    pub fn with_detailed_errors(mut self, detailed: bool) -> Self {
        self.detailed_errors = detailed;
        self
    }

    /// Set whether the node cache starts enabled
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set the cache size hint
    pub fn with_cache_size_hint(mut self, size_hint: usize) -> Self {
        self.cache_size_hint = size_hint;
        self
    }

    /// Set the idle buffer limit per pool bucket
    pub fn with_pool_idle_limit(mut self, limit: usize) -> Self {
        self.pool_idle_limit = limit;
        self
    }

    /// Set the largest capacity a pooled buffer may keep
    pub fn with_pool_max_capacity(mut self, capacity: usize) -> Self {
        self.pool_max_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert!(!config.detailed_errors);
        assert!(!config.cache_enabled);
        assert_eq!(config.cache_size_hint, DEFAULT_CACHE_SIZE_HINT);
        assert_eq!(config.pool_idle_limit, DEFAULT_IDLE_LIMIT);
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new()
            .with_detailed_errors(true)
            .with_cache(true)
            .with_cache_size_hint(10)
            .with_pool_idle_limit(2)
            .with_pool_max_capacity(128);

        assert!(config.detailed_errors);
        assert!(config.cache_enabled);
        assert_eq!(config.cache_size_hint, 10);
        assert_eq!(config.pool_idle_limit, 2);
        assert_eq!(config.pool_max_capacity, 128);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = EngineConfig::from_json(r#"{"cache_enabled": true}"#).unwrap();
        assert!(config.cache_enabled);
        assert!(!config.detailed_errors);
        assert_eq!(config.pool_max_capacity, DEFAULT_MAX_CAPACITY);

        assert!(EngineConfig::from_json("{").is_err());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = EngineConfig::new().with_detailed_errors(true);
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
