//! Mirror and list-cache configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the local mirror and the filtered-list cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for cached list queries in seconds.
    #[serde(default = "default_list_ttl")]
    pub list_ttl_seconds: u64,
    /// Maximum number of cached list queries.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_ttl_seconds: default_list_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_list_ttl() -> u64 {
    30
}

fn default_max_capacity() -> u64 {
    1000
}
