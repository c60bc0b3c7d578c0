//! Configuration section types

use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_QUOTA_BYTES, DEFAULT_TTL_MS};

/// Cache shim configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of entries written without an explicit TTL
    pub default_ttl_ms: u64,
    /// Quota of the in-memory store used when the browser has no usable
    /// persistent storage
    pub quota_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace | debug | info | warn | error
    pub level: String,
    /// pretty | compact | json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
