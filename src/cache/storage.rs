//! Synchronous string-keyed persistence surface
//!
//! Mirrors the shape of a browser's `localStorage`: a single flat namespace of
//! string keys and string values where every call may fail.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use thiserror::Error;

/// Default quota for [`MemoryStorage`] (5 MiB, the common browser allowance)
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Error raised by a persistence surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Write would exceed the storage quota
    #[error("Quota exceeded: need {needed} bytes, {available} available")]
    QuotaExceeded {
        /// Bytes the write requires
        needed: usize,
        /// Bytes still free
        available: usize,
    },

    /// Storage is disabled (private mode, policy, sandbox)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous string-keyed persistence
///
/// Implementations use interior mutability so a single store can be shared
/// between the probe surface and the cache shim.
pub trait Storage: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key; deleting an absent key succeeds
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// In-memory, quota-bounded storage
///
/// Usage is counted as the UTF-8 length of every key plus its value.
#[derive(Debug)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
    quota_bytes: usize,
    disabled: bool,
}

impl MemoryStorage {
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            quota_bytes,
            disabled: false,
        }
    }

    /// A store that rejects every operation, like storage in a locked-down
    /// private window
    pub fn disabled() -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            quota_bytes: 0,
            disabled: true,
        }
    }

    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    /// Bytes currently in use
    pub fn used_bytes(&self) -> usize {
        Self::usage(&self.items.lock())
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    fn usage(items: &BTreeMap<String, String>) -> usize {
        items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn check_enabled(&self) -> Result<(), StorageError> {
        if self.disabled {
            Err(StorageError::Unavailable("storage is disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA_BYTES)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_enabled()?;
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        let mut items = self.items.lock();

        // The replaced value's bytes are freed by the write
        let current = Self::usage(&items);
        let replaced = items.get(key).map_or(0, |old| key.len() + old.len());
        let needed = key.len() + value.len();
        let available = self.quota_bytes.saturating_sub(current - replaced);

        if needed > available {
            return Err(StorageError::QuotaExceeded { needed, available });
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        self.items.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.check_enabled()?;
        Ok(self.items.lock().keys().cloned().collect())
    }
}
