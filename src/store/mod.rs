// Durable cache store capability.
// Async keyed get/set of timestamped entries, with memory and file backends.

pub mod entry;
pub mod file;
pub mod memory;

pub use entry::CacheEntry;
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;

/// Key-addressed store for cache entries.
///
/// Treated as multi-reader/multi-writer with last-write-wins semantics; the
/// coordinator never locks or transacts against it. Only get and set are
/// required; eviction and enumeration are out of scope.
#[async_trait]
pub trait CacheStore<T>: Send + Sync {
    /// Read the entry for `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry<T>>>;

    /// Write the entry for `key`, replacing any previous one.
    async fn set(&self, key: &str, entry: CacheEntry<T>) -> Result<()>;
}
