//! Key-value cache for resolved poster URLs.
//!
//! The store itself is an external capability described by [`CacheStore`].
//! Two implementations ship with the crate:
//!
//! - [`MemoryCache`] -- process-local map with optional per-entry expiry.
//! - [`FileCache`] -- a [`MemoryCache`] persisted to a JSON file.
//!
//! Callers never talk to a store directly; [`CacheGateway`] wraps it and
//! keeps trusted and validated reads apart.

mod file;
mod gateway;
mod memory;

pub use file::FileCache;
pub use gateway::{CacheGateway, CacheLookup};
pub use memory::MemoryCache;

use async_trait::async_trait;

/// TTL value meaning "never expires".
pub const NO_EXPIRY: u64 = 0;

/// Minimal contract over a string-keyed, string-valued cache.
///
/// Implementations must be idempotent: deleting an absent key is not an
/// error, and setting the same value twice is harmless. Failures of the
/// backing store are the implementation's to log; they surface to callers
/// as a miss.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the value stored under `key`, if any and not expired.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`. A `ttl_secs` of [`NO_EXPIRY`] keeps it forever.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64);

    /// Remove `key` from the cache.
    async fn delete(&self, key: &str);
}
