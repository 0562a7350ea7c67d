//! In-memory cache store.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::{CacheStore, NO_EXPIRY};

/// A single cached value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct CacheEntry {
    pub value: String,
    /// Expiry as seconds since the Unix epoch, `None` for permanent entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    fn new(value: &str, ttl_secs: u64) -> Self {
        let expires_at = (ttl_secs != NO_EXPIRY).then(|| unix_now().saturating_add(ttl_secs));
        Self {
            value: value.to_string(),
            expires_at,
        }
    }

    fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Thread-safe in-memory cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of cached entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries.
    pub fn cleanup_expired(&self) {
        let now = unix_now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }

    pub(crate) fn get_entry(&self, key: &str) -> Option<String> {
        let now = unix_now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }
        // Re-checked under the write lock: a concurrent `set` may have refreshed it.
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    pub(crate) fn set_entry(&self, key: &str, value: &str, ttl_secs: u64) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl_secs));
    }

    pub(crate) fn delete_entry(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Copy of all live entries, used for persistence.
    pub(crate) fn snapshot(&self) -> HashMap<String, CacheEntry> {
        let now = unix_now();
        self.entries
            .iter()
            .filter(|e| !e.value().is_expired(now))
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub(crate) fn from_entries(entries: HashMap<String, CacheEntry>) -> Self {
        let now = unix_now();
        Self {
            entries: entries
                .into_iter()
                .filter(|(_, entry)| !entry.is_expired(now))
                .collect(),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.get_entry(key)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        self.set_entry(key, value, ttl_secs);
    }

    async fn delete(&self, key: &str) {
        self.delete_entry(key);
    }
}
