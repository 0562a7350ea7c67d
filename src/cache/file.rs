//! JSON-file backed cache store.
//!
//! Entries live in a [`MemoryCache`]; every mutation rewrites the file so the
//! cache survives restarts. Losing the file only costs refetches.
//!
//! Writes are serialized: each one snapshots the entries under the write lock
//! and finishes its rename before the next snapshot is taken, so the file
//! always reflects the latest completed mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::memory::{CacheEntry, MemoryCache};
use super::CacheStore;

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct PersistedCache {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

/// Cache store persisted to a JSON file.
pub struct FileCache {
    inner: MemoryCache,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCache {
    /// Open the cache at `path`, loading any existing entries.
    ///
    /// A missing file starts an empty cache. An unreadable or corrupt file is
    /// logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let inner = match load_from_file(&path) {
            Ok(entries) => MemoryCache::from_entries(entries),
            Err(e) => {
                tracing::warn!("Failed to load poster cache from {:?}: {:#}", path, e);
                MemoryCache::new()
            }
        };

        Self {
            inner,
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    async fn persist(&self) {
        let _guard = self.write_lock.lock().await;
        let state = PersistedCache {
            version: FORMAT_VERSION,
            entries: self.inner.snapshot(),
        };
        let path = self.path.clone();

        match tokio::task::spawn_blocking(move || save_to_file(&path, &state)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Failed to persist poster cache: {:#}", e),
            Err(e) => tracing::error!("Poster cache write task failed: {}", e),
        }
    }
}

fn save_to_file(path: &Path, state: &PersistedCache) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create cache directory: {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("Failed to write cache file: {:?}", tmp))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace cache file: {:?}", path))?;
    Ok(())
}

fn load_from_file(path: &Path) -> Result<HashMap<String, CacheEntry>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cache file: {:?}", path))?;
    let state: PersistedCache = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cache file: {:?}", path))?;

    if state.version != FORMAT_VERSION {
        anyhow::bail!("Unsupported cache file version {}", state.version);
    }

    Ok(state.entries)
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.inner.get_entry(key)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        self.inner.set_entry(key, value, ttl_secs);
        self.persist().await;
    }

    async fn delete(&self, key: &str) {
        self.inner.delete_entry(key);
        self.persist().await;
    }
}
