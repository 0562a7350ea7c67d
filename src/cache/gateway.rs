//! Trust-aware access to a [`CacheStore`].

use std::sync::Arc;

use tracing::{debug, warn};

use super::{CacheStore, NO_EXPIRY};
use crate::validate::is_valid_image_url;

/// Outcome of a validated cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// The key held a value that passed URL validation.
    Valid(String),
    /// The key held a corrupted value, which has been deleted.
    Invalidated,
    /// Nothing was stored under the key.
    Miss,
}

/// Cache access used by the resolvers.
///
/// Provider-sourced URLs are read with [`get_trusted`](Self::get_trusted);
/// everything else goes through [`get_validated`](Self::get_validated), which
/// deletes poisoned entries as a side effect. The two are kept separate on
/// purpose: the provider path has never validated its reads.
#[derive(Clone)]
pub struct CacheGateway {
    store: Arc<dyn CacheStore>,
}

impl CacheGateway {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Read `key` without validating the value.
    pub async fn get_trusted(&self, key: &str) -> Option<String> {
        self.store.get(key).await
    }

    /// Read `key`, deleting the entry if it fails URL validation.
    pub async fn get_validated(&self, key: &str) -> CacheLookup {
        let Some(value) = self.store.get(key).await.filter(|v| !v.is_empty()) else {
            debug!(key = %key, "Poster cache miss");
            return CacheLookup::Miss;
        };

        if is_valid_image_url(Some(&value)) {
            return CacheLookup::Valid(value);
        }

        warn!(key = %key, "Clearing invalid cached poster URL");
        self.store.delete(key).await;
        CacheLookup::Invalidated
    }

    /// Store `value` under `key` with no expiry.
    pub async fn put_permanent(&self, key: &str, value: &str) {
        self.store.set(key, value, NO_EXPIRY).await;
    }
}
