//! Destinations for normalized posters.
//!
//! A sink stores a [`NormalizedImage`] and hands back a public URL for it.
//! The default [`DisabledSink`] stores nothing, so by-key resolution never
//! produces a URL unless a real sink is configured.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::NormalizedImage;
use crate::config::{SinkConfig, SinkKind};
use crate::error::{Error, Result};

/// Stores normalized posters.
#[async_trait]
pub trait ImageSink: Send + Sync {
    /// Store `image` for `key`, returning the public URL if one was produced.
    async fn store(&self, key: &str, image: &NormalizedImage) -> Result<Option<String>>;
}

/// Sink that discards every image.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSink;

#[async_trait]
impl ImageSink for DisabledSink {
    async fn store(&self, key: &str, image: &NormalizedImage) -> Result<Option<String>> {
        tracing::info!(
            key = %key,
            size = image.bytes.len(),
            "Poster upload disabled, discarding normalized image"
        );
        Ok(None)
    }
}

/// Sink writing posters into a directory served at a public URL.
///
/// Files are named after the first 16 hex chars of the SHA-256 of their
/// content, so storing the same poster twice is a no-op.
pub struct LocalDirSink {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalDirSink {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageSink for LocalDirSink {
    async fn store(&self, key: &str, image: &NormalizedImage) -> Result<Option<String>> {
        let filename = format!("{}.png", compute_hash(&image.bytes));
        let path = self.dir.join(&filename);

        if !tokio::fs::try_exists(&path).await? {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, &image.bytes).await?;
        }

        let url = format!("{}/{}", self.public_base_url, filename);
        tracing::info!(key = %key, path = %path.display(), url = %url, "Stored normalized poster");
        Ok(Some(url))
    }
}

/// Build the sink described by the `[sink]` config section.
pub fn sink_from_config(config: &SinkConfig) -> Result<Arc<dyn ImageSink>> {
    match config.kind {
        SinkKind::Disabled => Ok(Arc::new(DisabledSink)),
        SinkKind::Local => {
            let dir = config
                .dir
                .clone()
                .ok_or_else(|| Error::config("sink.dir is required for the local sink"))?;
            let base = config.public_base_url.as_deref().ok_or_else(|| {
                Error::config("sink.public_base_url is required for the local sink")
            })?;
            Ok(Arc::new(LocalDirSink::new(dir, base)))
        }
    }
}

/// Compute the content hash for image data.
///
/// Returns the first 16 hex characters of the SHA-256 digest.
fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}
