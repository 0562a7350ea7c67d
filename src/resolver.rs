//! End-to-end poster resolution.
//!
//! [`PosterResolver`] ties the cache, the metadata provider, the image
//! downloader, the normalizer and the sink together. It holds no mutable
//! state of its own, so one instance can serve any number of concurrent
//! resolutions; concurrent misses on the same key simply do the work twice.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheGateway, CacheLookup, CacheStore};
use crate::config::Config;
use crate::error::Result;
use crate::images::{sink_from_config, ImageFetcher, ImageSink, Normalizer};
use crate::metadata::{MediaReference, PosterProvider, PosterSize, TmdbProvider};

/// Resolves poster URLs from the cache, a metadata provider or a source image.
pub struct PosterResolver {
    cache: CacheGateway,
    provider: Arc<dyn PosterProvider>,
    fetcher: ImageFetcher,
    normalizer: Normalizer,
    sink: Arc<dyn ImageSink>,
}

impl PosterResolver {
    pub fn new(
        cache: CacheGateway,
        provider: Arc<dyn PosterProvider>,
        fetcher: ImageFetcher,
        normalizer: Normalizer,
        sink: Arc<dyn ImageSink>,
    ) -> Self {
        Self {
            cache,
            provider,
            fetcher,
            normalizer,
            sink,
        }
    }

    /// Build a resolver with the TMDB provider and the configured sink.
    pub fn from_config(config: &Config, store: Arc<dyn CacheStore>) -> Result<Self> {
        let cache = CacheGateway::new(store);
        let provider = TmdbProvider::new(config, cache.clone())?;
        let fetcher = ImageFetcher::new(config.http.download_timeout())?;
        let normalizer = Normalizer::new(config.display.posters.normalize_options());
        let sink = sink_from_config(&config.sink)?;

        Ok(Self::new(
            cache,
            Arc::new(provider),
            fetcher,
            normalizer,
            sink,
        ))
    }

    /// Replace the sink normalized posters are handed to.
    pub fn with_sink(mut self, sink: Arc<dyn ImageSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Resolve the poster stored under `key`, falling back to `source_url`.
    ///
    /// A cached value is only returned after it passes URL validation; a
    /// corrupted one is deleted and treated as a miss. On a miss the source
    /// image is downloaded, normalized and passed to the sink, and whatever
    /// URL the sink returns is cached. With the default sink this yields
    /// `Ok(None)` even when every step succeeds.
    ///
    /// Download and sink failures are logged and reported as `Ok(None)`.
    /// Bytes that do not decode as an image are an error.
    pub async fn resolve_by_key(&self, key: &str, source_url: &str) -> Result<Option<String>> {
        debug!(key = %key, source = %source_url, "Resolving poster by key");

        match self.cache.get_validated(key).await {
            CacheLookup::Valid(url) => {
                info!(key = %key, url = %url, "Found valid cached poster URL");
                return Ok(Some(url));
            }
            CacheLookup::Invalidated | CacheLookup::Miss => {}
        }

        let data = match self.fetcher.fetch(source_url).await {
            Ok(data) => data,
            Err(e) => {
                warn!(key = %key, source = %source_url, error = %e, "Failed to download poster");
                return Ok(None);
            }
        };

        let normalizer = self.normalizer;
        let image = tokio::task::spawn_blocking(move || normalizer.normalize(&data)).await??;
        info!(
            key = %key,
            width = image.width,
            height = image.height,
            size = image.bytes.len(),
            "Processed poster"
        );

        let url = match self.sink.store(key, &image).await {
            Ok(Some(url)) => url,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to store normalized poster");
                return Ok(None);
            }
        };

        self.cache.put_permanent(key, &url).await;
        Ok(Some(url))
    }

    /// Resolve a poster for `media` through the metadata provider.
    ///
    /// The provider owns caching for this path and its cached values are
    /// trusted as-is.
    pub async fn resolve_for_media(
        &self,
        media: &MediaReference,
        size: PosterSize,
    ) -> Option<String> {
        self.provider
            .fetch_poster_url(&media.identifier, &media.media_type, size)
            .await
    }
}
