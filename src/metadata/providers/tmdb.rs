//! TMDB (The Movie Database) poster provider.
//!
//! Implements [`PosterProvider`] by querying the TMDB v3 detail endpoints.
//!
//! - Results are cached permanently under `tmdb_{type}_{id}_{size}`.
//! - Every request is bounded by a 5-second timeout.
//! - HTTP and parse failures are logged and reported as "no poster".

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cache::CacheGateway;
use crate::config::Config;
use crate::metadata::media::{MediaType, PosterSize};
use crate::metadata::provider::PosterProvider;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const PROVIDER_NAME: &str = "tmdb";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

/// The only field of the movie / TV detail response we care about.
#[derive(Debug, Deserialize)]
struct TmdbDetail {
    poster_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB poster provider.
///
/// Without an API key the provider is disabled: every lookup returns `None`
/// without touching the cache or the network.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use posterforge::cache::{CacheGateway, MemoryCache};
/// use posterforge::config::Config;
/// use posterforge::metadata::providers::TmdbProvider;
///
/// let cache = CacheGateway::new(Arc::new(MemoryCache::new()));
/// let provider = TmdbProvider::new(&Config::default(), cache).unwrap();
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base_url: String,
    image_base_url: String,
    cache: CacheGateway,
}

impl TmdbProvider {
    /// Create a provider from the `display.posters` and `tmdb` config sections.
    pub fn new(config: &Config, cache: CacheGateway) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key: config.display.posters.api_key().map(str::to_string),
            api_base_url: config.tmdb.api_base_url.trim_end_matches('/').to_string(),
            image_base_url: config.tmdb.image_base_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Cache key for a poster lookup.
    pub fn cache_key(identifier: &str, media_type: &MediaType, size: PosterSize) -> String {
        format!("{PROVIDER_NAME}_{media_type}_{identifier}_{size}")
    }

    /// Detail endpoint path segment for a media type, if it has one.
    ///
    /// Episodes resolve through their show, so the identifier passed with
    /// them must be the show ID.
    fn endpoint(media_type: &MediaType) -> Option<&'static str> {
        match media_type {
            MediaType::Movie => Some("movie"),
            MediaType::Episode | MediaType::LiveEpisode => Some("tv"),
            MediaType::Other(_) => None,
        }
    }

    /// Build the full poster URL for a `poster_path` fragment.
    fn poster_url(&self, size: PosterSize, poster_path: &str) -> String {
        if poster_path.starts_with('/') {
            format!("{}/{size}{poster_path}", self.image_base_url)
        } else {
            format!("{}/{size}/{poster_path}", self.image_base_url)
        }
    }

    /// Query the detail endpoint and return the raw `poster_path`.
    async fn fetch_poster_path(
        &self,
        api_key: &str,
        endpoint: &str,
        identifier: &str,
    ) -> Option<String> {
        let url = format!(
            "{}/3/{endpoint}/{}",
            self.api_base_url,
            encode_path_segment(identifier)
        );
        debug!(url = %url, "TMDB get detail");

        let resp = match self
            .client
            .get(&url)
            .query(&[("api_key", api_key)])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                info!(url = %url, error = %e, "TMDB request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            debug!(url = %url, status = %resp.status(), "TMDB returned no detail");
            return None;
        }

        match resp.json::<TmdbDetail>().await {
            Ok(detail) => detail.poster_path.filter(|p| !p.is_empty()),
            Err(e) => {
                info!(url = %url, error = %e, "Failed to parse TMDB detail response");
                None
            }
        }
    }
}

/// Minimal percent-encoding for a URL path segment.
fn encode_path_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

#[async_trait]
impl PosterProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_poster_url(
        &self,
        identifier: &str,
        media_type: &MediaType,
        size: PosterSize,
    ) -> Option<String> {
        let api_key = self.api_key.as_deref()?;
        if identifier.is_empty() {
            return None;
        }

        let key = Self::cache_key(identifier, media_type, size);
        if let Some(cached) = self.cache.get_trusted(&key).await {
            debug!(key = %key, "TMDB poster cache hit");
            return Some(cached);
        }

        let Some(endpoint) = Self::endpoint(media_type) else {
            debug!(media_type = %media_type, "No TMDB endpoint for media type");
            return None;
        };

        let Some(poster_path) = self.fetch_poster_path(api_key, endpoint, identifier).await
        else {
            debug!(id = %identifier, media_type = %media_type, "No TMDB poster found");
            return None;
        };

        let url = self.poster_url(size, &poster_path);
        self.cache.put_permanent(&key, &url).await;
        info!(key = %key, url = %url, "Resolved TMDB poster");
        Some(url)
    }
}
