use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::images::NormalizeOptions;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub posters: PosterConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PosterConfig {
    /// Pad non-square posters to a square with transparent borders
    #[serde(default = "default_fit")]
    pub fit: bool,

    /// Largest width or height of a normalized poster (0 = keep size)
    #[serde(
        rename = "maxSize",
        alias = "max_size",
        default = "default_max_size"
    )]
    pub max_size: Option<u32>,

    /// TMDB API key; provider lookups are disabled without one
    #[serde(
        rename = "tmdbAPIKey",
        alias = "tmdb_api_key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tmdb_api_key: Option<String>,
}

fn default_fit() -> bool {
    true
}
fn default_max_size() -> Option<u32> {
    Some(256)
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            fit: default_fit(),
            max_size: default_max_size(),
            tmdb_api_key: None,
        }
    }
}

impl PosterConfig {
    /// The configured API key, treating an empty string as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Normalizer settings derived from the display options.
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            fit_to_square: self.fit,
            max_dimension: self.max_size,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// Base URL of the TMDB API, without the `/3` version segment
    #[serde(default = "default_tmdb_api_base")]
    pub api_base_url: String,

    /// Base URL of the TMDB image CDN; the size token is appended to it
    #[serde(default = "default_tmdb_image_base")]
    pub image_base_url: String,
}

fn default_tmdb_api_base() -> String {
    "https://api.themoviedb.org".to_string()
}
fn default_tmdb_image_base() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_tmdb_api_base(),
            image_base_url: default_tmdb_image_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Upper bound for downloading a source image (default: 30)
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

fn default_download_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: default_download_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheConfig {
    /// JSON file backing the cache; the cache is memory-only when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub kind: SinkKind,

    /// Directory normalized posters are written to (local sink)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Public URL under which `dir` is served (local sink)
    #[serde(default)]
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Normalized posters are discarded
    #[default]
    Disabled,
    /// Normalized posters are written to a local directory
    Local,
}
