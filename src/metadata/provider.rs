//! Trait definition for poster metadata providers.

use async_trait::async_trait;

use super::media::{MediaType, PosterSize};

/// Async trait that all poster providers must implement.
///
/// A provider wraps one external metadata API and turns a media identifier
/// into a CDN poster URL. Lookups never fail from the caller's point of
/// view: a missing poster, a disabled provider and a transient API error
/// all come back as `None`.
#[async_trait]
pub trait PosterProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has credentials and will make requests.
    fn is_available(&self) -> bool;

    /// Look up the poster URL for `identifier` at the requested `size`.
    async fn fetch_poster_url(
        &self,
        identifier: &str,
        media_type: &MediaType,
        size: PosterSize,
    ) -> Option<String>;
}
