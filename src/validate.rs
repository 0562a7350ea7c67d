//! Classification of cached poster URLs.
//!
//! Cache entries are occasionally poisoned by an HTML error page that was
//! stored as if it were a URL. Everything read back from the cache on the
//! by-key path goes through [`is_valid_image_url`] before it is handed out.

use tracing::warn;

/// Longest string still accepted as a CDN URL.
pub const MAX_URL_LEN: usize = 500;

const HTML_MARKERS: [&str; 3] = ["<!doctype", "<html", "<!html"];
const ALLOWED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Number of characters of a rejected value echoed into the logs.
const LOG_PREVIEW_CHARS: usize = 100;

/// Reason a candidate was not accepted as an image URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlRejection {
    /// The candidate was absent or empty.
    #[error("empty value")]
    Empty,

    /// The candidate looks like an HTML document.
    #[error("value is an HTML document")]
    HtmlDocument,

    /// The candidate does not use http or https.
    #[error("not an http(s) URL")]
    UnsupportedScheme,

    /// The candidate is longer than any genuine CDN URL.
    #[error("suspiciously long value ({len} chars)")]
    TooLong { len: usize },
}

/// Classify `candidate`, returning the first rule it breaks.
pub fn classify_image_url(candidate: Option<&str>) -> Result<(), UrlRejection> {
    let url = match candidate {
        Some(url) if !url.is_empty() => url,
        _ => return Err(UrlRejection::Empty),
    };

    let folded = url.trim_start().to_lowercase();
    if HTML_MARKERS.iter().any(|marker| folded.starts_with(marker)) {
        return Err(UrlRejection::HtmlDocument);
    }

    if !ALLOWED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(UrlRejection::UnsupportedScheme);
    }

    let len = url.chars().count();
    if len > MAX_URL_LEN {
        return Err(UrlRejection::TooLong { len });
    }

    Ok(())
}

/// Returns `true` when `candidate` looks like a genuine image-source URL.
///
/// Never fails; rejected values are logged with their reason.
pub fn is_valid_image_url(candidate: Option<&str>) -> bool {
    match classify_image_url(candidate) {
        Ok(()) => true,
        Err(UrlRejection::Empty) => false,
        Err(reason) => {
            let preview: String = candidate
                .unwrap_or_default()
                .chars()
                .take(LOG_PREVIEW_CHARS)
                .collect();
            warn!(%reason, value = %preview, "Rejected cached image URL");
            false
        }
    }
}
