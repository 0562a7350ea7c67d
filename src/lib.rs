//! Posterforge - poster URL resolution with a self-healing cache
//!
//! Given a media identifier or a cache key plus a source image, posterforge
//! finds a usable poster URL. Cached values are validated before use, the
//! TMDB API is consulted on a miss, and source images can be normalized
//! (square-padded, downscaled, re-encoded to PNG) before being handed to a
//! pluggable sink.

pub mod cache;
pub mod config;
pub mod error;
pub mod images;
pub mod metadata;
pub mod resolver;
pub mod validate;

pub use error::{Error, Result};
pub use resolver::PosterResolver;
pub use validate::{classify_image_url, is_valid_image_url, UrlRejection};
