//! Poster image handling.
//!
//! - [`fetch`] downloads source images with a bounded timeout.
//! - [`normalize`] decodes, square-pads, downscales and re-encodes them.
//! - [`sink`] decides what happens to the normalized result.

pub mod fetch;
pub mod normalize;
pub mod sink;

pub use fetch::ImageFetcher;
pub use normalize::{NormalizeOptions, NormalizedImage, Normalizer};
pub use sink::{sink_from_config, DisabledSink, ImageSink, LocalDirSink};
