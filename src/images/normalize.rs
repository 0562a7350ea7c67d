//! Poster normalization: decode, square-pad, downscale, re-encode.
//!
//! Output is always PNG so transparent padding survives. Encoder settings
//! are fixed, so the same input and options always produce the same bytes.

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};

/// Display options applied by the [`Normalizer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Pad non-square images to a square with transparent borders.
    pub fit_to_square: bool,
    /// Largest allowed width or height; `None` or `0` keeps the size.
    pub max_dimension: Option<u32>,
}

/// A normalized poster, PNG encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Applies a fixed set of [`NormalizeOptions`] to raw image bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize `data`, returning the PNG-encoded result.
    ///
    /// Fails with [`Error::Decode`] when `data` is not a decodable image.
    pub fn normalize(&self, data: &[u8]) -> Result<NormalizedImage> {
        let img = self.normalize_bitmap(data)?;
        let (width, height) = img.dimensions();
        let bytes = encode_png(&img)?;
        debug!(width, height, size = bytes.len(), "Normalized poster");

        Ok(NormalizedImage {
            bytes,
            width,
            height,
        })
    }

    /// Run every step except the final encode.
    pub fn normalize_bitmap(&self, data: &[u8]) -> Result<RgbaImage> {
        let decoded = image::load_from_memory(data)
            .map_err(Error::Decode)?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        debug!(width, height, "Decoded source poster");

        // Fresh canvas so nothing downstream sees a lazily decoded buffer.
        let mut img = RgbaImage::from_fn(width, height, |x, y| *decoded.get_pixel(x, y));

        if self.options.fit_to_square && width != height {
            img = pad_to_square(&img);
        }

        if let Some(max) = self.options.max_dimension.filter(|m| *m > 0) {
            let (w, h) = img.dimensions();
            let (new_w, new_h) = fit_within(w, h, max);
            if (new_w, new_h) != (w, h) {
                debug!(max, new_w, new_h, "Downscaling poster");
                img = imageops::resize(&img, new_w, new_h, FilterType::Lanczos3);
            }
        }

        Ok(img)
    }
}

/// Center `img` on a transparent square canvas with side `max(w, h)`.
fn pad_to_square(img: &RgbaImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    let side = w.max(h);
    let mut canvas = RgbaImage::new(side, side);
    let x = center_offset(side - w);
    let y = center_offset(side - h);
    imageops::replace(&mut canvas, img, x, y);
    canvas
}

/// Offset that centers content in `slack` spare pixels.
///
/// Half of `slack`, rounded half to even: 1 -> 0, 3 -> 2, 5 -> 2, 7 -> 4.
fn center_offset(slack: u32) -> i64 {
    let half = slack / 2;
    let offset = if slack % 4 == 3 { half + 1 } else { half };
    i64::from(offset)
}

/// Dimensions of `(w, h)` scaled down to fit in `max x max`.
///
/// Aspect ratio is preserved (rounded to the nearest pixel) and images that
/// already fit are returned unchanged.
fn fit_within(w: u32, h: u32, max: u32) -> (u32, u32) {
    if w <= max && h <= max {
        return (w, h);
    }

    let scale = |short: u32, long: u32| -> u32 {
        let scaled = (u64::from(short) * u64::from(max) + u64::from(long) / 2) / u64::from(long);
        (scaled as u32).max(1)
    };

    if w >= h {
        (max, scale(h, w))
    } else {
        (scale(w, h), max)
    }
}

fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(Error::Encode)?;
    Ok(buf)
}
