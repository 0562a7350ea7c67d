//! Shared helpers for integration tests.
//!
//! Provides a [`RecordingCache`] that counts store operations, a
//! [`RecordingSink`] that keeps every normalized poster, image fixtures and
//! a config builder pointing the TMDB client at a wiremock server.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use posterforge::cache::{CacheStore, MemoryCache};
use posterforge::config::Config;
use posterforge::images::{ImageSink, NormalizedImage};
use posterforge::PosterResolver;
use wiremock::MockServer;

/// Cache store that records every call made against it.
#[derive(Default)]
pub struct RecordingCache {
    inner: MemoryCache,
    pub gets: AtomicUsize,
    pub deletes: Mutex<Vec<String>>,
    pub sets: Mutex<Vec<(String, String, u64)>>,
}

impl RecordingCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a value without recording it as a `set`.
    pub async fn seed(&self, key: &str, value: &str) {
        self.inner.set(key, value, 0).await;
    }

    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).await
    }

    pub fn delete_count(&self, key: &str) -> usize {
        self.deletes
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.as_str() == key)
            .count()
    }

    pub fn recorded_sets(&self) -> Vec<(String, String, u64)> {
        self.sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheStore for RecordingCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        self.sets
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string(), ttl_secs));
        self.inner.set(key, value, ttl_secs).await;
    }

    async fn delete(&self, key: &str) {
        self.deletes.lock().unwrap().push(key.to_string());
        self.inner.delete(key).await;
    }
}

/// Sink that keeps normalized posters and answers with a fixed URL.
pub struct RecordingSink {
    pub url: Option<String>,
    pub fail: bool,
    pub stored: Mutex<Vec<(String, NormalizedImage)>>,
}

impl RecordingSink {
    pub fn returning(url: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            url: url.map(str::to_string),
            fail: false,
            stored: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            url: None,
            fail: true,
            stored: Mutex::new(Vec::new()),
        })
    }

    pub fn stored(&self) -> Vec<(String, NormalizedImage)> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageSink for RecordingSink {
    async fn store(
        &self,
        key: &str,
        image: &NormalizedImage,
    ) -> posterforge::Result<Option<String>> {
        self.stored
            .lock()
            .unwrap()
            .push((key.to_string(), image.clone()));
        if self.fail {
            return Err(posterforge::Error::sink("upload rejected"));
        }
        Ok(self.url.clone())
    }
}

/// Config with the TMDB API pointed at `server`.
pub fn config_for(server: &MockServer, api_key: Option<&str>) -> Config {
    let mut config = Config::default();
    config.tmdb.api_base_url = server.uri();
    config.display.posters.tmdb_api_key = api_key.map(str::to_string);
    config
}

/// Resolver over `cache` using the given config.
pub fn resolver(config: &Config, cache: Arc<RecordingCache>) -> PosterResolver {
    PosterResolver::from_config(config, cache).expect("failed to build resolver")
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 120, 200]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
