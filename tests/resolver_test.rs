//! Integration tests for by-key poster resolution.

mod common;

use common::{config_for, jpeg_bytes, png_bytes, resolver, RecordingCache, RecordingSink};
use posterforge::cache::CacheStore;
use posterforge::images::LocalDirSink;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "plex_thumb_/library/metadata/1/thumb";

async fn serve_image(server: &MockServer, route: &str, body: Vec<u8>, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(body),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Cache hits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_cached_url_is_returned_without_download() {
    let server = MockServer::start().await;
    serve_image(&server, "/poster.jpg", jpeg_bytes(10, 10), 0).await;

    let cache = RecordingCache::new();
    cache.seed(KEY, "https://cdn.example.com/posters/abc.png").await;
    let resolver = resolver(&config_for(&server, None), cache.clone());

    let url = resolver
        .resolve_by_key(KEY, &format!("{}/poster.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(url.as_deref(), Some("https://cdn.example.com/posters/abc.png"));
    assert_eq!(cache.delete_count(KEY), 0);
    assert!(cache.recorded_sets().is_empty());
}

// ---------------------------------------------------------------------------
// Poisoned cache entries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poisoned_entry_is_deleted_once_then_downloaded() {
    let server = MockServer::start().await;
    serve_image(&server, "/poster.jpg", jpeg_bytes(40, 60), 1).await;

    let cache = RecordingCache::new();
    cache
        .seed(KEY, "<!DOCTYPE html><html><body>Bad Gateway</body></html>")
        .await;
    let resolver = resolver(&config_for(&server, None), cache.clone());

    let url = resolver
        .resolve_by_key(KEY, &format!("{}/poster.jpg", server.uri()))
        .await
        .unwrap();

    // Upload is disabled by default, so a full pipeline run still yields nothing.
    assert!(url.is_none());
    assert_eq!(cache.delete_count(KEY), 1);
    assert!(cache.peek(KEY).await.is_none());
}

#[tokio::test]
async fn oversized_entry_is_treated_as_poisoned() {
    let server = MockServer::start().await;
    serve_image(&server, "/poster.jpg", jpeg_bytes(8, 8), 1).await;

    let cache = RecordingCache::new();
    let long = format!("https://example.com/{}", "x".repeat(600));
    cache.seed(KEY, &long).await;
    let resolver = resolver(&config_for(&server, None), cache.clone())
        .with_sink(RecordingSink::returning(Some("https://cdn.example.com/new.png")));

    let url = resolver
        .resolve_by_key(KEY, &format!("{}/poster.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(url.as_deref(), Some("https://cdn.example.com/new.png"));
    assert_eq!(cache.delete_count(KEY), 1);
    assert_eq!(
        cache.peek(KEY).await.as_deref(),
        Some("https://cdn.example.com/new.png")
    );
}

// ---------------------------------------------------------------------------
// Download and normalization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn miss_normalizes_with_display_config() {
    let server = MockServer::start().await;
    serve_image(&server, "/poster.jpg", jpeg_bytes(300, 450), 1).await;

    let mut config = config_for(&server, None);
    config.display.posters.fit = true;
    config.display.posters.max_size = Some(128);

    let cache = RecordingCache::new();
    let sink = RecordingSink::returning(None);
    let resolver = resolver(&config, cache.clone()).with_sink(sink.clone());

    let url = resolver
        .resolve_by_key(KEY, &format!("{}/poster.jpg", server.uri()))
        .await
        .unwrap();
    assert!(url.is_none());
    assert_eq!(cache.delete_count(KEY), 0);

    let stored = sink.stored();
    assert_eq!(stored.len(), 1);
    let (key, image) = &stored[0];
    assert_eq!(key, KEY);
    assert_eq!((image.width, image.height), (128, 128));
    assert_eq!(
        image::guess_format(&image.bytes).unwrap(),
        image::ImageFormat::Png
    );
    assert!(cache.recorded_sets().is_empty());
}

#[tokio::test]
async fn small_images_are_not_upscaled() {
    let server = MockServer::start().await;
    serve_image(&server, "/small.png", png_bytes(200, 300), 1).await;

    let mut config = config_for(&server, None);
    config.display.posters.fit = false;
    config.display.posters.max_size = Some(1000);

    let sink = RecordingSink::returning(None);
    let resolver = resolver(&config, RecordingCache::new()).with_sink(sink.clone());

    resolver
        .resolve_by_key(KEY, &format!("{}/small.png", server.uri()))
        .await
        .unwrap();
    let (_, image) = &sink.stored()[0];
    assert_eq!((image.width, image.height), (200, 300));
}

#[tokio::test]
async fn sink_url_is_written_through_permanently() {
    let server = MockServer::start().await;
    serve_image(&server, "/poster.jpg", jpeg_bytes(20, 20), 1).await;

    let cache = RecordingCache::new();
    let resolver = resolver(&config_for(&server, None), cache.clone())
        .with_sink(RecordingSink::returning(Some("https://cdn.example.com/p.png")));
    let source = format!("{}/poster.jpg", server.uri());

    let first = resolver.resolve_by_key(KEY, &source).await.unwrap();
    let second = resolver.resolve_by_key(KEY, &source).await.unwrap();

    assert_eq!(first.as_deref(), Some("https://cdn.example.com/p.png"));
    assert_eq!(second, first);
    assert_eq!(
        cache.recorded_sets(),
        vec![(KEY.to_string(), "https://cdn.example.com/p.png".to_string(), 0)]
    );
}

#[tokio::test]
async fn local_sink_round_trip() {
    let server = MockServer::start().await;
    serve_image(&server, "/poster.jpg", jpeg_bytes(30, 50), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let cache = RecordingCache::new();
    let resolver = resolver(&config_for(&server, None), cache.clone()).with_sink(Arc::new(
        LocalDirSink::new(dir.path(), "https://posters.example.com"),
    ));

    let url = resolver
        .resolve_by_key(KEY, &format!("{}/poster.jpg", server.uri()))
        .await
        .unwrap()
        .unwrap();
    assert!(url.starts_with("https://posters.example.com/"));
    assert!(url.ends_with(".png"));

    let filename = url.rsplit('/').next().unwrap();
    let written = std::fs::read(dir.path().join(filename)).unwrap();
    let decoded = image::load_from_memory(&written).unwrap();
    assert_eq!(decoded.width(), decoded.height());
    assert!(posterforge::is_valid_image_url(cache.peek(KEY).await.as_deref()));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_error_status_is_no_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let sink = RecordingSink::returning(Some("https://cdn.example.com/p.png"));
    let resolver = resolver(&config_for(&server, None), RecordingCache::new()).with_sink(sink.clone());

    let url = resolver
        .resolve_by_key(KEY, &format!("{}/missing.jpg", server.uri()))
        .await
        .unwrap();
    assert!(url.is_none());
    assert!(sink.stored().is_empty());
}

#[tokio::test]
async fn slow_source_download_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(jpeg_bytes(10, 10))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server, None);
    config.http.download_timeout_secs = 1;
    let cache = RecordingCache::new();
    let sink = RecordingSink::returning(Some("https://cdn.example.com/p.png"));
    let resolver = resolver(&config, cache.clone()).with_sink(sink.clone());

    let started = Instant::now();
    let url = resolver
        .resolve_by_key(KEY, &format!("{}/slow.jpg", server.uri()))
        .await
        .unwrap();
    assert!(url.is_none());
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(sink.stored().is_empty());
    assert!(cache.recorded_sets().is_empty());
}

#[tokio::test]
async fn unreachable_source_is_no_result() {
    let server = MockServer::start().await;
    let resolver = resolver(&config_for(&server, None), RecordingCache::new());

    let url = resolver
        .resolve_by_key(KEY, "http://127.0.0.1:9/poster.jpg")
        .await
        .unwrap();
    assert!(url.is_none());

    let url = resolver.resolve_by_key(KEY, "not a url").await.unwrap();
    assert!(url.is_none());
}

#[tokio::test]
async fn undecodable_source_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/poster.jpg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<!DOCTYPE html><html>login</html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sink = RecordingSink::returning(Some("https://cdn.example.com/p.png"));
    let resolver = resolver(&config_for(&server, None), RecordingCache::new()).with_sink(sink.clone());

    let err = resolver
        .resolve_by_key(KEY, &format!("{}/poster.jpg", server.uri()))
        .await
        .unwrap_err();
    assert!(err.is_decode());
    assert!(sink.stored().is_empty());
}

#[tokio::test]
async fn sink_failure_is_no_result() {
    let server = MockServer::start().await;
    serve_image(&server, "/poster.jpg", jpeg_bytes(16, 16), 1).await;

    let cache = RecordingCache::new();
    let resolver = resolver(&config_for(&server, None), cache.clone()).with_sink(RecordingSink::failing());

    let url = resolver
        .resolve_by_key(KEY, &format!("{}/poster.jpg", server.uri()))
        .await
        .unwrap();
    assert!(url.is_none());
    assert!(cache.recorded_sets().is_empty());
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolutions_are_independent() {
    let server = MockServer::start().await;
    serve_image(&server, "/a.jpg", jpeg_bytes(10, 20), 1).await;
    serve_image(&server, "/b.jpg", jpeg_bytes(20, 10), 1).await;

    let cache = RecordingCache::new();
    cache.seed("c", "https://cdn.example.com/c.png").await;
    let sink = RecordingSink::returning(None);
    let resolver = resolver(&config_for(&server, None), cache.clone()).with_sink(sink.clone());

    let a_url = format!("{}/a.jpg", server.uri());
    let b_url = format!("{}/b.jpg", server.uri());
    let (a, b, c) = tokio::join!(
        resolver.resolve_by_key("a", &a_url),
        resolver.resolve_by_key("b", &b_url),
        resolver.resolve_by_key("c", "http://127.0.0.1:9/never.jpg"),
    );

    assert!(a.unwrap().is_none());
    assert!(b.unwrap().is_none());
    assert_eq!(c.unwrap().as_deref(), Some("https://cdn.example.com/c.png"));
    assert_eq!(sink.stored().len(), 2);
    assert!(cache.get("a").await.is_none());
}
