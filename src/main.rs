mod cli;

use posterforge::{
    cache::{CacheStore, FileCache, MemoryCache},
    classify_image_url, config,
    images::{NormalizeOptions, Normalizer},
    metadata::{MediaReference, PosterSize},
    PosterResolver,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

fn open_cache(config: &config::Config) -> Arc<dyn CacheStore> {
    match config.cache.path {
        Some(ref path) => {
            tracing::debug!("Using poster cache at {:?}", path);
            Arc::new(FileCache::open(path))
        }
        None => Arc::new(MemoryCache::new()),
    }
}

async fn poster(
    config_path: Option<&Path>,
    id: String,
    media_type: String,
    size: PosterSize,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    if config.display.posters.api_key().is_none() {
        tracing::warn!(
            "No TMDB API key configured (set display.posters.tmdbAPIKey or {})",
            config::API_KEY_ENV
        );
    }

    let resolver = PosterResolver::from_config(&config, open_cache(&config))?;
    let media = MediaReference::new(id, media_type);

    match resolver.resolve_for_media(&media, size).await {
        Some(url) => println!("{}", url),
        None => {
            eprintln!("No poster found for {} {}", media.media_type, media.identifier);
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn resolve(config_path: Option<&Path>, key: String, source_url: String) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let resolver = PosterResolver::from_config(&config, open_cache(&config))?;

    let resolved = resolver
        .resolve_by_key(&key, &source_url)
        .await
        .with_context(|| format!("Failed to resolve poster for key '{}'", key))?;

    match resolved {
        Some(url) => println!("{}", url),
        None => {
            eprintln!("No poster URL produced for '{}'", key);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn normalize_file(
    config_path: Option<&Path>,
    input: &Path,
    output: &Path,
    fit: Option<bool>,
    max_size: Option<u32>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let defaults = config.display.posters.normalize_options();
    let normalizer = Normalizer::new(NormalizeOptions {
        fit_to_square: fit.unwrap_or(defaults.fit_to_square),
        max_dimension: max_size.or(defaults.max_dimension),
    });

    let data = std::fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    let image = normalizer
        .normalize(&data)
        .with_context(|| format!("Failed to normalize {:?}", input))?;
    std::fs::write(output, &image.bytes)
        .with_context(|| format!("Failed to write {:?}", output))?;

    println!(
        "Wrote {:?} ({}x{}, {} bytes)",
        output,
        image.width,
        image.height,
        image.bytes.len()
    );
    Ok(())
}

fn check_url(candidate: &str) -> Result<()> {
    match classify_image_url(Some(candidate)) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(reason) => {
            println!("invalid: {}", reason);
            std::process::exit(1);
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(path)?;
    let posters = &config.display.posters;

    println!("Configuration is valid");
    println!("  Square fit: {}", posters.fit);
    match posters.max_size.filter(|m| *m > 0) {
        Some(max) => println!("  Max size: {}px", max),
        None => println!("  Max size: unbounded"),
    }
    println!(
        "  TMDB lookups: {}",
        if posters.api_key().is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );
    match config.cache.path {
        Some(ref path) => println!("  Cache: {:?}", path),
        None => println!("  Cache: in-memory"),
    }
    println!("  Sink: {:?}", config.sink.kind);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "posterforge=trace,reqwest=debug".to_string()
        } else {
            "posterforge=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Poster {
            id,
            media_type,
            size,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(poster(config_path, id, media_type, size))
        }
        Commands::Resolve { key, source_url } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve(config_path, key, source_url))
        }
        Commands::Normalize {
            input,
            output,
            fit,
            max_size,
        } => normalize_file(config_path, &input, &output, fit, max_size),
        Commands::CheckUrl { candidate } => check_url(&candidate),
        Commands::Validate { config } => validate_config(config.as_deref().or(config_path)),
    }
}
