mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable overriding `display.posters.tmdbAPIKey`.
pub const API_KEY_ENV: &str = "POSTERFORGE_TMDB_API_KEY";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config, std::env::var(API_KEY_ENV).ok());
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./posterforge.toml",
        "~/.config/posterforge/config.toml",
        "/etc/posterforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config, std::env::var(API_KEY_ENV).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, api_key: Option<String>) {
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.display.posters.tmdb_api_key = Some(key);
    }

    if let Some(path) = config.cache.path.take() {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        config.cache.path = Some(expanded.into());
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.display.posters.api_key().is_none() {
        tracing::debug!("No TMDB API key configured; provider lookups are disabled");
    }

    for (name, url) in [
        ("tmdb.api_base_url", &config.tmdb.api_base_url),
        ("tmdb.image_base_url", &config.tmdb.image_base_url),
    ] {
        if !is_http_url(url) {
            anyhow::bail!("{} must be an http(s) URL, got '{}'", name, url);
        }
    }

    if config.http.download_timeout_secs == 0 {
        anyhow::bail!("http.download_timeout_secs cannot be 0");
    }

    if config.sink.kind == SinkKind::Local {
        if config.sink.dir.is_none() {
            anyhow::bail!("Local poster sink is enabled but has no dir");
        }
        match config.sink.public_base_url.as_deref() {
            Some(url) if is_http_url(url) => {}
            _ => anyhow::bail!("Local poster sink needs an http(s) public_base_url"),
        }
    }

    Ok(())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
