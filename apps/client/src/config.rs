use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::i18n::FetchOrdering;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_LANGUAGE: &str = "en";
const TOKEN_DIR: &str = ".autointern";
const TOKEN_FILE: &str = "token";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
/// Every variable has a default; malformed values are rejected at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub default_language: String,
    pub token_path: PathBuf,
    pub http_timeout: Duration,
    pub fetch_ordering: FetchOrdering,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let http_timeout_secs = match lookup("AUTOINTERN_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("AUTOINTERN_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let fetch_ordering = match lookup("AUTOINTERN_FETCH_ORDERING") {
            Some(raw) => raw
                .parse::<FetchOrdering>()
                .context("AUTOINTERN_FETCH_ORDERING must be 'latest-request' or 'last-resolved'")?,
            None => FetchOrdering::default(),
        };

        Ok(Config {
            api_url: lookup("AUTOINTERN_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            default_language: lookup("AUTOINTERN_DEFAULT_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            token_path: match lookup("AUTOINTERN_TOKEN_PATH") {
                Some(path) => PathBuf::from(path),
                None => default_token_path()?,
            },
            http_timeout: Duration::from_secs(http_timeout_secs),
            fetch_ordering,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// `~/.autointern/token`, independent of the working directory.
fn default_token_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .context("Failed to get home directory; set AUTOINTERN_TOKEN_PATH")?;
    Ok(home.join(TOKEN_DIR).join(TOKEN_FILE))
}
