//! Session configuration
//!
//! A `Config` is built once and handed to [`ApiClient`](crate::api::ApiClient)
//! and [`TableCache`](crate::tables::TableCache). Nothing in the crate reads
//! global state after construction.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Defaults
// ============================================================================

/// Stable address of the current STRING release.
pub const DEFAULT_API_URL: &str = "https://string-db.org";

/// Host answering `/api/json/version`.
pub const DEFAULT_DISCOVERY_URL: &str = "https://string-db.org";

/// Base URL of the bulk download files.
pub const DEFAULT_STATIC_URL: &str = "https://stringdb-downloads.org/download/";

/// Release the bulk table names are built for.
pub const DEFAULT_STRING_VERSION: &str = "12.0";

/// Connect + read timeout for every request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Extra attempts after a failed request.
pub const DEFAULT_RETRIES: u32 = 2;

/// Identity sent as `caller_identity` and in the User-Agent header.
pub const CALLER_IDENTITY: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base address for API calls (a release's stable address)
    pub api_url: String,

    /// Host used for version discovery
    pub discovery_url: String,

    /// Base URL for bulk table downloads, with trailing slash
    pub static_url: String,

    /// Local directory holding downloaded tables
    pub cache_dir: PathBuf,

    /// Release number used in bulk table names, e.g. "12.0"
    pub string_version: String,

    pub timeout_secs: u64,

    pub retries: u32,

    pub caller_identity: String,
}

impl Config {
    /// Defaults with the per-user cache directory
    pub fn new() -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| ClientError::config("Could not determine cache directory"))?
            .join("stringdb");

        Ok(Self {
            api_url: DEFAULT_API_URL.to_string(),
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            static_url: DEFAULT_STATIC_URL.to_string(),
            cache_dir,
            string_version: DEFAULT_STRING_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            caller_identity: CALLER_IDENTITY.to_string(),
        })
    }

    /// Defaults overridden by `STRINGDB_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new().unwrap_or_else(|_| Self::local_fallback());

        if let Ok(url) = std::env::var("STRINGDB_API_URL") {
            config.api_url = url;
        }
        if let Ok(url) = std::env::var("STRINGDB_DISCOVERY_URL") {
            config.discovery_url = url;
        }
        if let Ok(url) = std::env::var("STRINGDB_STATIC_URL") {
            config.set_static_url(url);
        }
        if let Ok(dir) = std::env::var("STRINGDB_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Ok(version) = std::env::var("STRINGDB_VERSION") {
            config.string_version = version;
        }
        if let Ok(secs) = std::env::var("STRINGDB_TIMEOUT_SECS") {
            config.timeout_secs = secs
                .parse()
                .map_err(|_| ClientError::config(format!("STRINGDB_TIMEOUT_SECS='{}' is not a number", secs)))?;
        }
        if let Ok(retries) = std::env::var("STRINGDB_RETRIES") {
            config.retries = retries
                .parse()
                .map_err(|_| ClientError::config(format!("STRINGDB_RETRIES='{}' is not a number", retries)))?;
        }

        Ok(config)
    }

    fn local_fallback() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            static_url: DEFAULT_STATIC_URL.to_string(),
            cache_dir: PathBuf::from(".stringdb-cache"),
            string_version: DEFAULT_STRING_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            caller_identity: CALLER_IDENTITY.to_string(),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_discovery_url(mut self, url: impl Into<String>) -> Self {
        self.discovery_url = url.into();
        self
    }

    pub fn with_static_url(mut self, url: impl Into<String>) -> Self {
        self.set_static_url(url);
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_string_version(mut self, version: impl Into<String>) -> Self {
        self.string_version = version.into();
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn set_static_url(&mut self, url: impl Into<String>) {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.static_url = url;
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::local_fallback())
    }
}
