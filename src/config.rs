//! Service configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for development and validated once at startup.

use std::net::SocketAddr;
use std::time::Duration;

/// Error type for configuration problems, raised at startup only.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

impl ConfigError {
    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            message: message.into(),
        }
    }
}

/// Which cache store backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// RwLock<HashMap> store; the default.
    HashMap,
    /// Lock-free concurrent store for high-traffic deployments.
    Moka,
}

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host the HTTP server binds to.
    pub bind: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Base URL of the upstream API.
    pub upstream_url: String,
    /// Path of the ranked id list endpoint.
    pub list_path: String,
    /// Path template of the item detail endpoint; `{id}` is substituted.
    pub item_path: String,
    /// Expiration for the primary ranked id list.
    pub list_ttl: Duration,
    /// Expiration for cached detail records.
    pub story_ttl: Duration,
    /// Per-request timeout for upstream calls.
    pub upstream_timeout: Duration,
    /// Cache store backend.
    pub store_backend: StoreBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            upstream_url: "https://hacker-news.firebaseio.com".to_string(),
            list_path: "/v0/beststories.json".to_string(),
            item_path: "/v0/item/{id}.json".to_string(),
            list_ttl: Duration::from_secs(300),
            story_ttl: Duration::from_secs(4 * 3600),
            upstream_timeout: Duration::from_secs(10),
            store_backend: StoreBackend::HashMap,
        }
    }
}

impl Config {
    /// Create a Config from environment variables.
    ///
    /// Environment variables:
    /// - `BESTSTORIES_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `BESTSTORIES_PORT`: Bind port (default: 3000)
    /// - `BESTSTORIES_UPSTREAM_URL`: Upstream base URL
    /// - `BESTSTORIES_LIST_PATH`: Ranked id list endpoint path
    /// - `BESTSTORIES_ITEM_PATH`: Item detail path template with `{id}`
    /// - `BESTSTORIES_LIST_TTL_SECS`: Primary list expiration (default: 300)
    /// - `BESTSTORIES_STORY_TTL_SECS`: Detail expiration (default: 14400)
    /// - `BESTSTORIES_UPSTREAM_TIMEOUT_MS`: Upstream timeout (default: 10000)
    /// - `BESTSTORIES_STORE`: "hashmap" or "moka" (default: hashmap)
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let bind = std::env::var("BESTSTORIES_BIND").unwrap_or(defaults.bind);

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("BESTSTORIES_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let upstream_url =
            std::env::var("BESTSTORIES_UPSTREAM_URL").unwrap_or(defaults.upstream_url);
        let list_path = std::env::var("BESTSTORIES_LIST_PATH").unwrap_or(defaults.list_path);
        let item_path = std::env::var("BESTSTORIES_ITEM_PATH").unwrap_or(defaults.item_path);

        let list_ttl = std::env::var("BESTSTORIES_LIST_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.list_ttl);

        let story_ttl = std::env::var("BESTSTORIES_STORY_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.story_ttl);

        let upstream_timeout = std::env::var("BESTSTORIES_UPSTREAM_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.upstream_timeout);

        let store_backend = match std::env::var("BESTSTORIES_STORE").ok().as_deref() {
            Some("moka") => StoreBackend::Moka,
            Some("hashmap") | None => StoreBackend::HashMap,
            Some(other) => {
                tracing::warn!(backend = other, "unknown store backend, using hashmap");
                StoreBackend::HashMap
            }
        };

        Self {
            bind,
            port,
            upstream_url,
            list_path,
            item_path,
            list_ttl,
            story_ttl,
            upstream_timeout,
            store_backend,
        }
    }

    /// Validate the configuration. Called once at startup; a failure here
    /// aborts the process before any network activity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.upstream_url)
            .map_err(|e| ConfigError::invalid("upstream URL", e.to_string()))?;

        if !self.list_path.starts_with('/') {
            return Err(ConfigError::invalid(
                "list path",
                format!("must start with '/', got '{}'", self.list_path),
            ));
        }

        if !self.item_path.contains("{id}") {
            return Err(ConfigError::invalid(
                "item path",
                format!("must contain '{{id}}', got '{}'", self.item_path),
            ));
        }

        if self.list_ttl.is_zero() || self.story_ttl.is_zero() {
            return Err(ConfigError::invalid(
                "cache TTL",
                "expiration durations must be nonzero",
            ));
        }

        Ok(())
    }

    /// Resolve the HTTP bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("bind address", format!("{}: {}", addr, e)))
    }
}
