//! Upstream API client.
//!
//! Two operations are consumed from the upstream service: the ranked list
//! of best item ids and per-item detail payloads. The [`UpstreamClient`]
//! trait is the seam the orchestrator depends on; [`HnClient`] is the
//! reqwest-backed production implementation.

use async_trait::async_trait;

use crate::config::Config;
use crate::story::RawItem;

/// Error type for upstream operations.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    /// The upstream answered with a non-success status.
    #[error("unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },
    /// The payload could not be decoded into the expected shape.
    #[error("decode error from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

/// Upstream operations the orchestrator depends on.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetch the ranked list of best item ids, best first.
    async fn fetch_best_ids(&self) -> Result<Vec<u64>, UpstreamError>;

    /// Fetch the raw detail payload for one item.
    async fn fetch_item(&self, id: u64) -> Result<RawItem, UpstreamError>;
}

/// HTTP client for the Hacker News Firebase API.
#[derive(Clone)]
pub struct HnClient {
    client: reqwest::Client,
    base_url: String,
    list_path: String,
    item_path: String,
}

impl HnClient {
    /// Create a new client from the service configuration.
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.upstream_url.trim_end_matches('/').to_string(),
            list_path: config.list_path.clone(),
            item_path: config.item_path.clone(),
        })
    }

    fn list_url(&self) -> String {
        format!("{}{}", self.base_url, self.list_path)
    }

    fn item_url(&self, id: u64) -> String {
        let path = self.item_path.replace("{id}", &id.to_string());
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<T, UpstreamError> {
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                endpoint: url,
            });
        }

        response.json::<T>().await.map_err(|e| UpstreamError::Decode {
            endpoint: url,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl UpstreamClient for HnClient {
    async fn fetch_best_ids(&self) -> Result<Vec<u64>, UpstreamError> {
        self.get_json(self.list_url()).await
    }

    async fn fetch_item(&self, id: u64) -> Result<RawItem, UpstreamError> {
        self.get_json(self.item_url(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.upstream_url = "https://hacker-news.firebaseio.com/".to_string();
        config
    }

    #[test]
    fn test_url_templating() {
        let client = HnClient::new(&test_config()).unwrap();

        assert_eq!(
            client.list_url(),
            "https://hacker-news.firebaseio.com/v0/beststories.json"
        );
        assert_eq!(
            client.item_url(8863),
            "https://hacker-news.firebaseio.com/v0/item/8863.json"
        );
    }
}
