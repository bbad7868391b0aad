//! reqwest-backed transport for the live Digital Archive.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::models::DateRange;
use crate::transport::{ArchiveError, Transport, DEFAULT_BASE_URL};
use crate::utils::{with_retry, HttpClient, RetryConfig};

/// Digital Archive transport over HTTPS
///
/// Builds URLs of the form `{base}/srv/{endpoint}.json` for searches and
/// `{base}/srv/{endpoint}/{id}.json` for single records. The underlying
/// connection pool is shared by every request made through this transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Arc<HttpClient>,
    base_url: String,
    retry: RetryConfig,
}

impl HttpTransport {
    /// Create a transport against the public archive with default settings
    pub fn new() -> Result<Self, ArchiveError> {
        Ok(Self::with_client(Arc::new(HttpClient::new()?), DEFAULT_BASE_URL))
    }

    /// Create a transport from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, ArchiveError> {
        let base_url = url::Url::parse(&config.archive.base_url)
            .map_err(|e| ArchiveError::Config(format!("Invalid base URL: {}", e)))?;
        let client = HttpClient::from_settings(&config.http)?;

        Ok(Self::with_client(Arc::new(client), base_url.as_str())
            .with_retry(RetryConfig::from(&config.retry)))
    }

    /// Create with a custom HTTP client and base URL (for testing)
    pub fn with_client(client: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Set the retry policy applied to every request
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The archive base URL, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, endpoint: &str) -> String {
        format!("{}/srv/{}.json", self.base_url, endpoint)
    }

    fn record_url(&self, endpoint: &str, id: &str) -> String {
        format!("{}/srv/{}/{}.json", self.base_url, endpoint, id)
    }

    fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// GET a JSON document, mapping non-success statuses to `NoSuchResource`.
    async fn get_json(
        &self,
        url: &str,
        endpoint: &str,
        detail: &str,
        params: &[(String, String)],
    ) -> Result<Value, ArchiveError> {
        with_retry(self.retry, || async {
            let response = self
                .client
                .client()
                .get(url)
                .query(params)
                .send()
                .await
                .map_err(|e| ArchiveError::Network(format!("Failed to query {}: {}", endpoint, e)))?;

            if !response.status().is_success() {
                return Err(ArchiveError::NoSuchResource {
                    endpoint: endpoint.to_string(),
                    detail: detail.to_string(),
                    status: response.status().as_u16(),
                });
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| ArchiveError::Parse(format!("Failed to parse {} response: {}", endpoint, e)))
        })
        .await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn search(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, ArchiveError> {
        tracing::debug!("Querying {} API endpoint with params: {:?}", endpoint, params);
        let detail = format!("search with terms {:?}", params);
        self.get_json(&self.search_url(endpoint), endpoint, &detail, params)
            .await
    }

    async fn get(&self, endpoint: &str, id: &str) -> Result<Value, ArchiveError> {
        tracing::debug!("Querying {} API endpoint for resource id: {}", endpoint, id);
        let detail = format!("resource id {}", id);
        self.get_json(&self.record_url(endpoint, id), endpoint, &detail, &[])
            .await
    }

    async fn get_asset(&self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        let url = self.asset_url(path);
        tracing::debug!("Fetching asset content from {}", url);

        with_retry(self.retry, || async {
            let response = self
                .client
                .client()
                .get(&url)
                .send()
                .await
                .map_err(|e| ArchiveError::Network(format!("Failed to fetch asset: {}", e)))?;

            if !response.status().is_success() {
                return Err(ArchiveError::ApiServer {
                    target: url.clone(),
                    status: response.status().as_u16(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| ArchiveError::Network(format!("Failed to read asset: {}", e)))?;
            Ok(bytes.to_vec())
        })
        .await
    }

    async fn date_range(&self) -> Result<DateRange, ArchiveError> {
        let url = format!("{}/srv/record/date_range.json", self.base_url);
        let body = self.get_json(&url, "record", "date range", &[]).await?;
        Ok(serde_json::from_value(body)?)
    }
}
