//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpSettings;
use crate::transport::ArchiveError;

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ArchiveError> {
        Self::from_settings(&HttpSettings::default())
    }

    /// Create a new HTTP client from configured timeouts, user agent and TLS policy
    pub fn from_settings(settings: &HttpSettings) -> Result<Self, ArchiveError> {
        let user_agent = settings.user_agent.clone().unwrap_or_else(|| {
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
        });

        if settings.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled for archive requests");
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| ArchiveError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
