//! Transport layer for the Digital Archive HTTP/JSON API.
//!
//! This module defines the [`Transport`] trait that everything above it talks to.
//! The archive exposes four read-only operations:
//!
//! - a per-endpoint search returning `{list: [...], pagination: {...}}`
//! - a by-ID lookup returning one full record
//! - raw asset content (transcripts, translations, scans) served from a path
//! - the earliest and latest document dates held by the archive
//!
//! [`HttpTransport`] implements these against the live service with `reqwest`.
//! [`MockTransport`] replays canned responses and records every call, which is
//! what the unit and integration tests run against.
//!
//! # Errors
//!
//! Non-success statuses are never retried at this layer unless the transport was
//! built with a retry policy (see [`crate::utils::RetryConfig`]); by default a
//! failed request surfaces immediately as an [`ArchiveError`].

mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::DateRange;

/// Default location of the Digital Archive.
pub const DEFAULT_BASE_URL: &str = "https://digitalarchive.wilsoncenter.org";

/// The contract between the data access layer and the remote archive.
///
/// Implementations must be cheap to share: the matcher and hydrator hold an
/// `Arc<dyn Transport>` and may issue several requests concurrently.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Run one search request against `endpoint` and return the decoded body.
    async fn search(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, ArchiveError>;

    /// Fetch the full representation of one record.
    async fn get(&self, endpoint: &str, id: &str) -> Result<Value, ArchiveError>;

    /// Fetch raw asset bytes from a stored access path.
    async fn get_asset(&self, path: &str) -> Result<Vec<u8>, ArchiveError>;

    /// Fetch the earliest and latest document dates known to the archive.
    async fn date_range(&self) -> Result<DateRange, ArchiveError>;
}

/// Errors that can occur when searching, fetching or hydrating archive records
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// A filter name that the resource kind does not accept
    #[error("Invalid search field: {0}")]
    InvalidSearchField(String),

    /// A date filter of the wrong type or length
    #[error("Malformed date search: {0}")]
    MalformedDateSearch(String),

    /// A language filter element that is neither a Language nor a 3-letter code
    #[error("Malformed language search: {0}")]
    MalformedLanguageSearch(String),

    /// Search or by-ID lookup answered with a non-success status
    #[error("No such resource at {endpoint} ({detail}): HTTP {status}")]
    NoSuchResource {
        endpoint: String,
        detail: String,
        status: u16,
    },

    /// Asset content request answered with a non-success status
    #[error("Server error fetching {target}: HTTP {status}")]
    ApiServer { target: String, status: u16 },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArchiveError {
    /// Whether this error was raised by filter validation, before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ArchiveError::InvalidSearchField(_)
                | ArchiveError::MalformedDateSearch(_)
                | ArchiveError::MalformedLanguageSearch(_)
        )
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ArchiveError::NoSuchResource { status, .. } | ArchiveError::ApiServer { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ArchiveError {
    fn from(err: reqwest::Error) -> Self {
        ArchiveError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        ArchiveError::Parse(format!("JSON: {}", err))
    }
}

impl From<config::ConfigError> for ArchiveError {
    fn from(err: config::ConfigError) -> Self {
        ArchiveError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors() {
        assert!(ArchiveError::InvalidSearchField("foo".into()).is_validation());
        assert!(ArchiveError::MalformedDateSearch("1989".into()).is_validation());
        assert!(ArchiveError::MalformedLanguageSearch("en".into()).is_validation());
        assert!(!ArchiveError::Network("refused".into()).is_validation());
    }

    #[test]
    fn test_status() {
        let err = ArchiveError::NoSuchResource {
            endpoint: "record".into(),
            detail: "id 1".into(),
            status: 404,
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("HTTP 404"));
        assert_eq!(ArchiveError::Parse("bad".into()).status(), None);
    }
}
