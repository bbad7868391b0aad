//! Utility modules supporting the HTTP transport.
//!
//! - [`HttpClient`]: shared `reqwest` client configured from [`crate::config::HttpSettings`]
//! - [`RetryConfig`]: configuration for retry logic with exponential backoff
//! - [`with_retry`]: execute an operation with automatic retry on transient errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use digital_archive::utils::{with_retry, RetryConfig};
//! use digital_archive::transport::ArchiveError;
//!
//! # async fn fetch_page() -> Result<String, ArchiveError> { Ok("page".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), ArchiveError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let page = with_retry(config, || fetch_page()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::HttpClient;
pub use retry::{with_retry, RetryConfig, TransientError};
