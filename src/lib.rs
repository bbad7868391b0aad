//! # Digital Archive
//!
//! A typed async client for the Wilson Center Digital Archive, a read-only
//! HTTP/JSON archive of historical documents.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Typed records (documents, collections, subjects, assets...) and
//!   the three-state [`Field`](models::Field) that tells stub records from full ones
//! - [`matching`]: Filter validation, query translation and paginated [`ResultSet`]s
//! - [`hydrate`]: Upgrading stub records to full records without losing known fields
//! - [`transport`]: The [`Transport`] contract with HTTP and mock implementations
//! - [`client`]: The [`Archive`] handle tying a transport to the matcher settings
//! - [`utils`]: Shared HTTP client and retry with backoff
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```no_run
//! use digital_archive::prelude::*;
//!
//! # async fn run() -> Result<(), ArchiveError> {
//! let archive = Archive::new()?;
//! let mut documents = Document::search(
//!     &archive,
//!     SearchFilters::new().with("title", "Khrushchev").items_per_page(20),
//! )
//! .await?;
//!
//! println!("{} documents", documents.count());
//! if let Some(doc) = documents.next().await? {
//!     let mut doc = doc.clone();
//!     doc.hydrate_recursive(&archive).await?;
//!     println!("{}", doc.to_json()?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod hydrate;
pub mod matching;
pub mod models;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use client::Archive;
pub use matching::{ResultSet, SearchFilters, Searchable};
pub use transport::{ArchiveError, Transport};

/// Everything needed to search and hydrate records.
pub mod prelude {
    pub use crate::client::Archive;
    pub use crate::hydrate::Hydrateable;
    pub use crate::matching::{FilterValue, ResultSet, SearchFilters, Searchable};
    pub use crate::models::*;
    pub use crate::transport::ArchiveError;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
