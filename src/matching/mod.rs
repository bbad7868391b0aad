//! Searching the archive.
//!
//! A search validates a [`SearchFilters`] set against the kind's schema,
//! translates it into the archive's query dialect and runs the first page.
//! The returned [`ResultSet`] pulls later pages as the caller walks it.
//!
//! ```no_run
//! use digital_archive::matching::{SearchFilters, Searchable};
//! use digital_archive::models::Subject;
//! use digital_archive::Archive;
//!
//! # async fn run() -> Result<(), digital_archive::ArchiveError> {
//! let archive = Archive::new()?;
//! let mut subjects = Subject::search(&archive, SearchFilters::new().with("name", "Cuba")).await?;
//! for subject in subjects.all().await? {
//!     println!("{} {}", subject.id, subject.name);
//! }
//! # Ok(())
//! # }
//! ```

mod dates;
mod filters;
mod query;
mod results;

pub use filters::{FilterValue, SearchFilters};
pub use query::{WireQuery, WireValue};
pub use results::ResultSet;

use async_trait::async_trait;

use crate::client::Archive;
use crate::models::{Collection, Contributor, Coverage, Document, Repository, Resource, Subject};
use crate::transport::ArchiveError;

/// Kinds that have a search endpoint.
#[async_trait]
pub trait Searchable: Resource {
    /// Run a search, or a lookup when `filters` carries an `id`.
    ///
    /// Filter validation errors are returned before any request is sent.
    async fn search(archive: &Archive, filters: SearchFilters) -> Result<ResultSet<Self>, ArchiveError> {
        ResultSet::execute(archive, filters).await
    }
}

impl Searchable for Subject {}
impl Searchable for Contributor {}
impl Searchable for Coverage {}
impl Searchable for Collection {}
impl Searchable for Repository {}
impl Searchable for Document {}
