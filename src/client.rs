//! The [`Archive`] handle every search and hydration runs through.

use std::sync::Arc;

use crate::config::Config;
use crate::matching::{ResultSet, SearchFilters, Searchable};
use crate::models::{DateRange, Resource};
use crate::transport::{ArchiveError, HttpTransport, Transport};

/// A connection to the archive plus the matcher's settings.
///
/// Cloning is cheap; clones share the transport and its connection pool.
#[derive(Debug, Clone)]
pub struct Archive {
    transport: Arc<dyn Transport>,
    items_per_page: u32,
    max_concurrent_requests: usize,
}

impl Archive {
    /// Connect to the public archive with default settings.
    pub fn new() -> Result<Self, ArchiveError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new()?)))
    }

    pub fn from_config(config: &Config) -> Result<Self, ArchiveError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::from_config(config)?))
            .with_items_per_page(config.archive.items_per_page)
            .with_max_concurrent_requests(config.archive.max_concurrent_requests))
    }

    /// Use any transport, such as [`MockTransport`](crate::transport::MockTransport) in tests.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            items_per_page: 200,
            max_concurrent_requests: 8,
        }
    }

    /// Default page size for searches that do not set their own.
    pub fn with_items_per_page(mut self, items: u32) -> Self {
        self.items_per_page = items.max(1);
        self
    }

    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = limit.max(1);
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }

    /// Search one kind. Same as `T::search(&archive, filters)`.
    pub async fn search<T: Searchable>(&self, filters: SearchFilters) -> Result<ResultSet<T>, ArchiveError> {
        T::search(self, filters).await
    }

    /// Fetch one full record by id (by slug for themes).
    pub async fn get<T: Resource>(&self, key: &str) -> Result<T, ArchiveError> {
        let value = self.transport.get(T::endpoint(), key).await?;
        T::from_json(value)
    }

    /// Earliest and latest document dates held by the archive.
    pub async fn date_range(&self) -> Result<DateRange, ArchiveError> {
        self.transport.date_range().await
    }
}
