//! Paginated search results.

use futures_util::{stream, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::filters::SearchFilters;
use super::query::{self, Prepared, WireQuery, WireValue};
use crate::client::Archive;
use crate::hydrate::{hydrate_all, Hydrateable};
use crate::models::{Pagination, Resource};
use crate::transport::ArchiveError;

/// Response envelope shared by every search endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    list: Vec<Value>,
    pagination: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default = "first_page")]
    page: u32,
    total_pages: Option<u32>,
    total_items: usize,
}

fn first_page() -> u32 {
    1
}

fn parse_page<T: Resource>(body: Value) -> Result<(Vec<T>, Option<PageInfo>), ArchiveError> {
    let envelope: Envelope = serde_json::from_value(body)
        .map_err(|e| ArchiveError::Parse(format!("{} search response: {}", T::KIND, e)))?;
    let items = envelope
        .list
        .into_iter()
        .map(T::from_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((items, envelope.pagination))
}

/// The records responsive to one search.
///
/// The first page is fetched when the search runs, so [`count`](Self::count)
/// and [`first`](Self::first) never touch the network. Later pages are
/// fetched on demand by [`next`](Self::next), or all at once by
/// [`all`](Self::all). Fetched records are kept, so the set can be walked
/// again after it has been drained.
#[derive(Debug)]
pub struct ResultSet<T> {
    archive: Archive,
    query: WireQuery,
    count: usize,
    items: Vec<T>,
    cursor: usize,
    next_page: u32,
    last_page: u32,
}

impl<T: Resource> ResultSet<T> {
    /// Validate `filters`, then run the lookup or the first search request.
    pub(crate) async fn execute(archive: &Archive, filters: SearchFilters) -> Result<Self, ArchiveError> {
        let schema = T::schema();
        let per_page = filters.page_size().unwrap_or(archive.items_per_page());
        let transport = archive.transport();

        let mut query = match query::prepare(schema, filters, transport.as_ref()).await? {
            Prepared::ById(id) => {
                debug!("{} lookup by id {}", T::KIND, id);
                let record = T::from_json(transport.get(T::endpoint(), &id).await?)?;
                return Ok(Self::from_items(archive, WireQuery::default(), vec![record]));
            }
            Prepared::Search(query) => query,
        };
        query.insert("itemsPerPage", WireValue::One(per_page.to_string()));

        let body = transport.search(T::endpoint(), &query.to_params()).await?;
        let (items, page_info) = parse_page::<T>(body)?;

        let mut results = Self::from_items(archive, query, items);
        if let (Pagination::Paged, Some(info)) = (schema.pagination, page_info) {
            results.count = info.total_items;
            if info.total_items > per_page as usize {
                let per_page = per_page.max(1) as usize;
                let total_pages = info
                    .total_pages
                    .unwrap_or_else(|| info.total_items.div_ceil(per_page) as u32);
                results.next_page = info.page + 1;
                results.last_page = total_pages;
            }
        }

        debug!(
            "{} search matched {} records, {} buffered",
            T::KIND,
            results.count,
            results.items.len()
        );
        Ok(results)
    }

    fn from_items(archive: &Archive, query: WireQuery, items: Vec<T>) -> Self {
        Self {
            archive: archive.clone(),
            query,
            count: items.len(),
            items,
            cursor: 0,
            next_page: 1,
            last_page: 0,
        }
    }

    /// Total number of matching records as reported by the archive.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The first record, from the already-fetched first page.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Records fetched so far, in result order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether pages remain that have not been fetched.
    pub fn has_pending_pages(&self) -> bool {
        self.next_page <= self.last_page
    }

    /// Advance the cursor, fetching the next page only when it runs past the
    /// fetched records.
    pub async fn next(&mut self) -> Result<Option<&T>, ArchiveError> {
        while self.cursor >= self.items.len() && self.has_pending_pages() {
            let page = self.fetch_page(self.next_page).await?;
            self.items.extend(page);
            self.next_page += 1;
        }
        let index = self.cursor;
        if index < self.items.len() {
            self.cursor += 1;
        }
        Ok(self.items.get(index))
    }

    /// Move the cursor back to the first record.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Fetch every remaining page and return the whole result.
    ///
    /// Remaining pages are requested concurrently, up to the archive's
    /// request limit, and appended in page order. Once drained, repeat
    /// calls return the same records without any request.
    ///
    /// If a page fails, the pages before it are kept and the failing page
    /// stays pending, so a later call resumes from there.
    pub async fn all(&mut self) -> Result<&[T], ArchiveError> {
        if self.has_pending_pages() {
            let limit = self.archive.max_concurrent_requests().max(1);
            let (fetched, failure) = {
                let this = &*self;
                let mut pages = std::pin::pin!(stream::iter(this.next_page..=this.last_page)
                    .map(|page| this.fetch_page(page))
                    .buffered(limit));

                let mut fetched: Vec<Vec<T>> = Vec::new();
                let mut failure = None;
                while let Some(page) = pages.next().await {
                    match page {
                        Ok(items) => fetched.push(items),
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
                (fetched, failure)
            };

            self.next_page += fetched.len() as u32;
            self.items.extend(fetched.into_iter().flatten());
            if let Some(e) = failure {
                return Err(e);
            }
        }
        Ok(&self.items)
    }

    /// Consume the result set as a stream of records, fetching pages lazily.
    ///
    /// The stream continues from the current [`next`](Self::next) cursor;
    /// call [`rewind`](Self::rewind) first to start from the first record.
    pub fn stream(mut self) -> impl Stream<Item = Result<T, ArchiveError>> {
        async_stream::try_stream! {
            while let Some(record) = self.next().await? {
                yield record.clone();
            }
        }
    }

    /// The records fetched so far. Call [`all`](Self::all) first for the
    /// complete result.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<T>, ArchiveError> {
        let mut query = self.query.clone();
        query.insert("page", WireValue::One(page.to_string()));
        debug!("Fetching {} page {} of {}", T::KIND, page, self.last_page);

        let body = self
            .archive
            .transport()
            .search(T::endpoint(), &query.to_params())
            .await?;
        Ok(parse_page::<T>(body)?.0)
    }
}

impl<T: Hydrateable> ResultSet<T> {
    /// Fetch every page, then hydrate every record.
    ///
    /// With `recurse`, documents also hydrate their assets and collections.
    pub async fn hydrate(&mut self, recurse: bool) -> Result<&[T], ArchiveError> {
        self.all().await?;
        let archive = self.archive.clone();
        hydrate_all(&archive, &mut self.items, recurse).await?;
        Ok(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Searchable;
    use crate::models::{Collection, Repository, Subject};
    use crate::transport::{mock::MockCall, MockTransport};
    use futures_util::TryStreamExt;
    use serde_json::json;
    use std::sync::Arc;

    fn collection(id: u32) -> Value {
        json!({ "id": id.to_string(), "name": format!("Collection {}", id), "slug": format!("c-{}", id) })
    }

    fn paged(items: Vec<Value>, page: u32, total_pages: u32, total_items: usize) -> Value {
        json!({
            "list": items,
            "pagination": { "page": page, "totalPages": total_pages, "totalItems": total_items }
        })
    }

    fn archive(transport: &Arc<MockTransport>) -> Archive {
        Archive::with_transport(transport.clone())
    }

    #[tokio::test]
    async fn test_single_page_kind_counts_list() {
        let transport = Arc::new(MockTransport::new());
        transport.push_search(json!({ "list": [
            { "id": "1", "name": "Hoover Institution" },
            { "id": "2", "name": "National Archives" }
        ]}));

        let mut results = Repository::search(&archive(&transport), SearchFilters::new())
            .await
            .unwrap();
        assert_eq!(results.count(), 2);
        assert_eq!(results.all().await.unwrap().len(), 2);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_first_page_only_when_everything_fits() {
        let transport = Arc::new(MockTransport::new());
        transport.push_search(paged(vec![collection(1), collection(2)], 1, 1, 2));

        let mut results = Collection::search(&archive(&transport), SearchFilters::new())
            .await
            .unwrap();
        assert!(!results.has_pending_pages());
        assert_eq!(results.first().map(|c| c.id.as_str()), Some("1"));
        assert_eq!(results.all().await.unwrap().len(), 2);
        assert_eq!(transport.search_params().len(), 1);
    }

    #[tokio::test]
    async fn test_next_fetches_pages_on_demand() {
        let transport = Arc::new(MockTransport::new());
        transport.push_search(paged(vec![collection(1)], 1, 3, 3));
        transport.push_search(paged(vec![collection(2)], 2, 3, 3));
        transport.push_search(paged(vec![collection(3)], 3, 3, 3));

        let mut results = Collection::search(
            &archive(&transport),
            SearchFilters::new().items_per_page(1),
        )
        .await
        .unwrap();

        assert_eq!(results.next().await.unwrap().map(|c| c.id.clone()), Some("1".into()));
        assert_eq!(transport.search_params().len(), 1);
        assert_eq!(results.next().await.unwrap().map(|c| c.id.clone()), Some("2".into()));
        assert_eq!(transport.search_params().len(), 2);
        assert_eq!(results.next().await.unwrap().map(|c| c.id.clone()), Some("3".into()));
        assert!(results.next().await.unwrap().is_none());
        assert!(results.next().await.unwrap().is_none());

        let params = transport.search_params();
        assert!(params[1].contains(&("page".to_string(), "2".to_string())));
        assert!(params[2].contains(&("page".to_string(), "3".to_string())));
        assert!(!params[0].iter().any(|(k, _)| k == "page"));
    }

    #[tokio::test]
    async fn test_all_is_cached() {
        let transport = Arc::new(MockTransport::new());
        transport.push_search(paged(vec![collection(1), collection(2)], 1, 2, 3));
        transport.push_search(paged(vec![collection(3)], 2, 2, 3));

        let mut results = Collection::search(
            &archive(&transport),
            SearchFilters::new().items_per_page(2),
        )
        .await
        .unwrap();

        let ids: Vec<_> = results.all().await.unwrap().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(results.all().await.unwrap().len(), results.count());
        assert_eq!(results.first().map(|c| c.id.as_str()), Some("1"));
        assert_eq!(transport.search_params().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_total_pages_is_derived() {
        let transport = Arc::new(MockTransport::new());
        transport.push_search(json!({
            "list": [collection(1), collection(2)],
            "pagination": { "totalItems": 3 }
        }));
        transport.push_search(json!({ "list": [collection(3)] }));

        let mut results = Collection::search(
            &archive(&transport),
            SearchFilters::new().items_per_page(2),
        )
        .await
        .unwrap();
        assert_eq!(results.all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_page_failure_propagates() {
        let transport = Arc::new(MockTransport::new());
        transport.push_search(paged(vec![collection(1)], 1, 2, 2));
        transport.push_search_status(500);

        let mut results = Collection::search(
            &archive(&transport),
            SearchFilters::new().items_per_page(1),
        )
        .await
        .unwrap();
        let err = results.all().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(results.has_pending_pages());
        assert_eq!(results.items().len(), 1);
    }

    #[tokio::test]
    async fn test_all_keeps_pages_before_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.push_search(paged(vec![collection(1)], 1, 4, 4));
        transport.push_search(paged(vec![collection(2)], 2, 4, 4));
        transport.push_search_status(502);
        transport.push_search(paged(vec![collection(4)], 4, 4, 4));

        let mut results = Collection::search(
            &archive(&transport),
            SearchFilters::new().items_per_page(1),
        )
        .await
        .unwrap();

        let err = results.all().await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        let ids: Vec<_> = results.items().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(results.has_pending_pages());

        transport.push_search(paged(vec![collection(3)], 3, 4, 4));
        transport.push_search(paged(vec![collection(4)], 4, 4, 4));
        let ids: Vec<_> = results.all().await.unwrap().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);

        let params = transport.search_params();
        assert!(params.last().unwrap().contains(&("page".to_string(), "4".to_string())));
    }

    #[tokio::test]
    async fn test_stream_continues_from_cursor() {
        let transport = Arc::new(MockTransport::new());
        transport.push_search(paged(vec![collection(1), collection(2)], 1, 1, 2));

        let mut results = Collection::search(&archive(&transport), SearchFilters::new())
            .await
            .unwrap();
        results.next().await.unwrap();

        let rest: Vec<Collection> = results.stream().try_collect().await.unwrap();
        assert_eq!(rest.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_stream_yields_every_record() {
        let transport = Arc::new(MockTransport::new());
        transport.push_search(paged(vec![collection(1)], 1, 2, 2));
        transport.push_search(paged(vec![collection(2)], 2, 2, 2));

        let results = Collection::search(
            &archive(&transport),
            SearchFilters::new().items_per_page(1),
        )
        .await
        .unwrap();
        let records: Vec<Collection> = results.stream().try_collect().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let transport = Arc::new(MockTransport::new());
        transport.set_record("subject", "5", json!({ "id": "5", "name": "Korea", "value": "Korea" }));

        let results = Subject::search(&archive(&transport), SearchFilters::new().id("5"))
            .await
            .unwrap();
        assert_eq!(results.count(), 1);
        assert_eq!(results.first().map(|s| s.name.as_str()), Some("Korea"));
        assert_eq!(
            transport.calls(),
            vec![MockCall::Get {
                endpoint: "subject".to_string(),
                id: "5".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_result() {
        let transport = Arc::new(MockTransport::new());
        let mut results = Subject::search(&archive(&transport), SearchFilters::new().with("name", "zzz"))
            .await
            .unwrap();
        assert_eq!(results.count(), 0);
        assert!(results.first().is_none());
        assert!(results.next().await.unwrap().is_none());
    }
}
