//! Mock transport for testing purposes.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::models::DateRange;
use crate::transport::{ArchiveError, Transport};

/// A request observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Search {
        endpoint: String,
        params: Vec<(String, String)>,
    },
    Get {
        endpoint: String,
        id: String,
    },
    Asset {
        path: String,
    },
    DateRange,
}

#[derive(Debug, Clone)]
enum Reply<T> {
    Ok(T),
    Status(u16),
}

/// A mock transport that replays predefined responses and records every call.
///
/// Search pages are served in the order they were queued. Records and assets
/// are keyed by endpoint/id and path and may be requested any number of times.
#[derive(Debug, Default)]
pub struct MockTransport {
    searches: Mutex<VecDeque<Reply<Value>>>,
    records: Mutex<HashMap<(String, String), Reply<Value>>>,
    assets: Mutex<HashMap<String, Reply<Vec<u8>>>>,
    date_range: Mutex<Option<DateRange>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a search response body.
    pub fn push_search(&self, body: Value) {
        self.searches.lock().unwrap().push_back(Reply::Ok(body));
    }

    /// Queue a failed search response.
    pub fn push_search_status(&self, status: u16) {
        self.searches.lock().unwrap().push_back(Reply::Status(status));
    }

    /// Set the full representation returned for `endpoint`/`id`.
    pub fn set_record(&self, endpoint: &str, id: &str, body: Value) {
        self.records
            .lock()
            .unwrap()
            .insert((endpoint.to_string(), id.to_string()), Reply::Ok(body));
    }

    /// Make lookups of `endpoint`/`id` fail with `status`.
    pub fn set_record_status(&self, endpoint: &str, id: &str, status: u16) {
        self.records
            .lock()
            .unwrap()
            .insert((endpoint.to_string(), id.to_string()), Reply::Status(status));
    }

    /// Set the content served at an asset path.
    pub fn set_asset(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.assets
            .lock()
            .unwrap()
            .insert(path.to_string(), Reply::Ok(content.into()));
    }

    /// Make requests for an asset path fail with `status`.
    pub fn set_asset_status(&self, path: &str, status: u16) {
        self.assets
            .lock()
            .unwrap()
            .insert(path.to_string(), Reply::Status(status));
    }

    /// Set the archive date range.
    pub fn set_date_range(&self, begin: &str, end: &str) {
        *self.date_range.lock().unwrap() = Some(DateRange {
            begin: begin.to_string(),
            end: end.to_string(),
        });
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Parameters of every search call made so far, in order.
    pub fn search_params(&self) -> Vec<Vec<(String, String)>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Search { params, .. } => Some(params),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn search(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, ArchiveError> {
        self.record(MockCall::Search {
            endpoint: endpoint.to_string(),
            params: params.to_vec(),
        });

        let reply = self.searches.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Ok(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(ArchiveError::NoSuchResource {
                endpoint: endpoint.to_string(),
                detail: format!("search with terms {:?}", params),
                status,
            }),
            None => Ok(serde_json::json!({ "list": [] })),
        }
    }

    async fn get(&self, endpoint: &str, id: &str) -> Result<Value, ArchiveError> {
        self.record(MockCall::Get {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
        });

        let reply = self
            .records
            .lock()
            .unwrap()
            .get(&(endpoint.to_string(), id.to_string()))
            .cloned();
        match reply {
            Some(Reply::Ok(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(ArchiveError::NoSuchResource {
                endpoint: endpoint.to_string(),
                detail: format!("resource id {}", id),
                status,
            }),
            None => Err(ArchiveError::NoSuchResource {
                endpoint: endpoint.to_string(),
                detail: format!("resource id {}", id),
                status: 404,
            }),
        }
    }

    async fn get_asset(&self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        self.record(MockCall::Asset {
            path: path.to_string(),
        });

        let reply = self.assets.lock().unwrap().get(path).cloned();
        match reply {
            Some(Reply::Ok(content)) => Ok(content),
            Some(Reply::Status(status)) => Err(ArchiveError::ApiServer {
                target: path.to_string(),
                status,
            }),
            None => Err(ArchiveError::ApiServer {
                target: path.to_string(),
                status: 404,
            }),
        }
    }

    async fn date_range(&self) -> Result<DateRange, ArchiveError> {
        self.record(MockCall::DateRange);

        self.date_range
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ArchiveError::NoSuchResource {
                endpoint: "record".to_string(),
                detail: "date range".to_string(),
                status: 404,
            })
    }
}
