//! Caller-facing search filters.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::{Language, Resource, ResourceRef};

/// One filter value, before translation into the wire dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Date(NaiveDate),
    /// A related record, sent as its id
    Resource(ResourceRef),
    List(Vec<FilterValue>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Date(value)
    }
}

impl From<ResourceRef> for FilterValue {
    fn from(value: ResourceRef) -> Self {
        FilterValue::Resource(value)
    }
}

impl From<Vec<FilterValue>> for FilterValue {
    fn from(value: Vec<FilterValue>) -> Self {
        FilterValue::List(value)
    }
}

/// A set of named filters for one search.
///
/// Names are checked against the searched kind's schema when the search
/// runs, not when they are added.
///
/// ```
/// use digital_archive::matching::SearchFilters;
/// use digital_archive::models::Subject;
///
/// let cuba = Subject::new("1253", "Cuban Missile Crisis");
/// let filters = SearchFilters::new()
///     .with("description", "Khrushchev")
///     .related("subjects", [&cuba])
///     .languages(["rus"])
///     .items_per_page(50);
/// assert_eq!(filters.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    entries: BTreeMap<String, FilterValue>,
    items_per_page: Option<u32>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter, replacing any earlier value under the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Look up one record by id instead of searching.
    pub fn id(self, id: impl Into<String>) -> Self {
        self.with("id", id.into())
    }

    /// Restrict to documents related to every one of `records`.
    pub fn related<'a, T, I>(self, name: impl Into<String>, records: I) -> Self
    where
        T: Resource,
        I: IntoIterator<Item = &'a T>,
    {
        let refs = records
            .into_iter()
            .map(|record| FilterValue::Resource(record.to_ref()))
            .collect::<Vec<_>>();
        self.with(name, refs)
    }

    /// Restrict by original language, given as ISO 639-2/B codes.
    pub fn languages<I, S>(self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes = codes
            .into_iter()
            .map(|code| FilterValue::Text(code.into()))
            .collect::<Vec<_>>();
        self.with("languages", codes)
    }

    /// Restrict by original language, given as language records.
    pub fn language_records<'a, I>(self, languages: I) -> Self
    where
        I: IntoIterator<Item = &'a Language>,
    {
        self.related("languages", languages)
    }

    /// Override the archive's default page size for this search.
    pub fn items_per_page(mut self, items: u32) -> Self {
        self.items_per_page = Some(items);
        self
    }

    pub fn page_size(&self) -> Option<u32> {
        self.items_per_page
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> BTreeMap<String, FilterValue> {
        self.entries
    }
}
