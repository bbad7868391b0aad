//! Translation of [`SearchFilters`] into the archive's query dialect.
//!
//! The search endpoints disagree on how free text and relations are passed:
//!
//! - document searches fold free text into `q` and pin `model=Record`
//! - every other kind folds `name` and `value` into `term`
//! - relation filters use singular names and carry ids, with a `[]` suffix
//!   on the keys the archive treats as intersections
//!
//! Every check here runs before the first request is sent.

use std::collections::BTreeMap;

use super::dates::DateWindow;
use super::filters::{FilterValue, SearchFilters};
use crate::models::de::format_archive_date;
use crate::models::{ResourceKind, ResourceRef, Schema, TextSearch};
use crate::transport::{ArchiveError, Transport};

/// Plural relation filters, their singular wire names and the kind of
/// record they refer to.
const RELATION_RENAMES: &[(&str, &str, ResourceKind)] = &[
    ("collections", "collection", ResourceKind::Collection),
    ("publishers", "publisher", ResourceKind::Publisher),
    ("repositories", "repository", ResourceKind::Repository),
    ("original_coverages", "coverage", ResourceKind::Coverage),
    ("subjects", "subject", ResourceKind::Subject),
    ("contributors", "contributor", ResourceKind::Contributor),
    ("donors", "donor", ResourceKind::Donor),
    ("languages", "language", ResourceKind::Language),
    ("translations", "translation", ResourceKind::Translation),
    ("themes", "theme", ResourceKind::Theme),
];

/// Relations the archive accepts only one value for.
const SINGLE_VALUED: &[&str] = &["language", "translation", "theme"];

/// Relations sent as `name[]`, which the archive matches as "all of".
const ARRAY_KEYS: &[&str] = &["donor", "subject", "contributor", "coverage", "collection"];

/// Free-text filters folded into `q`, in join order.
const FULL_TEXT_FIELDS: &[&str] = &["name", "title", "description", "slug", "q"];

/// One wire parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    One(String),
    /// Sent as the same key repeated once per value
    Many(Vec<String>),
}

/// Query parameters for one search endpoint, kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireQuery(BTreeMap<String, WireValue>);

impl WireQuery {
    pub fn insert(&mut self, name: impl Into<String>, value: WireValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.0.get(name)
    }

    /// Flatten into `(key, value)` pairs ready for a URL query string.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for (name, value) in &self.0 {
            match value {
                WireValue::One(value) => params.push((name.clone(), value.clone())),
                WireValue::Many(values) => {
                    params.extend(values.iter().map(|v| (name.clone(), v.clone())));
                }
            }
        }
        params
    }
}

/// What a set of filters asks the archive for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Prepared {
    /// Fetch one record by id, skipping search.
    ById(String),
    Search(WireQuery),
}

/// Validate `filters` for `schema` and build the request they describe.
///
/// The only request this may issue is the date-range lookup that fills an
/// open `start_date`, and only after every filter has been validated.
pub(crate) async fn prepare(
    schema: &Schema,
    filters: SearchFilters,
    transport: &dyn Transport,
) -> Result<Prepared, ArchiveError> {
    for name in filters.names() {
        if !schema.accepts_filter(name) {
            return Err(ArchiveError::InvalidSearchField(format!(
                "'{}' is not a valid search field for {}. Valid fields: {}",
                name,
                schema.kind,
                schema.filter_names().join(", ")
            )));
        }
    }

    let mut entries = filters.into_entries();
    let id = entries.remove("id").map(|id| scalar("id", &id)).transpose()?;

    let mut query = WireQuery::default();
    let mut window = None;
    match schema.text_search {
        TextSearch::FullText { model } => {
            if entries.contains_key("start_date") || entries.contains_key("end_date") {
                window = Some(DateWindow::new(
                    entries.remove("start_date").as_ref(),
                    entries.remove("end_date").as_ref(),
                )?);
            }

            if let Some(languages) = entries.remove("languages") {
                entries.insert("languages".to_string(), normalize_languages(languages)?);
            }
            relations(&mut entries, &mut query)?;

            let keywords = FULL_TEXT_FIELDS
                .iter()
                .filter_map(|field| entries.remove(*field))
                .map(|value| scalar("q", &value))
                .collect::<Result<Vec<_>, _>>()?;
            query.insert("q", WireValue::One(keywords.join(" ")));
            query.insert("model", WireValue::One(model.to_string()));
            entries.remove("model");
        }
        TextSearch::Term => {
            let name = entries.remove("name").map(|v| scalar("name", &v)).transpose()?;
            let value = entries.remove("value").map(|v| scalar("value", &v)).transpose()?;
            let term = match (name, value) {
                (Some(name), Some(value)) if !name.is_empty() && !value.is_empty() => {
                    Some(format!("{} {}", name, value))
                }
                (Some(name), _) if !name.is_empty() => Some(name),
                (_, Some(value)) if !value.is_empty() => Some(value),
                _ => None,
            };
            if let Some(term) = term {
                query.insert("term", WireValue::One(term));
            }
        }
    }
    pass_through(entries, &mut query)?;

    // Everything is validated by now; a lookup by id ignores the rest.
    if let Some(id) = id {
        return Ok(Prepared::ById(id));
    }

    if let Some(window) = window {
        let (start, end) = window.close(transport).await?;
        query.insert("start_date", WireValue::One(start));
        query.insert("end_date", WireValue::One(end));
    }

    Ok(Prepared::Search(query))
}

/// Promote ISO 639-2/B codes to language references.
fn normalize_languages(value: FilterValue) -> Result<FilterValue, ArchiveError> {
    let items = match value {
        FilterValue::List(items) => items,
        single => vec![single],
    };
    items
        .into_iter()
        .map(|item| match item {
            FilterValue::Resource(r) if r.kind == ResourceKind::Language => {
                Ok(FilterValue::Resource(r))
            }
            FilterValue::Text(code) if code.chars().count() == 3 => Ok(FilterValue::Resource(
                ResourceRef::new(ResourceKind::Language, code),
            )),
            other => Err(ArchiveError::MalformedLanguageSearch(format!(
                "expected a Language or an ISO 639-2/B code, got {:?}",
                other
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(FilterValue::List)
}

/// Rename relation filters and reduce them to id lists.
fn relations(
    entries: &mut BTreeMap<String, FilterValue>,
    query: &mut WireQuery,
) -> Result<(), ArchiveError> {
    for (plural, singular, kind) in RELATION_RENAMES {
        let Some(value) = entries.remove(*plural) else {
            continue;
        };
        let ids = relation_ids(plural, *kind, value)?;

        if SINGLE_VALUED.contains(singular) {
            match <[String; 1]>::try_from(ids) {
                Ok([id]) => query.insert(*singular, WireValue::One(id)),
                Err(ids) => {
                    return Err(ArchiveError::InvalidSearchField(format!(
                        "'{}' takes exactly one {}, got {}",
                        plural,
                        singular,
                        ids.len()
                    )))
                }
            }
        } else if ARRAY_KEYS.contains(singular) {
            query.insert(format!("{}[]", singular), WireValue::Many(ids));
        } else {
            query.insert(*singular, WireValue::Many(ids));
        }
    }
    Ok(())
}

fn relation_ids(
    name: &str,
    kind: ResourceKind,
    value: FilterValue,
) -> Result<Vec<String>, ArchiveError> {
    let items = match value {
        FilterValue::List(items) => items,
        single => vec![single],
    };
    items
        .into_iter()
        .map(|item| match item {
            FilterValue::Resource(r) if r.kind == kind => Ok(r.id),
            FilterValue::Resource(r) => Err(ArchiveError::InvalidSearchField(format!(
                "'{}' takes {} records, got {}",
                name, kind, r
            ))),
            other => Err(ArchiveError::InvalidSearchField(format!(
                "'{}' takes related records, got {:?}",
                name, other
            ))),
        })
        .collect()
}

fn pass_through(
    entries: BTreeMap<String, FilterValue>,
    query: &mut WireQuery,
) -> Result<(), ArchiveError> {
    for (name, value) in entries {
        let wire = match value {
            FilterValue::List(items) => WireValue::Many(
                items
                    .iter()
                    .map(|item| scalar(&name, item))
                    .collect::<Result<_, _>>()?,
            ),
            single => WireValue::One(scalar(&name, &single)?),
        };
        query.insert(name, wire);
    }
    Ok(())
}

fn scalar(name: &str, value: &FilterValue) -> Result<String, ArchiveError> {
    match value {
        FilterValue::Text(text) => Ok(text.clone()),
        FilterValue::Date(date) => Ok(format_archive_date(*date)),
        FilterValue::Resource(r) => Ok(r.id.clone()),
        FilterValue::List(_) => Err(ArchiveError::InvalidSearchField(format!(
            "'{}' takes a single value",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Collection, Resource, Subject, Theme};
    use crate::transport::MockTransport;
    use chrono::NaiveDate;
    use serde_json::json;

    async fn search_query(kind: ResourceKind, filters: SearchFilters) -> WireQuery {
        let transport = MockTransport::new();
        match prepare(kind.schema(), filters, &transport).await.unwrap() {
            Prepared::Search(query) => query,
            Prepared::ById(id) => panic!("unexpected lookup of {}", id),
        }
    }

    fn one(value: &str) -> WireValue {
        WireValue::One(value.to_string())
    }

    #[tokio::test]
    async fn test_term_joins_name_and_value() {
        let query = search_query(
            ResourceKind::Subject,
            SearchFilters::new().with("name", "Soviet").with("value", "China"),
        )
        .await;
        assert_eq!(query.to_params(), vec![("term".to_string(), "Soviet China".to_string())]);
    }

    #[tokio::test]
    async fn test_term_from_single_field() {
        let query = search_query(ResourceKind::Contributor, SearchFilters::new().with("value", "Mao")).await;
        assert_eq!(query.get("term"), Some(&one("Mao")));

        let query = search_query(ResourceKind::Repository, SearchFilters::new()).await;
        assert!(query.to_params().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_field_rejected() {
        let transport = MockTransport::new();
        let result = prepare(
            ResourceKind::Subject.schema(),
            SearchFilters::new().with("title", "x"),
            &transport,
        )
        .await;
        assert!(matches!(result, Err(ArchiveError::InvalidSearchField(_))));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_id_short_circuits() {
        let transport = MockTransport::new();
        let prepared = prepare(
            ResourceKind::Document.schema(),
            SearchFilters::new().id("175898").with("title", "ignored"),
            &transport,
        )
        .await
        .unwrap();
        assert_eq!(prepared, Prepared::ById("175898".to_string()));
    }

    #[tokio::test]
    async fn test_document_full_text_and_model() {
        let query = search_query(
            ResourceKind::Document,
            SearchFilters::new()
                .with("description", "missile")
                .with("title", "Cuba")
                .with("q", "1962"),
        )
        .await;
        assert_eq!(query.get("q"), Some(&one("Cuba missile 1962")));
        assert_eq!(query.get("model"), Some(&one("Record")));
    }

    #[tokio::test]
    async fn test_document_q_always_present() {
        let query = search_query(ResourceKind::Document, SearchFilters::new()).await;
        assert_eq!(
            query.to_params(),
            vec![
                ("model".to_string(), "Record".to_string()),
                ("q".to_string(), String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_relation_filters() {
        let collections = [
            Collection::from_json(json!({ "id": "10", "name": "a", "slug": "a" })).unwrap(),
            Collection::from_json(json!({ "id": "11", "name": "b", "slug": "b" })).unwrap(),
        ];
        let publisher = ResourceRef::new(ResourceKind::Publisher, "3");
        let query = search_query(
            ResourceKind::Document,
            SearchFilters::new()
                .related("collections", &collections)
                .related("subjects", [&Subject::new("7", "Korea")])
                .with("publishers", vec![FilterValue::Resource(publisher)]),
        )
        .await;

        let params = query.to_params();
        assert!(params.contains(&("collection[]".to_string(), "10".to_string())));
        assert!(params.contains(&("collection[]".to_string(), "11".to_string())));
        assert!(params.contains(&("subject[]".to_string(), "7".to_string())));
        assert!(params.contains(&("publisher".to_string(), "3".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "collections"));
    }

    #[tokio::test]
    async fn test_single_valued_relations() {
        let theme = Theme::new("4", "cold-war");
        let query = search_query(
            ResourceKind::Document,
            SearchFilters::new().related("themes", [&theme]).languages(["rus"]),
        )
        .await;
        assert_eq!(query.get("theme"), Some(&one("4")));
        assert_eq!(query.get("language"), Some(&one("rus")));

        let transport = MockTransport::new();
        let result = prepare(
            ResourceKind::Document.schema(),
            SearchFilters::new().languages(["rus", "chi"]),
            &transport,
        )
        .await;
        assert!(matches!(result, Err(ArchiveError::InvalidSearchField(_))));
    }

    #[tokio::test]
    async fn test_malformed_language() {
        let transport = MockTransport::new();
        for value in [
            FilterValue::List(vec!["russian".into()]),
            FilterValue::List(vec![FilterValue::Resource(ResourceRef::new(
                ResourceKind::Subject,
                "1",
            ))]),
        ] {
            let result = prepare(
                ResourceKind::Document.schema(),
                SearchFilters::new().with("languages", value),
                &transport,
            )
            .await;
            assert!(matches!(result, Err(ArchiveError::MalformedLanguageSearch(_))));
        }
    }

    #[tokio::test]
    async fn test_single_language_code_is_a_singleton() {
        let query = search_query(ResourceKind::Document, SearchFilters::new().with("languages", "eng")).await;
        assert_eq!(query.get("language"), Some(&one("eng")));
    }

    #[tokio::test]
    async fn test_dates_encoded() {
        let query = search_query(
            ResourceKind::Document,
            SearchFilters::new()
                .with("start_date", NaiveDate::from_ymd_opt(1962, 10, 16).unwrap())
                .with("end_date", "19621028"),
        )
        .await;
        assert_eq!(query.get("start_date"), Some(&one("19621016")));
        assert_eq!(query.get("end_date"), Some(&one("19621028")));
    }

    #[tokio::test]
    async fn test_validation_runs_before_date_lookup() {
        let transport = MockTransport::new();
        transport.set_date_range("19000101", "20200101");
        let result = prepare(
            ResourceKind::Document.schema(),
            SearchFilters::new()
                .with("end_date", "19621028")
                .with("languages", "english"),
            &transport,
        )
        .await;
        assert!(matches!(result, Err(ArchiveError::MalformedLanguageSearch(_))));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_many_values_repeat_key() {
        let mut query = WireQuery::default();
        query.insert("coverage[]", WireValue::Many(vec!["1".into(), "2".into()]));
        query.insert("itemsPerPage", WireValue::One("200".into()));
        assert_eq!(
            query.to_params(),
            vec![
                ("coverage[]".to_string(), "1".to_string()),
                ("coverage[]".to_string(), "2".to_string()),
                ("itemsPerPage".to_string(), "200".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_lookup_by_id_still_validates_filters() {
        let transport = MockTransport::new();
        transport.set_date_range("18500101", "20200101");

        let result = prepare(
            ResourceKind::Document.schema(),
            SearchFilters::new().id("1").with("start_date", "1962"),
            &transport,
        )
        .await;
        assert!(matches!(result, Err(ArchiveError::MalformedDateSearch(_))));

        let result = prepare(
            ResourceKind::Document.schema(),
            SearchFilters::new().id("1").languages(["russian"]),
            &transport,
        )
        .await;
        assert!(matches!(result, Err(ArchiveError::MalformedLanguageSearch(_))));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_by_id_skips_date_range_request() {
        let transport = MockTransport::new();
        let result = prepare(
            ResourceKind::Document.schema(),
            SearchFilters::new().id("1").with("end_date", "19621028"),
            &transport,
        )
        .await
        .unwrap();
        assert_eq!(result, Prepared::ById("1".to_string()));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_relation_of_wrong_kind_rejected() {
        let transport = MockTransport::new();
        let result = prepare(
            ResourceKind::Document.schema(),
            SearchFilters::new().related("collections", [&Subject::new("7", "Korea")]),
            &transport,
        )
        .await;
        assert!(matches!(result, Err(ArchiveError::InvalidSearchField(_))));
    }
}
