use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collection::Collection;
use super::de;
use super::resource::{merge_optional_fields, resource_identity};
use super::Field;

/// A parent container for collections on one geopolitical topic.
///
/// Themes never appear embedded in another record and are looked up by
/// `slug` rather than by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub slug: String,

    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub value: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub description: Field<String>,
    /// Banner image path
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub main_src: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub uri: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub featured_resources: Field<Vec<Value>>,
    #[serde(
        default,
        deserialize_with = "de::lenient_string",
        skip_serializing_if = "Field::is_unfetched"
    )]
    pub has_map: Field<String>,
    #[serde(
        default,
        deserialize_with = "de::lenient_string",
        skip_serializing_if = "Field::is_unfetched"
    )]
    pub has_timeline: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub featured_collections: Field<Vec<Collection>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub dates_with_events: Field<Vec<Value>>,
}

impl Theme {
    pub fn new(id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            title: Field::Unfetched,
            value: Field::Unfetched,
            description: Field::Unfetched,
            main_src: Field::Unfetched,
            uri: Field::Unfetched,
            featured_resources: Field::Unfetched,
            has_map: Field::Unfetched,
            has_timeline: Field::Unfetched,
            featured_collections: Field::Unfetched,
            dates_with_events: Field::Unfetched,
        }
    }
}

resource_identity!(Theme, Theme);
merge_optional_fields!(Theme {
    title,
    value,
    description,
    main_src,
    uri,
    featured_resources,
    has_map,
    has_timeline,
    featured_collections,
    dates_with_events,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;
    use serde_json::json;

    #[test]
    fn test_theme_parse() {
        let theme = Theme::from_json(json!({
            "id": 4,
            "slug": "cold-war-history",
            "title": "Cold War History",
            "has_map": 1,
            "has_timeline": "0",
            "featured_collections": [
                { "id": "8", "name": "Tibet", "slug": "tibet" }
            ],
            "dates_with_events": []
        }))
        .unwrap();

        assert_eq!(theme.id, "4");
        assert_eq!(theme.has_map, Field::Value("1".to_string()));
        assert_eq!(theme.featured_collections.value().unwrap()[0].id, "8");
        assert!(theme.featured_resources.is_unfetched());
    }

    #[test]
    fn test_new_theme_is_a_stub() {
        let theme = Theme::new("4", "cold-war-history");
        assert_eq!(theme.to_json().unwrap(), r#"{"id":"4","slug":"cold-war-history"}"#);
    }
}
