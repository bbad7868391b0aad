use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::de;
use super::resource::{merge_optional_fields, resource_identity};
use super::{parse_timestamp, Field};

/// A curated grouping of documents around a theme or event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Collection {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    pub slug: String,

    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub uri: Field<String>,
    #[serde(
        default,
        deserialize_with = "de::parent",
        skip_serializing_if = "Field::is_unfetched"
    )]
    pub parent: Field<Box<Collection>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub model: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub value: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub short_description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub main_src: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub thumb_src: Field<String>,
    #[serde(
        default,
        deserialize_with = "de::lenient_string",
        skip_serializing_if = "Field::is_unfetched"
    )]
    pub no_of_documents: Field<String>,
    #[serde(
        default,
        deserialize_with = "de::lenient_string",
        skip_serializing_if = "Field::is_unfetched"
    )]
    pub is_inactive: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub source_created_at: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub source_updated_at: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub first_published_at: Field<String>,
}

impl Collection {
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.source_created_at.value().and_then(|s| parse_timestamp(s))
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        self.source_updated_at.value().and_then(|s| parse_timestamp(s))
    }

    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.first_published_at.value().and_then(|s| parse_timestamp(s))
    }

    /// Number of documents in the collection, when the archive reported one.
    pub fn document_count(&self) -> Option<u64> {
        self.no_of_documents.value().and_then(|n| n.parse().ok())
    }
}

resource_identity!(Collection, Collection);
merge_optional_fields!(Collection {
    uri,
    parent,
    model,
    value,
    description,
    short_description,
    main_src,
    thumb_src,
    no_of_documents,
    is_inactive,
    source_created_at,
    source_updated_at,
    first_published_at,
});
