use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::asset::{MediaFile, Transcript, Translation};
use super::collection::Collection;
use super::coverage::Coverage;
use super::de;
use super::entities::{
    Classification, Contributor, Donor, Language, Publisher, Repository, Right, Subject, Type,
};
use super::resource::{merge_optional_fields, resource_identity};
use super::{parse_timestamp, Field};

/// A single record page in the archive.
///
/// Search results hold stub documents with only the required fields set.
/// Hydrating a document fills in the remaining metadata and the embedded
/// related records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub uri: String,
    pub title: String,
    /// One-sentence summary of the content
    pub description: String,
    /// Creation date in `YYYYMMDD` form
    pub doc_date: String,
    /// Creation date as displayed on the website
    pub frontend_doc_date: String,
    pub slug: String,
    pub source_created_at: String,
    pub source_updated_at: String,
    pub first_published_at: String,

    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub source: Field<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "de::one_or_many",
        skip_serializing_if = "Field::is_unfetched"
    )]
    pub type_: Field<Vec<Type>>,
    #[serde(
        default,
        deserialize_with = "de::one_or_many",
        skip_serializing_if = "Field::is_unfetched"
    )]
    pub rights: Field<Vec<Right>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub pdf_generated_at: Field<String>,
    /// Rounded-down date used for date-range matching
    #[serde(
        default,
        deserialize_with = "de::archive_date",
        serialize_with = "de::serialize_archive_date",
        skip_serializing_if = "Field::is_unfetched"
    )]
    pub date_range_start: Field<NaiveDate>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub sort_string_by_coverage: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub main_src: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub model: Field<String>,

    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub donors: Field<Vec<Donor>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub subjects: Field<Vec<Subject>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub transcripts: Field<Vec<Transcript>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub translations: Field<Vec<Translation>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub media_files: Field<Vec<MediaFile>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub languages: Field<Vec<Language>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub contributors: Field<Vec<Contributor>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub creators: Field<Vec<Contributor>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub original_coverages: Field<Vec<Coverage>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub collections: Field<Vec<Collection>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub attachments: Field<Vec<Document>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub links: Field<Vec<Document>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub repositories: Field<Vec<Repository>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub publishers: Field<Vec<Publisher>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub classifications: Field<Vec<Classification>>,
}

impl Document {
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.source_created_at)
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.source_updated_at)
    }

    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.first_published_at)
    }

    /// `doc_date` as a calendar date, when it is a complete `YYYYMMDD` date.
    pub fn date(&self) -> Option<NaiveDate> {
        de::parse_archive_date(&self.doc_date)
    }

    /// Whether the by-ID record has been merged in.
    pub fn is_hydrated(&self) -> bool {
        !self.source.is_unfetched() || !self.subjects.is_unfetched()
    }
}

resource_identity!(Document, Document);
merge_optional_fields!(Document {
    source,
    type_,
    rights,
    pdf_generated_at,
    date_range_start,
    sort_string_by_coverage,
    main_src,
    model,
    donors,
    subjects,
    transcripts,
    translations,
    media_files,
    languages,
    contributors,
    creators,
    original_coverages,
    collections,
    attachments,
    links,
    repositories,
    publishers,
    classifications,
});
