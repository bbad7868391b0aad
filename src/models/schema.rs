//! Static per-kind schema descriptors.
//!
//! Each resource kind has one [`Schema`] that the matcher consults to
//! validate filter names and to decide how free text and pagination work
//! for that kind's search endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Operations a resource kind supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KindCapabilities: u32 {
        /// Has a search endpoint reachable through `match`
        const SEARCH = 1 << 0;
        /// Can be upgraded from a stub to a full record
        const HYDRATE = 1 << 1;
        /// Hydrates by downloading content from its own access path
        const ASSET = 1 << 2;
    }
}

/// Every kind of record the archive exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Document,
    Collection,
    Subject,
    Contributor,
    Donor,
    Coverage,
    Repository,
    Publisher,
    Type,
    Right,
    Classification,
    Language,
    Theme,
    Transcript,
    Translation,
    MediaFile,
}

/// How free-text filters are folded into the search request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSearch {
    /// `name`, `title`, `description`, `slug` and `q` are joined into `q`,
    /// and `model` is pinned to the discriminator.
    FullText { model: &'static str },
    /// `name` and `value` are joined into `term`.
    Term,
}

/// How the search endpoint reports result counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `pagination.totalItems` / `totalPages` are present
    Paged,
    /// The whole result set comes back in one list without pagination metadata
    SinglePage,
}

/// Static description of one resource kind
#[derive(Debug)]
pub struct Schema {
    pub kind: ResourceKind,
    pub endpoint: &'static str,
    /// Field names as they appear on the wire
    pub fields: &'static [&'static str],
    /// Filter names accepted on top of `fields`
    pub extra_filters: &'static [&'static str],
    pub text_search: TextSearch,
    pub pagination: Pagination,
    pub capabilities: KindCapabilities,
}

impl Schema {
    /// Whether `name` may be used as a search filter for this kind.
    pub fn accepts_filter(&self, name: &str) -> bool {
        self.fields.contains(&name) || self.extra_filters.contains(&name)
    }

    /// Every accepted filter name, for error messages.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .chain(self.extra_filters.iter())
            .copied()
            .collect()
    }
}

static DOCUMENT: Schema = Schema {
    kind: ResourceKind::Document,
    endpoint: "record",
    fields: &[
        "id",
        "uri",
        "title",
        "description",
        "doc_date",
        "frontend_doc_date",
        "slug",
        "source_created_at",
        "source_updated_at",
        "first_published_at",
        "source",
        "type",
        "rights",
        "pdf_generated_at",
        "date_range_start",
        "sort_string_by_coverage",
        "main_src",
        "model",
        "donors",
        "subjects",
        "transcripts",
        "translations",
        "media_files",
        "languages",
        "contributors",
        "creators",
        "original_coverages",
        "collections",
        "attachments",
        "links",
        "repositories",
        "publishers",
        "classifications",
    ],
    extra_filters: &["start_date", "end_date", "themes", "q"],
    text_search: TextSearch::FullText { model: "Record" },
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::SEARCH.union(KindCapabilities::HYDRATE),
};

static COLLECTION: Schema = Schema {
    kind: ResourceKind::Collection,
    endpoint: "collection",
    fields: &[
        "id",
        "name",
        "slug",
        "uri",
        "parent",
        "model",
        "value",
        "description",
        "short_description",
        "main_src",
        "thumb_src",
        "no_of_documents",
        "is_inactive",
        "source_created_at",
        "source_updated_at",
        "first_published_at",
    ],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::SEARCH.union(KindCapabilities::HYDRATE),
};

static SUBJECT: Schema = Schema {
    kind: ResourceKind::Subject,
    endpoint: "subject",
    fields: &["id", "name", "value", "uri"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::SinglePage,
    capabilities: KindCapabilities::SEARCH.union(KindCapabilities::HYDRATE),
};

static CONTRIBUTOR: Schema = Schema {
    kind: ResourceKind::Contributor,
    endpoint: "contributor",
    fields: &["id", "name", "value", "uri"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::SinglePage,
    capabilities: KindCapabilities::SEARCH.union(KindCapabilities::HYDRATE),
};

static DONOR: Schema = Schema {
    kind: ResourceKind::Donor,
    endpoint: "donor",
    fields: &["id", "name"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::empty(),
};

static COVERAGE: Schema = Schema {
    kind: ResourceKind::Coverage,
    endpoint: "coverage",
    fields: &["id", "name", "uri", "value", "parent", "children"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::SinglePage,
    capabilities: KindCapabilities::SEARCH.union(KindCapabilities::HYDRATE),
};

static REPOSITORY: Schema = Schema {
    kind: ResourceKind::Repository,
    endpoint: "repository",
    fields: &["id", "name", "uri", "value"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::SinglePage,
    capabilities: KindCapabilities::SEARCH.union(KindCapabilities::HYDRATE),
};

static PUBLISHER: Schema = Schema {
    kind: ResourceKind::Publisher,
    endpoint: "publisher",
    fields: &["id", "name", "value"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::empty(),
};

static TYPE: Schema = Schema {
    kind: ResourceKind::Type,
    endpoint: "type",
    fields: &["id", "name"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::empty(),
};

static RIGHT: Schema = Schema {
    kind: ResourceKind::Right,
    endpoint: "right",
    fields: &["id", "name", "rights"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::empty(),
};

static CLASSIFICATION: Schema = Schema {
    kind: ResourceKind::Classification,
    endpoint: "classification",
    fields: &["id", "name"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::empty(),
};

static LANGUAGE: Schema = Schema {
    kind: ResourceKind::Language,
    endpoint: "language",
    fields: &["id", "name"],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::empty(),
};

static THEME: Schema = Schema {
    kind: ResourceKind::Theme,
    endpoint: "theme",
    fields: &[
        "id",
        "slug",
        "title",
        "value",
        "description",
        "main_src",
        "uri",
        "featured_resources",
        "has_map",
        "has_timeline",
        "featured_collections",
        "dates_with_events",
    ],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::HYDRATE,
};

static TRANSCRIPT: Schema = Schema {
    kind: ResourceKind::Transcript,
    endpoint: "transcript",
    fields: &[
        "id",
        "filename",
        "content_type",
        "extension",
        "asset_id",
        "source_created_at",
        "source_updated_at",
        "url",
    ],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::HYDRATE.union(KindCapabilities::ASSET),
};

static TRANSLATION: Schema = Schema {
    kind: ResourceKind::Translation,
    endpoint: "translation",
    fields: &[
        "id",
        "filename",
        "content_type",
        "extension",
        "asset_id",
        "source_created_at",
        "source_updated_at",
        "url",
        "language",
    ],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::HYDRATE.union(KindCapabilities::ASSET),
};

static MEDIA_FILE: Schema = Schema {
    kind: ResourceKind::MediaFile,
    endpoint: "media_file",
    fields: &[
        "id",
        "filename",
        "content_type",
        "extension",
        "asset_id",
        "source_created_at",
        "source_updated_at",
        "path",
    ],
    extra_filters: &[],
    text_search: TextSearch::Term,
    pagination: Pagination::Paged,
    capabilities: KindCapabilities::HYDRATE.union(KindCapabilities::ASSET),
};

impl ResourceKind {
    pub const ALL: [ResourceKind; 16] = [
        ResourceKind::Document,
        ResourceKind::Collection,
        ResourceKind::Subject,
        ResourceKind::Contributor,
        ResourceKind::Donor,
        ResourceKind::Coverage,
        ResourceKind::Repository,
        ResourceKind::Publisher,
        ResourceKind::Type,
        ResourceKind::Right,
        ResourceKind::Classification,
        ResourceKind::Language,
        ResourceKind::Theme,
        ResourceKind::Transcript,
        ResourceKind::Translation,
        ResourceKind::MediaFile,
    ];

    pub fn schema(self) -> &'static Schema {
        match self {
            ResourceKind::Document => &DOCUMENT,
            ResourceKind::Collection => &COLLECTION,
            ResourceKind::Subject => &SUBJECT,
            ResourceKind::Contributor => &CONTRIBUTOR,
            ResourceKind::Donor => &DONOR,
            ResourceKind::Coverage => &COVERAGE,
            ResourceKind::Repository => &REPOSITORY,
            ResourceKind::Publisher => &PUBLISHER,
            ResourceKind::Type => &TYPE,
            ResourceKind::Right => &RIGHT,
            ResourceKind::Classification => &CLASSIFICATION,
            ResourceKind::Language => &LANGUAGE,
            ResourceKind::Theme => &THEME,
            ResourceKind::Transcript => &TRANSCRIPT,
            ResourceKind::Translation => &TRANSLATION,
            ResourceKind::MediaFile => &MEDIA_FILE,
        }
    }

    /// Endpoint name used to build search and lookup URLs
    pub fn endpoint(self) -> &'static str {
        self.schema().endpoint
    }

    pub fn capabilities(self) -> KindCapabilities {
        self.schema().capabilities
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Document => "Document",
            ResourceKind::Collection => "Collection",
            ResourceKind::Subject => "Subject",
            ResourceKind::Contributor => "Contributor",
            ResourceKind::Donor => "Donor",
            ResourceKind::Coverage => "Coverage",
            ResourceKind::Repository => "Repository",
            ResourceKind::Publisher => "Publisher",
            ResourceKind::Type => "Type",
            ResourceKind::Right => "Right",
            ResourceKind::Classification => "Classification",
            ResourceKind::Language => "Language",
            ResourceKind::Theme => "Theme",
            ResourceKind::Transcript => "Transcript",
            ResourceKind::Translation => "Translation",
            ResourceKind::MediaFile => "MediaFile",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_its_own_schema() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.schema().kind, kind);
            assert!(kind.schema().fields.contains(&"id"));
        }
    }

    #[test]
    fn test_capabilities() {
        let searchable: Vec<_> = ResourceKind::ALL
            .into_iter()
            .filter(|k| k.capabilities().contains(KindCapabilities::SEARCH))
            .collect();
        assert_eq!(
            searchable,
            vec![
                ResourceKind::Document,
                ResourceKind::Collection,
                ResourceKind::Subject,
                ResourceKind::Contributor,
                ResourceKind::Coverage,
                ResourceKind::Repository,
            ]
        );
        assert!(ResourceKind::Theme
            .capabilities()
            .contains(KindCapabilities::HYDRATE));
        assert!(ResourceKind::MediaFile
            .capabilities()
            .contains(KindCapabilities::ASSET));
    }

    #[test]
    fn test_document_filters() {
        let schema = ResourceKind::Document.schema();
        assert_eq!(schema.endpoint, "record");
        assert!(schema.accepts_filter("start_date"));
        assert!(schema.accepts_filter("collections"));
        assert!(schema.accepts_filter("themes"));
        assert!(!schema.accepts_filter("name"));
        assert!(!ResourceKind::Subject.schema().accepts_filter("start_date"));
    }

    #[test]
    fn test_single_page_kinds() {
        for kind in [
            ResourceKind::Subject,
            ResourceKind::Repository,
            ResourceKind::Contributor,
            ResourceKind::Coverage,
        ] {
            assert_eq!(kind.schema().pagination, Pagination::SinglePage);
        }
        assert_eq!(ResourceKind::Document.schema().pagination, Pagination::Paged);
    }
}
