//! Small reference records attached to documents.

use serde::{Deserialize, Serialize};

use super::de;
use super::resource::{merge_optional_fields, resource_identity};
use super::Field;

/// A historical topic to which documents can be related.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subject {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    /// Alias of `name`
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub value: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub uri: Field<String>,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: Field::Unfetched,
            uri: Field::Unfetched,
        }
    }
}

resource_identity!(Subject, Subject);
merge_optional_fields!(Subject { value, uri });

/// The language of a document or translation, keyed by its ISO 639-2/B code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Language {
    /// ISO 639-2/B code, e.g. `rus`
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub name: Field<String>,
}

impl Language {
    /// A language stub for an ISO 639-2/B code.
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            id: code.into(),
            name: Field::Unfetched,
        }
    }
}

resource_identity!(Language, Language);

/// A person or organization that contributed to a document, usually its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contributor {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub value: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub uri: Field<String>,
}

impl Contributor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: Field::Unfetched,
            uri: Field::Unfetched,
        }
    }
}

resource_identity!(Contributor, Contributor);
merge_optional_fields!(Contributor { value, uri });

/// An entity whose funding helped publish or translate a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Donor {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
}

resource_identity!(Donor, Donor);

/// The archive or library holding the original, physical document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Repository {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub uri: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub value: Field<String>,
}

impl Repository {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            uri: Field::Unfetched,
            value: Field::Unfetched,
        }
    }
}

resource_identity!(Repository, Repository);
merge_optional_fields!(Repository { uri, value });

/// An organization involved in publishing a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Publisher {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    pub value: String,
}

resource_identity!(Publisher, Publisher);

/// The type of a document (memo, report, meeting minutes).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Type {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
}

resource_identity!(Type, Type);

/// A copyright notice attached to a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Right {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    /// Description of the copyright requirements
    pub rights: String,
}

resource_identity!(Right, Right);

/// A security classification marking on the original document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Classification {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
}

resource_identity!(Classification, Classification);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Merge, Resource, ResourceKind};
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_hydration_state() {
        let stub = Subject::new("5", "Soviet Union");
        let full = Subject::from_json(json!({
            "id": "5",
            "name": "Soviet Union",
            "value": "Soviet Union",
            "uri": "/srv/subject/5.json"
        }))
        .unwrap();

        assert_eq!(stub, full);
        assert_ne!(stub, Subject::new("6", "Soviet Union"));
    }

    #[test]
    fn test_hash_deduplicates_by_id() {
        let set: HashSet<Contributor> = [
            Contributor::new("1", "test"),
            Contributor::new("2", "test"),
            Contributor::new("1", "test2"),
            Contributor::new("3", "test"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_refs_differ_across_kinds() {
        let subject = Subject::new("1", "test_subject");
        let contributor = Contributor::new("1", "test_contributor");
        assert_ne!(subject.to_ref(), contributor.to_ref());
        assert_eq!(contributor.to_ref().kind, ResourceKind::Contributor);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = Donor::from_json(json!({ "id": "1", "name": "Carnegie", "extra": 1 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        assert!(Right::from_json(json!({ "id": "1", "name": "Public" })).is_err());
    }

    #[test]
    fn test_merge_keeps_prior_values() {
        let mut prior = Repository::new("3", "National Archives");
        prior.uri = Field::Value("/srv/repository/3.json".to_string());

        let fresh = Repository::from_json(json!({
            "id": "3",
            "name": "National Archives (UK)",
            "value": "National Archives (UK)"
        }))
        .unwrap();

        let merged = Repository::merge(prior, fresh);
        assert_eq!(merged.name, "National Archives (UK)");
        assert_eq!(merged.uri.value().map(String::as_str), Some("/srv/repository/3.json"));
        assert_eq!(merged.value.value().map(String::as_str), Some("National Archives (UK)"));
    }

    #[test]
    fn test_to_json_skips_unfetched() {
        let language = Language::from_code("rus");
        assert_eq!(language.to_json().unwrap(), r#"{"id":"rus"}"#);
    }
}
