use serde::{Deserialize, Serialize};

use super::de;
use super::resource::{merge_optional_fields, resource_identity};
use super::Field;

/// A geographical area referenced by a document.
///
/// Coverages form a tree. Hydrated coverages carry their parent and their
/// children; the archive reports a missing parent as `null` on some endpoints
/// and as `[]` on others, and both parse to [`Field::Null`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coverage {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub value: Field<String>,
    #[serde(
        default,
        deserialize_with = "de::parent",
        skip_serializing_if = "Field::is_unfetched"
    )]
    pub parent: Field<Box<Coverage>>,
    #[serde(default, skip_serializing_if = "Field::is_unfetched")]
    pub children: Field<Vec<Coverage>>,
}

impl Coverage {
    /// Walk up the parent chain, nearest first. Stops at the first parent
    /// that is null or not fetched.
    pub fn ancestors(&self) -> impl Iterator<Item = &Coverage> {
        std::iter::successors(self.parent.value().map(Box::as_ref), |c| {
            c.parent.value().map(Box::as_ref)
        })
    }
}

resource_identity!(Coverage, Coverage);
merge_optional_fields!(Coverage { value, parent, children });
