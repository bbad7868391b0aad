//! The base [`Resource`] trait and record identity.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::schema::{ResourceKind, Schema};
use crate::transport::ArchiveError;

/// Identity of a record: its concrete kind plus its id.
///
/// Stubs and fully hydrated copies of the same record share one
/// `ResourceRef`, which is what equality and hashing are built on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Any typed record parsed from the archive.
pub trait Resource:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    const KIND: ResourceKind;

    fn id(&self) -> &str;

    fn schema() -> &'static Schema {
        Self::KIND.schema()
    }

    /// Endpoint name used for search and lookup URLs.
    fn endpoint() -> &'static str {
        Self::KIND.endpoint()
    }

    fn to_ref(&self) -> ResourceRef {
        ResourceRef::new(Self::KIND, self.id())
    }

    /// Parse one JSON object, recursively parsing embedded records.
    ///
    /// Unknown fields and missing required fields are rejected.
    fn from_json(value: Value) -> Result<Self, ArchiveError> {
        serde_json::from_value(value)
            .map_err(|e| ArchiveError::Parse(format!("{}: {}", Self::KIND, e)))
    }

    /// Serialize the record. Unfetched fields are left out.
    fn to_json(&self) -> Result<String, ArchiveError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Field-wise merge of a fresh fetch over a record already held.
pub trait Merge: Sized {
    /// Every field of `fresh` wins unless it is unfetched, in which case the
    /// value from `prior` is kept.
    fn merge(prior: Self, fresh: Self) -> Self;
}

/// Implements [`Resource`] plus id-based `PartialEq`, `Eq` and `Hash`.
macro_rules! resource_identity {
    ($ty:ident, $kind:ident) => {
        impl $crate::models::Resource for $ty {
            const KIND: $crate::models::ResourceKind = $crate::models::ResourceKind::$kind;

            fn id(&self) -> &str {
                &self.id
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&<$ty as $crate::models::Resource>::KIND, state);
                std::hash::Hash::hash(&self.id, state);
            }
        }
    };
}

/// Implements [`Merge`] for a record whose optional fields are listed.
///
/// The id is never replaced. Other required fields come from the fresh fetch.
macro_rules! merge_optional_fields {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::models::Merge for $ty {
            fn merge(prior: Self, fresh: Self) -> Self {
                Self {
                    id: prior.id,
                    $($field: fresh.$field.or_prior(prior.$field),)*
                    ..fresh
                }
            }
        }
    };
}

pub(crate) use merge_optional_fields;
pub(crate) use resource_identity;
