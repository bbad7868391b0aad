//! Three-state field values.
//!
//! The archive returns different shapes of the same record depending on the
//! endpoint. Stub records embedded in search results or in a parent record
//! omit most optional fields, while the by-ID endpoint includes them, and
//! either one may legitimately send `null`. [`Field`] keeps those apart.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A record field that may not have been fetched yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// Not present in the representation this record was built from.
    #[default]
    Unfetched,
    /// Fetched, and the archive holds no value.
    Null,
    /// Fetched value.
    Value(T),
}

impl<T> Field<T> {
    pub fn is_unfetched(&self) -> bool {
        matches!(self, Field::Unfetched)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// The value, if one was fetched.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Field::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Field::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Unfetched => Field::Unfetched,
            Field::Null => Field::Null,
            Field::Value(value) => Field::Value(value),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Field<U> {
        match self {
            Field::Unfetched => Field::Unfetched,
            Field::Null => Field::Null,
            Field::Value(value) => Field::Value(f(value)),
        }
    }

    /// Keep `self` unless it is unfetched, in which case fall back to `prior`.
    ///
    /// This is the per-field rule used when merging a fresh fetch over an
    /// existing record: a fetched value or a fetched null always wins.
    pub fn or_prior(self, prior: Field<T>) -> Field<T> {
        match self {
            Field::Unfetched => prior,
            fetched => fetched,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Field::Value(value),
            None => Field::Null,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(value) => value.serialize(serializer),
            Field::Unfetched | Field::Null => serializer.serialize_none(),
        }
    }
}

// Absent keys never reach this impl; they take the `#[serde(default)]` path
// and stay `Unfetched`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}
