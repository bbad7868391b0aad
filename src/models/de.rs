//! Deserialization helpers for the archive's inconsistent wire shapes.
//!
//! The list and by-ID endpoints disagree on small details: ids arrive as
//! strings or numbers, single relations arrive as an object or a one-element
//! list, and a missing parent is sometimes `null` and sometimes `[]`.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

use super::Field;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Record ids, accepted as strings or numbers.
pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Scalar::deserialize(deserializer)? {
        Scalar::Bool(_) => Err(D::Error::custom("id must be a string or a number")),
        scalar => Ok(scalar.into_string()),
    }
}

/// Optional string fields the archive sometimes sends as numbers or booleans.
pub fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Field<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_string)
        .into())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Relations sent either as a single object or as a list, stored as a list.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Field<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Field::Null,
        Some(OneOrMany::Many(items)) => Field::Value(items),
        Some(OneOrMany::One(item)) => Field::Value(vec![item]),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParentRepr<T> {
    Absent(Vec<serde_json::Value>),
    Present(Box<T>),
}

/// Self-referential parents, where a list (the archive sends `[]`) means no parent.
pub fn parent<'de, D, T>(deserializer: D) -> Result<Field<Box<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<ParentRepr<T>>::deserialize(deserializer)? {
        None | Some(ParentRepr::Absent(_)) => Field::Null,
        Some(ParentRepr::Present(parent)) => Field::Value(parent),
    })
}

/// Parse an archive date: `YYYYMMDD`, with ISO `YYYY-MM-DD` also accepted.
pub fn parse_archive_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

/// Format a date the way the archive expects it in queries.
pub fn format_archive_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Optional `YYYYMMDD` date fields.
pub fn archive_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Field<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Field::Null),
        Some(raw) => parse_archive_date(&raw)
            .map(Field::Value)
            .ok_or_else(|| D::Error::custom(format!("invalid archive date '{}'", raw))),
    }
}

pub fn serialize_archive_date<S: Serializer>(
    date: &Field<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Field::Value(date) => serializer.serialize_str(&format_archive_date(*date)),
        _ => serializer.serialize_none(),
    }
}
