//! Typed records of the archive and the machinery they share.
//!
//! Every record kind parses from the archive's JSON into a plain struct.
//! Optional fields are [`Field`]s so that a stub record from a search result
//! and the full record from the by-ID endpoint can share one type.

mod asset;
mod collection;
mod coverage;
pub mod de;
mod document;
mod entities;
mod field;
mod resource;
mod schema;
mod theme;

pub use asset::{Asset, AssetContent, MediaFile, Transcript, Translation};
pub use collection::Collection;
pub use coverage::Coverage;
pub use document::Document;
pub use entities::{
    Classification, Contributor, Donor, Language, Publisher, Repository, Right, Subject, Type,
};
pub use field::Field;
pub use resource::{Merge, Resource, ResourceRef};
pub use schema::{KindCapabilities, Pagination, ResourceKind, Schema, TextSearch};
pub use theme::Theme;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Earliest and latest document dates held by the archive, as `YYYYMMDD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub begin: String,
    pub end: String,
}

/// Parse an archive timestamp.
///
/// The archive mostly sends RFC 3339 timestamps; offset-less timestamps
/// are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp() {
        let with_offset = parse_timestamp("2018-02-08T14:11:34-05:00").unwrap();
        assert_eq!(with_offset.offset().local_minus_utc(), -5 * 3600);

        let naive = parse_timestamp("2018-02-08 14:11:34").unwrap();
        assert_eq!(naive.hour(), 14);
        assert_eq!(naive.offset().local_minus_utc(), 0);

        assert_eq!(parse_timestamp("2018-02-08T14:11:34").map(|t| t.day()), Some(8));
        assert!(parse_timestamp("February 2018").is_none());
    }
}
