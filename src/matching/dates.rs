//! `start_date` / `end_date` handling for document searches.

use chrono::Local;

use super::filters::FilterValue;
use crate::models::de::{format_archive_date, parse_archive_date};
use crate::transport::{ArchiveError, Transport};

/// A validated, possibly open-ended date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DateWindow {
    start: Option<String>,
    end: Option<String>,
}

impl DateWindow {
    /// Validate the raw filter values. No request is made here.
    pub(crate) fn new(
        start: Option<&FilterValue>,
        end: Option<&FilterValue>,
    ) -> Result<Self, ArchiveError> {
        Ok(Self {
            start: start.map(|v| encode("start_date", v)).transpose()?,
            end: end.map(|v| encode("end_date", v)).transpose()?,
        })
    }

    /// Fill an open end and return `(start_date, end_date)` in `YYYYMMDD`.
    ///
    /// A missing end becomes today. A missing start becomes the earliest
    /// document date, which costs one date-range request.
    pub(crate) async fn close(
        self,
        transport: &dyn Transport,
    ) -> Result<(String, String), ArchiveError> {
        let end = match self.end {
            Some(end) => end,
            None => format_archive_date(Local::now().date_naive()),
        };
        let start = match self.start {
            Some(start) => start,
            None => {
                let range = transport.date_range().await?;
                let begin = parse_archive_date(&range.begin).ok_or_else(|| {
                    ArchiveError::Parse(format!("unreadable archive start date '{}'", range.begin))
                })?;
                format_archive_date(begin)
            }
        };
        Ok((start, end))
    }
}

fn encode(name: &str, value: &FilterValue) -> Result<String, ArchiveError> {
    match value {
        FilterValue::Date(date) => Ok(format_archive_date(*date)),
        FilterValue::Text(text) if text.chars().count() == 8 => Ok(text.clone()),
        FilterValue::Text(text) => Err(ArchiveError::MalformedDateSearch(format!(
            "{} '{}' must be formatted YYYYMMDD",
            name, text
        ))),
        other => Err(ArchiveError::MalformedDateSearch(format!(
            "{} must be a date or a YYYYMMDD string, got {:?}",
            name, other
        ))),
    }
}
