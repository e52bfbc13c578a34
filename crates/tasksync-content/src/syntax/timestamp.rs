//! Creation-time decorations

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{Error, Result};

use super::config::TimestampSyntax;

const DATE_FORMAT: &str = "%Y-%m-%d";
const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// A creation time as written in a line: either a bare date or a full instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTimestamp {
    Date(NaiveDate),
    Instant(DateTime<Utc>),
}

impl ParsedTimestamp {
    /// Parse RFC 3339, a naive date-time (taken as UTC), or a bare date
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();

        if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self::Instant(instant.with_timezone(&Utc)));
        }
        for format in LOCAL_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(Self::Instant(naive.and_utc()));
            }
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Self::Date)
            .map_err(|e| Error::timestamp(value, e.to_string()))
    }

    /// The instant to store, given the instant currently stored.
    ///
    /// A bare date that agrees with the stored instant's date keeps the
    /// stored instant, so date-only dialects never erase the time of day.
    pub fn resolve(self, existing: Option<DateTime<Utc>>) -> DateTime<Utc> {
        match self {
            Self::Instant(instant) => instant,
            Self::Date(date) => match existing {
                Some(stored) if stored.date_naive() == date => stored,
                _ => date.and_time(NaiveTime::MIN).and_utc(),
            },
        }
    }
}

pub(crate) fn render(created_at: DateTime<Utc>, syntax: TimestampSyntax) -> Option<String> {
    let date = created_at.format(DATE_FORMAT);
    match syntax {
        TimestampSyntax::Hidden => None,
        TimestampSyntax::Symbol => Some(format!("@{date}")),
        TimestampSyntax::Emoji => Some(format!("➕ {date}")),
        TimestampSyntax::Dataview => Some(format!(
            "[created:: {}]",
            created_at.format("%Y-%m-%dT%H:%M:%SZ")
        )),
    }
}

/// `@2024-01-05` or `@2024-01-05T10:30`
pub(crate) fn from_symbol(token: &str) -> Option<ParsedTimestamp> {
    let value = token.strip_prefix('@')?;
    if !value.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    ParsedTimestamp::parse(value).ok()
}
