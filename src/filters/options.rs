use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{HistoryError, Result};
use crate::models::EntryType;

/// Independent, optional constraints on entries. Empty fields impose nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Inclusive lower time bound.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper time bound.
    pub end: Option<DateTime<Utc>>,
    pub types: Vec<EntryType>,
    pub agent_id: String,
    /// Accepted tool names, compared case-insensitively.
    pub tools: Vec<String>,
    /// Regex matched against each tool invocation's serialized input.
    pub tool_pattern: String,
}

impl FilterOptions {
    pub fn has_time_window(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_time_window()
            && self.types.is_empty()
            && self.agent_id.is_empty()
            && self.tools.is_empty()
            && self.tool_pattern.is_empty()
    }
}

/// Parse a lower time bound: RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC) or a bare date, which means
/// the start of that day (UTC).
pub fn parse_start_bound(value: &str) -> Result<DateTime<Utc>> {
    parse_bound(value, NaiveTime::MIN)
}

/// Parse an upper time bound. Accepts the same forms as [`parse_start_bound`]; a bare date means
/// the last instant of that day (UTC).
pub fn parse_end_bound(value: &str) -> Result<DateTime<Utc>> {
    let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| HistoryError::InvalidTimeBound(value.to_string()))?;
    parse_bound(value, end_of_day)
}

fn parse_bound(value: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    // No offset means UTC
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(time_of_day).and_utc())
        .map_err(|_| HistoryError::InvalidTimeBound(value.to_string()))
}
