//! Working calendar used to truncate instants to days.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::error::{QueryError, QueryResult};

/// A fixed-offset calendar in which day predicates are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingCalendar {
    offset: FixedOffset,
}

impl WorkingCalendar {
    /// UTC calendar.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Create a calendar with the given offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parse an offset such as `+02:00`, `-0530` or `Z`.
    pub fn parse(offset: &str) -> QueryResult<Self> {
        let raw = offset.trim();
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }

        raw.parse::<FixedOffset>().map(Self::new).map_err(|e| {
            QueryError::invalid_configuration(format!("Invalid UTC offset '{}'", offset))
                .with_suggestion("Use the form +HH:MM or -HH:MM, e.g. \"+02:00\"")
                .with_source(e)
        })
    }

    /// Get the offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The calendar day an instant falls on.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

impl Default for WorkingCalendar {
    fn default() -> Self {
        Self::utc()
    }
}
