//! Half-open booking interval

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::shared::errors::DomainError;

/// `[start, end)` interval reserved against one charging point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    /// Fails with an invalid-range validation error unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::Validation(format!(
                "InvalidRange: start {} must be before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// The one-hour slot starting at `hour:00` UTC on `date`.
    pub fn for_hour(date: NaiveDate, hour: u32) -> Result<Self, DomainError> {
        let start = date
            .and_hms_opt(hour, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| {
                DomainError::Validation(format!("InvalidRange: hour {} is not in 0..=23", hour))
            })?;
        let end = start.checked_add_signed(Duration::hours(1)).ok_or_else(|| {
            DomainError::Validation(format!("InvalidRange: {} {}:00 is out of range", date, hour))
        })?;
        Self::new(start, end)
    }

    /// Two intervals overlap unless one ends at or before the other begins.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} – {} UTC",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%H:%M")
        )
    }
}
