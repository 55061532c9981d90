//! Reservation domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::slot::TimeSlot;
use crate::shared::errors::DomainError;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationStatus {
    /// Slot confirmed, driver not yet arrived
    Booked,
    /// Driver arrived and scanned the point
    CheckedIn,
    /// Charging under this reservation has started
    InProgress,
    Completed,
    Cancelled,
    /// Driver never showed up
    NoShow,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 6] = [
        Self::Booked,
        Self::CheckedIn,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::NoShow,
    ];

    /// Statuses whose interval must never overlap another on the same point.
    pub const SLOT_HOLDING: [ReservationStatus; 4] = [
        Self::Booked,
        Self::Completed,
        Self::CheckedIn,
        Self::InProgress,
    ];

    /// Statuses consulted by the read-time advisory slot check.
    pub const ADVISORY_CONFLICT: [ReservationStatus; 2] = [Self::Booked, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::CheckedIn => "checked_in",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        match self {
            Booked => matches!(next, CheckedIn | Cancelled | NoShow),
            CheckedIn => matches!(next, InProgress | Completed | Cancelled),
            InProgress => matches!(next, Completed | Cancelled),
            Completed | Cancelled | NoShow => false,
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("Unknown reservation status '{}'", s)))
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of human-readable reservation codes.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Reservation codes are exactly 8 ASCII digits.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == 8 && code.bytes().all(|b| b.is_ascii_digit())
}

/// Booked time slot on a charging point
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: i32,
    /// 8-digit numeric code, unique across all reservations
    pub code: String,
    pub driver_id: i32,
    pub point_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub cancel_reason: Option<String>,
    /// Set once an upcoming-reservation reminder was delivered
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Validate and apply a status change.
    pub fn transition(&mut self, next: ReservationStatus, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidState(format!(
                "Reservation {} cannot move from {} to {}",
                self.code, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(ReservationStatus::Cancelled, now)?;
        self.cancel_reason = reason;
        Ok(())
    }
}

/// Data needed to create a reservation; code and id are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub driver_id: i32,
    pub point_id: i32,
    pub slot: TimeSlot,
}

/// Error for a slot that is already held by another reservation.
pub fn slot_conflict(point_id: i32, slot: &TimeSlot, holder: &Reservation) -> DomainError {
    DomainError::Conflict(format!(
        "SlotConflict: point {} is already reserved for {} by reservation {} ({} – {})",
        point_id,
        slot,
        holder.code,
        holder.start_time.format("%Y-%m-%d %H:%M"),
        holder.end_time.format("%H:%M"),
    ))
}

/// Listing filter; every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub driver_id: Option<i32>,
    pub station_id: Option<i32>,
    pub point_id: Option<i32>,
    pub status: Option<ReservationStatus>,
    /// Inclusive lower bound on start time
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on start time
    pub to: Option<DateTime<Utc>>,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample() -> Reservation {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap();
        Reservation {
            id: 1,
            code: "12345678".into(),
            driver_id: 2,
            point_id: 7,
            start_time: start,
            end_time: start + Duration::hours(1),
            status: ReservationStatus::Booked,
            cancel_reason: None,
            reminder_sent_at: None,
            created_at: start - Duration::days(1),
            updated_at: start - Duration::days(1),
        }
    }

    #[test]
    fn booked_reservation_can_be_checked_in_and_cancelled() {
        let s = ReservationStatus::Booked;
        assert!(s.can_transition_to(ReservationStatus::CheckedIn));
        assert!(s.can_transition_to(ReservationStatus::Cancelled));
        assert!(s.can_transition_to(ReservationStatus::NoShow));
        assert!(!s.can_transition_to(ReservationStatus::InProgress));
        assert!(!s.can_transition_to(ReservationStatus::Completed));
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        for from in ReservationStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ReservationStatus::ALL {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn cancel_records_reason() {
        let mut r = sample();
        let now = r.start_time - Duration::hours(2);
        r.cancel(Some("plans changed".into()), now).unwrap();
        assert_eq!(r.status, ReservationStatus::Cancelled);
        assert_eq!(r.cancel_reason.as_deref(), Some("plans changed"));
        assert_eq!(r.updated_at, now);
    }

    #[test]
    fn cancelling_twice_is_invalid_state() {
        let mut r = sample();
        r.cancel(None, Utc::now()).unwrap();
        let err = r.cancel(None, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn status_strings_roundtrip() {
        for status in ReservationStatus::ALL {
            assert_eq!(status.as_str().parse::<ReservationStatus>().unwrap(), status);
        }
        assert!("Accepted".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn code_format() {
        assert!(is_valid_code("00012345"));
        assert!(!is_valid_code("1234567"));
        assert!(!is_valid_code("1234567a"));
    }

    #[test]
    fn conflict_message_names_slot_and_holder() {
        let r = sample();
        let msg = slot_conflict(7, &r.slot(), &r).to_string();
        assert!(msg.contains("point 7"));
        assert!(msg.contains("12345678"));
        assert!(msg.contains("2024-06-01 14:00"));
    }
}
