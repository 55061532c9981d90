//! Time-slot validation
//!
//! Read-time advisory check. The authoritative overlap check runs again
//! inside the booking transaction.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::reservation::{slot_conflict, ReservationStatus, TimeSlot};
use crate::domain::{ChargingPoint, DomainError, DomainResult, RepositoryProvider};

pub struct SlotValidator {
    repos: Arc<dyn RepositoryProvider>,
    past_buffer: Duration,
}

impl SlotValidator {
    pub fn new(repos: Arc<dyn RepositoryProvider>, past_buffer_minutes: i64) -> Self {
        Self {
            repos,
            past_buffer: Duration::minutes(past_buffer_minutes),
        }
    }

    /// Validate `[start, end)` on a point; returns the point.
    pub async fn validate(
        &self,
        point_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DomainResult<ChargingPoint> {
        let slot = TimeSlot::new(start, end)?;
        self.validate_slot(point_id, &slot, now).await
    }

    pub async fn validate_slot(
        &self,
        point_id: i32,
        slot: &TimeSlot,
        now: DateTime<Utc>,
    ) -> DomainResult<ChargingPoint> {
        if self.is_past(slot, now) {
            return Err(DomainError::Validation(format!(
                "PastBooking: slot {} ends before {}",
                slot,
                (now + self.past_buffer).format("%Y-%m-%d %H:%M UTC")
            )));
        }

        let point = self
            .repos
            .stations()
            .find_point(point_id)
            .await?
            .ok_or_else(|| DomainError::not_found("ChargingPoint", "id", point_id))?;

        let existing = self
            .repos
            .reservations()
            .find_overlapping(point_id, slot, &ReservationStatus::ADVISORY_CONFLICT)
            .await?;
        if let Some(holder) = existing.first() {
            return Err(slot_conflict(point_id, slot, holder));
        }

        Ok(point)
    }

    /// `end <= now + buffer`
    pub fn is_past(&self, slot: &TimeSlot, now: DateTime<Utc>) -> bool {
        slot.end <= now + self.past_buffer
    }
}
