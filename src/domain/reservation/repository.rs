//! Reservation repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{CodeGenerator, NewReservation, Reservation, ReservationFilter, ReservationStatus};
use super::slot::TimeSlot;
use crate::domain::DomainResult;
use crate::shared::pagination::{PageRequest, PaginatedResult};

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Plain insert without slot checks (fixtures, imports)
    async fn save(&self, reservation: Reservation) -> DomainResult<Reservation>;

    /// Guarded create.
    ///
    /// Inside one serializable transaction: re-check that no slot-holding
    /// reservation on the point overlaps `new.slot` (fails with a slot
    /// conflict), draw codes from `codes` until one is unused (fails with
    /// `Exhausted` after `max_code_attempts`), insert, commit.
    async fn create_guarded(
        &self,
        new: NewReservation,
        codes: &dyn CodeGenerator,
        max_code_attempts: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Reservation>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>>;

    async fn find_by_code(&self, code: &str) -> DomainResult<Option<Reservation>>;

    /// Reservations on `point_id` with a status in `statuses` overlapping `slot`
    async fn find_overlapping(
        &self,
        point_id: i32,
        slot: &TimeSlot,
        statuses: &[ReservationStatus],
    ) -> DomainResult<Vec<Reservation>>;

    /// Slot-holding reservations on a point that overlap `[from, to)`
    async fn find_holding_for_point(
        &self,
        point_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>>;

    /// Filtered listing, newest start time first
    async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Reservation>>;

    /// Booked reservations of a driver starting in `[from, to]`, earliest first
    async fn find_upcoming_for_driver(
        &self,
        driver_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>>;

    /// Conditional status change: applies only while the stored status is
    /// one of `from`. Returns whether a row changed.
    async fn transition(
        &self,
        id: i32,
        from: &[ReservationStatus],
        to: ReservationStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<bool>;

    /// Booked reservations whose end time is strictly before `cutoff`
    async fn find_booked_ended_before(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Reservation>>;

    /// Booked reservations with start time in `(after, until]` and no
    /// reminder sent yet
    async fn find_unreminded_starting_within(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>>;

    async fn mark_reminded(&self, id: i32, at: DateTime<Utc>) -> DomainResult<()>;

    /// Checked-in reservations with `start_time <= now` whose tied session
    /// is in progress
    async fn find_promotable(&self, now: DateTime<Utc>) -> DomainResult<Vec<Reservation>>;
}
