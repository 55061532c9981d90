//! Charging session repository interface
//!
//! Every write that touches both a session and its charging point runs in
//! a single transaction inside the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{ChargingSession, NewSession, NewSessionLog, SessionClosing, SessionLog, SessionStatus};
use crate::domain::station::PointStatus;
use crate::domain::DomainResult;

/// Pause bookkeeping written together with a status change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PauseChange {
    Start {
        at: DateTime<Utc>,
        max_minutes: Option<i32>,
    },
    Clear,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Guarded start.
    ///
    /// In one transaction: fail with a conflict if the driver already has
    /// an active session; flip the point `available -> in_use` with a
    /// conditional update (no row changed means the point was claimed or is
    /// unavailable); when `new.reservation_id` is set and `claim_reservation`
    /// is true, move the reservation `booked -> checked_in`; insert.
    async fn start_guarded(
        &self,
        new: NewSession,
        claim_reservation: bool,
    ) -> DomainResult<ChargingSession>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ChargingSession>>;

    async fn find_active_for_driver(&self, driver_id: i32) -> DomainResult<Option<ChargingSession>>;

    async fn find_active_for_point(&self, point_id: i32) -> DomainResult<Option<ChargingSession>>;

    async fn find_by_reservation(&self, reservation_id: i32) -> DomainResult<Option<ChargingSession>>;

    /// Guarded close.
    ///
    /// In one transaction: fail if the session is already terminal; write
    /// `closing`; move the point from in_use/paused to `release_to` (a
    /// staff maintenance/offline mark is left untouched); settle the tied
    /// reservation (completed, or cancelled for a cancelled session);
    /// append `audit` when given.
    async fn close_guarded(
        &self,
        session_id: i32,
        closing: SessionClosing,
        release_to: PointStatus,
        audit: Option<NewSessionLog>,
    ) -> DomainResult<ChargingSession>;

    /// Guarded non-terminal change (pause / resume).
    ///
    /// In one transaction: session `from -> to` conditional on the stored
    /// status, point moved to `point_to`, pause bookkeeping applied, audit
    /// log appended.
    async fn change_status_guarded(
        &self,
        session_id: i32,
        from: SessionStatus,
        to: SessionStatus,
        point_to: PointStatus,
        pause: PauseChange,
        audit: NewSessionLog,
    ) -> DomainResult<ChargingSession>;

    /// Append a log entry and record its SOC as the session's current SOC
    async fn append_log(&self, log: NewSessionLog) -> DomainResult<SessionLog>;

    /// Logs of a session, oldest first
    async fn list_logs(&self, session_id: i32) -> DomainResult<Vec<SessionLog>>;

    async fn last_log(&self, session_id: i32) -> DomainResult<Option<SessionLog>>;

    /// In-progress sessions without end time whose reservation ended before
    /// `now` while still checked in or in progress
    async fn find_overrunning(&self, now: DateTime<Utc>) -> DomainResult<Vec<ChargingSession>>;

    async fn find_paused(&self) -> DomainResult<Vec<ChargingSession>>;
}
