//! Reservation lifecycle
//!
//! Booking, listing, cancellation and check-in marking. Ownership is
//! checked by resolving the reservation's driver to its user account.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{info, instrument};

use super::{BookingSettings, SlotValidator};
use crate::application::notify::DriverNotifier;
use crate::domain::reservation::{
    CodeGenerator, NewReservation, Reservation, ReservationFilter, ReservationStatus, TimeSlot,
};
use crate::domain::{Driver, DomainError, DomainResult, NotificationKind, RepositoryProvider};
use crate::shared::clock::SharedClock;
use crate::shared::pagination::{PageRequest, PaginatedResult};
use crate::shared::retry::{retry_with_backoff, RetryConfig};

/// Statuses a reservation may be cancelled from.
const CANCELLABLE: [ReservationStatus; 3] = [
    ReservationStatus::Booked,
    ReservationStatus::CheckedIn,
    ReservationStatus::InProgress,
];

pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    notifier: DriverNotifier,
    codes: Arc<dyn CodeGenerator>,
    clock: SharedClock,
    validator: SlotValidator,
    settings: BookingSettings,
    retry: RetryConfig,
}

impl ReservationService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        notifier: DriverNotifier,
        codes: Arc<dyn CodeGenerator>,
        clock: SharedClock,
        settings: BookingSettings,
    ) -> Self {
        Self {
            validator: SlotValidator::new(repos.clone(), settings.past_buffer_minutes),
            repos,
            notifier,
            codes,
            clock,
            settings,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn settings(&self) -> &BookingSettings {
        &self.settings
    }

    /// Driver profile of a user account
    pub async fn driver_for_user(&self, user_id: &str) -> DomainResult<Driver> {
        self.repos
            .drivers()
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("DriverProfile", "user_id", user_id))
    }

    /// Book the one-hour slot `date@hour` on a point.
    #[instrument(skip(self))]
    pub async fn create_reservation(
        &self,
        user_id: &str,
        point_id: i32,
        date: NaiveDate,
        hour: u32,
    ) -> DomainResult<Reservation> {
        let driver = self.driver_for_user(user_id).await?;
        let slot = TimeSlot::for_hour(date, hour)?;
        let now = self.clock.now();

        self.validator.validate_slot(point_id, &slot, now).await?;

        let reservations = self.repos.reservations();
        let codes = self.codes.as_ref();
        let attempts = self.settings.code_attempts;
        let reservation = retry_with_backoff(
            &self.retry,
            || {
                reservations.create_guarded(
                    NewReservation {
                        driver_id: driver.id,
                        point_id,
                        slot,
                    },
                    codes,
                    attempts,
                    now,
                )
            },
            DomainError::is_transient,
            "create_reservation",
        )
        .await?;

        metrics::counter!("chargenet_reservations_created_total").increment(1);
        self.notifier
            .notify(
                driver.id,
                NotificationKind::ReservationCreated,
                "Reservation confirmed",
                format!("Reservation {} for {}", reservation.code, slot),
                Some(reservation.id),
            )
            .await;

        Ok(reservation)
    }

    pub async fn get_reservations(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Reservation>> {
        self.repos.reservations().list(filter, page).await
    }

    /// Booked reservations of the user starting within `horizon` from now
    pub async fn get_upcoming(
        &self,
        user_id: &str,
        horizon: Option<Duration>,
    ) -> DomainResult<Vec<Reservation>> {
        let driver = self.driver_for_user(user_id).await?;
        let now = self.clock.now();
        let horizon = match horizon {
            Some(h) => h,
            None => Duration::try_hours(self.settings.upcoming_horizon_hours)
                .unwrap_or(Duration::MAX),
        };
        let until = now.checked_add_signed(horizon).ok_or_else(|| {
            DomainError::Validation(format!(
                "Look-ahead of {} hours is out of range",
                horizon.num_hours()
            ))
        })?;
        self.repos
            .reservations()
            .find_upcoming_for_driver(driver.id, now, until)
            .await
    }

    pub async fn get_reservation(&self, user_id: &str, id: i32) -> DomainResult<Reservation> {
        let reservation = self
            .repos
            .reservations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", "id", id))?;
        self.ensure_owner(user_id, &reservation).await?;
        Ok(reservation)
    }

    pub async fn get_by_code(&self, user_id: &str, code: &str) -> DomainResult<Reservation> {
        let reservation = self.find_by_code(code).await?;
        self.ensure_owner(user_id, &reservation).await?;
        Ok(reservation)
    }

    pub async fn cancel_reservation(
        &self,
        user_id: &str,
        id: i32,
        reason: Option<String>,
    ) -> DomainResult<Reservation> {
        let reservation = self.get_reservation(user_id, id).await?;
        self.cancel(reservation, reason).await
    }

    pub async fn cancel_by_code(
        &self,
        user_id: &str,
        code: &str,
        reason: Option<String>,
    ) -> DomainResult<Reservation> {
        let reservation = self.get_by_code(user_id, code).await?;
        self.cancel(reservation, reason).await
    }

    /// `booked -> checked_in` without starting a session.
    pub async fn mark_checked_in(&self, user_id: &str, code: &str) -> DomainResult<Reservation> {
        let reservation = self.get_by_code(user_id, code).await?;
        ensure_can_check_in(&reservation)?;

        let now = self.clock.now();
        let moved = self
            .repos
            .reservations()
            .transition(
                reservation.id,
                &[ReservationStatus::Booked],
                ReservationStatus::CheckedIn,
                None,
                now,
            )
            .await?;
        if !moved {
            return Err(self.lost_race(reservation.id).await);
        }

        info!(code = %reservation.code, "Reservation checked in");
        self.reload(reservation.id).await
    }

    pub(crate) async fn find_by_code(&self, code: &str) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .find_by_code(code.trim())
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", "code", code))
    }

    pub(crate) async fn ensure_owner(&self, user_id: &str, reservation: &Reservation) -> DomainResult<()> {
        let owner = self.repos.drivers().find_by_id(reservation.driver_id).await?;
        match owner {
            Some(driver) if driver.user_id == user_id => Ok(()),
            _ => Err(DomainError::Unauthorized(format!(
                "NotOwner: reservation {} does not belong to user {}",
                reservation.code, user_id
            ))),
        }
    }

    async fn cancel(&self, reservation: Reservation, reason: Option<String>) -> DomainResult<Reservation> {
        if reservation.is_terminal() {
            return Err(DomainError::InvalidState(format!(
                "Reservation {} is already {}",
                reservation.code, reservation.status
            )));
        }

        if let Some(session) = self
            .repos
            .sessions()
            .find_by_reservation(reservation.id)
            .await?
            .filter(|s| s.is_active())
        {
            return Err(DomainError::InvalidState(format!(
                "Reservation {} has an active charging session {}; stop it first",
                reservation.code, session.id
            )));
        }

        let now = self.clock.now();
        let moved = self
            .repos
            .reservations()
            .transition(
                reservation.id,
                &CANCELLABLE,
                ReservationStatus::Cancelled,
                reason.clone(),
                now,
            )
            .await?;
        if !moved {
            return Err(self.lost_race(reservation.id).await);
        }

        info!(code = %reservation.code, reason = ?reason, "Reservation cancelled");
        metrics::counter!("chargenet_reservations_cancelled_total").increment(1);
        self.notifier
            .notify(
                reservation.driver_id,
                NotificationKind::ReservationCancelled,
                "Reservation cancelled",
                format!("Reservation {} for {} was cancelled", reservation.code, reservation.slot()),
                Some(reservation.id),
            )
            .await;

        self.reload(reservation.id).await
    }

    async fn reload(&self, id: i32) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", "id", id))
    }

    /// A conditional transition matched no row: somebody else moved it.
    async fn lost_race(&self, id: i32) -> DomainError {
        match self.reload(id).await {
            Ok(current) => DomainError::InvalidState(format!(
                "Reservation {} changed concurrently and is now {}",
                current.code, current.status
            )),
            Err(e) => e,
        }
    }
}

/// Only booked reservations can be checked in; a second attempt is a
/// conflict rather than a generic state error.
pub(crate) fn ensure_can_check_in(reservation: &Reservation) -> DomainResult<()> {
    match reservation.status {
        ReservationStatus::Booked => Ok(()),
        ReservationStatus::CheckedIn | ReservationStatus::InProgress => Err(DomainError::Conflict(
            format!("AlreadyCheckedIn: reservation {} is {}", reservation.code, reservation.status),
        )),
        other => Err(DomainError::InvalidState(format!(
            "Reservation {} is {} and cannot be checked in",
            reservation.code, other
        ))),
    }
}
