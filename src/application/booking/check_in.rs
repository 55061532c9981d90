//! Check-in: driver arrives, scans the point and charging starts
//!
//! The reservation claim (`booked -> checked_in`), the point claim
//! (`available -> in_use`) and the session insert commit together.

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use super::reservation_service::{ensure_can_check_in, ReservationService};
use crate::application::charging::session_service::ensure_qr;
use crate::application::charging::SessionService;
use crate::application::notify::DriverNotifier;
use crate::domain::{
    ChargingSession, DomainError, DomainResult, NotificationKind, RepositoryProvider, Reservation,
};
use crate::shared::clock::SharedClock;

#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    pub reservation: Reservation,
    pub session: ChargingSession,
}

pub struct CheckInService {
    repos: Arc<dyn RepositoryProvider>,
    reservations: Arc<ReservationService>,
    sessions: Arc<SessionService>,
    notifier: DriverNotifier,
    clock: SharedClock,
}

impl CheckInService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        reservations: Arc<ReservationService>,
        sessions: Arc<SessionService>,
        notifier: DriverNotifier,
        clock: SharedClock,
    ) -> Self {
        Self {
            repos,
            reservations,
            sessions,
            notifier,
            clock,
        }
    }

    pub async fn check_in(
        &self,
        user_id: &str,
        code: &str,
        point_qr_code: &str,
        initial_soc: i32,
    ) -> DomainResult<CheckInOutcome> {
        let reservation = self.reservations.get_by_code(user_id, code).await?;
        ensure_can_check_in(&reservation)?;

        let point = self
            .repos
            .stations()
            .find_point(reservation.point_id)
            .await?
            .ok_or_else(|| DomainError::not_found("ChargingPoint", "id", reservation.point_id))?;
        ensure_qr(&point, point_qr_code)?;

        let now = self.clock.now();
        let grace = Duration::minutes(self.reservations.settings().check_in_grace_minutes);
        let opens = reservation.start_time - grace;
        if now < opens || now >= reservation.end_time {
            return Err(DomainError::Validation(format!(
                "OutsideCheckInWindow: reservation {} can be checked in from {} until {}",
                reservation.code,
                opens.format("%Y-%m-%d %H:%M UTC"),
                reservation.end_time.format("%H:%M UTC")
            )));
        }

        let session = self
            .sessions
            .start_for_reservation(&reservation, initial_soc)
            .await?;

        let reservation = self
            .repos
            .reservations()
            .find_by_id(reservation.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", "id", reservation.id))?;

        info!(code = %reservation.code, session_id = session.id, "Checked in");
        self.notifier
            .notify(
                reservation.driver_id,
                NotificationKind::CheckedIn,
                "Checked in",
                format!(
                    "Reservation {} checked in, charging session {} started",
                    reservation.code, session.id
                ),
                Some(reservation.id),
            )
            .await;

        Ok(CheckInOutcome {
            reservation,
            session,
        })
    }
}
