//! Session lifecycle
//!
//! Starts, stops and transitions charging sessions. Every change that also
//! moves the charging point goes through one guarded repository call so
//! the point status and the session status never diverge.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::{ChargingSettings, EnergyPolicy};
use crate::application::notify::DriverNotifier;
use crate::domain::reservation::Reservation;
use crate::domain::session::{
    validate_soc, NewSession, NewSessionLog, PauseChange, SessionClosing,
};
use crate::domain::{
    ChargingPoint, ChargingSession, DomainError, DomainResult, NotificationKind, PaymentInitiator,
    PointStatus, PricingLookup, RepositoryProvider, SessionLog, SessionStatus,
};
use crate::shared::clock::SharedClock;
use crate::shared::retry::{retry_with_backoff, RetryConfig};

/// Outcome of the start pre-flight check
#[derive(Debug, Clone, PartialEq)]
pub struct CanStartSession {
    pub can_start: bool,
    pub point_status: PointStatus,
    pub driver_has_active_session: bool,
    pub reasons: Vec<String>,
}

/// One telemetry sample reported for a running session
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryReading {
    pub soc: i32,
    pub power_kw: Option<f64>,
    pub voltage: Option<f64>,
    pub temperature: Option<f64>,
}

pub struct SessionService {
    repos: Arc<dyn RepositoryProvider>,
    pricing: Arc<dyn PricingLookup>,
    payments: Arc<dyn PaymentInitiator>,
    notifier: DriverNotifier,
    energy: Arc<dyn EnergyPolicy>,
    clock: SharedClock,
    settings: ChargingSettings,
    retry: RetryConfig,
}

impl SessionService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        pricing: Arc<dyn PricingLookup>,
        payments: Arc<dyn PaymentInitiator>,
        notifier: DriverNotifier,
        energy: Arc<dyn EnergyPolicy>,
        clock: SharedClock,
        settings: ChargingSettings,
    ) -> Self {
        Self {
            repos,
            pricing,
            payments,
            notifier,
            energy,
            clock,
            settings,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn settings(&self) -> &ChargingSettings {
        &self.settings
    }

    pub async fn get_session(&self, id: i32) -> DomainResult<ChargingSession> {
        self.repos
            .sessions()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("ChargingSession", "id", id))
    }

    async fn find_point(&self, point_id: i32) -> DomainResult<ChargingPoint> {
        self.repos
            .stations()
            .find_point(point_id)
            .await?
            .ok_or_else(|| DomainError::not_found("ChargingPoint", "id", point_id))
    }

    /// Pre-flight: point available and driver without an active session.
    pub async fn can_start_session(&self, point_id: i32, driver_id: i32) -> DomainResult<CanStartSession> {
        let point = self.find_point(point_id).await?;
        let active = self.repos.sessions().find_active_for_driver(driver_id).await?;

        let mut reasons = Vec::new();
        if !point.is_available() {
            reasons.push(format!("PointUnavailable: point {} is {}", point.id, point.status));
        }
        if let Some(s) = &active {
            reasons.push(format!(
                "DriverHasActiveSession: driver {} is charging in session {}",
                driver_id, s.id
            ));
        }

        Ok(CanStartSession {
            can_start: reasons.is_empty(),
            point_status: point.status,
            driver_has_active_session: active.is_some(),
            reasons,
        })
    }

    /// Walk-in start. `qr_code`, when given, must match the point.
    #[instrument(skip(self, qr_code))]
    pub async fn start_session(
        &self,
        point_id: i32,
        driver_id: i32,
        initial_soc: i32,
        qr_code: Option<&str>,
    ) -> DomainResult<ChargingSession> {
        validate_soc(initial_soc)?;
        self.repos
            .drivers()
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Driver", "id", driver_id))?;

        let point = self.find_point(point_id).await?;
        if let Some(scanned) = qr_code {
            ensure_qr(&point, scanned)?;
        }

        let check = self.can_start_session(point_id, driver_id).await?;
        if let Some(reason) = check.reasons.into_iter().next() {
            return Err(DomainError::Conflict(reason));
        }

        self.open(
            NewSession {
                driver_id,
                point_id,
                reservation_id: None,
                initial_soc,
                start_time: self.clock.now(),
            },
            false,
        )
        .await
    }

    /// Session for a booked reservation; claims the reservation
    /// (`booked -> checked_in`) in the same transaction as the point.
    pub(crate) async fn start_for_reservation(
        &self,
        reservation: &Reservation,
        initial_soc: i32,
    ) -> DomainResult<ChargingSession> {
        validate_soc(initial_soc)?;
        self.open(
            NewSession {
                driver_id: reservation.driver_id,
                point_id: reservation.point_id,
                reservation_id: Some(reservation.id),
                initial_soc,
                start_time: self.clock.now(),
            },
            true,
        )
        .await
    }

    async fn open(&self, new: NewSession, claim_reservation: bool) -> DomainResult<ChargingSession> {
        let sessions = self.repos.sessions();
        let session = retry_with_backoff(
            &self.retry,
            || sessions.start_guarded(new.clone(), claim_reservation),
            DomainError::is_transient,
            "start_session",
        )
        .await?;
        metrics::counter!("chargenet_sessions_started_total").increment(1);
        Ok(session)
    }

    /// Stop with the driver-reported final SOC; the session completes.
    #[instrument(skip(self))]
    pub async fn stop_session(&self, session_id: i32, final_soc: i32) -> DomainResult<ChargingSession> {
        validate_soc(final_soc)?;
        let session = self.get_session(session_id).await?;
        ensure_not_terminal(&session)?;
        self.close(session, SessionStatus::Completed, final_soc, PointStatus::Available, None)
            .await
    }

    /// Generic status change along the session transition table.
    pub async fn update_status(
        &self,
        session_id: i32,
        next: SessionStatus,
    ) -> DomainResult<ChargingSession> {
        let session = self.get_session(session_id).await?;
        if !session.status.can_transition_to(next) {
            return Err(invalid_transition(&session, next));
        }

        let soc = session.last_known_soc();
        match next {
            SessionStatus::Paused => self.pause(session_id, None, "paused").await,
            SessionStatus::InProgress => self.resume(session_id, "resumed").await,
            SessionStatus::Completed => {
                self.close(session, next, soc, PointStatus::Available, None).await
            }
            SessionStatus::Interrupted => {
                let audit = NewSessionLog::audit(&session, "interrupted", self.clock.now());
                self.close(session, next, soc, PointStatus::Maintenance, Some(audit))
                    .await
            }
            SessionStatus::Cancelled => {
                let audit = NewSessionLog::audit(&session, "cancelled", self.clock.now());
                self.close(session, next, soc, PointStatus::Available, Some(audit))
                    .await
            }
        }
    }

    /// `in_progress -> paused`; the point follows to `paused`.
    pub async fn pause(
        &self,
        session_id: i32,
        max_pause_minutes: Option<i32>,
        note: &str,
    ) -> DomainResult<ChargingSession> {
        if let Some(m) = max_pause_minutes {
            if m <= 0 {
                return Err(DomainError::Validation(format!(
                    "Max pause duration must be positive, got {} minutes",
                    m
                )));
            }
        }

        let session = self.get_session(session_id).await?;
        if session.status != SessionStatus::InProgress {
            return Err(invalid_transition(&session, SessionStatus::Paused));
        }

        let now = self.clock.now();
        self.repos
            .sessions()
            .change_status_guarded(
                session_id,
                SessionStatus::InProgress,
                SessionStatus::Paused,
                PointStatus::Paused,
                PauseChange::Start {
                    at: now,
                    max_minutes: max_pause_minutes,
                },
                NewSessionLog::audit(&session, note, now),
            )
            .await
    }

    /// `paused -> in_progress`; the point goes back to `in_use`.
    pub async fn resume(&self, session_id: i32, note: &str) -> DomainResult<ChargingSession> {
        let session = self.get_session(session_id).await?;
        if session.status != SessionStatus::Paused {
            return Err(invalid_transition(&session, SessionStatus::InProgress));
        }

        let now = self.clock.now();
        self.repos
            .sessions()
            .change_status_guarded(
                session_id,
                SessionStatus::Paused,
                SessionStatus::InProgress,
                PointStatus::InUse,
                PauseChange::Clear,
                NewSessionLog::audit(&session, note, now),
            )
            .await
    }

    /// End a running or paused session as `interrupted` and park the
    /// point in maintenance for inspection.
    pub async fn emergency_stop(&self, session_id: i32, note: &str) -> DomainResult<ChargingSession> {
        let session = self.get_session(session_id).await?;
        ensure_not_terminal(&session)?;
        warn!(session_id, point_id = session.point_id, "Emergency stop: {}", note);

        let audit = NewSessionLog::audit(&session, note, self.clock.now());
        let soc = session.last_known_soc();
        self.close(
            session,
            SessionStatus::Interrupted,
            soc,
            PointStatus::Maintenance,
            Some(audit),
        )
        .await
    }

    /// Cancel a paused session whose pause budget ran out.
    pub async fn cancel_paused(&self, session_id: i32, note: &str) -> DomainResult<ChargingSession> {
        let session = self.get_session(session_id).await?;
        if session.status != SessionStatus::Paused {
            return Err(invalid_transition(&session, SessionStatus::Cancelled));
        }
        let audit = NewSessionLog::audit(&session, note, self.clock.now());
        let soc = session.last_known_soc();
        self.close(
            session,
            SessionStatus::Cancelled,
            soc,
            PointStatus::Available,
            Some(audit),
        )
        .await
    }

    /// Append a telemetry entry to an active session.
    pub async fn create_session_log(
        &self,
        session_id: i32,
        reading: TelemetryReading,
    ) -> DomainResult<SessionLog> {
        validate_soc(reading.soc)?;
        if let Some(p) = reading.power_kw {
            if !p.is_finite() || p < 0.0 {
                return Err(DomainError::Validation(format!("Power must be >= 0 kW, got {}", p)));
            }
        }

        let session = self.get_session(session_id).await?;
        if !session.is_active() {
            return Err(DomainError::InvalidState(format!(
                "Session {} is {}; telemetry is closed",
                session.id, session.status
            )));
        }

        self.repos
            .sessions()
            .append_log(NewSessionLog {
                session_id,
                soc: reading.soc,
                power_kw: reading.power_kw,
                voltage: reading.voltage,
                temperature: reading.temperature,
                note: None,
                logged_at: self.clock.now(),
            })
            .await
    }

    pub async fn list_logs(&self, session_id: i32) -> DomainResult<Vec<SessionLog>> {
        self.get_session(session_id).await?;
        self.repos.sessions().list_logs(session_id).await
    }

    /// Compute final figures and close in one guarded write. Payment and
    /// notification run after the commit and never undo it.
    async fn close(
        &self,
        session: ChargingSession,
        status: SessionStatus,
        final_soc: i32,
        release_to: PointStatus,
        audit: Option<NewSessionLog>,
    ) -> DomainResult<ChargingSession> {
        let now = self.clock.now();
        let price = self.pricing.price_per_kwh(session.point_id).await?;
        let logs = self.repos.sessions().list_logs(session.id).await?;
        let energy = self.energy.energy_kwh(&session, final_soc, &logs);
        let closing = SessionClosing::compute(&session, status, now, final_soc, energy, price);

        let closed = self
            .repos
            .sessions()
            .close_guarded(session.id, closing, release_to, audit)
            .await?;

        metrics::counter!("chargenet_sessions_closed_total", "status" => closed.status.as_str())
            .increment(1);

        if closed.status == SessionStatus::Completed {
            if let Err(e) = self.payments.initiate(&closed).await {
                warn!(session_id = closed.id, error = %e, "Payment hand-off failed");
            }
        }

        let (kind, title) = match closed.status {
            SessionStatus::Completed => (NotificationKind::SessionCompleted, "Charging complete"),
            _ => (NotificationKind::SessionInterrupted, "Charging stopped"),
        };
        self.notifier
            .notify(
                closed.driver_id,
                kind,
                title,
                format!(
                    "Session {} {}: {:.2} kWh in {} min, {}",
                    closed.id,
                    closed.status,
                    closed.energy_used_kwh,
                    closed.duration_minutes,
                    closed.final_cost
                ),
                Some(closed.id),
            )
            .await;

        info!(
            session_id = closed.id,
            status = %closed.status,
            energy_kwh = closed.energy_used_kwh,
            cost = %closed.final_cost,
            "Session closed"
        );
        Ok(closed)
    }
}

pub(crate) fn ensure_qr(point: &ChargingPoint, scanned: &str) -> DomainResult<()> {
    if point.matches_qr(scanned) {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "InvalidQrCode: scanned code does not belong to point {}",
            point.id
        )))
    }
}

fn ensure_not_terminal(session: &ChargingSession) -> DomainResult<()> {
    if session.status.is_terminal() {
        return Err(DomainError::InvalidState(format!(
            "AlreadyTerminal: session {} is {}",
            session.id, session.status
        )));
    }
    Ok(())
}

fn invalid_transition(session: &ChargingSession, next: SessionStatus) -> DomainError {
    DomainError::InvalidState(format!(
        "InvalidTransition: session {} cannot move from {} to {}",
        session.id, session.status, next
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::*;
    use crate::application::test_support::{at, harness, harness_with, pooled_harness};
    use crate::application::charging::EnergyPolicyKind;
    use crate::application::ServiceSettings;

    #[tokio::test]
    async fn stop_computes_energy_cost_and_releases_point() {
        let h = harness().await;
        let mut sub = h.bus.subscribe();
        let s = h.walk_in().await;
        assert_eq!(s.status, SessionStatus::InProgress);
        assert!(s.is_walk_in());
        assert_eq!(h.point_status().await, PointStatus::InUse);

        h.clock.advance(Duration::minutes(42));
        let done = h.services.sessions.stop_session(s.id, 80).await.unwrap();

        assert_eq!(done.status, SessionStatus::Completed);
        assert_eq!(done.final_soc, Some(80));
        assert!((done.energy_used_kwh - 36.0).abs() < 1e-9);
        assert_eq!(done.duration_minutes, 42);
        assert_eq!(done.cost_before_discount, Decimal::new(126_000, 0));
        assert_eq!(done.discount, Decimal::ZERO);
        assert_eq!(done.final_cost, Decimal::new(126_000, 0));
        assert_eq!(done.end_time, Some(at(8, 42)));
        assert_eq!(h.point_status().await, PointStatus::Available);

        assert_eq!(*h.payments.initiated.lock().unwrap(), vec![s.id]);
        let kinds: Vec<_> = sub.drain().into_iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::SessionCompleted]);
    }

    #[tokio::test]
    async fn stop_twice_is_rejected() {
        let h = harness().await;
        let s = h.walk_in().await;
        h.services.sessions.stop_session(s.id, 50).await.unwrap();
        let err = h.services.sessions.stop_session(s.id, 60).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(ref m) if m.starts_with("AlreadyTerminal")));
    }

    #[tokio::test]
    async fn payment_failure_does_not_undo_the_stop() {
        let h = harness().await;
        *h.payments.fail.lock().unwrap() = true;
        let s = h.walk_in().await;

        let done = h.services.sessions.stop_session(s.id, 30).await.unwrap();
        assert_eq!(done.status, SessionStatus::Completed);
        assert_eq!(h.point_status().await, PointStatus::Available);
    }

    #[tokio::test]
    async fn stop_keeps_a_staff_maintenance_mark() {
        let h = harness().await;
        let s = h.walk_in().await;
        h.repos
            .stations()
            .set_point_status(h.fx.point.id, PointStatus::Maintenance)
            .await
            .unwrap();

        h.services.sessions.stop_session(s.id, 40).await.unwrap();
        assert_eq!(h.point_status().await, PointStatus::Maintenance);
    }

    #[tokio::test]
    async fn occupied_point_and_busy_driver_block_a_start() {
        let h = harness().await;
        h.walk_in().await;

        let other = h.fx.second_driver(&h.db).await;
        let err = h
            .services
            .sessions
            .start_session(h.fx.point.id, other.id, 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref m) if m.starts_with("PointUnavailable")));

        let p2 = h.fx.second_point(&h.db).await;
        let err = h
            .services
            .sessions
            .start_session(p2.id, h.fx.driver.id, 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref m) if m.starts_with("DriverHasActiveSession")));

        let check = h
            .services
            .sessions
            .can_start_session(h.fx.point.id, h.fx.driver.id)
            .await
            .unwrap();
        assert!(!check.can_start);
        assert_eq!(check.point_status, PointStatus::InUse);
        assert!(check.driver_has_active_session);
        assert_eq!(check.reasons.len(), 2);

        let check = h
            .services
            .sessions
            .can_start_session(p2.id, other.id)
            .await
            .unwrap();
        assert!(check.can_start);
    }

    #[tokio::test]
    async fn start_validates_soc_and_qr() {
        let h = harness().await;
        let err = h
            .services
            .sessions
            .start_session(h.fx.point.id, h.fx.driver.id, 101, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = h
            .services
            .sessions
            .start_session(h.fx.point.id, h.fx.driver.id, 20, Some("POINT-9-Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.starts_with("InvalidQrCode")));

        let s = h
            .services
            .sessions
            .start_session(h.fx.point.id, h.fx.driver.id, 20, Some(&h.fx.point.qr_code))
            .await
            .unwrap();
        assert_eq!(s.initial_soc, 20);
    }

    #[tokio::test]
    async fn update_status_follows_the_transition_table() {
        let h = harness().await;
        let s = h.walk_in().await;

        let err = h
            .services
            .sessions
            .update_status(s.id, SessionStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(ref m) if m.starts_with("InvalidTransition")));

        let paused = h
            .services
            .sessions
            .update_status(s.id, SessionStatus::Paused)
            .await
            .unwrap();
        assert_eq!(paused.status, SessionStatus::Paused);
        assert_eq!(paused.paused_at, Some(at(8, 0)));
        assert_eq!(h.point_status().await, PointStatus::Paused);

        let resumed = h
            .services
            .sessions
            .update_status(s.id, SessionStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(resumed.paused_at, None);

        let interrupted = h
            .services
            .sessions
            .update_status(s.id, SessionStatus::Interrupted)
            .await
            .unwrap();
        assert_eq!(interrupted.status, SessionStatus::Interrupted);
        assert_eq!(h.point_status().await, PointStatus::Maintenance);
        assert!(h.payments.initiated.lock().unwrap().is_empty());

        let err = h
            .services
            .sessions
            .update_status(s.id, SessionStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn telemetry_updates_current_soc_and_closes_with_session() {
        let h = harness().await;
        let s = h.walk_in().await;

        h.clock.advance(Duration::minutes(10));
        let log = h
            .services
            .sessions
            .create_session_log(
                s.id,
                TelemetryReading {
                    soc: 35,
                    power_kw: Some(50.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(log.soc, 35);
        assert_eq!(
            h.services.sessions.get_session(s.id).await.unwrap().current_soc,
            Some(35)
        );

        let err = h
            .services
            .sessions
            .create_session_log(
                s.id,
                TelemetryReading {
                    soc: 40,
                    power_kw: Some(-1.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        h.services.sessions.stop_session(s.id, 50).await.unwrap();
        let err = h
            .services
            .sessions
            .create_session_log(
                s.id,
                TelemetryReading {
                    soc: 55,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(h.services.sessions.list_logs(s.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn telemetry_policy_integrates_logged_power() {
        let mut settings = ServiceSettings::default();
        settings.charging.energy_policy = EnergyPolicyKind::Telemetry;
        let h = harness_with(settings).await;
        let s = h.walk_in().await;

        for (minute, soc) in [(0, 20), (30, 40), (60, 60)] {
            h.clock.set(at(8, 0) + Duration::minutes(minute));
            h.services
                .sessions
                .create_session_log(
                    s.id,
                    TelemetryReading {
                        soc,
                        power_kw: Some(40.0),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let done = h.services.sessions.stop_session(s.id, 60).await.unwrap();
        assert!((done.energy_used_kwh - 40.0).abs() < 1e-9);
        assert_eq!(done.final_cost, Decimal::new(140_000, 0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_walk_ins_on_one_point_have_one_winner() {
        let (h, _file) = pooled_harness(5).await;
        let drivers = h.add_drivers(10..18).await;

        let mut handles = Vec::new();
        for driver_id in drivers {
            let sessions = h.services.sessions.clone();
            let point_id = h.fx.point.id;
            handles.push(tokio::spawn(async move {
                sessions.start_session(point_id, driver_id, 20, None).await
            }));
        }

        let mut winners = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(session) => winners.push(session),
                Err(DomainError::Conflict(m)) => {
                    assert!(m.starts_with("PointUnavailable"), "{}", m)
                }
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(h.point_status().await, PointStatus::InUse);

        let active = h
            .repos
            .sessions()
            .find_active_for_point(h.fx.point.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.id, winners[0].id);
    }

    #[tokio::test]
    async fn paused_session_cannot_be_cancelled_through_update_status() {
        let h = harness().await;
        let s = h.walk_in().await;
        h.services
            .sessions
            .update_status(s.id, SessionStatus::Paused)
            .await
            .unwrap();

        let err = h
            .services
            .sessions
            .update_status(s.id, SessionStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(
            matches!(err, DomainError::InvalidState(ref m) if m.starts_with("InvalidTransition")),
            "{:?}",
            err
        );
        let still = h.services.sessions.get_session(s.id).await.unwrap();
        assert_eq!(still.status, SessionStatus::Paused);
        assert_eq!(h.point_status().await, PointStatus::Paused);

        let cancelled = h
            .services
            .sessions
            .cancel_paused(s.id, "pause timeout")
            .await
            .unwrap();
        assert_eq!(cancelled.status, SessionStatus::Cancelled);
        assert_eq!(h.point_status().await, PointStatus::Available);
    }

    #[tokio::test]
    async fn cancel_paused_releases_the_point() {
        let h = harness().await;
        let s = h.walk_in().await;
        let err = h
            .services
            .sessions
            .cancel_paused(s.id, "pause timeout")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        h.services.sessions.pause(s.id, Some(5), "paused").await.unwrap();
        let cancelled = h
            .services
            .sessions
            .cancel_paused(s.id, "pause timeout")
            .await
            .unwrap();
        assert_eq!(cancelled.status, SessionStatus::Cancelled);
        assert_eq!(h.point_status().await, PointStatus::Available);
    }

    #[tokio::test]
    async fn pause_budget_must_be_positive() {
        let h = harness().await;
        let s = h.walk_in().await;
        let err = h.services.sessions.pause(s.id, Some(0), "x").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
