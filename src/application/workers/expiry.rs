//! Expires booked reservations nobody checked in for

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::{SweepReport, SweepWorker};
use crate::application::notify::DriverNotifier;
use crate::domain::{DomainResult, NotificationKind, RepositoryProvider, ReservationStatus};

pub struct ExpiryWorker {
    repos: Arc<dyn RepositoryProvider>,
    notifier: DriverNotifier,
    grace: Duration,
}

impl ExpiryWorker {
    pub fn new(repos: Arc<dyn RepositoryProvider>, notifier: DriverNotifier, grace_minutes: i64) -> Self {
        Self {
            repos,
            notifier,
            grace: Duration::minutes(grace_minutes),
        }
    }
}

#[async_trait]
impl SweepWorker for ExpiryWorker {
    fn name(&self) -> &'static str {
        "expiry"
    }

    /// `booked` reservations with `end < now - grace` become `cancelled`.
    async fn sweep(&self, now: DateTime<Utc>) -> DomainResult<SweepReport> {
        let overdue = self
            .repos
            .reservations()
            .find_booked_ended_before(now - self.grace)
            .await?;
        let mut report = SweepReport {
            examined: overdue.len(),
            ..Default::default()
        };

        for r in overdue {
            let reason = format!(
                "Expired: no check-in by {}",
                (r.end_time + self.grace).format("%Y-%m-%d %H:%M UTC")
            );
            match self
                .repos
                .reservations()
                .transition(
                    r.id,
                    &[ReservationStatus::Booked],
                    ReservationStatus::Cancelled,
                    Some(reason),
                    now,
                )
                .await
            {
                // Checked in between the query and the update
                Ok(false) => {}
                Ok(true) => {
                    report.changed += 1;
                    info!(reservation_id = r.id, code = %r.code, "Reservation expired");
                    self.notifier
                        .notify(
                            r.driver_id,
                            NotificationKind::ReservationExpired,
                            "Reservation expired",
                            format!("Reservation {} for {} expired without check-in", r.code, r.slot()),
                            Some(r.id),
                        )
                        .await;
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(reservation_id = r.id, error = %e, "Failed to expire reservation");
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::application::test_support::{at, harness, Harness};
    use crate::domain::Reservation;

    async fn booked_ending_at(h: &Harness, code: &str, end: DateTime<Utc>) -> Reservation {
        h.repos
            .reservations()
            .save(Reservation {
                id: 0,
                code: code.into(),
                driver_id: h.fx.driver.id,
                point_id: h.fx.point.id,
                start_time: end - Duration::hours(1),
                end_time: end,
                status: ReservationStatus::Booked,
                cancel_reason: None,
                reminder_sent_at: None,
                created_at: at(6, 0),
                updated_at: at(6, 0),
            })
            .await
            .unwrap()
    }

    fn worker(h: &Harness) -> ExpiryWorker {
        ExpiryWorker::new(h.repos.clone(), h.services.notifier.clone(), 15)
    }

    #[tokio::test]
    async fn expires_only_past_the_grace_period() {
        let h = harness().await;
        let now = at(12, 0);
        let grace = Duration::minutes(15);
        let late = booked_ending_at(&h, "00000001", now - grace - Duration::seconds(1)).await;
        let fresh = booked_ending_at(&h, "00000002", now - grace + Duration::seconds(1)).await;
        let mut sub = h.bus.subscribe();

        let report = worker(&h).sweep(now).await.unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.changed, 1);

        let late = h.repos.reservations().find_by_id(late.id).await.unwrap().unwrap();
        assert_eq!(late.status, ReservationStatus::Cancelled);
        assert!(late.cancel_reason.unwrap().starts_with("Expired"));
        let fresh = h.repos.reservations().find_by_id(fresh.id).await.unwrap().unwrap();
        assert_eq!(fresh.status, ReservationStatus::Booked);

        let sent = sub.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::ReservationExpired);
        assert_eq!(sent[0].related_id, Some(late.id));
    }

    #[tokio::test]
    async fn second_sweep_is_a_no_op() {
        let h = harness().await;
        booked_ending_at(&h, "00000003", at(9, 0)).await;
        let w = worker(&h);
        assert_eq!(w.sweep(at(12, 0)).await.unwrap().changed, 1);
        assert!(w.sweep(at(12, 1)).await.unwrap().is_idle());
    }
}
