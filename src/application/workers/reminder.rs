//! Reminds drivers of reservations starting soon
//!
//! A reservation is reminded once: the marker is written only after the
//! notification went out, so a failed send is retried on the next sweep.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use super::{SweepReport, SweepWorker};
use crate::application::notify::DriverNotifier;
use crate::domain::{DomainResult, NotificationKind, RepositoryProvider};

pub struct ReminderWorker {
    repos: Arc<dyn RepositoryProvider>,
    notifier: DriverNotifier,
    window: Duration,
}

impl ReminderWorker {
    pub fn new(repos: Arc<dyn RepositoryProvider>, notifier: DriverNotifier, reminder_minutes: i64) -> Self {
        Self {
            repos,
            notifier,
            window: Duration::minutes(reminder_minutes),
        }
    }
}

#[async_trait]
impl SweepWorker for ReminderWorker {
    fn name(&self) -> &'static str {
        "reminder"
    }

    async fn sweep(&self, now: DateTime<Utc>) -> DomainResult<SweepReport> {
        let due = self
            .repos
            .reservations()
            .find_unreminded_starting_within(now, now + self.window)
            .await?;
        let mut report = SweepReport {
            examined: due.len(),
            ..Default::default()
        };

        for r in due {
            let minutes = (r.start_time - now).num_minutes();
            let sent = self
                .notifier
                .try_notify(
                    r.driver_id,
                    NotificationKind::ReservationReminder,
                    "Your charging slot starts soon",
                    format!(
                        "Reservation {} starts in {} min ({})",
                        r.code,
                        minutes,
                        r.slot()
                    ),
                    Some(r.id),
                )
                .await;

            let outcome = match sent {
                Ok(()) => self.repos.reservations().mark_reminded(r.id, now).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => report.changed += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(reservation_id = r.id, error = %e, "Reminder not sent");
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::application::test_support::{at, harness};

    fn june1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn reminds_once_inside_the_window() {
        let h = harness().await;
        let soon = h
            .services
            .reservations
            .create_reservation("user-1", h.fx.point.id, june1(), 14)
            .await
            .unwrap();
        let p2 = h.fx.second_point(&h.db).await;
        h.services
            .reservations
            .create_reservation("user-1", p2.id, june1(), 16)
            .await
            .unwrap();
        let w = ReminderWorker::new(h.repos.clone(), h.services.notifier.clone(), 30);
        let mut sub = h.bus.subscribe();

        assert!(w.sweep(at(13, 29)).await.unwrap().is_idle());

        let report = w.sweep(at(13, 30)).await.unwrap();
        assert_eq!(report.changed, 1);
        let sent = sub.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::ReservationReminder);
        assert_eq!(sent[0].related_id, Some(soon.id));
        assert!(sent[0].message.contains("30 min"));

        assert!(w.sweep(at(13, 40)).await.unwrap().is_idle());
        assert!(sub.drain().is_empty());

        let stored = h.repos.reservations().find_by_id(soon.id).await.unwrap().unwrap();
        assert_eq!(stored.reminder_sent_at, Some(at(13, 30)));
    }

    #[tokio::test]
    async fn cancelled_reservations_are_not_reminded() {
        let h = harness().await;
        let r = h
            .services
            .reservations
            .create_reservation("user-1", h.fx.point.id, june1(), 14)
            .await
            .unwrap();
        h.services
            .reservations
            .cancel_reservation("user-1", r.id, Some("plans changed".into()))
            .await
            .unwrap();

        let w = ReminderWorker::new(h.repos.clone(), h.services.notifier.clone(), 30);
        assert!(w.sweep(at(13, 45)).await.unwrap().is_idle());
    }
}
