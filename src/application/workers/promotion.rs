//! Promotes checked-in reservations once their session is charging

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{SweepReport, SweepWorker};
use crate::domain::{DomainResult, RepositoryProvider, ReservationStatus};

pub struct PromotionWorker {
    repos: Arc<dyn RepositoryProvider>,
}

impl PromotionWorker {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl SweepWorker for PromotionWorker {
    fn name(&self) -> &'static str {
        "promotion"
    }

    /// `checked_in -> in_progress` for reservations that have started and
    /// have an in-progress session.
    async fn sweep(&self, now: DateTime<Utc>) -> DomainResult<SweepReport> {
        let ready = self.repos.reservations().find_promotable(now).await?;
        let mut report = SweepReport {
            examined: ready.len(),
            ..Default::default()
        };

        for r in ready {
            match self
                .repos
                .reservations()
                .transition(
                    r.id,
                    &[ReservationStatus::CheckedIn],
                    ReservationStatus::InProgress,
                    None,
                    now,
                )
                .await
            {
                Ok(true) => {
                    report.changed += 1;
                    debug!(reservation_id = r.id, "Reservation in progress");
                }
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    warn!(reservation_id = r.id, error = %e, "Failed to promote reservation");
                }
            }
        }
        Ok(report)
    }
}
