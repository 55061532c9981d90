//! Cancels sessions left paused past their pause budget

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{SweepReport, SweepWorker};
use crate::application::charging::SessionService;
use crate::domain::{DomainResult, RepositoryProvider};

pub struct PausedTimeoutWorker {
    repos: Arc<dyn RepositoryProvider>,
    sessions: Arc<SessionService>,
}

impl PausedTimeoutWorker {
    pub fn new(repos: Arc<dyn RepositoryProvider>, sessions: Arc<SessionService>) -> Self {
        Self { repos, sessions }
    }
}

#[async_trait]
impl SweepWorker for PausedTimeoutWorker {
    fn name(&self) -> &'static str {
        "paused_timeout"
    }

    async fn sweep(&self, now: DateTime<Utc>) -> DomainResult<SweepReport> {
        let default_max = self.sessions.settings().paused_max_minutes;
        let timed_out: Vec<_> = self
            .repos
            .sessions()
            .find_paused()
            .await?
            .into_iter()
            .filter(|s| s.pause_deadline(default_max).is_some_and(|d| d <= now))
            .collect();
        let mut report = SweepReport {
            examined: timed_out.len(),
            ..Default::default()
        };

        for session in timed_out {
            let minutes = session.max_pause_minutes.map(i64::from).unwrap_or(default_max);
            let note = format!("cancelled after {} min paused", minutes);
            match self.sessions.cancel_paused(session.id, &note).await {
                Ok(_) => {
                    report.changed += 1;
                    info!(session_id = session.id, minutes, "Paused session timed out");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(session_id = session.id, error = %e, "Failed to cancel paused session");
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
    use crate::application::test_support::{at, harness};
    use crate::domain::{PointStatus, SessionStatus};

    #[tokio::test]
    async fn cancels_at_the_session_pause_budget() {
        let h = harness().await;
        let s = h.walk_in().await;
        h.services.sessions.pause(s.id, Some(10), "paused").await.unwrap();
        let w = PausedTimeoutWorker::new(h.repos.clone(), h.services.sessions.clone());

        assert!(w.sweep(at(8, 9)).await.unwrap().is_idle());

        h.clock.set(at(8, 10));
        assert_eq!(w.sweep(at(8, 10)).await.unwrap().changed, 1);
        let done = h.services.sessions.get_session(s.id).await.unwrap();
        assert_eq!(done.status, SessionStatus::Cancelled);
        assert_eq!(h.point_status().await, PointStatus::Available);

        let notes: Vec<_> = h
            .services
            .sessions
            .list_logs(s.id)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|l| l.note)
            .collect();
        assert_eq!(notes.last().map(String::as_str), Some("cancelled after 10 min paused"));
    }

    #[tokio::test]
    async fn default_budget_applies_without_one() {
        let h = harness().await;
        let s = h.walk_in().await;
        h.services.sessions.pause(s.id, None, "paused").await.unwrap();
        let w = PausedTimeoutWorker::new(h.repos.clone(), h.services.sessions.clone());

        assert!(w.sweep(at(8, 0) + Duration::minutes(29)).await.unwrap().is_idle());
        assert_eq!(w.sweep(at(8, 30)).await.unwrap().changed, 1);
    }

    #[tokio::test]
    async fn resumed_sessions_are_ignored() {
        let h = harness().await;
        let s = h.walk_in().await;
        h.services.sessions.pause(s.id, Some(1), "paused").await.unwrap();
        h.services.sessions.resume(s.id, "resumed").await.unwrap();
        let w = PausedTimeoutWorker::new(h.repos.clone(), h.services.sessions.clone());
        assert!(w.sweep(at(9, 0)).await.unwrap().is_idle());
    }
}
