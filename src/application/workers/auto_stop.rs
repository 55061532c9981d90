//! Stops sessions that run past their reservation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{SweepReport, SweepWorker};
use crate::application::charging::SessionService;
use crate::domain::{ChargingSession, DomainResult, RepositoryProvider};

pub struct AutoStopWorker {
    repos: Arc<dyn RepositoryProvider>,
    sessions: Arc<SessionService>,
}

impl AutoStopWorker {
    pub fn new(repos: Arc<dyn RepositoryProvider>, sessions: Arc<SessionService>) -> Self {
        Self { repos, sessions }
    }

    /// Last logged SOC, else the SOC the session started with
    async fn final_soc(&self, session: &ChargingSession) -> DomainResult<i32> {
        let last = self.repos.sessions().last_log(session.id).await?;
        Ok(last.map(|l| l.soc).unwrap_or(session.initial_soc))
    }

    async fn stop(&self, session: &ChargingSession) -> DomainResult<ChargingSession> {
        let soc = self.final_soc(session).await?;
        self.sessions.stop_session(session.id, soc).await
    }
}

#[async_trait]
impl SweepWorker for AutoStopWorker {
    fn name(&self) -> &'static str {
        "auto_stop"
    }

    async fn sweep(&self, now: DateTime<Utc>) -> DomainResult<SweepReport> {
        let overrunning = self.repos.sessions().find_overrunning(now).await?;
        let mut report = SweepReport {
            examined: overrunning.len(),
            ..Default::default()
        };

        for session in overrunning {
            match self.stop(&session).await {
                Ok(stopped) => {
                    report.changed += 1;
                    info!(
                        session_id = stopped.id,
                        final_soc = ?stopped.final_soc,
                        cost = %stopped.final_cost,
                        "Session auto-stopped at reservation end"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(session_id = session.id, error = %e, "Auto-stop failed");
                }
            }
        }
        Ok(report)
    }
}
