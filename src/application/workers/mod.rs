//! Background reconciliation workers
//!
//! Each worker is a [`SweepWorker`]: one pass over the records it owns,
//! run on a fixed interval by the [`WorkerSupervisor`]. A sweep isolates
//! failures per record and reports counts instead of propagating.

pub mod auto_stop;
pub mod expiry;
pub mod paused_timeout;
pub mod promotion;
pub mod reminder;
pub mod supervisor;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use auto_stop::AutoStopWorker;
pub use expiry::ExpiryWorker;
pub use paused_timeout::PausedTimeoutWorker;
pub use promotion::PromotionWorker;
pub use reminder::ReminderWorker;
pub use supervisor::WorkerSupervisor;

use super::AppServices;
use crate::domain::DomainResult;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Candidate records found
    pub examined: usize,
    /// Records actually moved
    pub changed: usize,
    /// Records whose handling failed; retried on the next sweep
    pub failed: usize,
}

impl SweepReport {
    pub fn is_idle(&self) -> bool {
        self.examined == 0
    }
}

#[async_trait]
pub trait SweepWorker: Send + Sync {
    fn name(&self) -> &'static str;

    /// One pass at instant `now`. An `Err` means the candidate query
    /// itself failed; per-record failures are counted in the report.
    async fn sweep(&self, now: DateTime<Utc>) -> DomainResult<SweepReport>;
}

/// Which workers run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerToggles {
    pub expiry: bool,
    pub reminder: bool,
    pub promotion: bool,
    pub auto_stop: bool,
    pub paused_timeout: bool,
}

impl Default for WorkerToggles {
    fn default() -> Self {
        Self {
            expiry: true,
            reminder: true,
            promotion: true,
            auto_stop: true,
            paused_timeout: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub poll_interval: std::time::Duration,
    /// Booked reservations are expired this long after their end time
    pub expiry_grace_minutes: i64,
    /// Reminders go out for reservations starting within this window
    pub reminder_minutes: i64,
    pub enabled: WorkerToggles,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_interval: std::time::Duration::from_secs(60),
            expiry_grace_minutes: 15,
            reminder_minutes: 30,
            enabled: WorkerToggles::default(),
        }
    }
}

/// The enabled workers, wired against the shared services.
pub fn build_workers(services: &AppServices, settings: &WorkerSettings) -> Vec<Arc<dyn SweepWorker>> {
    let mut workers: Vec<Arc<dyn SweepWorker>> = Vec::new();
    let on = settings.enabled;

    if on.expiry {
        workers.push(Arc::new(ExpiryWorker::new(
            services.repos.clone(),
            services.notifier.clone(),
            settings.expiry_grace_minutes,
        )));
    }
    if on.reminder {
        workers.push(Arc::new(ReminderWorker::new(
            services.repos.clone(),
            services.notifier.clone(),
            settings.reminder_minutes,
        )));
    }
    if on.promotion {
        workers.push(Arc::new(PromotionWorker::new(services.repos.clone())));
    }
    if on.auto_stop {
        workers.push(Arc::new(AutoStopWorker::new(
            services.repos.clone(),
            services.sessions.clone(),
        )));
    }
    if on.paused_timeout {
        workers.push(Arc::new(PausedTimeoutWorker::new(
            services.repos.clone(),
            services.sessions.clone(),
        )));
    }
    workers
}
