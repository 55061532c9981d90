//! Runs sweep workers on an interval until shutdown

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::SweepWorker;
use crate::shared::clock::SharedClock;
use crate::shared::shutdown::ShutdownSignal;

pub struct WorkerSupervisor {
    clock: SharedClock,
    shutdown: ShutdownSignal,
    interval: std::time::Duration,
    workers: Vec<Arc<dyn SweepWorker>>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl WorkerSupervisor {
    pub fn new(clock: SharedClock, shutdown: ShutdownSignal, interval: std::time::Duration) -> Self {
        Self {
            clock,
            shutdown,
            interval,
            workers: Vec::new(),
            handles: Vec::new(),
        }
    }

    pub fn register(&mut self, worker: Arc<dyn SweepWorker>) -> &mut Self {
        self.workers.push(worker);
        self
    }

    pub fn worker_names(&self) -> Vec<&'static str> {
        self.workers.iter().map(|w| w.name()).collect()
    }

    /// Spawn one task per registered worker.
    pub fn start(&mut self) {
        for worker in self.workers.drain(..) {
            let name = worker.name();
            let handle = tokio::spawn(run_worker(
                worker,
                self.clock.clone(),
                self.shutdown.clone(),
                self.interval,
            ));
            self.handles.push((name, handle));
        }
        info!(count = self.handles.len(), "Background workers started");
    }

    /// Wait for every task to leave its loop. Call after triggering the
    /// shutdown signal.
    pub async fn join(self) {
        let (names, handles): (Vec<_>, Vec<_>) = self.handles.into_iter().unzip();
        for (name, result) in names.into_iter().zip(join_all(handles).await) {
            if let Err(e) = result {
                warn!(worker = name, error = %e, "Worker task ended abnormally");
            }
        }
        info!("Background workers stopped");
    }
}

async fn run_worker(
    worker: Arc<dyn SweepWorker>,
    clock: SharedClock,
    shutdown: ShutdownSignal,
    every: std::time::Duration,
) {
    let name = worker.name();
    info!(worker = name, interval_secs = every.as_secs(), "Worker started");

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let outcome = match AssertUnwindSafe(worker.sweep(clock.now())).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(panic) => {
                        error!(worker = name, panic = panic_message(&*panic), "Sweep panicked");
                        metrics::counter!("chargenet_worker_failures_total", "worker" => name)
                            .increment(1);
                        continue;
                    }
                };
                match outcome {
                    Ok(report) if report.is_idle() => {
                        debug!(worker = name, "Nothing to do");
                    }
                    Ok(report) => {
                        info!(
                            worker = name,
                            examined = report.examined,
                            changed = report.changed,
                            failed = report.failed,
                            "Sweep finished"
                        );
                        metrics::counter!("chargenet_worker_records_total", "worker" => name)
                            .increment(report.changed as u64);
                        if report.failed > 0 {
                            metrics::counter!("chargenet_worker_failures_total", "worker" => name)
                                .increment(report.failed as u64);
                        }
                    }
                    Err(e) => {
                        warn!(worker = name, error = %e, "Sweep failed");
                        metrics::counter!("chargenet_worker_failures_total", "worker" => name)
                            .increment(1);
                    }
                }
            }
            _ = shutdown.notified().wait() => {
                info!(worker = name, "Worker shutting down");
                break;
            }
        }
    }

    info!(worker = name, "Worker stopped");
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
