//! Reusable service runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: database init, migrations,
//! service graph, background workers, REST API, metrics and graceful
//! shutdown. The CLI binary and the standalone binary both start the
//! service through it.

use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::workers::{build_workers, WorkerSupervisor};
use crate::application::{AppServices, Ports, RandomCodeGenerator};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::{
    init_database, run_migrations, LoggingPaymentInitiator, NotificationBus,
    RepositoryPricingLookup, SeaOrmRepositoryProvider,
};
use crate::interfaces::http::modules::metrics::install_recorder;
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::clock::{SharedClock, SystemClock};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Mount `/metrics` and record Prometheus metrics (default: true).
    pub enable_metrics: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            enable_metrics: true,
        }
    }
}

/// Handle to a running service.
///
/// ```rust,no_run
/// use chargenet::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub services: AppServices,
    pub repos: Arc<dyn RepositoryProvider>,
    /// Fan-out of driver notifications; subscribe to observe them.
    pub notifications: NotificationBus,
    pub config: AppConfig,
    /// Address the REST API is bound to
    pub api_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    supervisor: WorkerSupervisor,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Start the service:
    ///
    /// 1. Install the Prometheus recorder
    /// 2. Connect to the database and run migrations
    /// 3. Wire repositories, ports and services
    /// 4. Start the enabled background workers
    /// 5. Serve the REST API (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting ChargeNet reservation service...");

        let prometheus = if opts.enable_metrics {
            install_recorder()
        } else {
            None
        };

        // ── Database ───────────────────────────────────────────
        let db_config = app_cfg.database_config();
        let db = init_database(&db_config).await?;
        if opts.auto_migrate {
            run_migrations(&db).await?;
        }

        // ── Repositories, ports & services ─────────────────────
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let notifications = NotificationBus::new();
        let clock: SharedClock = Arc::new(SystemClock);
        let ports = Ports {
            notifications: Arc::new(notifications.clone()),
            pricing: Arc::new(RepositoryPricingLookup::new(repos.clone())),
            payments: Arc::new(LoggingPaymentInitiator),
            codes: Arc::new(RandomCodeGenerator),
        };
        let services = AppServices::new(
            repos.clone(),
            ports,
            clock.clone(),
            app_cfg.service_settings(),
        );

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── Background workers ─────────────────────────────────
        let worker_settings = app_cfg.worker_settings();
        let mut supervisor = WorkerSupervisor::new(
            clock,
            shutdown_signal.clone(),
            worker_settings.poll_interval,
        );
        for worker in build_workers(&services, &worker_settings) {
            supervisor.register(worker);
        }
        info!(
            workers = ?supervisor.worker_names(),
            interval_secs = worker_settings.poll_interval.as_secs(),
            "Registering background workers"
        );
        supervisor.start();

        // ── REST API server ────────────────────────────────────
        let router = create_api_router(ApiState::new(services.clone(), db.clone()), prometheus);
        let listener = tokio::net::TcpListener::bind(app_cfg.api_address()).await?;
        let api_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Service started");

        Ok(Self {
            services,
            repos,
            notifications,
            config: app_cfg,
            api_addr,
            db,
            shutdown,
            supervisor,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown without waiting.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API server and every worker to stop, bounded by the
    /// configured shutdown timeout, then close the database.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            supervisor,
            api_task,
            ..
        } = self;

        let completed = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
                supervisor.join().await;
            })
            .await;
        if !completed {
            warn!("Some tasks were still running when the shutdown timeout expired");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("👋 ChargeNet shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the logging section. `RUST_LOG` wins over the
/// configured level.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.server.api_host = "127.0.0.1".into();
        cfg.server.api_port = 0;
        cfg.server.shutdown_timeout = 5;
        cfg.database.url = "sqlite::memory:".into();
        cfg.database.max_connections = 1;
        cfg
    }

    #[tokio::test]
    async fn starts_and_shuts_down_cleanly() {
        let handle = ServerHandle::start(ServerOptions {
            config: in_memory_config(),
            auto_migrate: true,
            enable_metrics: false,
        })
        .await
        .unwrap();

        assert!(handle.is_running());
        assert_ne!(handle.api_addr.port(), 0);
        assert!(handle.services.reservations.driver_for_user("nobody").await.is_err());

        tokio::time::timeout(std::time::Duration::from_secs(10), handle.shutdown())
            .await
            .expect("shutdown timed out");
    }
}
