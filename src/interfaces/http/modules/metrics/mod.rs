//! Prometheus scrape endpoint and HTTP request metrics

pub mod handlers;
pub mod middleware;

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

pub use handlers::{prometheus_metrics, MetricsState};
pub use middleware::http_metrics_middleware;

static PROMETHEUS: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the process-wide Prometheus recorder on first call.
///
/// Returns `None` when another recorder already owns the global slot; the
/// service then runs without `/metrics`.
pub fn install_recorder() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
                None
            }
        })
        .clone()
}
