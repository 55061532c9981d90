//! ChargeNet reservation service
//!
//! Reads configuration from a TOML file (`~/.config/chargenet/config.toml`,
//! or the path in `CHARGENET_CONFIG`). The `chargenet` CLI in `cli/` offers
//! overrides and a config check mode on top of the same runtime.

use tracing::{error, info};

use chargenet::config::{config_path_from_env, AppConfig};
use chargenet::server::{init_tracing, ServerHandle, ServerOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path_from_env();
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config: {}. Using defaults.", e);
            cfg
        }
    };

    let handle = ServerHandle::start(ServerOptions {
        config,
        ..ServerOptions::default()
    })
    .await?;
    handle.install_signal_handler();

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}
