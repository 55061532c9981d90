//! ChargeNet CLI server
//!
//! Headless reservation and charging-session service, suitable for a
//! systemd unit, a container or a plain process.
//!
//! ```sh
//! # Default config (~/.config/chargenet/config.toml)
//! chargenet
//!
//! # Custom config path
//! chargenet --config /etc/chargenet/config.toml
//!
//! # Write a config file with every default spelled out
//! chargenet --config ./chargenet.toml --init-config
//!
//! # Validate config without starting
//! chargenet --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use chargenet::config::{default_config_path, AppConfig};
use chargenet::server::{init_tracing, ServerHandle, ServerOptions};

/// ChargeNet: charging-slot reservations and session lifecycle.
#[derive(Parser, Debug)]
#[command(
    name = "chargenet",
    version,
    about = "Reservation and charging-session service for EV charging stations",
    long_about = "ChargeNet: REST API for booking one-hour charging slots, checking in \
                  with the point QR code and running charging sessions, plus the \
                  background workers that expire, remind, promote and stop them.\n\n\
                  Default config: ~/.config/chargenet/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "CHARGENET_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the database URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    init_config: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Do not install the Prometheus recorder or mount `/metrics`.
    #[arg(long)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            if cli.check {
                eprintln!("❌ Invalid configuration {}: {}", config_path.display(), e);
                std::process::exit(1);
            }
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            AppConfig::default()
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
        config.server.api_port = port;
    }
    if let Some(url) = cli.database_url {
        info!("CLI override: database_url = {}", url);
        config.database.url = url;
    }
    if let Some(ref level) = cli.log_level {
        info!("CLI override: log_level = {}", level);
        config.logging.level = level.clone();
    }
    config.validate()?;

    if cli.init_config {
        config.save(&config_path)?;
        println!("✅ Configuration written to {}", config_path.display());
        return Ok(());
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        let workers = config.worker_settings();
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.api_address());
        println!("   Database    : {}", config.database.connection_url());
        println!("   Log level   : {}", config.logging.level);
        println!("   Workers     : every {}s, {:?}", workers.poll_interval.as_secs(), workers.enabled);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        enable_metrics: !cli.no_metrics,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
