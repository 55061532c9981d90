//! # ChargeNet
//!
//! Reservation and charging-session core for EV charging stations: drivers
//! book one-hour slots on a charging point, check in by scanning the point's
//! QR code, charge, and pay; background workers expire no-shows, send
//! reminders, promote due reservations and stop overrunning sessions.
//!
//! ## Architecture
//!
//! - **domain**: entities, status machines, repository traits and ports
//! - **application**: booking, charging, search and the background workers
//! - **infrastructure**: SeaORM persistence, notification bus, adapters
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: errors, clock, retry, pagination, shutdown
//! - **server**: runtime wiring used by the binaries

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::http::create_api_router;

pub use infrastructure::NotificationBus;
