//! Infrastructure layer - external concerns

pub mod adapters;
pub mod database;

pub use adapters::{LoggingPaymentInitiator, NotificationBus, RepositoryPricingLookup};
pub use database::repositories::SeaOrmRepositoryProvider;
pub use database::{init_database, run_migrations, DatabaseConfig};
