//! Outbound adapters for the domain ports

pub mod notification_bus;
pub mod payment;
pub mod pricing;

pub use notification_bus::{NotificationBus, NotificationSubscriber};
pub use payment::LoggingPaymentInitiator;
pub use pricing::RepositoryPricingLookup;
