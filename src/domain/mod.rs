//! Domain layer: entities, status machines, repository traits and ports

pub mod driver;
pub mod ports;
pub mod repositories;
pub mod reservation;
pub mod session;
pub mod station;

pub use driver::{Driver, StaffAssignment};
pub use ports::{Notification, NotificationKind, NotificationSink, PaymentInitiator, PricingLookup};
pub use repositories::{DomainResult, RepositoryProvider};
pub use reservation::{Reservation, ReservationStatus, TimeSlot};
pub use session::{ChargingSession, SessionLog, SessionStatus};
pub use station::{ChargingPoint, ConnectorType, PointStatus, Station};

pub use crate::shared::errors::DomainError;
