//! Database entities module

pub mod charging_point;
pub mod charging_session;
pub mod driver;
pub mod reservation;
pub mod session_log;
pub mod staff_assignment;
pub mod station;

pub use charging_point::Entity as ChargingPoint;
pub use charging_session::Entity as ChargingSession;
pub use driver::Entity as Driver;
pub use reservation::Entity as Reservation;
pub use session_log::Entity as SessionLog;
pub use staff_assignment::Entity as StaffAssignment;
pub use station::Entity as Station;
