//! Drivers and station staff

pub mod model;
pub mod repository;

pub use model::{Driver, StaffAssignment};
pub use repository::{DriverRepository, StaffRepository};
