//! Station aggregate
//!
//! Stations and their charging points.

pub mod model;
pub mod repository;

pub use model::{ChargingPoint, ConnectorType, PointStatus, Station};
pub use repository::StationRepository;
