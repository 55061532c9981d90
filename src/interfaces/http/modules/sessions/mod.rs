//! Charging session module: walk-in start, stop and telemetry

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
