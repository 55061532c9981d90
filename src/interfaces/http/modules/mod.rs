//! Feature modules of the REST API. Each owns its DTOs and handlers.

pub mod health;
pub mod metrics;
pub mod request_id;
pub mod reservations;
pub mod sessions;
pub mod staff;
pub mod stations;
