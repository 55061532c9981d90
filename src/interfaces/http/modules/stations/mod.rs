//! Station search and hourly availability

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
