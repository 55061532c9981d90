//! Reservation module: booking, lookup, cancellation and check-in

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
