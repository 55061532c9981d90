//! Reservation aggregate
//!
//! Contains the Reservation entity, the half-open time slot, the status
//! transition table and the repository interface.

pub mod model;
pub mod repository;
pub mod slot;

pub use model::{
    is_valid_code, slot_conflict, CodeGenerator, NewReservation, Reservation, ReservationFilter,
    ReservationStatus,
};
pub use repository::ReservationRepository;
pub use slot::TimeSlot;
