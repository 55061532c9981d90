//! Booking: slot validation, reservation lifecycle and check-in

pub mod check_in;
pub mod codes;
pub mod reservation_service;
pub mod slot_validator;

pub use check_in::{CheckInOutcome, CheckInService};
pub use codes::RandomCodeGenerator;
pub use reservation_service::ReservationService;
pub use slot_validator::SlotValidator;

/// Booking rules
#[derive(Debug, Clone)]
pub struct BookingSettings {
    /// A slot must end more than this many minutes after "now"
    pub past_buffer_minutes: i64,
    /// Code draws before giving up with `Exhausted`
    pub code_attempts: u32,
    /// Default window for the upcoming-reservations listing
    pub upcoming_horizon_hours: i64,
    /// How early before the slot start a driver may check in
    pub check_in_grace_minutes: i64,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            past_buffer_minutes: 5,
            code_attempts: 5,
            upcoming_horizon_hours: 24,
            check_in_grace_minutes: 15,
        }
    }
}
