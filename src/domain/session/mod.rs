//! Charging session aggregate

pub mod model;
pub mod repository;

pub use model::{
    validate_soc, ChargingSession, NewSession, NewSessionLog, SessionClosing, SessionLog,
    SessionStatus,
};
pub use repository::{PauseChange, SessionRepository};
