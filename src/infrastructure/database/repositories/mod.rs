//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod driver_repository;
pub mod repository_provider;
pub mod reservation_repository;
pub mod session_repository;
pub mod station_repository;

pub use driver_repository::{SeaOrmDriverRepository, SeaOrmStaffRepository};
pub use repository_provider::SeaOrmRepositoryProvider;
pub use reservation_repository::SeaOrmReservationRepository;
pub use session_repository::SeaOrmSessionRepository;
pub use station_repository::SeaOrmStationRepository;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::DomainError;

// ── Shared conversion helpers ──────────────────────────────────

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

/// Parse a status / enum column; a bad value means corrupt data.
pub(crate) fn parse_column<T>(column: &'static str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse()
        .map_err(|_| DomainError::Storage(format!("Unexpected value '{}' in column {}", raw, column)))
}

pub(crate) fn parse_money(column: &'static str, raw: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(raw)
        .map_err(|e| DomainError::Storage(format!("Bad decimal '{}' in column {}: {}", raw, column, e)))
}
