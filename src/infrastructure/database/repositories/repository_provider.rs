//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::driver::{DriverRepository, StaffRepository};
use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::ReservationRepository;
use crate::domain::session::SessionRepository;
use crate::domain::station::StationRepository;

use super::driver_repository::{SeaOrmDriverRepository, SeaOrmStaffRepository};
use super::reservation_repository::SeaOrmReservationRepository;
use super::session_repository::SeaOrmSessionRepository;
use super::station_repository::SeaOrmStationRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let point = repos.stations().find_point(7).await?;
/// let active = repos.sessions().find_active_for_point(7).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    stations: SeaOrmStationRepository,
    reservations: SeaOrmReservationRepository,
    sessions: SeaOrmSessionRepository,
    drivers: SeaOrmDriverRepository,
    staff: SeaOrmStaffRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            stations: SeaOrmStationRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db.clone()),
            sessions: SeaOrmSessionRepository::new(db.clone()),
            drivers: SeaOrmDriverRepository::new(db.clone()),
            staff: SeaOrmStaffRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn stations(&self) -> &dyn StationRepository {
        &self.stations
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn sessions(&self) -> &dyn SessionRepository {
        &self.sessions
    }

    fn drivers(&self) -> &dyn DriverRepository {
        &self.drivers
    }

    fn staff(&self) -> &dyn StaffRepository {
        &self.staff
    }
}
