//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_stations;
mod m20240101_000002_create_drivers_and_staff;
mod m20240101_000003_create_reservations;
mod m20240101_000004_create_charging_sessions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_stations::Migration),
            Box::new(m20240101_000002_create_drivers_and_staff::Migration),
            Box::new(m20240101_000003_create_reservations::Migration),
            Box::new(m20240101_000004_create_charging_sessions::Migration),
        ]
    }
}
