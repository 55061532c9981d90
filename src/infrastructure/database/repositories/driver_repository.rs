//! SeaORM implementations of DriverRepository and StaffRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, Set,
};

use super::{db_err, parse_column};
use crate::domain::driver::{Driver, DriverRepository, StaffAssignment, StaffRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::{driver, staff_assignment};

pub struct SeaOrmDriverRepository {
    db: DatabaseConnection,
}

impl SeaOrmDriverRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: driver::Model) -> DomainResult<Driver> {
    Ok(Driver {
        id: m.id,
        user_id: m.user_id,
        full_name: m.full_name,
        vehicle_connector: m
            .vehicle_connector
            .as_deref()
            .map(|raw| parse_column("drivers.vehicle_connector", raw))
            .transpose()?,
    })
}

#[async_trait]
impl DriverRepository for SeaOrmDriverRepository {
    async fn save(&self, d: Driver) -> DomainResult<Driver> {
        debug!("Saving driver for user {}", d.user_id);

        let model = driver::ActiveModel {
            id: NotSet,
            user_id: Set(d.user_id),
            full_name: Set(d.full_name),
            vehicle_connector: Set(d.vehicle_connector.map(|c| c.as_str().to_string())),
            created_at: Set(Utc::now()),
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        model_to_domain(saved)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Driver>> {
        driver::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_user_id(&self, user_id: &str) -> DomainResult<Option<Driver>> {
        driver::Entity::find()
            .filter(driver::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }
}

pub struct SeaOrmStaffRepository {
    db: DatabaseConnection,
}

impl SeaOrmStaffRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StaffRepository for SeaOrmStaffRepository {
    async fn assign(&self, a: StaffAssignment) -> DomainResult<()> {
        if self.is_assigned(&a.staff_id, a.station_id).await? {
            return Ok(());
        }
        debug!("Assigning staff {} to station {}", a.staff_id, a.station_id);

        let model = staff_assignment::ActiveModel {
            id: NotSet,
            staff_id: Set(a.staff_id),
            station_id: Set(a.station_id),
            assigned_at: Set(Utc::now()),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn is_assigned(&self, staff_id: &str, station_id: i32) -> DomainResult<bool> {
        let count = staff_assignment::Entity::find()
            .filter(staff_assignment::Column::StaffId.eq(staff_id))
            .filter(staff_assignment::Column::StationId.eq(station_id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::station::{ConnectorType, Station, StationRepository};
    use crate::infrastructure::database::repositories::SeaOrmStationRepository;
    use crate::infrastructure::database::test_support::test_db;

    #[tokio::test]
    async fn driver_lookup_by_user_id() {
        let db = test_db().await;
        let repo = SeaOrmDriverRepository::new(db);

        let mut d = Driver::new("user-42", "Ada Driver");
        d.vehicle_connector = Some(ConnectorType::Ccs2);
        let saved = repo.save(d).await.unwrap();

        let found = repo.find_by_user_id("user-42").await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert_eq!(found.vehicle_connector, Some(ConnectorType::Ccs2));
        assert!(repo.find_by_user_id("user-43").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn staff_assignment_is_idempotent() {
        let db = test_db().await;
        let station = SeaOrmStationRepository::new(db.clone())
            .save_station(Station::new("Depot", "x"))
            .await
            .unwrap();
        let repo = SeaOrmStaffRepository::new(db);

        let a = StaffAssignment {
            staff_id: "staff-1".into(),
            station_id: station.id,
        };
        repo.assign(a.clone()).await.unwrap();
        repo.assign(a).await.unwrap();

        assert!(repo.is_assigned("staff-1", station.id).await.unwrap());
        assert!(!repo.is_assigned("staff-2", station.id).await.unwrap());
    }
}
