//! SeaORM implementation of StationRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use super::{db_err, parse_column, parse_money};
use crate::domain::station::{
    ChargingPoint, ConnectorType, PointStatus, Station, StationRepository,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{charging_point, station};

pub struct SeaOrmStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn station_to_domain(m: station::Model) -> Station {
    Station {
        id: m.id,
        name: m.name,
        address: m.address,
        latitude: m.latitude,
        longitude: m.longitude,
        is_active: m.is_active,
    }
}

pub(crate) fn point_to_domain(m: charging_point::Model) -> DomainResult<ChargingPoint> {
    Ok(ChargingPoint {
        id: m.id,
        station_id: m.station_id,
        connector_type: parse_column("charging_points.connector_type", &m.connector_type)?,
        power_kw: m.power_kw,
        price_per_kwh: parse_money("charging_points.price_per_kwh", &m.price_per_kwh)?,
        qr_code: m.qr_code,
        status: parse_column("charging_points.status", &m.status)?,
        name: m.name,
    })
}

// ── StationRepository impl ──────────────────────────────────────

#[async_trait]
impl StationRepository for SeaOrmStationRepository {
    async fn save_station(&self, s: Station) -> DomainResult<Station> {
        debug!("Saving station: {}", s.name);

        let model = station::ActiveModel {
            id: NotSet,
            name: Set(s.name),
            address: Set(s.address),
            latitude: Set(s.latitude),
            longitude: Set(s.longitude),
            is_active: Set(s.is_active),
            created_at: Set(Utc::now()),
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        Ok(station_to_domain(saved))
    }

    async fn find_station(&self, id: i32) -> DomainResult<Option<Station>> {
        let model = station::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(station_to_domain))
    }

    async fn list_active_stations(&self) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .filter(station::Column::IsActive.eq(true))
            .order_by_asc(station::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(station_to_domain).collect())
    }

    async fn save_point(&self, p: ChargingPoint) -> DomainResult<ChargingPoint> {
        debug!("Saving charging point: {} (station {})", p.name, p.station_id);

        let model = charging_point::ActiveModel {
            id: NotSet,
            station_id: Set(p.station_id),
            name: Set(p.name),
            connector_type: Set(p.connector_type.as_str().to_string()),
            power_kw: Set(p.power_kw),
            price_per_kwh: Set(p.price_per_kwh.to_string()),
            qr_code: Set(p.qr_code),
            status: Set(p.status.as_str().to_string()),
            updated_at: Set(Utc::now()),
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        point_to_domain(saved)
    }

    async fn find_point(&self, id: i32) -> DomainResult<Option<ChargingPoint>> {
        charging_point::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(point_to_domain)
            .transpose()
    }

    async fn list_points_for_station(&self, station_id: i32) -> DomainResult<Vec<ChargingPoint>> {
        let models = charging_point::Entity::find()
            .filter(charging_point::Column::StationId.eq(station_id))
            .order_by_asc(charging_point::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(point_to_domain).collect()
    }

    async fn find_points_by_connector(
        &self,
        connector_type: ConnectorType,
        status: Option<PointStatus>,
    ) -> DomainResult<Vec<ChargingPoint>> {
        let mut query = charging_point::Entity::find()
            .filter(charging_point::Column::ConnectorType.eq(connector_type.as_str()));
        if let Some(status) = status {
            query = query.filter(charging_point::Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_asc(charging_point::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(point_to_domain).collect()
    }

    async fn set_point_status(&self, id: i32, status: PointStatus) -> DomainResult<()> {
        debug!("Setting point {} status to {}", id, status);

        let result = charging_point::Entity::update_many()
            .col_expr(
                charging_point::Column::Status,
                sea_orm::sea_query::Expr::value(status.as_str()),
            )
            .col_expr(
                charging_point::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(charging_point::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("ChargingPoint", "id", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_support::test_db;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn point_roundtrip_keeps_price_and_connector() {
        let db = test_db().await;
        let repo = SeaOrmStationRepository::new(db);

        let station = repo
            .save_station(Station::new("Depot", "1 Main St").with_location(52.52, 13.40))
            .await
            .unwrap();
        let point = repo
            .save_point(ChargingPoint::new(
                station.id,
                "A1",
                ConnectorType::Ccs2,
                150.0,
                Decimal::new(4550, 2),
            ))
            .await
            .unwrap();

        let loaded = repo.find_point(point.id).await.unwrap().unwrap();
        assert_eq!(loaded.connector_type, ConnectorType::Ccs2);
        assert_eq!(loaded.price_per_kwh, Decimal::new(4550, 2));
        assert_eq!(loaded.qr_code, format!("POINT-{}-A1", station.id));
        assert_eq!(loaded.status, PointStatus::Available);
    }

    #[tokio::test]
    async fn connector_search_filters_by_status() {
        let db = test_db().await;
        let repo = SeaOrmStationRepository::new(db);

        let station = repo.save_station(Station::new("Depot", "x")).await.unwrap();
        let a = repo
            .save_point(ChargingPoint::new(station.id, "A", ConnectorType::Type2, 22.0, Decimal::ONE))
            .await
            .unwrap();
        repo.save_point(ChargingPoint::new(station.id, "B", ConnectorType::Type2, 22.0, Decimal::ONE))
            .await
            .unwrap();
        repo.save_point(ChargingPoint::new(station.id, "C", ConnectorType::Chademo, 50.0, Decimal::ONE))
            .await
            .unwrap();
        repo.set_point_status(a.id, PointStatus::Maintenance).await.unwrap();

        let all = repo
            .find_points_by_connector(ConnectorType::Type2, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let free = repo
            .find_points_by_connector(ConnectorType::Type2, Some(PointStatus::Available))
            .await
            .unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].name, "B");
    }

    #[tokio::test]
    async fn setting_status_of_unknown_point_is_not_found() {
        let db = test_db().await;
        let repo = SeaOrmStationRepository::new(db);
        let err = repo
            .set_point_status(404, PointStatus::Offline)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
