//! Station / charging point repository interface

use async_trait::async_trait;

use super::model::{ChargingPoint, ConnectorType, PointStatus, Station};
use crate::domain::DomainResult;

#[async_trait]
pub trait StationRepository: Send + Sync {
    /// Insert a station, returning it with its assigned id
    async fn save_station(&self, station: Station) -> DomainResult<Station>;

    async fn find_station(&self, id: i32) -> DomainResult<Option<Station>>;

    async fn list_active_stations(&self) -> DomainResult<Vec<Station>>;

    /// Insert a charging point, returning it with its assigned id
    async fn save_point(&self, point: ChargingPoint) -> DomainResult<ChargingPoint>;

    async fn find_point(&self, id: i32) -> DomainResult<Option<ChargingPoint>>;

    async fn list_points_for_station(&self, station_id: i32) -> DomainResult<Vec<ChargingPoint>>;

    /// Points with the given connector, optionally restricted to one status
    async fn find_points_by_connector(
        &self,
        connector_type: ConnectorType,
        status: Option<PointStatus>,
    ) -> DomainResult<Vec<ChargingPoint>>;

    /// Unconditional status write, used by staff maintenance actions
    async fn set_point_status(&self, id: i32, status: PointStatus) -> DomainResult<()>;
}
