//! Station DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::search::{HourAvailability, StationMatch};
use crate::domain::{ChargingPoint, Station};

/// Query of `GET /api/v1/stations/search`
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Connector the vehicle needs, e.g. `CCS2`
    pub connector_type: String,
    /// Only points with a free hour on this date
    pub date: Option<NaiveDate>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Search radius around `lat`/`lon`
    pub radius_km: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityParams {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChargingPointDto {
    pub id: i32,
    pub station_id: i32,
    pub name: String,
    pub connector_type: String,
    pub power_kw: f64,
    /// Decimal string, e.g. `"3500"`
    pub price_per_kwh: String,
    pub status: String,
}

impl From<ChargingPoint> for ChargingPointDto {
    fn from(p: ChargingPoint) -> Self {
        Self {
            id: p.id,
            station_id: p.station_id,
            name: p.name,
            connector_type: p.connector_type.to_string(),
            power_kw: p.power_kw,
            price_per_kwh: p.price_per_kwh.to_string(),
            status: p.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StationDto {
    pub id: i32,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl From<Station> for StationDto {
    fn from(s: Station) -> Self {
        Self {
            id: s.id,
            name: s.name,
            address: s.address,
            latitude: s.latitude,
            longitude: s.longitude,
        }
    }
}

/// A station with the points matching the search
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StationMatchDto {
    pub station: StationDto,
    /// Present when the search had an origin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub compatible_count: usize,
    pub compatible_points: Vec<ChargingPointDto>,
}

impl From<StationMatch> for StationMatchDto {
    fn from(m: StationMatch) -> Self {
        Self {
            compatible_count: m.compatible_count(),
            station: m.station.into(),
            distance_km: m.distance_km.map(|d| (d * 100.0).round() / 100.0),
            compatible_points: m.compatible_points.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HourAvailabilityDto {
    pub hour: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
}

impl From<HourAvailability> for HourAvailabilityDto {
    fn from(h: HourAvailability) -> Self {
        Self {
            hour: h.hour,
            start_time: h.slot.start,
            end_time: h.slot.end,
            available: h.available,
        }
    }
}
