//! Station and charging point entities

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::shared::errors::DomainError;

/// Physical connector standard of a charging point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorType {
    Type1,
    Type2,
    Ccs1,
    Ccs2,
    Chademo,
    Gbt,
}

impl ConnectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type1 => "Type1",
            Self::Type2 => "Type2",
            Self::Ccs1 => "CCS1",
            Self::Ccs2 => "CCS2",
            Self::Chademo => "CHAdeMO",
            Self::Gbt => "GBT",
        }
    }
}

impl FromStr for ConnectorType {
    type Err = DomainError;

    /// Case-insensitive, so `ccs2` and `CCS2` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "type1" => Ok(Self::Type1),
            "type2" => Ok(Self::Type2),
            "ccs1" => Ok(Self::Ccs1),
            "ccs2" => Ok(Self::Ccs2),
            "chademo" => Ok(Self::Chademo),
            "gbt" => Ok(Self::Gbt),
            other => Err(DomainError::Validation(format!(
                "Unknown connector type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational status of a charging point.
///
/// This is the single source of truth for whether a new session may
/// start on the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointStatus {
    Available,
    InUse,
    Paused,
    Maintenance,
    Offline,
}

impl PointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::InUse => "in_use",
            Self::Paused => "paused",
            Self::Maintenance => "maintenance",
            Self::Offline => "offline",
        }
    }

    /// A point is occupied while a session on it is in progress or paused.
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::InUse | Self::Paused)
    }

    /// Statuses set by staff that a session stop must not overwrite.
    pub fn is_staff_hold(&self) -> bool {
        matches!(self, Self::Maintenance | Self::Offline)
    }
}

impl FromStr for PointStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "in_use" => Ok(Self::InUse),
            "paused" => Ok(Self::Paused),
            "maintenance" => Ok(Self::Maintenance),
            "offline" => Ok(Self::Offline),
            other => Err(DomainError::Validation(format!(
                "Unknown point status '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for PointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Charging station (a site with one or more points)
#[derive(Debug, Clone)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
}

impl Station {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            address: address.into(),
            latitude: None,
            longitude: None,
            is_active: true,
        }
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// A single charging point at a station
#[derive(Debug, Clone)]
pub struct ChargingPoint {
    pub id: i32,
    pub station_id: i32,
    pub name: String,
    pub connector_type: ConnectorType,
    /// Rated power in kW
    pub power_kw: f64,
    /// Energy price per kWh
    pub price_per_kwh: Decimal,
    /// Content of the QR sticker on the point, scanned at check-in
    pub qr_code: String,
    pub status: PointStatus,
}

impl ChargingPoint {
    pub fn new(
        station_id: i32,
        name: impl Into<String>,
        connector_type: ConnectorType,
        power_kw: f64,
        price_per_kwh: Decimal,
    ) -> Self {
        let name = name.into();
        Self {
            id: 0,
            station_id,
            qr_code: format!("POINT-{}-{}", station_id, name),
            name,
            connector_type,
            power_kw,
            price_per_kwh,
            status: PointStatus::Available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == PointStatus::Available
    }

    pub fn matches_qr(&self, scanned: &str) -> bool {
        self.qr_code == scanned.trim()
    }
}

// ── Tests ──────────────────────────────────────────────────────
