//! Charging session DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::charging::{CanStartSession, TelemetryReading};
use crate::domain::{ChargingSession, SessionLog};

/// Walk-in start on a point without a reservation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StartSessionRequest {
    pub point_id: i32,
    #[validate(range(min = 0, max = 100))]
    pub initial_soc: i32,
    /// Scanned point QR; checked against the point when present
    #[validate(length(min = 1, max = 128))]
    pub qr_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StopSessionRequest {
    #[validate(range(min = 0, max = 100))]
    pub final_soc: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SessionLogRequest {
    #[validate(range(min = 0, max = 100))]
    pub soc: i32,
    #[validate(range(min = 0.0))]
    pub power_kw: Option<f64>,
    pub voltage: Option<f64>,
    pub temperature: Option<f64>,
}

impl From<SessionLogRequest> for TelemetryReading {
    fn from(r: SessionLogRequest) -> Self {
        Self {
            soc: r.soc,
            power_kw: r.power_kw,
            voltage: r.voltage,
            temperature: r.temperature,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CanStartParams {
    pub point_id: i32,
}

/// Session details; money fields are decimal strings
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub id: i32,
    pub point_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i32>,
    pub status: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub initial_soc: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_soc: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_soc: Option<i32>,
    pub energy_used_kwh: f64,
    pub duration_minutes: i64,
    pub cost_before_discount: String,
    pub discount: String,
    pub final_cost: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<DateTime<Utc>>,
}

impl From<ChargingSession> for SessionDto {
    fn from(s: ChargingSession) -> Self {
        Self {
            id: s.id,
            point_id: s.point_id,
            reservation_id: s.reservation_id,
            status: s.status.to_string(),
            start_time: s.start_time,
            end_time: s.end_time,
            initial_soc: s.initial_soc,
            current_soc: s.current_soc,
            final_soc: s.final_soc,
            energy_used_kwh: s.energy_used_kwh,
            duration_minutes: s.duration_minutes,
            cost_before_discount: s.cost_before_discount.to_string(),
            discount: s.discount.to_string(),
            final_cost: s.final_cost.to_string(),
            paused_at: s.paused_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionLogDto {
    pub id: i32,
    pub soc: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_kw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl From<SessionLog> for SessionLogDto {
    fn from(l: SessionLog) -> Self {
        Self {
            id: l.id,
            soc: l.soc,
            power_kw: l.power_kw,
            voltage: l.voltage,
            temperature: l.temperature,
            note: l.note,
            logged_at: l.logged_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CanStartDto {
    pub can_start: bool,
    pub point_status: String,
    pub driver_has_active_session: bool,
    pub reasons: Vec<String>,
}

impl From<CanStartSession> for CanStartDto {
    fn from(c: CanStartSession) -> Self {
        Self {
            can_start: c.can_start,
            point_status: c.point_status.to_string(),
            driver_has_active_session: c.driver_has_active_session,
            reasons: c.reasons,
        }
    }
}
