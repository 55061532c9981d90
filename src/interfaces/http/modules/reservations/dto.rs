//! Reservation DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::booking::CheckInOutcome;
use crate::domain::Reservation;

/// Book the one-hour slot `date@hour` on a point
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReservationRequest {
    pub point_id: i32,
    /// Calendar day of the slot (UTC)
    pub date: NaiveDate,
    /// Hour of day, 0-23
    #[validate(range(min = 0, max = 23))]
    pub hour: u32,
}

/// Reservation details in API responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: i32,
    /// 8-digit code shown to the driver
    pub code: String,
    pub point_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            code: r.code,
            point_id: r.point_id,
            start_time: r.start_time,
            end_time: r.end_time,
            status: r.status.to_string(),
            cancel_reason: r.cancel_reason,
            created_at: r.created_at,
        }
    }
}

/// Filters of `GET /api/v1/reservations`; always scoped to the caller
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReservationListParams {
    /// booked, checked_in, in_progress, completed, cancelled, no_show
    pub status: Option<String>,
    pub station_id: Option<i32>,
    pub point_id: Option<i32>,
    /// Inclusive lower bound on start time
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on start time
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UpcomingParams {
    /// Look-ahead window in hours
    pub hours: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CancelParams {
    pub reason: Option<String>,
}

/// Scan of the point QR at arrival
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckInRequest {
    #[validate(length(min = 1, max = 128))]
    pub point_qr_code: String,
    /// Battery state of charge at plug-in, 0-100
    #[validate(range(min = 0, max = 100))]
    pub initial_soc: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckInResponse {
    pub reservation_id: i32,
    pub reservation_status: String,
    pub session_id: i32,
    pub status: String,
}

impl From<CheckInOutcome> for CheckInResponse {
    fn from(o: CheckInOutcome) -> Self {
        Self {
            reservation_id: o.reservation.id,
            reservation_status: o.reservation.status.to_string(),
            session_id: o.session.id,
            status: o.session.status.to_string(),
        }
    }
}
