//! Staff HTTP handlers
//!
//! The staff member must be assigned to the station owning the session's
//! point; otherwise the service answers `Unauthorized` (403).

use axum::extract::{Path, State};
use axum::Json;

use super::dto::{EmergencyStopRequest, PauseRequest};
use crate::application::AppServices;
use crate::interfaces::http::common::{ApiResponse, ApiResult, StaffId, ValidatedJson};
use crate::interfaces::http::modules::sessions::SessionDto;

#[utoipa::path(
    post,
    path = "/api/v1/staff/sessions/{id}/pause",
    tag = "Staff",
    security(("staff_id" = [])),
    params(("id" = i32, Path, description = "Session ID")),
    request_body = PauseRequest,
    responses(
        (status = 200, description = "Session paused", body = ApiResponse<SessionDto>),
        (status = 403, description = "Staff not assigned to the station"),
        (status = 409, description = "Session is not in progress")
    )
)]
pub async fn pause_session(
    State(services): State<AppServices>,
    StaffId(staff_id): StaffId,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<PauseRequest>,
) -> ApiResult<Json<ApiResponse<SessionDto>>> {
    let session = services
        .staff
        .pause(&staff_id, id, body.max_pause_minutes, body.reason.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(session.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/sessions/{id}/resume",
    tag = "Staff",
    security(("staff_id" = [])),
    params(("id" = i32, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session resumed", body = ApiResponse<SessionDto>),
        (status = 403, description = "Staff not assigned to the station"),
        (status = 409, description = "Session is not paused")
    )
)]
pub async fn resume_session(
    State(services): State<AppServices>,
    StaffId(staff_id): StaffId,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<SessionDto>>> {
    let session = services.staff.resume(&staff_id, id).await?;
    Ok(Json(ApiResponse::success(session.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff/sessions/{id}/emergency-stop",
    tag = "Staff",
    security(("staff_id" = [])),
    params(("id" = i32, Path, description = "Session ID")),
    request_body = EmergencyStopRequest,
    responses(
        (status = 200, description = "Session interrupted, point parked in maintenance", body = ApiResponse<SessionDto>),
        (status = 403, description = "Staff not assigned to the station"),
        (status = 409, description = "Session already ended")
    )
)]
pub async fn emergency_stop(
    State(services): State<AppServices>,
    StaffId(staff_id): StaffId,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<EmergencyStopRequest>,
) -> ApiResult<Json<ApiResponse<SessionDto>>> {
    let session = services
        .staff
        .emergency_stop(&staff_id, id, body.reason.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(session.into())))
}
