//! Charging session HTTP handlers
//!
//! Drivers only see and stop their own sessions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::dto::*;
use crate::application::AppServices;
use crate::domain::{ChargingSession, DomainError, DomainResult};
use crate::interfaces::http::common::{ApiResponse, ApiResult, UserId, ValidatedJson};

async fn owned_session(services: &AppServices, user_id: &str, id: i32) -> DomainResult<ChargingSession> {
    let driver = services.reservations.driver_for_user(user_id).await?;
    let session = services.sessions.get_session(id).await?;
    if session.driver_id != driver.id {
        return Err(DomainError::Unauthorized(format!(
            "NotOwner: session {} belongs to another driver",
            id
        )));
    }
    Ok(session)
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    security(("user_id" = [])),
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Walk-in session started", body = ApiResponse<SessionDto>),
        (status = 400, description = "QR code does not match the point"),
        (status = 409, description = "Point busy or driver already charging")
    )
)]
pub async fn start_session(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    ValidatedJson(body): ValidatedJson<StartSessionRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SessionDto>>)> {
    let driver = services.reservations.driver_for_user(&user_id).await?;
    let session = services
        .sessions
        .start_session(body.point_id, driver.id, body.initial_soc, body.qr_code.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(session.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions/can-start",
    tag = "Sessions",
    security(("user_id" = [])),
    params(CanStartParams),
    responses(
        (status = 200, description = "Whether the caller could start on the point now", body = ApiResponse<CanStartDto>)
    )
)]
pub async fn can_start(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Query(params): Query<CanStartParams>,
) -> ApiResult<Json<ApiResponse<CanStartDto>>> {
    let driver = services.reservations.driver_for_user(&user_id).await?;
    let check = services
        .sessions
        .can_start_session(params.point_id, driver.id)
        .await?;
    Ok(Json(ApiResponse::success(check.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    security(("user_id" = [])),
    params(("id" = i32, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session", body = ApiResponse<SessionDto>),
        (status = 403, description = "Not the caller's session"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_session(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<SessionDto>>> {
    let session = owned_session(&services, &user_id, id).await?;
    Ok(Json(ApiResponse::success(session.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/stop",
    tag = "Sessions",
    security(("user_id" = [])),
    params(("id" = i32, Path, description = "Session ID")),
    request_body = StopSessionRequest,
    responses(
        (status = 200, description = "Session completed with energy and cost", body = ApiResponse<SessionDto>),
        (status = 409, description = "Session already ended")
    )
)]
pub async fn stop_session(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<StopSessionRequest>,
) -> ApiResult<Json<ApiResponse<SessionDto>>> {
    owned_session(&services, &user_id, id).await?;
    let session = services.sessions.stop_session(id, body.final_soc).await?;
    Ok(Json(ApiResponse::success(session.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/logs",
    tag = "Sessions",
    security(("user_id" = [])),
    params(("id" = i32, Path, description = "Session ID")),
    request_body = SessionLogRequest,
    responses(
        (status = 201, description = "Telemetry recorded", body = ApiResponse<SessionLogDto>),
        (status = 409, description = "Session is not active")
    )
)]
pub async fn create_session_log(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<SessionLogRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SessionLogDto>>)> {
    owned_session(&services, &user_id, id).await?;
    let log = services.sessions.create_session_log(id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(log.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/logs",
    tag = "Sessions",
    security(("user_id" = [])),
    params(("id" = i32, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Telemetry and audit entries, oldest first", body = ApiResponse<Vec<SessionLogDto>>)
    )
)]
pub async fn list_session_logs(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<SessionLogDto>>>> {
    owned_session(&services, &user_id, id).await?;
    let logs = services.sessions.list_logs(id).await?;
    Ok(Json(ApiResponse::success(logs.into_iter().map(Into::into).collect())))
}
