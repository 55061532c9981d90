//! Reservation HTTP handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Duration;

use super::dto::*;
use crate::application::AppServices;
use crate::domain::reservation::{ReservationFilter, ReservationStatus};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    ApiResponse, ApiResult, PaginatedResponse, PaginationParams, UserId, ValidatedJson,
};

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("user_id" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation booked", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Point not found"),
        (status = 409, description = "Slot already taken"),
        (status = 422, description = "Slot in the past or invalid hour")
    )
)]
pub async fn create_reservation(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    ValidatedJson(body): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ReservationDto>>)> {
    let reservation = services
        .reservations
        .create_reservation(&user_id, body.point_id, body.date, body.hour)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(reservation.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    security(("user_id" = [])),
    params(ReservationListParams, PaginationParams),
    responses(
        (status = 200, description = "Caller's reservations", body = ApiResponse<PaginatedResponse<ReservationDto>>)
    )
)]
pub async fn list_reservations(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Query(params): Query<ReservationListParams>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PaginatedResponse<ReservationDto>>>> {
    let driver = services.reservations.driver_for_user(&user_id).await?;
    let status = params
        .status
        .as_deref()
        .map(str::parse::<ReservationStatus>)
        .transpose()?;

    let filter = ReservationFilter {
        driver_id: Some(driver.id),
        station_id: params.station_id,
        point_id: params.point_id,
        status,
        from: params.from,
        to: params.to,
    };
    let page = services
        .reservations
        .get_reservations(&filter, pagination.into())
        .await?;
    Ok(Json(ApiResponse::success(page.map(ReservationDto::from).into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/upcoming",
    tag = "Reservations",
    security(("user_id" = [])),
    params(UpcomingParams),
    responses(
        (status = 200, description = "Booked reservations starting soon", body = ApiResponse<Vec<ReservationDto>>)
    )
)]
pub async fn upcoming_reservations(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Query(params): Query<UpcomingParams>,
) -> ApiResult<Json<ApiResponse<Vec<ReservationDto>>>> {
    let horizon = match params.hours {
        Some(h) if h <= 0 => {
            return Err(DomainError::Validation(format!(
                "Look-ahead must be positive, got {} hours",
                h
            ))
            .into())
        }
        Some(h) => Some(Duration::try_hours(h).ok_or_else(|| {
            DomainError::Validation(format!("Look-ahead of {} hours is out of range", h))
        })?),
        None => None,
    };
    let reservations = services.reservations.get_upcoming(&user_id, horizon).await?;
    Ok(Json(ApiResponse::success(
        reservations.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("user_id" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation", body = ApiResponse<ReservationDto>),
        (status = 403, description = "Not the caller's reservation"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_reservation(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<ReservationDto>>> {
    let reservation = services.reservations.get_reservation(&user_id, id).await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    security(("user_id" = [])),
    params(("id" = i32, Path, description = "Reservation ID"), CancelParams),
    responses(
        (status = 200, description = "Reservation cancelled", body = ApiResponse<ReservationDto>),
        (status = 409, description = "Reservation can no longer be cancelled")
    )
)]
pub async fn cancel_reservation(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Path(id): Path<i32>,
    Query(params): Query<CancelParams>,
) -> ApiResult<Json<ApiResponse<ReservationDto>>> {
    let reservation = services
        .reservations
        .cancel_reservation(&user_id, id, params.reason)
        .await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/code/{code}",
    tag = "Reservations",
    security(("user_id" = [])),
    params(("code" = String, Path, description = "8-digit reservation code")),
    responses(
        (status = 200, description = "Reservation", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn get_reservation_by_code(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Path(code): Path<String>,
) -> ApiResult<Json<ApiResponse<ReservationDto>>> {
    let reservation = services.reservations.get_by_code(&user_id, &code).await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/code/{code}",
    tag = "Reservations",
    security(("user_id" = [])),
    params(("code" = String, Path, description = "8-digit reservation code"), CancelParams),
    responses(
        (status = 200, description = "Reservation cancelled", body = ApiResponse<ReservationDto>),
        (status = 409, description = "Reservation can no longer be cancelled")
    )
)]
pub async fn cancel_reservation_by_code(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Path(code): Path<String>,
    Query(params): Query<CancelParams>,
) -> ApiResult<Json<ApiResponse<ReservationDto>>> {
    let reservation = services
        .reservations
        .cancel_by_code(&user_id, &code, params.reason)
        .await?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

/// The path segment shares its name with `/{id}` for routing, but carries
/// the reservation code.
#[utoipa::path(
    post,
    path = "/api/v1/reservations/{id}/check-in",
    tag = "Reservations",
    security(("user_id" = [])),
    params(("id" = String, Path, description = "8-digit reservation code")),
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in, session started", body = ApiResponse<CheckInResponse>),
        (status = 400, description = "QR code does not match the reserved point"),
        (status = 409, description = "Already checked in, or outside the check-in window")
    )
)]
pub async fn check_in(
    State(services): State<AppServices>,
    UserId(user_id): UserId,
    Path(code): Path<String>,
    ValidatedJson(body): ValidatedJson<CheckInRequest>,
) -> ApiResult<Json<ApiResponse<CheckInResponse>>> {
    let outcome = services
        .check_in
        .check_in(&user_id, &code, &body.point_qr_code, body.initial_soc)
        .await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}
