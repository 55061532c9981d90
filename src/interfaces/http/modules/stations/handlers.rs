//! Station API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{AvailabilityParams, HourAvailabilityDto, SearchParams, StationMatchDto};
use crate::application::search::SearchQuery;
use crate::application::AppServices;
use crate::domain::ConnectorType;
use crate::interfaces::http::common::{ApiResponse, ApiResult};

#[utoipa::path(
    get,
    path = "/api/v1/stations/search",
    tag = "Stations",
    params(SearchParams),
    responses(
        (status = 200, description = "Stations with compatible available points", body = ApiResponse<Vec<StationMatchDto>>),
        (status = 422, description = "Unknown connector type or bad coordinates")
    )
)]
pub async fn search_stations(
    State(services): State<AppServices>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<ApiResponse<Vec<StationMatchDto>>>> {
    let connector_type: ConnectorType = params.connector_type.parse()?;

    let query = SearchQuery {
        connector_type,
        date: params.date,
        latitude: params.lat,
        longitude: params.lon,
        radius_km: params.radius_km,
    };
    let matches = services.search.search_compatible_stations(&query).await?;
    Ok(Json(ApiResponse::success(
        matches.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/points/{point_id}/availability",
    tag = "Stations",
    params(
        ("point_id" = i32, Path, description = "Charging point ID"),
        AvailabilityParams
    ),
    responses(
        (status = 200, description = "24 hourly buckets", body = ApiResponse<Vec<HourAvailabilityDto>>),
        (status = 404, description = "Point not found")
    )
)]
pub async fn point_availability(
    State(services): State<AppServices>,
    Path(point_id): Path<i32>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<Json<ApiResponse<Vec<HourAvailabilityDto>>>> {
    let hours = services.search.hourly_availability(point_id, params.date).await?;
    Ok(Json(ApiResponse::success(
        hours.into_iter().map(Into::into).collect(),
    )))
}
