//! Caller identity
//!
//! Authentication happens in front of this service; the gateway forwards
//! the authenticated account as `X-User-Id` (drivers) or `X-Staff-Id`
//! (station staff).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::ApiResponse;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const STAFF_ID_HEADER: &str = "x-staff-id";

/// Authenticated driver account
#[derive(Debug, Clone)]
pub struct UserId(pub String);

/// Authenticated staff member
#[derive(Debug, Clone)]
pub struct StaffId(pub String);

pub struct MissingIdentity(&'static str);

impl IntoResponse for MissingIdentity {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(format!("Missing or empty {} header", self.0))
            .with_code("Unauthenticated");
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

fn header_value(parts: &Parts, name: &'static str) -> Result<String, MissingIdentity> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or(MissingIdentity(name))
}

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = MissingIdentity;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_value(parts, USER_ID_HEADER).map(UserId)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for StaffId {
    type Rejection = MissingIdentity;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_value(parts, STAFF_ID_HEADER).map(StaffId)
    }
}
