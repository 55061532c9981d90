//! Domain error to HTTP response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::domain::DomainError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by every handler; renders the standard envelope.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

/// Status code for a domain error.
///
/// A wrong QR scan is a bad request rather than an unprocessable one: the
/// body is well-formed but names the wrong point.
pub fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) | DomainError::InvalidState(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::FORBIDDEN,
        DomainError::Validation(msg) if msg.starts_with("InvalidQrCode") => StatusCode::BAD_REQUEST,
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Exhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = match &self.0 {
            DomainError::Storage(detail) => {
                error!(error = %detail, "Storage failure while handling request");
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };
        let body = ApiResponse::<()>::error(message).with_code(self.0.code());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let cases = [
            (DomainError::not_found("ChargingPoint", "id", 7), StatusCode::NOT_FOUND),
            (DomainError::Conflict("SlotConflict: taken".into()), StatusCode::CONFLICT),
            (DomainError::InvalidState("terminal".into()), StatusCode::CONFLICT),
            (DomainError::Unauthorized("NotOwner".into()), StatusCode::FORBIDDEN),
            (DomainError::Validation("PastBooking: too late".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::Validation("InvalidQrCode: wrong point".into()), StatusCode::BAD_REQUEST),
            (DomainError::Exhausted("codes".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err), status, "{:?}", err);
        }
    }

    #[tokio::test]
    async fn storage_details_are_not_leaked() {
        let resp = ApiError(DomainError::Storage("no such table: secrets".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal storage error");
        assert_eq!(body["code"], "StorageError");
    }
}
