//! JSON body extractor that also runs `validator` rules
//!
//! Malformed JSON keeps axum's own status (400 syntax, 415 content type,
//! 422 shape mismatch); a body that parses but breaks a rule is 422 with one
//! `field: message` entry per violation, sorted by field.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;

/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct StopSession {
///     #[validate(range(min = 0, max = 100))]
///     final_soc: i32,
/// }
///
/// async fn stop(ValidatedJson(body): ValidatedJson<StopSession>) { /* body.final_soc is 0-100 */ }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Rules(ValidationErrors),
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let parts: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(m) => format!("{}: {}", field, m),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();

    if parts.is_empty() {
        "Validation failed".to_string()
    } else {
        parts.join("; ")
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Json(rejection) => (
                rejection.status(),
                ApiResponse::<()>::error(format!("Invalid JSON: {}", rejection.body_text()))
                    .with_code("InvalidJson"),
            ),
            Self::Rules(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiResponse::<()>::error(describe(&errors)).with_code("ValidationError"),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;
        value.validate().map_err(ValidatedJsonRejection::Rules)?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct CheckIn {
        #[validate(length(min = 1, max = 64))]
        point_qr_code: String,
        #[validate(range(min = 0, max = 100))]
        initial_soc: i32,
    }

    async fn handler(ValidatedJson(body): ValidatedJson<CheckIn>) -> String {
        body.point_qr_code
    }

    async fn post_json(raw: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/check-in")
            .header("content-type", "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        let resp = Router::new()
            .route("/check-in", post(handler))
            .oneshot(req)
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn valid_body_reaches_handler() {
        let (status, _) = post_json(r#"{"point_qr_code": "POINT-1-P1", "initial_soc": 30}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn syntax_error_is_bad_request() {
        let (status, body) = post_json("not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidJson");
    }

    #[tokio::test]
    async fn missing_field_is_unprocessable() {
        let (status, body) = post_json(r#"{"point_qr_code": "POINT-1-P1"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "InvalidJson");
    }

    #[tokio::test]
    async fn rule_violations_are_listed_by_field() {
        let (status, body) = post_json(r#"{"point_qr_code": "", "initial_soc": 130}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "ValidationError");
        let msg = body["error"].as_str().unwrap();
        assert!(msg.starts_with("initial_soc: range; point_qr_code: length"), "{}", msg);
    }
}
