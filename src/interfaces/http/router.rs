//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, PaginatedResponse, PaginationParams};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{self, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::{reservations, sessions, staff, stations};
use crate::application::AppServices;

/// Everything the handlers need. Each handler extracts its own slice
/// through `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub services: AppServices,
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(services: AppServices, db: DatabaseConnection) -> Self {
        Self {
            services,
            db,
            started_at: Arc::new(Instant::now()),
        }
    }
}

impl FromRef<ApiState> for AppServices {
    fn from_ref(s: &ApiState) -> Self {
        s.services.clone()
    }
}

impl FromRef<ApiState> for HealthState {
    fn from_ref(s: &ApiState) -> Self {
        HealthState {
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// Identity headers set by the upstream gateway
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-User-Id"))),
            );
            components.add_security_scheme(
                "staff_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Staff-Id"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        // Stations
        stations::search_stations,
        stations::point_availability,
        // Reservations
        reservations::create_reservation,
        reservations::list_reservations,
        reservations::upcoming_reservations,
        reservations::get_reservation,
        reservations::cancel_reservation,
        reservations::get_reservation_by_code,
        reservations::cancel_reservation_by_code,
        reservations::check_in,
        // Sessions
        sessions::start_session,
        sessions::can_start,
        sessions::get_session,
        sessions::stop_session,
        sessions::create_session_log,
        sessions::list_session_logs,
        // Staff
        staff::pause_session,
        staff::resume_session,
        staff::emergency_stop,
    ),
    components(
        schemas(
            ApiResponse<String>,
            PaginatedResponse<reservations::ReservationDto>,
            PaginationParams,
            health::HealthResponse,
            health::ComponentHealth,
            stations::StationDto,
            stations::ChargingPointDto,
            stations::StationMatchDto,
            stations::HourAvailabilityDto,
            reservations::CreateReservationRequest,
            reservations::ReservationDto,
            reservations::CheckInRequest,
            reservations::CheckInResponse,
            sessions::StartSessionRequest,
            sessions::StopSessionRequest,
            sessions::SessionLogRequest,
            sessions::SessionDto,
            sessions::SessionLogDto,
            sessions::CanStartDto,
            staff::PauseRequest,
            staff::EmergencyStopRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database health"),
        (name = "Stations", description = "Compatible station search and hourly point availability"),
        (name = "Reservations", description = "One-hour slot booking, cancellation and check-in"),
        (name = "Sessions", description = "Charging sessions: walk-in start, stop, telemetry"),
        (name = "Staff", description = "Station staff operations on running sessions"),
    ),
    info(
        title = "ChargeNet Reservation API",
        version = "1.0.0",
        description = "Reservations and charging sessions for EV charging stations",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router. `/metrics` is mounted only when a Prometheus
/// handle is given.
pub fn create_api_router(state: ApiState, prometheus: Option<PrometheusHandle>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let station_routes = Router::new()
        .route("/search", get(stations::search_stations));

    let point_routes = Router::new()
        .route("/{point_id}/availability", get(stations::point_availability));

    // `/{id}/check-in` carries a reservation code; the segment name has to
    // match the sibling `/{id}` routes.
    let reservation_routes = Router::new()
        .route(
            "/",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route("/upcoming", get(reservations::upcoming_reservations))
        .route(
            "/code/{code}",
            get(reservations::get_reservation_by_code).delete(reservations::cancel_reservation_by_code),
        )
        .route(
            "/{id}",
            get(reservations::get_reservation).delete(reservations::cancel_reservation),
        )
        .route("/{id}/check-in", post(reservations::check_in));

    let session_routes = Router::new()
        .route("/", post(sessions::start_session))
        .route("/can-start", get(sessions::can_start))
        .route("/{id}", get(sessions::get_session))
        .route("/{id}/stop", post(sessions::stop_session))
        .route(
            "/{id}/logs",
            get(sessions::list_session_logs).post(sessions::create_session_log),
        );

    let staff_routes = Router::new()
        .route("/sessions/{id}/pause", post(staff::pause_session))
        .route("/sessions/{id}/resume", post(staff::resume_session))
        .route("/sessions/{id}/emergency-stop", post(staff::emergency_stop));

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/stations", station_routes)
        .nest("/api/v1/points", point_routes)
        .nest("/api/v1/reservations", reservation_routes)
        .nest("/api/v1/sessions", session_routes)
        .nest("/api/v1/staff", staff_routes)
        .with_state(state)
        .merge(swagger_routes);

    if let Some(handle) = prometheus {
        let metrics_routes = Router::new()
            .route("/metrics", get(metrics::prometheus_metrics))
            .with_state(MetricsState { handle });
        router = router.merge(metrics_routes);
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Duration;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::test_support::{at, harness, Harness};
    use crate::interfaces::http::common::actor::{STAFF_ID_HEADER, USER_ID_HEADER};

    fn app(h: &Harness) -> Router {
        create_api_router(ApiState::new(h.services.clone(), h.db.clone()), None)
    }

    fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(u) = user {
            builder = builder.header(USER_ID_HEADER, u);
        }
        match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn book(router: &Router, h: &Harness, hour: u32) -> (StatusCode, Value) {
        send(
            router,
            request(
                "POST",
                "/api/v1/reservations",
                Some("user-1"),
                Some(json!({"point_id": h.fx.point.id, "date": "2024-06-01", "hour": hour})),
            ),
        )
        .await
    }

    #[tokio::test]
    async fn booking_returns_created_then_conflict() {
        let h = harness().await;
        let router = app(&h);

        let (status, body) = book(&router, &h, 10).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "booked");
        assert_eq!(body["data"]["code"].as_str().unwrap().len(), 8);

        let (status, body) = book(&router, &h, 10).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "Conflict");
    }

    #[tokio::test]
    async fn past_slot_and_bad_hour_are_unprocessable() {
        let h = harness().await;
        let router = app(&h);

        let (status, body) = book(&router, &h, 7).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "ValidationError");

        let (status, _) = book(&router, &h, 24).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn huge_upcoming_horizon_is_unprocessable() {
        let h = harness().await;
        let router = app(&h);
        for hours in ["10000000000", "3000000000000"] {
            let uri = format!("/api/v1/reservations/upcoming?hours={}", hours);
            let (status, body) = send(&router, request("GET", &uri, Some("user-1"), None)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "hours={}", hours);
            assert_eq!(body["code"], "ValidationError");
        }
    }

    #[tokio::test]
    async fn unknown_point_is_not_found() {
        let h = harness().await;
        let router = app(&h);
        let (status, body) = send(
            &router,
            request(
                "POST",
                "/api/v1/reservations",
                Some("user-1"),
                Some(json!({"point_id": 9999, "date": "2024-06-01", "hour": 10})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NotFound");
    }

    #[tokio::test]
    async fn missing_identity_is_unauthenticated() {
        let h = harness().await;
        let router = app(&h);
        let (status, body) = send(
            &router,
            request(
                "POST",
                "/api/v1/reservations",
                None,
                Some(json!({"point_id": h.fx.point.id, "date": "2024-06-01", "hour": 10})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn check_in_stop_flow() {
        let h = harness().await;
        let router = app(&h);

        let (_, booked) = book(&router, &h, 8).await;
        let code = booked["data"]["code"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/reservations/{}/check-in", code);

        let (status, body) = send(
            &router,
            request("POST", &uri, Some("user-1"), Some(json!({"point_qr_code": "nope", "initial_soc": 20}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "ValidationError");

        let qr = h.fx.point.qr_code.clone();
        let (status, body) = send(
            &router,
            request("POST", &uri, Some("user-1"), Some(json!({"point_qr_code": qr, "initial_soc": 20}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "in_progress");
        assert_eq!(body["data"]["reservation_status"], "checked_in");
        let session_id = body["data"]["session_id"].as_i64().unwrap();

        let (status, body) = send(
            &router,
            request("POST", &uri, Some("user-1"), Some(json!({"point_qr_code": qr, "initial_soc": 20}))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("AlreadyCheckedIn"));

        h.clock.set(at(8, 0) + Duration::minutes(42));
        let (status, body) = send(
            &router,
            request(
                "POST",
                &format!("/api/v1/sessions/{}/stop", session_id),
                Some("user-1"),
                Some(json!({"final_soc": 80})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "completed");
        assert_eq!(body["data"]["duration_minutes"], 42);
        let cost = Decimal::from_str(body["data"]["final_cost"].as_str().unwrap()).unwrap();
        assert_eq!(cost, Decimal::new(126000, 0));
    }

    #[tokio::test]
    async fn sessions_are_private_to_their_driver() {
        let h = harness().await;
        h.fx.second_driver(&h.db).await;
        let session = h.walk_in().await;
        let router = app(&h);

        let (status, body) = send(
            &router,
            request("GET", &format!("/api/v1/sessions/{}", session.id), Some("user-2"), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "Unauthorized");

        let (status, _) = send(
            &router,
            request("GET", &format!("/api/v1/sessions/{}", session.id), Some("user-1"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn staff_must_be_assigned_to_the_station() {
        let h = harness().await;
        let session = h.walk_in().await;
        let router = app(&h);
        let uri = format!("/api/v1/staff/sessions/{}/pause", session.id);

        let pause = |staff: &str| {
            Request::builder()
                .method("POST")
                .uri(&uri)
                .header(STAFF_ID_HEADER, staff)
                .header("content-type", "application/json")
                .body(Body::from(json!({"max_pause_minutes": 10}).to_string()))
                .unwrap()
        };

        let (status, _) = send(&router, pause("staff-9")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        h.assign_staff("staff-9").await;
        let (status, body) = send(&router, pause("staff-9")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "paused");
    }

    #[tokio::test]
    async fn search_lists_compatible_stations() {
        let h = harness().await;
        let router = app(&h);

        let (status, body) = send(
            &router,
            request("GET", "/api/v1/stations/search?connector_type=CCS2&lat=52.52&lon=13.40", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let matches = body["data"].as_array().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["compatible_count"], 1);

        let (status, _) = send(
            &router,
            request("GET", "/api/v1/stations/search?connector_type=Warp", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn health_reports_database() {
        let h = harness().await;
        let (status, body) = send(&app(&h), request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"]["status"], "ok");
    }
}
