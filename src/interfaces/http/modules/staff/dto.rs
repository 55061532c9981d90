//! Staff DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct PauseRequest {
    /// Pause budget before the session is cancelled automatically
    #[validate(range(min = 1, max = 1440))]
    pub max_pause_minutes: Option<i32>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct EmergencyStopRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}
