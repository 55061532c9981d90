//! Shared HTTP building blocks: response envelope, pagination, error
//! mapping, caller identity and validated JSON bodies.

pub mod actor;
pub mod error;
pub mod validated_json;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use actor::{StaffId, UserId};
pub use error::{ApiError, ApiResult};
pub use validated_json::ValidatedJson;

use crate::shared::pagination::{PageRequest, PaginatedResult};

/// Standard response envelope.
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "...", "code": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct PaginationParams {
    /// Page number, starting at 1. Default: 1
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (1-100). Default: 50
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl From<PaginationParams> for PageRequest {
    fn from(p: PaginationParams) -> Self {
        PageRequest::new(p.page, p.limit)
    }
}

/// One page of a listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    /// Items across all pages
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit)) as u32
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

impl<T> From<PaginatedResult<T>> for PaginatedResponse<T> {
    fn from(r: PaginatedResult<T>) -> Self {
        Self {
            items: r.items,
            total: r.total,
            page: r.page,
            limit: r.limit,
            total_pages: r.total_pages,
        }
    }
}
