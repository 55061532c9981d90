//! HTTP REST API
//!
//! - `common`: response envelope, error mapping, caller identity, validated bodies
//! - `modules`: one module per resource (DTOs + handlers)
//! - `router`: route table, middleware stack and Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, ApiState};
