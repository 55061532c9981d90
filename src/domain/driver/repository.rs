use async_trait::async_trait;

use super::model::{Driver, StaffAssignment};
use crate::domain::DomainResult;

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn save(&self, driver: Driver) -> DomainResult<Driver>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Driver>>;

    async fn find_by_user_id(&self, user_id: &str) -> DomainResult<Option<Driver>>;
}

#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn assign(&self, assignment: StaffAssignment) -> DomainResult<()>;

    async fn is_assigned(&self, staff_id: &str, station_id: i32) -> DomainResult<bool>;
}
