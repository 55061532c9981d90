//! Price lookup backed by the charging point's configured price

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{DomainError, DomainResult, PricingLookup, RepositoryProvider};

pub struct RepositoryPricingLookup {
    repos: Arc<dyn RepositoryProvider>,
}

impl RepositoryPricingLookup {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl PricingLookup for RepositoryPricingLookup {
    async fn price_per_kwh(&self, point_id: i32) -> DomainResult<Decimal> {
        let point = self
            .repos
            .stations()
            .find_point(point_id)
            .await?
            .ok_or_else(|| DomainError::not_found("ChargingPoint", "id", point_id))?;
        Ok(point.price_per_kwh)
    }
}
