//! Payment handoff
//!
//! Payment processing is an external system; this adapter records the
//! handoff so a downstream collector can pick completed sessions up.

use async_trait::async_trait;
use tracing::info;

use crate::domain::{ChargingSession, DomainResult, PaymentInitiator};

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPaymentInitiator;

#[async_trait]
impl PaymentInitiator for LoggingPaymentInitiator {
    async fn initiate(&self, session: &ChargingSession) -> DomainResult<()> {
        info!(
            session_id = session.id,
            driver_id = session.driver_id,
            amount = %session.final_cost,
            "Payment initiated"
        );
        metrics::counter!("chargenet_payments_initiated_total").increment(1);
        Ok(())
    }
}
