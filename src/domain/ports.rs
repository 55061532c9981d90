//! Outbound ports — collaborators the core consumes but does not implement
//!
//! Notification delivery, pricing and payment gateways live outside this
//! service; the core talks to them only through these traits.

use std::fmt;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::session::ChargingSession;
use super::DomainResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    ReservationCreated,
    ReservationReminder,
    ReservationCancelled,
    ReservationExpired,
    CheckedIn,
    SessionCompleted,
    SessionInterrupted,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReservationCreated => "reservation_created",
            Self::ReservationReminder => "reservation_reminder",
            Self::ReservationCancelled => "reservation_cancelled",
            Self::ReservationExpired => "reservation_expired",
            Self::CheckedIn => "checked_in",
            Self::SessionCompleted => "session_completed",
            Self::SessionInterrupted => "session_interrupted",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_id: Option<i32>,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, notification: Notification) -> DomainResult<()>;
}

#[async_trait]
pub trait PricingLookup: Send + Sync {
    async fn price_per_kwh(&self, point_id: i32) -> DomainResult<Decimal>;
}

/// Invoked once a session reaches `completed`.
#[async_trait]
pub trait PaymentInitiator: Send + Sync {
    async fn initiate(&self, session: &ChargingSession) -> DomainResult<()>;
}
