//! Driver notifications
//!
//! Resolves the driver's user account and forwards to the
//! [`NotificationSink`]. Delivery failures are logged and swallowed: a
//! notification never decides the outcome of the operation that sent it.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{DomainResult, Notification, NotificationKind, NotificationSink, RepositoryProvider};

#[derive(Clone)]
pub struct DriverNotifier {
    repos: Arc<dyn RepositoryProvider>,
    sink: Arc<dyn NotificationSink>,
}

impl DriverNotifier {
    pub fn new(repos: Arc<dyn RepositoryProvider>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { repos, sink }
    }

    /// Send and report the outcome. Used where the caller records delivery.
    pub async fn try_notify(
        &self,
        driver_id: i32,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        related_id: Option<i32>,
    ) -> DomainResult<()> {
        let driver = self
            .repos
            .drivers()
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| crate::domain::DomainError::not_found("Driver", "id", driver_id))?;

        self.sink
            .send(Notification {
                user_id: driver.user_id,
                title: title.into(),
                message: message.into(),
                kind,
                related_id,
            })
            .await
    }

    pub async fn notify(
        &self,
        driver_id: i32,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        related_id: Option<i32>,
    ) {
        if let Err(e) = self
            .try_notify(driver_id, kind, title, message, related_id)
            .await
        {
            warn!(driver_id, kind = %kind, error = %e, "Notification not delivered");
        }
    }
}
