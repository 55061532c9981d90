//! Notification bus
//!
//! Broadcasts driver notifications to in-process subscribers (delivery
//! gateways, tests). Every notification is also written to the log, so a
//! bus with no subscribers still leaves a trace.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::domain::{DomainResult, Notification, NotificationSink};

const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
    subscriber_count: Arc<AtomicUsize>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn subscribe(&self) -> NotificationSubscriber {
        let receiver = self.sender.subscribe();
        self.subscriber_count.fetch_add(1, Ordering::SeqCst);
        NotificationSubscriber {
            receiver,
            subscriber_count: self.subscriber_count.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for NotificationBus {
    async fn send(&self, notification: Notification) -> DomainResult<()> {
        info!(
            user_id = %notification.user_id,
            kind = %notification.kind,
            related_id = ?notification.related_id,
            "{}: {}",
            notification.title,
            notification.message
        );

        if self.sender.send(notification).is_err() {
            debug!("Notification published with no subscribers");
        }
        Ok(())
    }
}

pub struct NotificationSubscriber {
    receiver: broadcast::Receiver<Notification>,
    subscriber_count: Arc<AtomicUsize>,
}

impl NotificationSubscriber {
    /// Next notification; lagged messages are skipped.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(n) => return Some(n),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Notification subscriber lagged by {} messages", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Everything already queued, without waiting.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(n) => out.push(n),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        out
    }
}

impl Drop for NotificationSubscriber {
    fn drop(&mut self) {
        self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
    }
}
