//! Application layer: use cases over the domain repositories and ports

pub mod booking;
pub mod charging;
pub mod notify;
pub mod search;
pub mod workers;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::domain::reservation::CodeGenerator;
use crate::domain::{NotificationSink, PaymentInitiator, PricingLookup, RepositoryProvider};
use crate::shared::clock::SharedClock;
use crate::shared::retry::RetryConfig;

pub use booking::{BookingSettings, CheckInService, RandomCodeGenerator, ReservationService};
pub use charging::{ChargingSettings, SessionService, StaffService};
pub use notify::DriverNotifier;
pub use search::{SearchSettings, StationSearchService};

/// Rule settings for every service, assembled from configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    pub booking: BookingSettings,
    pub charging: ChargingSettings,
    pub search: SearchSettings,
    /// Backoff for the guarded booking and session-start transactions
    pub retry: RetryConfig,
}

/// Outbound collaborators the services call
#[derive(Clone)]
pub struct Ports {
    pub notifications: Arc<dyn NotificationSink>,
    pub pricing: Arc<dyn PricingLookup>,
    pub payments: Arc<dyn PaymentInitiator>,
    pub codes: Arc<dyn CodeGenerator>,
}

/// The wired service graph shared by the HTTP handlers and the workers
#[derive(Clone)]
pub struct AppServices {
    pub repos: Arc<dyn RepositoryProvider>,
    pub notifier: DriverNotifier,
    pub clock: SharedClock,
    pub reservations: Arc<ReservationService>,
    pub sessions: Arc<SessionService>,
    pub check_in: Arc<CheckInService>,
    pub staff: Arc<StaffService>,
    pub search: Arc<StationSearchService>,
}

impl AppServices {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        ports: Ports,
        clock: SharedClock,
        settings: ServiceSettings,
    ) -> Self {
        let notifier = DriverNotifier::new(repos.clone(), ports.notifications);

        let reservations = Arc::new(ReservationService::new(
            repos.clone(),
            notifier.clone(),
            ports.codes,
            clock.clone(),
            settings.booking,
        )
        .with_retry(settings.retry.clone()));
        let sessions = Arc::new(SessionService::new(
            repos.clone(),
            ports.pricing,
            ports.payments,
            notifier.clone(),
            settings.charging.build_energy_policy(),
            clock.clone(),
            settings.charging,
        )
        .with_retry(settings.retry));
        let check_in = Arc::new(CheckInService::new(
            repos.clone(),
            reservations.clone(),
            sessions.clone(),
            notifier.clone(),
            clock.clone(),
        ));
        let staff = Arc::new(StaffService::new(repos.clone(), sessions.clone()));
        let search = Arc::new(StationSearchService::new(
            repos.clone(),
            clock.clone(),
            settings.search,
        ));

        Self {
            repos,
            notifier,
            clock,
            reservations,
            sessions,
            check_in,
            staff,
            search,
        }
    }
}
