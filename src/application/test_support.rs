//! Service graph over an in-memory database with a fixed clock

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use super::{AppServices, Ports, RandomCodeGenerator, ServiceSettings};
use crate::domain::{
    ChargingPoint, ChargingSession, ConnectorType, DomainError, DomainResult, Driver,
    PaymentInitiator, PointStatus, RepositoryProvider, StaffAssignment, Station,
};
use crate::infrastructure::database::test_support::{pooled_test_db, seed, test_db, Fixture, PooledDb};
use crate::infrastructure::{NotificationBus, RepositoryPricingLookup, SeaOrmRepositoryProvider};
use crate::shared::clock::FixedClock;
use crate::shared::retry::RetryConfig;

/// 2024-06-01 at `h:m` UTC
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
}

/// Records payment hand-offs; can be told to fail.
#[derive(Default)]
pub struct RecordingPayments {
    pub initiated: Mutex<Vec<i32>>,
    pub fail: Mutex<bool>,
}

#[async_trait]
impl PaymentInitiator for RecordingPayments {
    async fn initiate(&self, session: &ChargingSession) -> DomainResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(DomainError::Storage("payment gateway unreachable".into()));
        }
        self.initiated.lock().unwrap().push(session.id);
        Ok(())
    }
}

pub struct Harness {
    pub services: AppServices,
    pub repos: Arc<dyn RepositoryProvider>,
    pub clock: FixedClock,
    pub bus: NotificationBus,
    pub payments: Arc<RecordingPayments>,
    pub fx: Fixture,
    pub db: DatabaseConnection,
}

/// Seeded harness with the clock at 08:00 on 2024-06-01.
pub async fn harness() -> Harness {
    harness_with(ServiceSettings::default()).await
}

pub async fn harness_with(settings: ServiceSettings) -> Harness {
    harness_on(test_db().await, settings).await
}

/// Seeded harness over a file database with `connections` pooled
/// connections, for tests where transactions must race. Keep the returned
/// [`PooledDb`] alive for the duration of the test.
pub async fn pooled_harness(connections: u32) -> (Harness, PooledDb) {
    let file = pooled_test_db(connections).await;
    let settings = ServiceSettings {
        retry: RetryConfig {
            max_attempts: 10,
            initial_delay: std::time::Duration::from_millis(10),
            ..RetryConfig::default()
        },
        ..ServiceSettings::default()
    };
    (harness_on(file.db.clone(), settings).await, file)
}

async fn harness_on(db: DatabaseConnection, settings: ServiceSettings) -> Harness {
    let fx = seed(&db).await;
    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
    let clock = FixedClock::new(at(8, 0));
    let bus = NotificationBus::new();
    let payments = Arc::new(RecordingPayments::default());

    let services = AppServices::new(
        repos.clone(),
        Ports {
            notifications: Arc::new(bus.clone()),
            pricing: Arc::new(RepositoryPricingLookup::new(repos.clone())),
            payments: payments.clone(),
            codes: Arc::new(RandomCodeGenerator),
        },
        Arc::new(clock.clone()),
        settings,
    );

    Harness {
        services,
        repos,
        clock,
        bus,
        payments,
        fx,
        db,
    }
}

impl Harness {
    /// Walk-in session for the fixture driver on the fixture point, SOC 20.
    pub async fn walk_in(&self) -> ChargingSession {
        self.services
            .sessions
            .start_session(self.fx.point.id, self.fx.driver.id, 20, None)
            .await
            .unwrap()
    }

    pub async fn assign_staff(&self, staff_id: &str) {
        self.repos
            .staff()
            .assign(StaffAssignment {
                staff_id: staff_id.into(),
                station_id: self.fx.station.id,
            })
            .await
            .unwrap();
    }

    /// Extra driver profiles `user-<n>` for `n` in `range`; returns their ids.
    pub async fn add_drivers(&self, range: std::ops::Range<u32>) -> Vec<i32> {
        let mut ids = Vec::new();
        for n in range {
            let driver = self
                .repos
                .drivers()
                .save(Driver::new(format!("user-{}", n), format!("Driver {}", n)))
                .await
                .unwrap();
            ids.push(driver.id);
        }
        ids
    }

    pub async fn point_status(&self) -> PointStatus {
        self.repos
            .stations()
            .find_point(self.fx.point.id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    /// Station with one available point of `connector`; returns the station id.
    pub async fn add_station(&self, name: &str, location: (f64, f64), connector: ConnectorType) -> i32 {
        let station = self
            .repos
            .stations()
            .save_station(Station::new(name, "test").with_location(location.0, location.1))
            .await
            .unwrap();
        self.repos
            .stations()
            .save_point(ChargingPoint::new(
                station.id,
                "A",
                connector,
                50.0,
                Decimal::new(3000, 0),
            ))
            .await
            .unwrap();
        station.id
    }
}
