//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IsolationLevel, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Select, Set, TransactionTrait,
};

use super::{db_err, parse_column};
use crate::domain::reservation::{
    slot_conflict, CodeGenerator, NewReservation, Reservation, ReservationFilter,
    ReservationRepository, ReservationStatus, TimeSlot,
};
use crate::domain::{DomainError, DomainResult, SessionStatus};
use crate::infrastructure::database::entities::{charging_session, reservation};
use crate::shared::pagination::{PageRequest, PaginatedResult};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    Ok(Reservation {
        id: m.id,
        status: parse_column("reservations.status", &m.status)?,
        code: m.code,
        driver_id: m.driver_id,
        point_id: m.point_id,
        start_time: m.start_time,
        end_time: m.end_time,
        cancel_reason: m.cancel_reason,
        reminder_sent_at: m.reminder_sent_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<reservation::Model>) -> DomainResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

fn status_strings(statuses: &[ReservationStatus]) -> Vec<&'static str> {
    statuses.iter().map(|s| s.as_str()).collect()
}

/// Reservations on a point in the given statuses whose interval overlaps
/// `[from, to)`. Both intervals are half-open, so touching slots do not
/// overlap.
pub(crate) fn overlapping_query(
    point_id: i32,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    statuses: &[ReservationStatus],
) -> Select<reservation::Entity> {
    reservation::Entity::find()
        .filter(reservation::Column::PointId.eq(point_id))
        .filter(reservation::Column::Status.is_in(status_strings(statuses)))
        .filter(reservation::Column::StartTime.lt(to))
        .filter(reservation::Column::EndTime.gt(from))
        .order_by_asc(reservation::Column::StartTime)
}

/// Conditional status write on an arbitrary connection (pool or
/// transaction). Returns the number of rows changed.
pub(crate) async fn transition_on<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    from: &[ReservationStatus],
    to: ReservationStatus,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<u64, sea_orm::DbErr> {
    let mut update = reservation::Entity::update_many()
        .col_expr(reservation::Column::Status, Expr::value(to.as_str()))
        .col_expr(reservation::Column::UpdatedAt, Expr::value(now));
    if let Some(reason) = reason {
        update = update.col_expr(reservation::Column::CancelReason, Expr::value(reason));
    }
    let result = update
        .filter(reservation::Column::Id.eq(id))
        .filter(reservation::Column::Status.is_in(status_strings(from)))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn save(&self, r: Reservation) -> DomainResult<Reservation> {
        debug!("Saving reservation: {}", r.code);

        let model = reservation::ActiveModel {
            id: NotSet,
            code: Set(r.code),
            driver_id: Set(r.driver_id),
            point_id: Set(r.point_id),
            start_time: Set(r.start_time),
            end_time: Set(r.end_time),
            status: Set(r.status.as_str().to_string()),
            cancel_reason: Set(r.cancel_reason),
            reminder_sent_at: Set(r.reminder_sent_at),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        model_to_domain(saved)
    }

    async fn create_guarded(
        &self,
        new: NewReservation,
        codes: &dyn CodeGenerator,
        max_code_attempts: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<Reservation> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(db_err)?;

        let holder = overlapping_query(
            new.point_id,
            new.slot.start,
            new.slot.end,
            &ReservationStatus::SLOT_HOLDING,
        )
        .one(&txn)
        .await
        .map_err(db_err)?;

        if let Some(holder) = holder {
            let holder = model_to_domain(holder)?;
            txn.rollback().await.map_err(db_err)?;
            return Err(slot_conflict(new.point_id, &new.slot, &holder));
        }

        let mut code = None;
        for attempt in 1..=max_code_attempts {
            let candidate = codes.generate();
            let taken = reservation::Entity::find()
                .filter(reservation::Column::Code.eq(candidate.as_str()))
                .count(&txn)
                .await
                .map_err(db_err)?
                > 0;
            if !taken {
                code = Some(candidate);
                break;
            }
            debug!("Reservation code collision on attempt {}", attempt);
        }

        let Some(code) = code else {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::Exhausted(format!(
                "No unused reservation code after {} attempts",
                max_code_attempts
            )));
        };

        let model = reservation::ActiveModel {
            id: NotSet,
            code: Set(code),
            driver_id: Set(new.driver_id),
            point_id: Set(new.point_id),
            start_time: Set(new.slot.start),
            end_time: Set(new.slot.end),
            status: Set(ReservationStatus::Booked.as_str().to_string()),
            cancel_reason: Set(None),
            reminder_sent_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = model.insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        info!(
            "Reservation {} booked: point={}, driver={}, slot={}",
            saved.code, saved.point_id, saved.driver_id, new.slot
        );
        model_to_domain(saved)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_code(&self, code: &str) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find()
            .filter(reservation::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_overlapping(
        &self,
        point_id: i32,
        slot: &TimeSlot,
        statuses: &[ReservationStatus],
    ) -> DomainResult<Vec<Reservation>> {
        let models = overlapping_query(point_id, slot.start, slot.end, statuses)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_holding_for_point(
        &self,
        point_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>> {
        let models = overlapping_query(point_id, from, to, &ReservationStatus::SLOT_HOLDING)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Reservation>> {
        let mut query = reservation::Entity::find();

        if let Some(driver_id) = filter.driver_id {
            query = query.filter(reservation::Column::DriverId.eq(driver_id));
        }
        if let Some(point_id) = filter.point_id {
            query = query.filter(reservation::Column::PointId.eq(point_id));
        }
        if let Some(station_id) = filter.station_id {
            use crate::infrastructure::database::entities::charging_point;
            query = query
                .join(
                    sea_orm::JoinType::InnerJoin,
                    reservation::Relation::ChargingPoint.def(),
                )
                .filter(charging_point::Column::StationId.eq(station_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(reservation::Column::Status.eq(status.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(reservation::Column::StartTime.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(reservation::Column::StartTime.lte(to));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(reservation::Column::StartTime)
            .order_by_desc(reservation::Column::Id)
            .offset(page.offset())
            .limit(page.limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PaginatedResult::new(models_to_domain(models)?, total, page))
    }

    async fn find_upcoming_for_driver(
        &self,
        driver_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::DriverId.eq(driver_id))
            .filter(reservation::Column::Status.eq(ReservationStatus::Booked.as_str()))
            .filter(reservation::Column::StartTime.gte(from))
            .filter(reservation::Column::StartTime.lte(to))
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn transition(
        &self,
        id: i32,
        from: &[ReservationStatus],
        to: ReservationStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        debug!("Reservation {} -> {} (from {:?})", id, to, from);
        let changed = transition_on(&self.db, id, from, to, reason, now)
            .await
            .map_err(db_err)?;
        Ok(changed > 0)
    }

    async fn find_booked_ended_before(&self, cutoff: DateTime<Utc>) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::Status.eq(ReservationStatus::Booked.as_str()))
            .filter(reservation::Column::EndTime.lt(cutoff))
            .order_by_asc(reservation::Column::EndTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_unreminded_starting_within(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::Status.eq(ReservationStatus::Booked.as_str()))
            .filter(reservation::Column::ReminderSentAt.is_null())
            .filter(reservation::Column::StartTime.gt(after))
            .filter(reservation::Column::StartTime.lte(until))
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn mark_reminded(&self, id: i32, at: DateTime<Utc>) -> DomainResult<()> {
        reservation::Entity::update_many()
            .col_expr(reservation::Column::ReminderSentAt, Expr::value(Some(at)))
            .filter(reservation::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_promotable(&self, now: DateTime<Utc>) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                reservation::Relation::Sessions.def(),
            )
            .filter(reservation::Column::Status.eq(ReservationStatus::CheckedIn.as_str()))
            .filter(reservation::Column::StartTime.lte(now))
            .filter(charging_session::Column::Status.eq(SessionStatus::InProgress.as_str()))
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::application::RandomCodeGenerator;
    use crate::infrastructure::database::test_support::{pooled_test_db, seed, test_db};
    use crate::shared::retry::{retry_with_backoff, RetryConfig};

    /// Hands out a fixed sequence of codes, repeating the last one.
    struct ScriptedCodes {
        codes: Vec<&'static str>,
        next: AtomicUsize,
    }

    impl ScriptedCodes {
        fn new(codes: Vec<&'static str>) -> Self {
            Self {
                codes,
                next: AtomicUsize::new(0),
            }
        }
    }

    impl CodeGenerator for ScriptedCodes {
        fn generate(&self) -> String {
            let i = self.next.fetch_add(1, Ordering::SeqCst).min(self.codes.len() - 1);
            self.codes[i].to_string()
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn slot(from: u32, to: u32) -> TimeSlot {
        TimeSlot::new(at(from), at(to)).unwrap()
    }

    #[tokio::test]
    async fn guarded_create_rejects_overlap_but_allows_adjacent_slot() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let repo = SeaOrmReservationRepository::new(db);
        let codes = ScriptedCodes::new(vec!["10000001", "10000002", "10000003"]);
        let now = at(8);

        let first = repo
            .create_guarded(
                NewReservation {
                    driver_id: fx.driver.id,
                    point_id: fx.point.id,
                    slot: slot(14, 15),
                },
                &codes,
                5,
                now,
            )
            .await
            .unwrap();
        assert_eq!(first.status, ReservationStatus::Booked);
        assert_eq!(first.code, "10000001");

        let err = repo
            .create_guarded(
                NewReservation {
                    driver_id: fx.driver.id,
                    point_id: fx.point.id,
                    slot: TimeSlot::new(at(14) + Duration::minutes(30), at(15) + Duration::minutes(30))
                        .unwrap(),
                },
                &codes,
                5,
                now,
            )
            .await
            .unwrap_err();
        match err {
            DomainError::Conflict(msg) => assert!(msg.contains("10000001"), "{}", msg),
            other => panic!("expected conflict, got {:?}", other),
        }

        let adjacent = repo
            .create_guarded(
                NewReservation {
                    driver_id: fx.driver.id,
                    point_id: fx.point.id,
                    slot: slot(15, 16),
                },
                &codes,
                5,
                now,
            )
            .await
            .unwrap();
        assert_eq!(adjacent.start_time, at(15));
    }

    #[tokio::test]
    async fn cancelled_reservation_frees_its_slot() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let repo = SeaOrmReservationRepository::new(db);
        let codes = ScriptedCodes::new(vec!["20000001", "20000002"]);

        let first = repo
            .create_guarded(
                NewReservation {
                    driver_id: fx.driver.id,
                    point_id: fx.point.id,
                    slot: slot(10, 11),
                },
                &codes,
                5,
                at(8),
            )
            .await
            .unwrap();
        assert!(repo
            .transition(first.id, &[ReservationStatus::Booked], ReservationStatus::Cancelled, None, at(9))
            .await
            .unwrap());

        repo.create_guarded(
            NewReservation {
                driver_id: fx.driver.id,
                point_id: fx.point.id,
                slot: slot(10, 11),
            },
            &codes,
            5,
            at(9),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn code_collisions_are_retried_then_exhausted() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let repo = SeaOrmReservationRepository::new(db);

        let first = ScriptedCodes::new(vec!["30000001"]);
        repo.create_guarded(
            NewReservation {
                driver_id: fx.driver.id,
                point_id: fx.point.id,
                slot: slot(10, 11),
            },
            &first,
            5,
            at(8),
        )
        .await
        .unwrap();

        // One collision, then a free code
        let retrying = ScriptedCodes::new(vec!["30000001", "30000002"]);
        let second = repo
            .create_guarded(
                NewReservation {
                    driver_id: fx.driver.id,
                    point_id: fx.point.id,
                    slot: slot(11, 12),
                },
                &retrying,
                5,
                at(8),
            )
            .await
            .unwrap();
        assert_eq!(second.code, "30000002");

        let stuck = ScriptedCodes::new(vec!["30000001"]);
        let err = repo
            .create_guarded(
                NewReservation {
                    driver_id: fx.driver.id,
                    point_id: fx.point.id,
                    slot: slot(12, 13),
                },
                &stuck,
                5,
                at(8),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Exhausted(_)));
        assert_eq!(stuck.next.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bookings_of_one_slot_yield_a_single_winner() {
        let file = pooled_test_db(5).await;
        let fx = seed(&file.db).await;
        let repo = Arc::new(SeaOrmReservationRepository::new(file.db.clone()));
        let retry = RetryConfig {
            max_attempts: 10,
            initial_delay: std::time::Duration::from_millis(10),
            ..RetryConfig::default()
        };

        let mut handles = Vec::new();
        for _ in 0..12 {
            let repo = repo.clone();
            let retry = retry.clone();
            let driver_id = fx.driver.id;
            let point_id = fx.point.id;
            handles.push(tokio::spawn(async move {
                retry_with_backoff(
                    &retry,
                    || {
                        repo.create_guarded(
                            NewReservation {
                                driver_id,
                                point_id,
                                slot: slot(18, 19),
                            },
                            &RandomCodeGenerator,
                            5,
                            at(8),
                        )
                    },
                    DomainError::is_transient,
                    "create_guarded",
                )
                .await
            }));
        }

        let mut ok = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(DomainError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 11);

        let holding = repo
            .find_holding_for_point(fx.point.id, at(18), at(19))
            .await
            .unwrap();
        assert_eq!(holding.len(), 1);
    }

    #[tokio::test]
    async fn conditional_transition_only_applies_from_listed_statuses() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let repo = SeaOrmReservationRepository::new(db);
        let codes = ScriptedCodes::new(vec!["50000001"]);

        let r = repo
            .create_guarded(
                NewReservation {
                    driver_id: fx.driver.id,
                    point_id: fx.point.id,
                    slot: slot(10, 11),
                },
                &codes,
                5,
                at(8),
            )
            .await
            .unwrap();

        let moved = repo
            .transition(
                r.id,
                &[ReservationStatus::CheckedIn],
                ReservationStatus::InProgress,
                None,
                at(9),
            )
            .await
            .unwrap();
        assert!(!moved);

        let moved = repo
            .transition(
                r.id,
                &[ReservationStatus::Booked],
                ReservationStatus::Cancelled,
                Some("changed plans".into()),
                at(9),
            )
            .await
            .unwrap();
        assert!(moved);

        let stored = repo.find_by_id(r.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Cancelled);
        assert_eq!(stored.cancel_reason.as_deref(), Some("changed plans"));
    }

    #[tokio::test]
    async fn listing_filters_and_paginates() {
        let db = test_db().await;
        let fx = seed(&db).await;
        let repo = SeaOrmReservationRepository::new(db);
        let codes = ScriptedCodes::new(vec!["60000001", "60000002", "60000003"]);

        for h in [9, 11, 13] {
            repo.create_guarded(
                NewReservation {
                    driver_id: fx.driver.id,
                    point_id: fx.point.id,
                    slot: slot(h, h + 1),
                },
                &codes,
                5,
                at(8),
            )
            .await
            .unwrap();
        }

        let filter = ReservationFilter {
            station_id: Some(fx.station.id),
            ..Default::default()
        };
        let page = repo.list(&filter, PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].start_time, at(13));

        let filter = ReservationFilter {
            from: Some(at(10)),
            to: Some(at(12)),
            ..Default::default()
        };
        let page = repo.list(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].start_time, at(11));
    }
}
