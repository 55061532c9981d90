//! SeaORM implementation of SessionRepository
//!
//! Session, point and reservation rows that change together are written
//! inside one serializable transaction. Status moves use conditional
//! `UPDATE ... WHERE status IN (...)` so a concurrent writer turns into
//! zero affected rows instead of a lost update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, NotSet, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};

use super::reservation_repository::transition_on;
use super::{db_err, parse_column, parse_money};
use crate::domain::reservation::ReservationStatus;
use crate::domain::session::{
    ChargingSession, NewSession, NewSessionLog, PauseChange, SessionClosing, SessionLog,
    SessionRepository, SessionStatus,
};
use crate::domain::station::PointStatus;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{
    charging_point, charging_session, reservation, session_log,
};

pub struct SeaOrmSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn begin(&self) -> DomainResult<DatabaseTransaction> {
        self.db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(db_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: charging_session::Model) -> DomainResult<ChargingSession> {
    Ok(ChargingSession {
        id: m.id,
        status: parse_column("charging_sessions.status", &m.status)?,
        cost_before_discount: parse_money(
            "charging_sessions.cost_before_discount",
            &m.cost_before_discount,
        )?,
        discount: parse_money("charging_sessions.discount", &m.discount)?,
        final_cost: parse_money("charging_sessions.final_cost", &m.final_cost)?,
        driver_id: m.driver_id,
        point_id: m.point_id,
        reservation_id: m.reservation_id,
        start_time: m.start_time,
        end_time: m.end_time,
        initial_soc: m.initial_soc,
        current_soc: m.current_soc,
        final_soc: m.final_soc,
        energy_used_kwh: m.energy_used_kwh,
        duration_minutes: m.duration_minutes,
        paused_at: m.paused_at,
        max_pause_minutes: m.max_pause_minutes,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<charging_session::Model>) -> DomainResult<Vec<ChargingSession>> {
    models.into_iter().map(model_to_domain).collect()
}

fn log_to_domain(m: session_log::Model) -> SessionLog {
    SessionLog {
        id: m.id,
        session_id: m.session_id,
        soc: m.soc,
        power_kw: m.power_kw,
        voltage: m.voltage,
        temperature: m.temperature,
        note: m.note,
        logged_at: m.logged_at,
    }
}

fn active_statuses() -> Vec<&'static str> {
    SessionStatus::ACTIVE.iter().map(|s| s.as_str()).collect()
}

async fn load_session<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<ChargingSession> {
    let model = charging_session::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("ChargingSession", "id", id))?;
    model_to_domain(model)
}

async fn insert_log<C: ConnectionTrait>(conn: &C, log: NewSessionLog) -> DomainResult<SessionLog> {
    let model = session_log::ActiveModel {
        id: NotSet,
        session_id: Set(log.session_id),
        soc: Set(log.soc),
        power_kw: Set(log.power_kw),
        voltage: Set(log.voltage),
        temperature: Set(log.temperature),
        note: Set(log.note),
        logged_at: Set(log.logged_at),
    };
    let saved = model.insert(conn).await.map_err(db_err)?;
    Ok(log_to_domain(saved))
}

/// Move a point that a session occupies (in_use / paused) to `to`.
/// Staff holds (maintenance / offline) are left as they are.
async fn move_occupied_point<C: ConnectionTrait>(
    conn: &C,
    point_id: i32,
    to: PointStatus,
    now: DateTime<Utc>,
) -> DomainResult<u64> {
    let result = charging_point::Entity::update_many()
        .col_expr(charging_point::Column::Status, Expr::value(to.as_str()))
        .col_expr(charging_point::Column::UpdatedAt, Expr::value(now))
        .filter(charging_point::Column::Id.eq(point_id))
        .filter(charging_point::Column::Status.is_in([
            PointStatus::InUse.as_str(),
            PointStatus::Paused.as_str(),
        ]))
        .exec(conn)
        .await
        .map_err(db_err)?;
    Ok(result.rows_affected)
}

// ── SessionRepository impl ──────────────────────────────────────

#[async_trait]
impl SessionRepository for SeaOrmSessionRepository {
    async fn start_guarded(
        &self,
        new: NewSession,
        claim_reservation: bool,
    ) -> DomainResult<ChargingSession> {
        let txn = self.begin().await?;

        let running = charging_session::Entity::find()
            .filter(charging_session::Column::DriverId.eq(new.driver_id))
            .filter(charging_session::Column::Status.is_in(active_statuses()))
            .one(&txn)
            .await
            .map_err(db_err)?;
        if let Some(running) = running {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::Conflict(format!(
                "Driver {} already has an active session {} on point {}",
                new.driver_id, running.id, running.point_id
            )));
        }

        let claimed = charging_point::Entity::update_many()
            .col_expr(
                charging_point::Column::Status,
                Expr::value(PointStatus::InUse.as_str()),
            )
            .col_expr(charging_point::Column::UpdatedAt, Expr::value(new.start_time))
            .filter(charging_point::Column::Id.eq(new.point_id))
            .filter(charging_point::Column::Status.eq(PointStatus::Available.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if claimed.rows_affected == 0 {
            let point = charging_point::Entity::find_by_id(new.point_id)
                .one(&txn)
                .await
                .map_err(db_err)?;
            txn.rollback().await.map_err(db_err)?;
            return Err(match point {
                None => DomainError::not_found("ChargingPoint", "id", new.point_id),
                Some(p) => DomainError::Conflict(format!(
                    "PointUnavailable: point {} is {}",
                    p.id, p.status
                )),
            });
        }

        if let (Some(reservation_id), true) = (new.reservation_id, claim_reservation) {
            let moved = transition_on(
                &txn,
                reservation_id,
                &[ReservationStatus::Booked],
                ReservationStatus::CheckedIn,
                None,
                new.start_time,
            )
            .await
            .map_err(db_err)?;
            if moved == 0 {
                txn.rollback().await.map_err(db_err)?;
                return Err(DomainError::InvalidState(format!(
                    "Reservation {} is no longer booked",
                    reservation_id
                )));
            }
        }

        let model = charging_session::ActiveModel {
            id: NotSet,
            driver_id: Set(new.driver_id),
            point_id: Set(new.point_id),
            reservation_id: Set(new.reservation_id),
            start_time: Set(new.start_time),
            end_time: Set(None),
            initial_soc: Set(new.initial_soc),
            current_soc: Set(Some(new.initial_soc)),
            final_soc: Set(None),
            energy_used_kwh: Set(0.0),
            duration_minutes: Set(0),
            cost_before_discount: Set("0".to_string()),
            discount: Set("0".to_string()),
            final_cost: Set("0".to_string()),
            status: Set(SessionStatus::InProgress.as_str().to_string()),
            paused_at: Set(None),
            max_pause_minutes: Set(None),
            updated_at: Set(new.start_time),
        };
        let saved = model.insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        info!(
            "Session {} started: point={}, driver={}, reservation={:?}",
            saved.id, saved.point_id, saved.driver_id, saved.reservation_id
        );
        model_to_domain(saved)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ChargingSession>> {
        charging_session::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_active_for_driver(&self, driver_id: i32) -> DomainResult<Option<ChargingSession>> {
        charging_session::Entity::find()
            .filter(charging_session::Column::DriverId.eq(driver_id))
            .filter(charging_session::Column::Status.is_in(active_statuses()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_active_for_point(&self, point_id: i32) -> DomainResult<Option<ChargingSession>> {
        charging_session::Entity::find()
            .filter(charging_session::Column::PointId.eq(point_id))
            .filter(charging_session::Column::Status.is_in(active_statuses()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_reservation(&self, reservation_id: i32) -> DomainResult<Option<ChargingSession>> {
        charging_session::Entity::find()
            .filter(charging_session::Column::ReservationId.eq(reservation_id))
            .order_by_desc(charging_session::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn close_guarded(
        &self,
        session_id: i32,
        closing: SessionClosing,
        release_to: PointStatus,
        audit: Option<NewSessionLog>,
    ) -> DomainResult<ChargingSession> {
        let txn = self.begin().await?;

        let current = load_session(&txn, session_id).await?;
        if current.status.is_terminal() {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::InvalidState(format!(
                "Session {} is already {}",
                session_id, current.status
            )));
        }

        let closed = charging_session::Entity::update_many()
            .col_expr(
                charging_session::Column::Status,
                Expr::value(closing.status.as_str()),
            )
            .col_expr(charging_session::Column::EndTime, Expr::value(Some(closing.end_time)))
            .col_expr(charging_session::Column::FinalSoc, Expr::value(Some(closing.final_soc)))
            .col_expr(
                charging_session::Column::EnergyUsedKwh,
                Expr::value(closing.energy_used_kwh),
            )
            .col_expr(
                charging_session::Column::DurationMinutes,
                Expr::value(closing.duration_minutes),
            )
            .col_expr(
                charging_session::Column::CostBeforeDiscount,
                Expr::value(closing.cost_before_discount.to_string()),
            )
            .col_expr(
                charging_session::Column::Discount,
                Expr::value(closing.discount.to_string()),
            )
            .col_expr(
                charging_session::Column::FinalCost,
                Expr::value(closing.final_cost.to_string()),
            )
            .col_expr(
                charging_session::Column::PausedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(charging_session::Column::UpdatedAt, Expr::value(closing.end_time))
            .filter(charging_session::Column::Id.eq(session_id))
            .filter(charging_session::Column::Status.is_in(active_statuses()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if closed.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::InvalidState(format!(
                "Session {} was closed concurrently",
                session_id
            )));
        }

        let released = move_occupied_point(&txn, current.point_id, release_to, closing.end_time).await?;
        if released == 0 {
            debug!(
                "Point {} kept its staff status after session {} closed",
                current.point_id, session_id
            );
        }

        if let Some(reservation_id) = current.reservation_id {
            let (to, reason) = match closing.status {
                SessionStatus::Cancelled => (
                    ReservationStatus::Cancelled,
                    Some("Charging session cancelled".to_string()),
                ),
                _ => (ReservationStatus::Completed, None),
            };
            transition_on(
                &txn,
                reservation_id,
                &[ReservationStatus::CheckedIn, ReservationStatus::InProgress],
                to,
                reason,
                closing.end_time,
            )
            .await
            .map_err(db_err)?;
        }

        if let Some(audit) = audit {
            insert_log(&txn, audit).await?;
        }

        let session = load_session(&txn, session_id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            "Session {} closed as {}: energy={:.2} kWh, cost={}",
            session.id, session.status, session.energy_used_kwh, session.final_cost
        );
        Ok(session)
    }

    async fn change_status_guarded(
        &self,
        session_id: i32,
        from: SessionStatus,
        to: SessionStatus,
        point_to: PointStatus,
        pause: PauseChange,
        audit: NewSessionLog,
    ) -> DomainResult<ChargingSession> {
        let txn = self.begin().await?;
        let current = load_session(&txn, session_id).await?;

        let (paused_at, max_pause_minutes) = match pause {
            PauseChange::Start { at, max_minutes } => (Some(at), max_minutes),
            PauseChange::Clear => (None, None),
        };

        let changed = charging_session::Entity::update_many()
            .col_expr(charging_session::Column::Status, Expr::value(to.as_str()))
            .col_expr(charging_session::Column::PausedAt, Expr::value(paused_at))
            .col_expr(
                charging_session::Column::MaxPauseMinutes,
                Expr::value(max_pause_minutes),
            )
            .col_expr(charging_session::Column::UpdatedAt, Expr::value(audit.logged_at))
            .filter(charging_session::Column::Id.eq(session_id))
            .filter(charging_session::Column::Status.eq(from.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if changed.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::InvalidState(format!(
                "Session {} is {}, expected {}",
                session_id, current.status, from
            )));
        }

        move_occupied_point(&txn, current.point_id, point_to, audit.logged_at).await?;
        insert_log(&txn, audit).await?;

        let session = load_session(&txn, session_id).await?;
        txn.commit().await.map_err(db_err)?;

        info!("Session {} moved {} -> {}", session_id, from, to);
        Ok(session)
    }

    async fn append_log(&self, log: NewSessionLog) -> DomainResult<SessionLog> {
        debug!("Session {} telemetry: soc={}", log.session_id, log.soc);

        let txn = self.begin().await?;
        let session_id = log.session_id;
        let soc = log.soc;
        let saved = insert_log(&txn, log).await?;
        charging_session::Entity::update_many()
            .col_expr(charging_session::Column::CurrentSoc, Expr::value(Some(soc)))
            .filter(charging_session::Column::Id.eq(session_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(saved)
    }

    async fn list_logs(&self, session_id: i32) -> DomainResult<Vec<SessionLog>> {
        let models = session_log::Entity::find()
            .filter(session_log::Column::SessionId.eq(session_id))
            .order_by_asc(session_log::Column::LoggedAt)
            .order_by_asc(session_log::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(log_to_domain).collect())
    }

    async fn last_log(&self, session_id: i32) -> DomainResult<Option<SessionLog>> {
        let model = session_log::Entity::find()
            .filter(session_log::Column::SessionId.eq(session_id))
            .order_by_desc(session_log::Column::LoggedAt)
            .order_by_desc(session_log::Column::Id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(log_to_domain))
    }

    async fn find_overrunning(&self, now: DateTime<Utc>) -> DomainResult<Vec<ChargingSession>> {
        let models = charging_session::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                charging_session::Relation::Reservation.def(),
            )
            .filter(charging_session::Column::Status.eq(SessionStatus::InProgress.as_str()))
            .filter(charging_session::Column::EndTime.is_null())
            .filter(reservation::Column::EndTime.lt(now))
            .filter(reservation::Column::Status.is_in([
                ReservationStatus::CheckedIn.as_str(),
                ReservationStatus::InProgress.as_str(),
            ]))
            .order_by_asc(charging_session::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_paused(&self) -> DomainResult<Vec<ChargingSession>> {
        let models = charging_session::Entity::find()
            .filter(charging_session::Column::Status.eq(SessionStatus::Paused.as_str()))
            .order_by_asc(charging_session::Column::PausedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }
}
