//! Charging session entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "charging_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub driver_id: i32,
    pub point_id: i32,

    /// NULL for walk-in sessions
    #[sea_orm(nullable)]
    pub reservation_id: Option<i32>,

    pub start_time: DateTimeUtc,
    #[sea_orm(nullable)]
    pub end_time: Option<DateTimeUtc>,

    pub initial_soc: i32,
    #[sea_orm(nullable)]
    pub current_soc: Option<i32>,
    #[sea_orm(nullable)]
    pub final_soc: Option<i32>,

    pub energy_used_kwh: f64,
    pub duration_minutes: i64,

    // Money columns hold decimal text
    pub cost_before_discount: String,
    pub discount: String,
    pub final_cost: String,

    /// Session status: in_progress, paused, completed, interrupted, cancelled
    pub status: String,

    #[sea_orm(nullable)]
    pub paused_at: Option<DateTimeUtc>,
    #[sea_orm(nullable)]
    pub max_pause_minutes: Option<i32>,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reservation::Entity",
        from = "Column::ReservationId",
        to = "super::reservation::Column::Id"
    )]
    Reservation,
    #[sea_orm(
        belongs_to = "super::charging_point::Entity",
        from = "Column::PointId",
        to = "super::charging_point::Column::Id"
    )]
    ChargingPoint,
    #[sea_orm(has_many = "super::session_log::Entity")]
    Logs,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl Related<super::charging_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargingPoint.def()
    }
}

impl Related<super::session_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
