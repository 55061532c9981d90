//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// 8-digit numeric code
    #[sea_orm(unique)]
    pub code: String,

    pub driver_id: i32,
    pub point_id: i32,

    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    /// Reservation status: booked, checked_in, in_progress, completed,
    /// cancelled, no_show
    pub status: String,

    #[sea_orm(nullable)]
    pub cancel_reason: Option<String>,

    #[sea_orm(nullable)]
    pub reminder_sent_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charging_point::Entity",
        from = "Column::PointId",
        to = "super::charging_point::Column::Id"
    )]
    ChargingPoint,
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id"
    )]
    Driver,
    #[sea_orm(has_many = "super::charging_session::Entity")]
    Sessions,
}

impl Related<super::charging_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargingPoint.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl Related<super::charging_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
