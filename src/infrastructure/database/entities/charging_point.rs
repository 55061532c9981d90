//! Charging point entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "charging_points")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub station_id: i32,
    pub name: String,

    /// Connector standard: Type1, Type2, CCS1, CCS2, CHAdeMO, GBT
    pub connector_type: String,

    pub power_kw: f64,

    /// Decimal price per kWh, stored as text to stay exact on every backend
    pub price_per_kwh: String,

    #[sea_orm(unique)]
    pub qr_code: String,

    /// Point status: available, in_use, paused, maintenance, offline
    pub status: String,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::StationId",
        to = "super::station::Column::Id"
    )]
    Station,
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
    #[sea_orm(has_many = "super::charging_session::Entity")]
    Sessions,
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Station.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl Related<super::charging_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
