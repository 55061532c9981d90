//! Session log entity (append-only telemetry / audit trail)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub session_id: i32,
    pub soc: i32,

    #[sea_orm(nullable)]
    pub power_kw: Option<f64>,
    #[sea_orm(nullable)]
    pub voltage: Option<f64>,
    #[sea_orm(nullable)]
    pub temperature: Option<f64>,
    #[sea_orm(nullable)]
    pub note: Option<String>,

    pub logged_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charging_session::Entity",
        from = "Column::SessionId",
        to = "super::charging_session::Column::Id"
    )]
    Session,
}

impl Related<super::charging_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
