//! Create charging_sessions and session_logs tables

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_stations::ChargingPoints;
use super::m20240101_000002_create_drivers_and_staff::Drivers;
use super::m20240101_000003_create_reservations::Reservations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChargingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargingSessions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChargingSessions::DriverId).integer().not_null())
                    .col(ColumnDef::new(ChargingSessions::PointId).integer().not_null())
                    .col(ColumnDef::new(ChargingSessions::ReservationId).integer())
                    .col(
                        ColumnDef::new(ChargingSessions::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChargingSessions::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(ChargingSessions::InitialSoc).integer().not_null())
                    .col(ColumnDef::new(ChargingSessions::CurrentSoc).integer())
                    .col(ColumnDef::new(ChargingSessions::FinalSoc).integer())
                    .col(
                        ColumnDef::new(ChargingSessions::EnergyUsedKwh)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ChargingSessions::DurationMinutes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ChargingSessions::CostBeforeDiscount)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(ChargingSessions::Discount)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(ChargingSessions::FinalCost)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(ChargingSessions::Status)
                            .string()
                            .not_null()
                            .default("in_progress"),
                    )
                    .col(ColumnDef::new(ChargingSessions::PausedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ChargingSessions::MaxPauseMinutes).integer())
                    .col(
                        ColumnDef::new(ChargingSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charging_sessions_point")
                            .from(ChargingSessions::Table, ChargingSessions::PointId)
                            .to(ChargingPoints::Table, ChargingPoints::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charging_sessions_driver")
                            .from(ChargingSessions::Table, ChargingSessions::DriverId)
                            .to(Drivers::Table, Drivers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charging_sessions_reservation")
                            .from(ChargingSessions::Table, ChargingSessions::ReservationId)
                            .to(Reservations::Table, Reservations::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_charging_sessions_status")
                    .table(ChargingSessions::Table)
                    .col(ChargingSessions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_charging_sessions_reservation")
                    .table(ChargingSessions::Table)
                    .col(ChargingSessions::ReservationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SessionLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SessionLogs::SessionId).integer().not_null())
                    .col(ColumnDef::new(SessionLogs::Soc).integer().not_null())
                    .col(ColumnDef::new(SessionLogs::PowerKw).double())
                    .col(ColumnDef::new(SessionLogs::Voltage).double())
                    .col(ColumnDef::new(SessionLogs::Temperature).double())
                    .col(ColumnDef::new(SessionLogs::Note).string())
                    .col(
                        ColumnDef::new(SessionLogs::LoggedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_logs_session")
                            .from(SessionLogs::Table, SessionLogs::SessionId)
                            .to(ChargingSessions::Table, ChargingSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_session_logs_session_time")
                    .table(SessionLogs::Table)
                    .col(SessionLogs::SessionId)
                    .col(SessionLogs::LoggedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SessionLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChargingSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ChargingSessions {
    Table,
    Id,
    DriverId,
    PointId,
    ReservationId,
    StartTime,
    EndTime,
    InitialSoc,
    CurrentSoc,
    FinalSoc,
    EnergyUsedKwh,
    DurationMinutes,
    CostBeforeDiscount,
    Discount,
    FinalCost,
    Status,
    PausedAt,
    MaxPauseMinutes,
    UpdatedAt,
}

#[derive(Iden)]
pub enum SessionLogs {
    Table,
    Id,
    SessionId,
    Soc,
    PowerKw,
    Voltage,
    Temperature,
    Note,
    LoggedAt,
}
