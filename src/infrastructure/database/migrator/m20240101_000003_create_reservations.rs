//! Create reservations table
//!
//! `code` carries a unique index: it is the last guard against two
//! bookings ending up with the same human-readable code.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_stations::ChargingPoints;
use super::m20240101_000002_create_drivers_and_staff::Drivers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::Code).string_len(8).not_null())
                    .col(ColumnDef::new(Reservations::DriverId).integer().not_null())
                    .col(ColumnDef::new(Reservations::PointId).integer().not_null())
                    .col(
                        ColumnDef::new(Reservations::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("booked"),
                    )
                    .col(ColumnDef::new(Reservations::CancelReason).string())
                    .col(ColumnDef::new(Reservations::ReminderSentAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_point")
                            .from(Reservations::Table, Reservations::PointId)
                            .to(ChargingPoints::Table, ChargingPoints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_driver")
                            .from(Reservations::Table, Reservations::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_code")
                    .table(Reservations::Table)
                    .col(Reservations::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_point_start")
                    .table(Reservations::Table)
                    .col(Reservations::PointId)
                    .col(Reservations::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_status_end")
                    .table(Reservations::Table)
                    .col(Reservations::Status)
                    .col(Reservations::EndTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Reservations {
    Table,
    Id,
    Code,
    DriverId,
    PointId,
    StartTime,
    EndTime,
    Status,
    CancelReason,
    ReminderSentAt,
    CreatedAt,
    UpdatedAt,
}
