//! Create drivers and staff_assignments tables

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_stations::Stations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Drivers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Drivers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Drivers::UserId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Drivers::FullName).string().not_null())
                    .col(ColumnDef::new(Drivers::VehicleConnector).string())
                    .col(
                        ColumnDef::new(Drivers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StaffAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StaffAssignments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StaffAssignments::StaffId).string().not_null())
                    .col(ColumnDef::new(StaffAssignments::StationId).integer().not_null())
                    .col(
                        ColumnDef::new(StaffAssignments::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_assignments_station")
                            .from(StaffAssignments::Table, StaffAssignments::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_staff_assignments_unique")
                    .table(StaffAssignments::Table)
                    .col(StaffAssignments::StaffId)
                    .col(StaffAssignments::StationId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StaffAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Drivers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Drivers {
    Table,
    Id,
    UserId,
    FullName,
    VehicleConnector,
    CreatedAt,
}

#[derive(Iden)]
pub enum StaffAssignments {
    Table,
    Id,
    StaffId,
    StationId,
    AssignedAt,
}
