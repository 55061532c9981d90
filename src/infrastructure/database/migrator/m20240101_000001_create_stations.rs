//! Create stations and charging_points tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stations::Name).string().not_null())
                    .col(ColumnDef::new(Stations::Address).string().not_null())
                    .col(ColumnDef::new(Stations::Latitude).double())
                    .col(ColumnDef::new(Stations::Longitude).double())
                    .col(
                        ColumnDef::new(Stations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Stations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChargingPoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargingPoints::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChargingPoints::StationId).integer().not_null())
                    .col(ColumnDef::new(ChargingPoints::Name).string().not_null())
                    .col(ColumnDef::new(ChargingPoints::ConnectorType).string().not_null())
                    .col(ColumnDef::new(ChargingPoints::PowerKw).double().not_null())
                    .col(
                        ColumnDef::new(ChargingPoints::PricePerKwh)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(ChargingPoints::QrCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ChargingPoints::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(ChargingPoints::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charging_points_station")
                            .from(ChargingPoints::Table, ChargingPoints::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_charging_points_connector_status")
                    .table(ChargingPoints::Table)
                    .col(ChargingPoints::ConnectorType)
                    .col(ChargingPoints::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChargingPoints::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Stations {
    Table,
    Id,
    Name,
    Address,
    Latitude,
    Longitude,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
pub enum ChargingPoints {
    Table,
    Id,
    StationId,
    Name,
    ConnectorType,
    PowerKw,
    PricePerKwh,
    QrCode,
    Status,
    UpdatedAt,
}
