use sea_orm_migration::{prelude::*, schema::*};

use crate::m20261019_000001_create_vehicle_table::Vehicle;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Mileage readings and service events, owned by a vehicle.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MileageLog::Table)
                    .if_not_exists()
                    .col(pk_auto(MileageLog::Id))
                    .col(integer(MileageLog::VehicleId))
                    .col(big_integer(MileageLog::Mileage))
                    .col(string(MileageLog::Action).default(""))
                    .col(date(MileageLog::EventDate))
                    .col(
                        timestamp_with_time_zone(MileageLog::DateAdded)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mileage_log_vehicle")
                            .from(MileageLog::Table, MileageLog::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mileage_log_vehicle_event")
                    .table(MileageLog::Table)
                    .col(MileageLog::VehicleId)
                    .col(MileageLog::EventDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MileageLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MileageLog {
    Table,
    Id,
    VehicleId,
    Mileage,
    Action,
    EventDate,
    DateAdded,
}
