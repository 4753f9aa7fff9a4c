use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(pk_auto(Vehicle::Id))
                    .col(string_null(Vehicle::Brand))
                    .col(string_null(Vehicle::Model))
                    .col(string_null(Vehicle::Plate))
                    .col(string_null(Vehicle::Vin))
                    .col(string_null(Vehicle::Year))
                    .col(string_null(Vehicle::Garage))
                    .col(string_null(Vehicle::Note))
                    .col(string_null(Vehicle::ImagePath))
                    .col(string_null(Vehicle::PolicyNumber))
                    // Document due dates as ISO `YYYY-MM-DD` text
                    .col(string_null(Vehicle::InsuranceDate))
                    .col(string_null(Vehicle::InspectionDate))
                    .col(string_null(Vehicle::ReminderEmail))
                    .col(date(Vehicle::CreatedOn).default(Expr::current_date()))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_garage")
                    .table(Vehicle::Table)
                    .col(Vehicle::Garage)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_vehicle_garage")
                    .table(Vehicle::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Vehicle {
    Table,
    Id,
    Brand,
    Model,
    Plate,
    Vin,
    Year,
    Garage,
    Note,
    ImagePath,
    PolicyNumber,
    InsuranceDate,
    InspectionDate,
    ReminderEmail,
    CreatedOn,
}
