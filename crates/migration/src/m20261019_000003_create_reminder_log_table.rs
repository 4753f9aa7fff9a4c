use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Audit trail of reminder e-mails that were handed to the SMTP relay.
///
/// Rows outlive the vehicle they reference, so there is no foreign key.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReminderLog::Table)
                    .if_not_exists()
                    .col(pk_auto(ReminderLog::Id))
                    .col(integer(ReminderLog::VehicleId))
                    // 'insurance' or 'inspection'
                    .col(string(ReminderLog::Document))
                    .col(string(ReminderLog::Recipient))
                    .col(integer(ReminderLog::DaysRemaining))
                    .col(
                        timestamp_with_time_zone(ReminderLog::SentAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reminder_log_vehicle_document")
                    .table(ReminderLog::Table)
                    .col(ReminderLog::VehicleId)
                    .col(ReminderLog::Document)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reminder_log_sent_at")
                    .table(ReminderLog::Table)
                    .col(ReminderLog::SentAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReminderLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ReminderLog {
    Table,
    Id,
    VehicleId,
    Document,
    Recipient,
    DaysRemaining,
    SentAt,
}
