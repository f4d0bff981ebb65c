//! Migration: Create notifications, sms_messages and sms_alerts.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_stores_tables::Stores;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notifications::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notifications::UserId).uuid().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string_len(60).not_null())
                    .col(ColumnDef::new(Notifications::Data).json_binary().not_null())
                    .col(
                        ColumnDef::new(Notifications::ReadAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp(Notifications::CreatedAt))
                    .col(timestamp(Notifications::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Unread counts filter on both columns
        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_read")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::ReadAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SmsMessages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SmsMessages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SmsMessages::StoreId).uuid().null())
                    .col(
                        ColumnDef::new(SmsMessages::RecipientMobileNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SmsMessages::Content).string_len(480).not_null())
                    .col(
                        ColumnDef::new(SmsMessages::Sent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SmsMessages::Error).text().null())
                    .col(timestamp(SmsMessages::CreatedAt))
                    .col(timestamp(SmsMessages::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sms_messages_store_id")
                            .from(SmsMessages::Table, SmsMessages::StoreId)
                            .to(Stores::Table, Stores::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SmsAlerts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SmsAlerts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SmsAlerts::UserId).uuid().not_null().unique_key())
                    .col(
                        ColumnDef::new(SmsAlerts::SmsCredits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(SmsAlerts::CreatedAt))
                    .col(timestamp(SmsAlerts::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SmsAlerts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SmsMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await
    }
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Kind,
    Data,
    ReadAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SmsMessages {
    Table,
    Id,
    StoreId,
    RecipientMobileNumber,
    Content,
    Sent,
    Error,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SmsAlerts {
    Table,
    Id,
    UserId,
    SmsCredits,
    CreatedAt,
    UpdatedAt,
}
