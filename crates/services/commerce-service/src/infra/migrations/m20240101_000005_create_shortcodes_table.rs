//! Migration: Create shortcodes.
//!
//! Codes are unique, and each (owner, action) pair holds at most one code.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shortcodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shortcodes::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Shortcodes::Code)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Shortcodes::Action).string_len(10).not_null())
                    .col(ColumnDef::new(Shortcodes::OwnerType).string_len(20).not_null())
                    .col(ColumnDef::new(Shortcodes::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Shortcodes::ReservedForUserId).uuid().null())
                    .col(
                        ColumnDef::new(Shortcodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shortcodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Shortcodes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shortcodes_owner_action")
                    .table(Shortcodes::Table)
                    .col(Shortcodes::OwnerType)
                    .col(Shortcodes::OwnerId)
                    .col(Shortcodes::Action)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Recycling scans expired codes per action
        manager
            .create_index(
                Index::create()
                    .name("idx_shortcodes_action_expires_at")
                    .table(Shortcodes::Table)
                    .col(Shortcodes::Action)
                    .col(Shortcodes::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shortcodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Shortcodes {
    Table,
    Id,
    Code,
    Action,
    OwnerType,
    OwnerId,
    ReservedForUserId,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}
