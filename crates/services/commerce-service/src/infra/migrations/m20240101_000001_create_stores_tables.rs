//! Migration: Create stores, store_members, store_quotas and instant_carts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stores::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stores::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Stores::UserId).uuid().not_null())
                    .col(ColumnDef::new(Stores::Name).string_len(60).not_null())
                    .col(timestamp(Stores::CreatedAt))
                    .col(timestamp(Stores::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stores_user_id")
                    .table(Stores::Table)
                    .col(Stores::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StoreMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StoreMembers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(StoreMembers::StoreId).uuid().not_null())
                    .col(ColumnDef::new(StoreMembers::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(StoreMembers::Role)
                            .string_len(20)
                            .not_null()
                            .default("team member"),
                    )
                    .col(timestamp(StoreMembers::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_store_members_store_id")
                            .from(StoreMembers::Table, StoreMembers::StoreId)
                            .to(Stores::Table, Stores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_store_members_store_user")
                    .table(StoreMembers::Table)
                    .col(StoreMembers::StoreId)
                    .col(StoreMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StoreQuotas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StoreQuotas::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(StoreQuotas::StoreId).uuid().not_null().unique_key())
                    .col(
                        ColumnDef::new(StoreQuotas::SmsCredits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(StoreQuotas::EmailCredits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(StoreQuotas::CreatedAt))
                    .col(timestamp(StoreQuotas::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_store_quotas_store_id")
                            .from(StoreQuotas::Table, StoreQuotas::StoreId)
                            .to(Stores::Table, Stores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InstantCarts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InstantCarts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InstantCarts::StoreId).uuid().not_null())
                    .col(ColumnDef::new(InstantCarts::Name).string_len(60).not_null())
                    .col(
                        ColumnDef::new(InstantCarts::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(InstantCarts::CreatedAt))
                    .col(timestamp(InstantCarts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_instant_carts_store_id")
                            .from(InstantCarts::Table, InstantCarts::StoreId)
                            .to(Stores::Table, Stores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InstantCarts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StoreQuotas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StoreMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stores::Table).to_owned())
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
pub enum Stores {
    Table,
    Id,
    UserId,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum StoreMembers {
    Table,
    Id,
    StoreId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum StoreQuotas {
    Table,
    Id,
    StoreId,
    SmsCredits,
    EmailCredits,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum InstantCarts {
    Table,
    Id,
    StoreId,
    Name,
    Active,
    CreatedAt,
    UpdatedAt,
}
