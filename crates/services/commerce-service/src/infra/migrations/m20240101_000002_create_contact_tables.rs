//! Migration: Create customers, delivery_addresses and friends.

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
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customers::StoreId).uuid().not_null())
                    .col(ColumnDef::new(Customers::FirstName).string_len(60).not_null())
                    .col(ColumnDef::new(Customers::LastName).string_len(60).not_null())
                    .col(ColumnDef::new(Customers::MobileNumber).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Customers::TotalOrders)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::TotalSpend)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::LastOrderAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp(Customers::CreatedAt))
                    .col(timestamp(Customers::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_store_id")
                            .from(Customers::Table, Customers::StoreId)
                            .to(Stores::Table, Stores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customers_store_id")
                    .table(Customers::Table)
                    .col(Customers::StoreId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeliveryAddresses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DeliveryAddresses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DeliveryAddresses::UserId).uuid().not_null())
                    .col(ColumnDef::new(DeliveryAddresses::Name).string_len(60).not_null())
                    .col(ColumnDef::new(DeliveryAddresses::AddressLine).string_len(255).not_null())
                    .col(timestamp(DeliveryAddresses::CreatedAt))
                    .col(timestamp(DeliveryAddresses::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_delivery_addresses_user_id")
                    .table(DeliveryAddresses::Table)
                    .col(DeliveryAddresses::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Friends::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Friends::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Friends::UserId).uuid().not_null())
                    .col(ColumnDef::new(Friends::Name).string_len(60).not_null())
                    .col(ColumnDef::new(Friends::MobileNumber).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Friends::LastSelectedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp(Friends::CreatedAt))
                    .col(timestamp(Friends::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_friends_user_id")
                    .table(Friends::Table)
                    .col(Friends::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Friends::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeliveryAddresses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
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
enum Customers {
    Table,
    Id,
    StoreId,
    FirstName,
    LastName,
    MobileNumber,
    TotalOrders,
    TotalSpend,
    LastOrderAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DeliveryAddresses {
    Table,
    Id,
    UserId,
    Name,
    AddressLine,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Friends {
    Table,
    Id,
    UserId,
    Name,
    MobileNumber,
    LastSelectedAt,
    CreatedAt,
    UpdatedAt,
}
