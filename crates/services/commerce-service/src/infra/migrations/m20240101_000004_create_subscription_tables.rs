//! Migration: Create subscription_plans, subscriptions and ai_assistants.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SubscriptionPlans::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SubscriptionPlans::Name).string_len(60).not_null())
                    .col(ColumnDef::new(SubscriptionPlans::Kind).string_len(20).not_null())
                    .col(
                        ColumnDef::new(SubscriptionPlans::Price)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SubscriptionPlans::Duration).integer().null())
                    .col(ColumnDef::new(SubscriptionPlans::Frequency).string_len(10).null())
                    .col(ColumnDef::new(SubscriptionPlans::Credits).integer().null())
                    .col(
                        ColumnDef::new(SubscriptionPlans::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(SubscriptionPlans::CreatedAt))
                    .col(timestamp(SubscriptionPlans::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Subscriptions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Subscriptions::UserId).uuid().not_null())
                    .col(ColumnDef::new(Subscriptions::OwnerType).string_len(20).not_null())
                    .col(ColumnDef::new(Subscriptions::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Subscriptions::SubscriptionPlanId).uuid().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::SmsCredits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriptions::EndAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp(Subscriptions::CreatedAt))
                    .col(timestamp(Subscriptions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscriptions_plan_id")
                            .from(Subscriptions::Table, Subscriptions::SubscriptionPlanId)
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Chaining looks up the latest end date per owner
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_owner_end_at")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::OwnerType)
                    .col(Subscriptions::OwnerId)
                    .col(Subscriptions::EndAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AiAssistants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AiAssistants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AiAssistants::UserId).uuid().not_null())
                    .col(ColumnDef::new(AiAssistants::Name).string_len(60).not_null())
                    .col(ColumnDef::new(AiAssistants::Description).text().null())
                    .col(
                        ColumnDef::new(AiAssistants::RemainingPaidTokens)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(AiAssistants::CreatedAt))
                    .col(timestamp(AiAssistants::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ai_assistants_user_id")
                    .table(AiAssistants::Table)
                    .col(AiAssistants::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiAssistants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubscriptionPlans::Table).to_owned())
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
enum SubscriptionPlans {
    Table,
    Id,
    Name,
    Kind,
    Price,
    Duration,
    Frequency,
    Credits,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Subscriptions {
    Table,
    Id,
    UserId,
    OwnerType,
    OwnerId,
    SubscriptionPlanId,
    SmsCredits,
    StartAt,
    EndAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AiAssistants {
    Table,
    Id,
    UserId,
    Name,
    Description,
    RemainingPaidTokens,
    CreatedAt,
    UpdatedAt,
}
