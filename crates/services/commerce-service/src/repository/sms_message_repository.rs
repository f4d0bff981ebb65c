//! SMS message data access.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use super::base::{fetch_listing, scoped_select, ScopedEntity};
use super::credits::{add_store_credits, take_store_credit};
use super::entities::sms_message::{self, ActiveModel, Entity as SmsMessageEntity};
use common::{AppError, AppResult};
use domain::{CreateSmsMessage, Listing, ResourceQuery, Restriction, SmsMessage};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

impl ScopedEntity for SmsMessageEntity {
    fn id_column() -> sms_message::Column {
        sms_message::Column::Id
    }

    fn created_at_column() -> sms_message::Column {
        sms_message::Column::CreatedAt
    }

    fn search_columns() -> Vec<sms_message::Column> {
        vec![
            sms_message::Column::RecipientMobileNumber,
            sms_message::Column::Content,
        ]
    }

    fn restrict(restriction: &Restriction) -> Option<Condition> {
        match restriction {
            Restriction::Everything => Some(Condition::all()),
            Restriction::Store(store_id) => {
                Some(Condition::all().add(sms_message::Column::StoreId.eq(*store_id)))
            }
            Restriction::User(_) | Restriction::Owner(_) => None,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SmsMessageRepository: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<SmsMessage>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SmsMessage>>;

    /// Take one store credit and insert the unsent message in one transaction.
    ///
    /// `None` when the store has no credit left; nothing is written then.
    async fn create_paid(
        &self,
        store_id: Uuid,
        input: CreateSmsMessage,
    ) -> AppResult<Option<SmsMessage>>;

    /// Give the credit back and record `reason` on the message, atomically
    async fn cancel_paid(&self, id: Uuid, store_id: Uuid, reason: String) -> AppResult<()>;

    /// Record the delivery result reported by the SMS worker
    async fn mark_sent(&self, id: Uuid, error: Option<String>) -> AppResult<SmsMessage>;
}

pub struct SmsMessageStore {
    db: DatabaseConnection,
}

impl SmsMessageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SmsMessageRepository for SmsMessageStore {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<SmsMessage>> {
        let select = scoped_select::<SmsMessageEntity>(query)?;
        let listing = fetch_listing(&self.db, select, query).await?;
        Ok(listing.map(SmsMessage::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SmsMessage>> {
        let result = SmsMessageEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(SmsMessage::from))
    }

    async fn create_paid(
        &self,
        store_id: Uuid,
        input: CreateSmsMessage,
    ) -> AppResult<Option<SmsMessage>> {
        let txn = self.db.begin().await?;

        if !take_store_credit(&txn, store_id).await? {
            txn.rollback().await?;
            return Ok(None);
        }

        let now = chrono::Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            store_id: Set(Some(store_id)),
            recipient_mobile_number: Set(input.recipient_mobile_number),
            content: Set(input.content),
            sent: Set(false),
            error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(Some(SmsMessage::from(model)))
    }

    async fn cancel_paid(&self, id: Uuid, store_id: Uuid, reason: String) -> AppResult<()> {
        let txn = self.db.begin().await?;

        add_store_credits(&txn, store_id, 1).await?;
        let result = SmsMessageEntity::update_many()
            .col_expr(sms_message::Column::Sent, Expr::value(false))
            .col_expr(sms_message::Column::Error, Expr::value(Some(reason)))
            .col_expr(sms_message::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(sms_message::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        txn.commit().await?;
        Ok(())
    }

    async fn mark_sent(&self, id: Uuid, error: Option<String>) -> AppResult<SmsMessage> {
        let message = SmsMessageEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = message.into();
        active.sent = Set(error.is_none());
        active.error = Set(error);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(SmsMessage::from(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn affected(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn input() -> CreateSmsMessage {
        CreateSmsMessage {
            recipient_mobile_number: "+26772000001".to_string(),
            content: "Your order is ready".to_string(),
        }
    }

    fn row(store_id: Uuid) -> sms_message::Model {
        let now = chrono::Utc::now();
        sms_message::Model {
            id: Uuid::new_v4(),
            store_id: Some(store_id),
            recipient_mobile_number: "+26772000001".to_string(),
            content: "Your order is ready".to_string(),
            sent: false,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn statements(db: DatabaseConnection) -> Vec<String> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    #[tokio::test]
    async fn paid_message_commits_debit_and_insert_together() {
        let store_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([affected(1)])
            .append_query_results([vec![row(store_id)]])
            .into_connection();

        let message = SmsMessageStore::new(db.clone())
            .create_paid(store_id, input())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.store_id, Some(store_id));

        let sql = statements(db);
        assert_eq!(sql.len(), 4);
        assert_eq!(sql[0], "BEGIN");
        assert!(sql[1].starts_with(r#"UPDATE "store_quotas""#));
        assert!(sql[2].starts_with(r#"INSERT INTO "sms_messages""#));
        assert_eq!(sql[3], "COMMIT");
    }

    #[tokio::test]
    async fn failed_insert_rolls_the_debit_back() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([affected(1)])
            .append_query_errors([DbErr::Custom("disk full".to_string())])
            .into_connection();

        let result = SmsMessageStore::new(db.clone())
            .create_paid(Uuid::new_v4(), input())
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));

        let sql = statements(db);
        assert!(sql[1].starts_with(r#"UPDATE "store_quotas""#));
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
        assert!(!sql.iter().any(|stmt| stmt == "COMMIT"));
    }

    #[tokio::test]
    async fn no_credit_writes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([affected(0)])
            .into_connection();

        let message = SmsMessageStore::new(db.clone())
            .create_paid(Uuid::new_v4(), input())
            .await
            .unwrap();
        assert!(message.is_none());

        let sql = statements(db);
        assert!(!sql.iter().any(|stmt| stmt.starts_with("INSERT")));
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
    }

    #[tokio::test]
    async fn cancel_refunds_and_records_the_reason() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([affected(1), affected(1)])
            .into_connection();

        SmsMessageStore::new(db.clone())
            .cancel_paid(Uuid::new_v4(), Uuid::new_v4(), "queue down".to_string())
            .await
            .unwrap();

        let sql = statements(db);
        assert_eq!(sql.len(), 4);
        assert!(sql[1].starts_with(r#"UPDATE "store_quotas""#));
        assert!(sql[2].starts_with(r#"UPDATE "sms_messages""#));
        assert_eq!(sql[3], "COMMIT");
    }
}
