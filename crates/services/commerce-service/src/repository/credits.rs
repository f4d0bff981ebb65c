//! SMS credit moves shared by the quota, SMS and subscription stores.
//!
//! Every helper takes any connection so callers can run it inside their own
//! transaction.

use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::{sms_alert, store_quota};
use common::AppResult;
use domain::{OwnerKind, OwnerRef, DEFAULT_STORE_EMAIL_CREDITS, DEFAULT_STORE_SMS_CREDITS};

/// Insert the default quota row for `store_id` unless one exists.
pub(crate) async fn ensure_store_quota<C: ConnectionTrait>(
    db: &C,
    store_id: Uuid,
) -> AppResult<()> {
    let now = Utc::now();
    let row = store_quota::ActiveModel {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        sms_credits: Set(DEFAULT_STORE_SMS_CREDITS),
        email_credits: Set(DEFAULT_STORE_EMAIL_CREDITS),
        created_at: Set(now),
        updated_at: Set(now),
    };

    // A concurrent request may have inserted the row in the meantime
    store_quota::Entity::insert(row)
        .on_conflict(
            OnConflict::column(store_quota::Column::StoreId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Add `credits` to an existing store quota row.
pub(crate) async fn add_store_credits<C: ConnectionTrait>(
    db: &C,
    store_id: Uuid,
    credits: i32,
) -> AppResult<()> {
    store_quota::Entity::update_many()
        .col_expr(
            store_quota::Column::SmsCredits,
            Expr::col(store_quota::Column::SmsCredits).add(credits),
        )
        .col_expr(store_quota::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(store_quota::Column::StoreId.eq(store_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Take one SMS credit; false when the store has none left.
pub(crate) async fn take_store_credit<C: ConnectionTrait>(
    db: &C,
    store_id: Uuid,
) -> AppResult<bool> {
    let result = store_quota::Entity::update_many()
        .col_expr(
            store_quota::Column::SmsCredits,
            Expr::col(store_quota::Column::SmsCredits).sub(1),
        )
        .col_expr(store_quota::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(store_quota::Column::StoreId.eq(store_id))
        .filter(store_quota::Column::SmsCredits.gt(0))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Credit SMS to owners that hold an SMS balance; false for the others.
pub(crate) async fn grant_sms_credits<C: ConnectionTrait>(
    db: &C,
    owner: OwnerRef,
    credits: i32,
) -> AppResult<bool> {
    match owner.kind {
        OwnerKind::Store => {
            ensure_store_quota(db, owner.id).await?;
            add_store_credits(db, owner.id, credits).await?;
            Ok(true)
        }
        OwnerKind::SmsAlert => {
            let result = sms_alert::Entity::update_many()
                .col_expr(
                    sms_alert::Column::SmsCredits,
                    Expr::col(sms_alert::Column::SmsCredits).add(credits),
                )
                .col_expr(sms_alert::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(sms_alert::Column::Id.eq(owner.id))
                .exec(db)
                .await?;
            Ok(result.rows_affected == 1)
        }
        OwnerKind::AiAssistant | OwnerKind::InstantCart => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn affected(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn empty_quota_gives_no_credit() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([affected(0)])
            .into_connection();

        assert!(!take_store_credit(&db, Uuid::new_v4()).await.unwrap());

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = &log[0].statements()[0].sql;
        assert!(sql.starts_with(r#"UPDATE "store_quotas""#));
        assert!(sql.contains(r#""sms_credits" > "#));
    }

    #[tokio::test]
    async fn store_grant_creates_the_quota_row_first() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([affected(1), affected(1)])
            .into_connection();

        let granted = grant_sms_credits(&db, OwnerRef::store(Uuid::new_v4()), 50)
            .await
            .unwrap();
        assert!(granted);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(log[0].statements()[0].sql.starts_with(r#"INSERT INTO "store_quotas""#));
        assert!(log[0].statements()[0].sql.contains("ON CONFLICT"));
        assert!(log[1].statements()[0].sql.starts_with(r#"UPDATE "store_quotas""#));
    }

    #[tokio::test]
    async fn assistants_hold_no_sms_balance() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let granted = grant_sms_credits(&db, OwnerRef::ai_assistant(Uuid::new_v4()), 50)
            .await
            .unwrap();

        assert!(!granted);
        assert!(db.into_transaction_log().is_empty());
    }
}
