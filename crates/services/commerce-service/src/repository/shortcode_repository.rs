//! Shortcode data access and issuance.
//!
//! Issuance runs the extend / recycle / generate decision inside a
//! serializable transaction. The unique indexes on `code` and on
//! `(owner_type, owner_id, action)` turn a lost race into an error, and the
//! whole issuance is retried once when that happens.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter,
    QueryOrder, RuntimeErr, Set, TransactionTrait, Unchanged,
};
use uuid::Uuid;

use super::entities::shortcode::{self, ActiveModel, Entity as ShortcodeEntity};
use crate::integrations::CodeGenerator;
use common::{AppError, AppResult};
use domain::{
    plan_issuance, IssuancePlan, IssueShortcode, OwnerRef, Shortcode,
    SHORTCODE_ATTEMPTS_PER_LENGTH,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Lengths tried before giving up on a unique code
const CODE_LENGTH_STEPS: usize = 5;

/// Postgres SQLSTATE codes
const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ShortcodeRepository: Send + Sync {
    /// Bind a code to the request's owner and action, expiring at `expires_at`
    async fn issue(&self, request: IssueShortcode, expires_at: DateTime<Utc>)
        -> AppResult<Shortcode>;

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Shortcode>>;

    /// Expire every live code of the owner; returns how many changed
    async fn expire(&self, owner: OwnerRef, at: DateTime<Utc>) -> AppResult<u64>;

    async fn count_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Drop user reservations from expired codes so they recycle cleanly
    async fn release_expired_reservations(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

pub struct ShortcodeStore {
    db: DatabaseConnection,
    codes: Arc<dyn CodeGenerator>,
}

impl ShortcodeStore {
    pub fn new(db: DatabaseConnection, codes: Arc<dyn CodeGenerator>) -> Self {
        Self { db, codes }
    }

    async fn issue_once(
        &self,
        request: &IssueShortcode,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Shortcode> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;
        let now = Utc::now();

        let matching = ShortcodeEntity::find()
            .filter(owner_condition(&request.owner))
            .filter(shortcode::Column::Action.eq(request.action.as_str()))
            .one(&txn)
            .await?
            .map(Shortcode::try_from)
            .transpose()?;

        let recyclable = match matching {
            Some(_) => None,
            None => ShortcodeEntity::find()
                .filter(shortcode::Column::Action.eq(request.action.as_str()))
                .filter(shortcode::Column::ExpiresAt.lte(now))
                .filter(
                    Condition::any()
                        .add(shortcode::Column::OwnerType.ne(request.owner.kind.as_str()))
                        .add(shortcode::Column::OwnerId.ne(request.owner.id)),
                )
                .order_by_asc(shortcode::Column::ExpiresAt)
                .one(&txn)
                .await?
                .map(Shortcode::try_from)
                .transpose()?,
        };

        let model = match plan_issuance(matching, recyclable) {
            IssuancePlan::Extend(existing) => {
                tracing::debug!(code = %existing.code, "Extending shortcode");
                ActiveModel {
                    id: Unchanged(existing.id),
                    reserved_for_user_id: Set(request.reserved_for_user_id),
                    expires_at: Set(expires_at),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(&txn)
                .await?
            }
            IssuancePlan::Recycle(expired) => {
                tracing::debug!(code = %expired.code, "Recycling expired shortcode");
                ActiveModel {
                    id: Unchanged(expired.id),
                    owner_type: Set(request.owner.kind.as_str().to_string()),
                    owner_id: Set(request.owner.id),
                    reserved_for_user_id: Set(request.reserved_for_user_id),
                    expires_at: Set(expires_at),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(&txn)
                .await?
            }
            IssuancePlan::Generate => {
                let code = self.unique_code(&txn).await?;
                ActiveModel {
                    id: Set(Uuid::new_v4()),
                    code: Set(code),
                    action: Set(request.action.as_str().to_string()),
                    owner_type: Set(request.owner.kind.as_str().to_string()),
                    owner_id: Set(request.owner.id),
                    reserved_for_user_id: Set(request.reserved_for_user_id),
                    expires_at: Set(expires_at),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?
            }
        };

        txn.commit().await?;
        Ok(Shortcode::try_from(model)?)
    }

    async fn unique_code<C: ConnectionTrait>(&self, db: &C) -> AppResult<String> {
        for attempt in 0..SHORTCODE_ATTEMPTS_PER_LENGTH * CODE_LENGTH_STEPS {
            let code = self.codes.generate(attempt);
            let taken = ShortcodeEntity::find()
                .filter(shortcode::Column::Code.eq(code.as_str()))
                .count(db)
                .await?;
            if taken == 0 {
                return Ok(code);
            }
        }

        Err(AppError::internal("Could not generate a unique shortcode"))
    }
}

fn owner_condition(owner: &OwnerRef) -> Condition {
    Condition::all()
        .add(shortcode::Column::OwnerType.eq(owner.kind.as_str()))
        .add(shortcode::Column::OwnerId.eq(owner.id))
}

/// Unique violations and serialization failures mean another issuance won.
fn is_write_conflict(err: &AppError) -> bool {
    match err {
        AppError::Database(db_err) => matches!(
            sql_state(db_err).as_deref(),
            Some(UNIQUE_VIOLATION | SERIALIZATION_FAILURE)
        ),
        _ => false,
    }
}

/// SQLSTATE reported by the server, `None` for client-side failures.
fn sql_state(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Conn(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

#[async_trait]
impl ShortcodeRepository for ShortcodeStore {
    async fn issue(
        &self,
        request: IssueShortcode,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Shortcode> {
        match self.issue_once(&request, expires_at).await {
            Err(err) if is_write_conflict(&err) => {
                tracing::warn!(
                    owner_type = %request.owner.kind,
                    owner_id = %request.owner.id,
                    action = %request.action,
                    "Shortcode issuance conflicted, retrying"
                );
                self.issue_once(&request, expires_at).await.map_err(|err| {
                    if is_write_conflict(&err) {
                        AppError::conflict("Shortcode")
                    } else {
                        err
                    }
                })
            }
            result => result,
        }
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Shortcode>> {
        let result = ShortcodeEntity::find()
            .filter(shortcode::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(result.map(Shortcode::try_from).transpose()?)
    }

    async fn expire(&self, owner: OwnerRef, at: DateTime<Utc>) -> AppResult<u64> {
        let result = ShortcodeEntity::update_many()
            .col_expr(shortcode::Column::ExpiresAt, Expr::value(at))
            .col_expr(shortcode::Column::UpdatedAt, Expr::value(at))
            .filter(owner_condition(&owner))
            .filter(shortcode::Column::ExpiresAt.gt(at))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn count_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let total = ShortcodeEntity::find()
            .filter(shortcode::Column::ExpiresAt.lte(now))
            .count(&self.db)
            .await?;
        Ok(total)
    }

    async fn release_expired_reservations(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = ShortcodeEntity::update_many()
            .col_expr(
                shortcode::Column::ReservedForUserId,
                Expr::value(Option::<Uuid>::None),
            )
            .col_expr(shortcode::Column::UpdatedAt, Expr::value(now))
            .filter(shortcode::Column::ExpiresAt.lte(now))
            .filter(shortcode::Column::ReservedForUserId.is_not_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
