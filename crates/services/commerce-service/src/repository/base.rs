//! Shared query plumbing for the scoped stores.
//!
//! A [`ResourceQuery`] arrives here with its scope already initialized by the
//! calling service. These helpers translate the scope, the caller filters and
//! the page request into a single SeaORM select.

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, Select,
};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Listing, Paginated, ResourceQuery, Restriction, SortOrder};

/// Table metadata needed to apply a [`ResourceQuery`].
pub trait ScopedEntity: EntityTrait {
    fn id_column() -> Self::Column;

    fn created_at_column() -> Self::Column;

    /// Columns matched against the free-text search term
    fn search_columns() -> Vec<Self::Column> {
        Vec::new()
    }

    /// Row condition for `restriction`, `None` when the table cannot honour it.
    fn restrict(restriction: &Restriction) -> Option<Condition>;
}

fn restriction_condition<E: ScopedEntity>(restriction: &Restriction) -> AppResult<Condition> {
    E::restrict(restriction).ok_or_else(|| {
        AppError::internal(format!(
            "Restriction {:?} is not supported by {}",
            restriction,
            E::default().table_name()
        ))
    })
}

/// Build the select described by `query`.
pub(crate) fn scoped_select<E: ScopedEntity>(query: &ResourceQuery) -> AppResult<Select<E>> {
    let scope = query.scope().ok_or_else(|| {
        AppError::internal(format!(
            "Query on {} reached the store without a scope",
            E::default().table_name()
        ))
    })?;
    query.filters.validate()?;

    let mut select = E::find().filter(restriction_condition::<E>(&scope.restriction)?);

    if let Some(start_at) = query.filters.start_at {
        select = select.filter(E::created_at_column().gte(start_at));
    }
    if let Some(end_at) = query.filters.end_at {
        select = select.filter(E::created_at_column().lte(end_at));
    }
    if let Some(term) = query.filters.search_term() {
        let columns = E::search_columns();
        if !columns.is_empty() {
            let matches = columns
                .into_iter()
                .fold(Condition::any(), |condition, column| {
                    condition.add(column.contains(term))
                });
            select = select.filter(matches);
        }
    }

    Ok(match scope.order {
        SortOrder::LatestFirst => select.order_by_desc(E::created_at_column()),
        SortOrder::OldestFirst => select.order_by_asc(E::created_at_column()),
    })
}

/// Run `select` as either a page or a bare count.
pub(crate) async fn fetch_listing<C, E>(
    db: &C,
    select: Select<E>,
    query: &ResourceQuery,
) -> AppResult<Listing<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync,
{
    if query.count_only {
        let total = select.count(db).await?;
        return Ok(Listing::Count { total });
    }

    let per_page = query.page.limit();
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(query.page.page_index()).await?;

    Ok(Listing::Page(Paginated::new(
        models,
        query.page.page_index() + 1,
        per_page,
        total,
    )))
}

/// Delete the rows among `ids` that fall inside `restriction`.
///
/// Runs as one statement, so the batch is all-or-nothing. Ids that do not
/// exist or sit outside the restriction are ignored and not counted.
pub(crate) async fn delete_within<C, E>(
    db: &C,
    ids: &[Uuid],
    restriction: &Restriction,
) -> AppResult<u64>
where
    C: ConnectionTrait,
    E: ScopedEntity,
{
    if ids.is_empty() {
        return Ok(0);
    }

    let result = E::delete_many()
        .filter(E::id_column().is_in(ids.iter().copied()))
        .filter(restriction_condition::<E>(restriction)?)
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::entities::customer;
    use domain::{FilterParams, Scope};
    use sea_orm::{
        DatabaseBackend, DbBackend, DbErr, MockDatabase, MockExecResult, QueryTrait, Value,
    };
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn delete_reports_only_the_rows_removed() {
        let store_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();
        let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];

        let deleted =
            delete_within::<_, customer::Entity>(&db, &ids, &Restriction::Store(store_id))
                .await
                .unwrap();
        assert_eq!(deleted, 2);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = &log[0].statements()[0].sql;
        assert!(sql.starts_with(r#"DELETE FROM "customers""#));
        assert!(sql.contains(r#""customers"."id" IN ("#));
        assert!(sql.contains(r#""customers"."store_id" = "#));
    }

    #[tokio::test]
    async fn empty_id_list_touches_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let deleted = delete_within::<_, customer::Entity>(&db, &[], &Restriction::Everything)
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn unsupported_restriction_deletes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = delete_within::<_, customer::Entity>(
            &db,
            &[Uuid::new_v4()],
            &Restriction::User(Uuid::new_v4()),
        )
        .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(db.into_transaction_log().is_empty());
    }

    #[test]
    fn select_applies_restriction_search_and_order() {
        let store_id = Uuid::new_v4();
        let query = ResourceQuery::new()
            .set_scope(Scope::latest(Restriction::Store(store_id)))
            .with_filters(FilterParams::search("ann"));

        let sql = scoped_select::<customer::Entity>(&query)
            .unwrap()
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(&format!(r#""customers"."store_id" = '{store_id}'"#)));
        assert!(sql.contains(r#""customers"."first_name" LIKE '%ann%'"#));
        assert!(sql.contains(" OR "));
        assert!(sql.ends_with(r#"ORDER BY "customers"."created_at" DESC"#));
    }

    #[test]
    fn unscoped_query_never_reaches_sql() {
        let result = scoped_select::<customer::Entity>(&ResourceQuery::new());
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn count_only_listing_reads_the_total() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::from(7i64))])]])
            .into_connection();
        let query = ResourceQuery::new()
            .set_scope(Scope::latest(Restriction::Everything))
            .counting();
        let select = scoped_select::<customer::Entity>(&query).unwrap();

        let listing = fetch_listing(&db, select, &query).await.unwrap();

        assert_eq!(listing.total(), 7);
        assert!(listing.items().is_empty());
    }

    #[tokio::test]
    async fn store_errors_surface_as_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let result = delete_within::<_, customer::Entity>(
            &db,
            &[Uuid::new_v4()],
            &Restriction::Everything,
        )
        .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
