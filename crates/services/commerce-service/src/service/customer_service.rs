//! Customer repository: store-scoped CRUD, gated on store management.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::access::{manages_store, scope_permitted};
use super::views::WithStore;
use crate::repository::{CustomerRepository, StoreRepository};
use common::AppResult;
use domain::{
    ensure_mobile_number, validate_input, Action, CreateCustomer, Customer, Includes, Listing,
    Outcome, RequestContext, ResourceQuery, Restriction, Scope, Store, UpdateCustomer,
};

#[async_trait]
pub trait CustomerService: Send + Sync {
    /// Customers of a store, newest first unless the query says otherwise
    async fn list_customers(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<WithStore<Customer>>>>;

    async fn show_customer(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        includes: &Includes,
    ) -> AppResult<Outcome<WithStore<Customer>>>;

    async fn create_customer(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        input: CreateCustomer,
    ) -> AppResult<Outcome<Customer>>;

    async fn update_customer(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateCustomer,
    ) -> AppResult<Outcome<Customer>>;

    async fn delete_customer(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Outcome<Customer>>;

    /// Delete the listed customers of one store; unknown ids are skipped
    async fn delete_customers(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        ids: Vec<Uuid>,
    ) -> AppResult<Outcome<Customer>>;
}

pub struct CustomerManager {
    customers: Arc<dyn CustomerRepository>,
    stores: Arc<dyn StoreRepository>,
}

impl CustomerManager {
    pub fn new(customers: Arc<dyn CustomerRepository>, stores: Arc<dyn StoreRepository>) -> Self {
        Self { customers, stores }
    }

    async fn find_store(&self, store_id: Uuid) -> AppResult<Option<Store>> {
        self.stores.find_by_id(store_id).await
    }
}

#[async_trait]
impl CustomerService for CustomerManager {
    async fn list_customers(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        query: ResourceQuery,
    ) -> AppResult<Outcome<Listing<WithStore<Customer>>>> {
        let Some(store) = self.find_store(store_id).await? else {
            return Ok(Outcome::not_found::<Store>(None));
        };
        if !manages_store(ctx, self.stores.as_ref(), store_id).await?
            || !scope_permitted(ctx, &query, Restriction::Store(store_id))
        {
            warn!(store_id = %store_id, "Customer listing refused");
            return Ok(Outcome::forbidden::<Customer>(Action::Viewed));
        }

        let query = query.scoped_or(|| Scope::latest(Restriction::Store(store_id)));
        let customers = self.customers.list(&query).await?;

        let attached = query.includes.wants("store").then_some(store);
        Ok(Outcome::Found(customers.map(|customer| WithStore {
            resource: customer,
            store: attached.clone(),
        })))
    }

    async fn show_customer(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        includes: &Includes,
    ) -> AppResult<Outcome<WithStore<Customer>>> {
        let Some(customer) = self.customers.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<Customer>(None));
        };
        if !manages_store(ctx, self.stores.as_ref(), customer.store_id).await? {
            return Ok(Outcome::forbidden::<Customer>(Action::Viewed));
        }

        let store = match includes.wants("store") {
            true => self.find_store(customer.store_id).await?,
            false => None,
        };
        Ok(Outcome::Found(WithStore {
            resource: customer,
            store,
        }))
    }

    async fn create_customer(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        input: CreateCustomer,
    ) -> AppResult<Outcome<Customer>> {
        if self.find_store(store_id).await?.is_none() {
            return Ok(Outcome::not_found::<Store>(Some(Action::Created)));
        }
        if !manages_store(ctx, self.stores.as_ref(), store_id).await? {
            warn!(store_id = %store_id, "Customer creation refused");
            return Ok(Outcome::forbidden::<Customer>(Action::Created));
        }
        validate_input(&input)?;
        ensure_mobile_number(&input.mobile_number)?;

        let customer = self.customers.create(store_id, input).await?;
        info!(customer_id = %customer.id, store_id = %store_id, "Customer created");
        Ok(Outcome::show_created(customer))
    }

    async fn update_customer(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateCustomer,
    ) -> AppResult<Outcome<Customer>> {
        let Some(customer) = self.customers.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<Customer>(Some(Action::Updated)));
        };
        if !manages_store(ctx, self.stores.as_ref(), customer.store_id).await? {
            warn!(customer_id = %id, "Customer update refused");
            return Ok(Outcome::forbidden::<Customer>(Action::Updated));
        }
        validate_input(&changes)?;
        if let Some(mobile_number) = &changes.mobile_number {
            ensure_mobile_number(mobile_number)?;
        }

        let customer = self.customers.update(id, changes).await?;
        info!(customer_id = %id, "Customer updated");
        Ok(Outcome::show_updated(customer))
    }

    async fn delete_customer(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Outcome<Customer>> {
        let Some(customer) = self.customers.find_by_id(id).await? else {
            return Ok(Outcome::not_found::<Customer>(Some(Action::Deleted)));
        };
        if !manages_store(ctx, self.stores.as_ref(), customer.store_id).await? {
            warn!(customer_id = %id, "Customer deletion refused");
            return Ok(Outcome::forbidden::<Customer>(Action::Deleted));
        }

        self.customers.delete(id).await?;
        info!(customer_id = %id, "Customer deleted");
        Ok(Outcome::done::<Customer>(Action::Deleted))
    }

    async fn delete_customers(
        &self,
        ctx: &RequestContext,
        store_id: Uuid,
        ids: Vec<Uuid>,
    ) -> AppResult<Outcome<Customer>> {
        if !manages_store(ctx, self.stores.as_ref(), store_id).await? {
            warn!(store_id = %store_id, "Bulk customer deletion refused");
            return Ok(Outcome::forbidden::<Customer>(Action::Deleted));
        }

        let deleted = self
            .customers
            .delete_many(ids, Restriction::Store(store_id))
            .await?;
        info!(store_id = %store_id, deleted, "Customers deleted");
        Ok(Outcome::counted::<Customer>(Action::Deleted, deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockCustomerRepository, MockStoreRepository};
    use crate::service::test_support::{customer, guest, store, super_admin, user};
    use domain::{Paginated, RefusalReason, SortOrder};
    use mockall::predicate::eq;

    fn manager(customers: MockCustomerRepository, stores: MockStoreRepository) -> CustomerManager {
        CustomerManager::new(Arc::new(customers), Arc::new(stores))
    }

    fn input() -> CreateCustomer {
        CreateCustomer {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            mobile_number: "+15550100200".to_string(),
        }
    }

    #[tokio::test]
    async fn list_applies_the_store_scope_newest_first() {
        let owner_id = Uuid::new_v4();
        let shop = store(owner_id);
        let store_id = shop.id;

        let mut stores = MockStoreRepository::new();
        stores
            .expect_find_by_id()
            .returning(move |_| Ok(Some(shop.clone())));
        stores.expect_is_manager().returning(|_, _| Ok(true));

        let mut customers = MockCustomerRepository::new();
        customers
            .expect_list()
            .withf(move |query| {
                query.scope() == Some(&Scope::latest(Restriction::Store(store_id)))
                    && query.scope().map(|s| s.order) == Some(SortOrder::LatestFirst)
            })
            .times(1)
            .returning(move |_| {
                Ok(Listing::Page(Paginated::new(
                    vec![customer(store_id)],
                    1,
                    20,
                    1,
                )))
            });

        let outcome = manager(customers, stores)
            .list_customers(&user(owner_id), store_id, ResourceQuery::new())
            .await
            .unwrap();

        let listing = outcome.into_resource().unwrap();
        assert_eq!(listing.total(), 1);
        assert!(listing.items()[0].store.is_none());
    }

    #[tokio::test]
    async fn unauthorized_create_leaves_customers_untouched() {
        let shop = store(Uuid::new_v4());
        let store_id = shop.id;

        let mut stores = MockStoreRepository::new();
        stores
            .expect_find_by_id()
            .returning(move |_| Ok(Some(shop.clone())));
        stores.expect_is_manager().returning(|_, _| Ok(false));

        // No expectations: any write would panic
        let customers = MockCustomerRepository::new();

        let outcome = manager(customers, stores)
            .create_customer(&user(Uuid::new_v4()), store_id, input())
            .await
            .unwrap();

        let refusal = outcome.refusal().unwrap();
        assert_eq!(refusal.reason, RefusalReason::Forbidden);
        assert_eq!(refusal.action, Some(Action::Created));
        assert_eq!(refusal.message, "You do not have permission to create customers");
    }

    #[tokio::test]
    async fn guest_cannot_delete_in_bulk() {
        let customers = MockCustomerRepository::new();
        let stores = MockStoreRepository::new();

        let outcome = manager(customers, stores)
            .delete_customers(&guest(), Uuid::new_v4(), vec![Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(
            outcome.refusal().map(|r| r.reason),
            Some(RefusalReason::Forbidden)
        );
    }

    #[tokio::test]
    async fn bulk_delete_reports_only_rows_removed() {
        let store_id = Uuid::new_v4();
        let valid = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let mut ids = valid.clone();
        ids.extend([Uuid::new_v4(), Uuid::new_v4()]);

        let mut customers = MockCustomerRepository::new();
        customers
            .expect_delete_many()
            .with(eq(ids.clone()), eq(Restriction::Store(store_id)))
            .times(1)
            .returning(move |_, _| Ok(valid.len() as u64));

        let outcome = manager(customers, MockStoreRepository::new())
            .delete_customers(&super_admin(), store_id, ids)
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("3 customers deleted"));
    }

    #[tokio::test]
    async fn bulk_delete_of_unknown_ids_reports_nothing_deleted() {
        let mut customers = MockCustomerRepository::new();
        customers.expect_delete_many().returning(|_, _| Ok(0));

        let outcome = manager(customers, MockStoreRepository::new())
            .delete_customers(&super_admin(), Uuid::new_v4(), vec![Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(
            outcome.refusal().map(|r| r.reason),
            Some(RefusalReason::NothingToDelete)
        );
        assert_eq!(outcome.message(), Some("No customers deleted"));
    }

    #[tokio::test]
    async fn missing_customer_is_reported_not_raised() {
        let mut customers = MockCustomerRepository::new();
        customers.expect_find_by_id().returning(|_| Ok(None));

        let outcome = manager(customers, MockStoreRepository::new())
            .show_customer(&super_admin(), Uuid::new_v4(), &Includes::default())
            .await
            .unwrap();

        assert_eq!(outcome.message(), Some("Customer does not exist"));
    }

    #[tokio::test]
    async fn store_is_eager_loaded_on_request() {
        let shop = store(Uuid::new_v4());
        let found = customer(shop.id);
        let store_id = shop.id;

        let mut customers = MockCustomerRepository::new();
        customers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let mut stores = MockStoreRepository::new();
        stores
            .expect_find_by_id()
            .with(eq(store_id))
            .returning(move |_| Ok(Some(shop.clone())));

        let includes: Includes = ["store"].into_iter().collect();
        let outcome = manager(customers, stores)
            .show_customer(&super_admin(), Uuid::new_v4(), &includes)
            .await
            .unwrap();

        let view = outcome.into_resource().unwrap();
        assert_eq!(view.store.map(|s| s.id), Some(store_id));
    }

    #[tokio::test]
    async fn invalid_mobile_number_is_a_validation_error() {
        let shop = store(Uuid::new_v4());
        let store_id = shop.id;
        let mut stores = MockStoreRepository::new();
        stores
            .expect_find_by_id()
            .returning(move |_| Ok(Some(shop.clone())));

        let mut bad = input();
        bad.mobile_number = "call me".to_string();

        let result = manager(MockCustomerRepository::new(), stores)
            .create_customer(&super_admin(), store_id, bad)
            .await;

        assert!(matches!(result, Err(common::AppError::Validation(_))));
    }
}
