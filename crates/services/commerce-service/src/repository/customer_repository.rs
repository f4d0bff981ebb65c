//! Customer data access.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Set,
};
use uuid::Uuid;

use super::base::{delete_within, fetch_listing, scoped_select, ScopedEntity};
use super::entities::customer::{self, ActiveModel, Entity as CustomerEntity};
use common::{AppError, AppResult};
use domain::{CreateCustomer, Customer, Listing, ResourceQuery, Restriction, UpdateCustomer};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

impl ScopedEntity for CustomerEntity {
    fn id_column() -> customer::Column {
        customer::Column::Id
    }

    fn created_at_column() -> customer::Column {
        customer::Column::CreatedAt
    }

    fn search_columns() -> Vec<customer::Column> {
        vec![
            customer::Column::FirstName,
            customer::Column::LastName,
            customer::Column::MobileNumber,
        ]
    }

    fn restrict(restriction: &Restriction) -> Option<Condition> {
        match restriction {
            Restriction::Everything => Some(Condition::all()),
            Restriction::Store(store_id) => {
                Some(Condition::all().add(customer::Column::StoreId.eq(*store_id)))
            }
            Restriction::User(_) | Restriction::Owner(_) => None,
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Customer>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>>;

    async fn create(&self, store_id: Uuid, input: CreateCustomer) -> AppResult<Customer>;

    async fn update(&self, id: Uuid, changes: UpdateCustomer) -> AppResult<Customer>;

    /// Returns the number of rows removed (0 or 1)
    async fn delete(&self, id: Uuid) -> AppResult<u64>;

    /// Delete the given customers of one store in a single statement
    async fn delete_many(&self, ids: Vec<Uuid>, restriction: Restriction) -> AppResult<u64>;
}

pub struct CustomerStore {
    db: DatabaseConnection,
}

impl CustomerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerRepository for CustomerStore {
    async fn list(&self, query: &ResourceQuery) -> AppResult<Listing<Customer>> {
        let select = scoped_select::<CustomerEntity>(query)?;
        let listing = fetch_listing(&self.db, select, query).await?;
        Ok(listing.map(Customer::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let result = CustomerEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Customer::from))
    }

    async fn create(&self, store_id: Uuid, input: CreateCustomer) -> AppResult<Customer> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            store_id: Set(store_id),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            mobile_number: Set(input.mobile_number),
            total_orders: Set(0),
            total_spend: Set(0),
            last_order_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Customer::from(model))
    }

    async fn update(&self, id: Uuid, changes: UpdateCustomer) -> AppResult<Customer> {
        let customer = CustomerEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = customer.into();
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(mobile_number) = changes.mobile_number {
            active.mobile_number = Set(mobile_number);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Customer::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let result = CustomerEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn delete_many(&self, ids: Vec<Uuid>, restriction: Restriction) -> AppResult<u64> {
        delete_within::<_, CustomerEntity>(&self.db, &ids, &restriction).await
    }
}
