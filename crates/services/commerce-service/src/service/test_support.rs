//! Fixtures shared by the service tests.

use chrono::Utc;
use uuid::Uuid;

use domain::{AuthUser, Customer, RequestContext, Store, UserRole};

pub(crate) fn user(id: Uuid) -> RequestContext {
    RequestContext::authenticated(AuthUser::new(id, "Tumi", UserRole::User))
}

pub(crate) fn super_admin() -> RequestContext {
    RequestContext::authenticated(AuthUser::new(Uuid::new_v4(), "Root", UserRole::SuperAdmin))
}

pub(crate) fn guest() -> RequestContext {
    RequestContext::guest()
}

pub(crate) fn store(user_id: Uuid) -> Store {
    Store {
        id: Uuid::new_v4(),
        user_id,
        name: "Corner Shop".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn customer(store_id: Uuid) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        store_id,
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        mobile_number: "+15550100200".to_string(),
        total_orders: 0,
        total_spend: 0,
        last_order_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
