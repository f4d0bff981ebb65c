//! Store customers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::resource_kind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub store_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub total_orders: i32,
    /// Lifetime spend in minor currency units
    pub total_spend: i64,
    pub last_order_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(Customer, "customer", "customers", "Customer", "customer");

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Customer creation payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(length(min = 1, max = 60))]
    pub first_name: String,
    #[validate(length(min = 1, max = 60))]
    pub last_name: String,
    pub mobile_number: String,
}

/// Customer update payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 60))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 60))]
    pub last_name: Option<String>,
    pub mobile_number: Option<String>,
}
