//! Stores (tenants), their quotas and instant carts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::resource_kind;

/// A tenant storefront owned by its creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(Store, "store", "stores", "Store", "store");

/// Per-store messaging allowance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreQuota {
    pub id: Uuid,
    pub store_id: Uuid,
    pub sms_credits: i32,
    pub email_credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(StoreQuota, "store quota", "store quotas", "Store quota", "store_quota");

impl StoreQuota {
    pub fn has_sms_credits(&self) -> bool {
        self.sms_credits > 0
    }
}

/// Store quota update payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStoreQuota {
    #[validate(range(min = 0))]
    pub sms_credits: Option<i32>,
    #[validate(range(min = 0))]
    pub email_credits: Option<i32>,
}

/// A shareable, pre-filled cart for a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantCart {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(InstantCart, "instant cart", "instant carts", "Instant cart", "instant_cart");
