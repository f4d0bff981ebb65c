//! Saved delivery addresses of a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::resource_kind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub address_line: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(
    DeliveryAddress,
    "delivery address",
    "delivery addresses",
    "Delivery address",
    "delivery_address"
);

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDeliveryAddress {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub address_line: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDeliveryAddress {
    #[validate(length(min = 1, max = 60))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address_line: Option<String>,
}
