//! Contacts a user can order for or share with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::resource_kind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub mobile_number: String,
    pub last_selected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(Friend, "friend", "friends", "Friend", "friend");

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFriend {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    pub mobile_number: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFriend {
    #[validate(length(min = 1, max = 60))]
    pub name: Option<String>,
    pub mobile_number: Option<String>,
}
