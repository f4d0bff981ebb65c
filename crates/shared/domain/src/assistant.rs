//! AI assistants owned by users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::resource_kind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAssistant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub remaining_paid_tokens: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(AiAssistant, "AI assistant", "AI assistants", "AI assistant", "ai_assistant");

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAiAssistant {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAiAssistant {
    #[validate(length(min = 1, max = 60))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}
