//! Outbound SMS messages and SMS alert accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::resource_kind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub id: Uuid,
    /// Sending store, `None` for platform messages
    pub store_id: Option<Uuid>,
    pub recipient_mobile_number: String,
    pub content: String,
    pub sent: bool,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(SmsMessage, "SMS message", "SMS messages", "SMS message", "sms_message");

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSmsMessage {
    pub recipient_mobile_number: String,
    #[validate(length(min = 1, max = 480))]
    pub content: String,
}

/// A user's prepaid SMS alert account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsAlert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sms_credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(SmsAlert, "SMS alert", "SMS alerts", "SMS alert", "sms_alert");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, Outcome, ResourceKind};

    #[test]
    fn messages_spell_sms_in_capitals() {
        let refused = Outcome::<SmsMessage>::forbidden::<SmsMessage>(Action::Created);
        assert_eq!(
            refused.message(),
            Some("You do not have permission to create SMS messages")
        );

        let done = Outcome::<()>::done::<SmsAlert>(Action::Deleted);
        assert_eq!(done.message(), Some("SMS alert deleted"));
        assert_eq!(SmsAlert::count_label(2), "2 SMS alerts");
    }
}
