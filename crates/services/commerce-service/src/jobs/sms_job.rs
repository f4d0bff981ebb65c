//! SMS background job.
//!
//! Messages are stored first, then delivered here. Without a provider
//! configured, the message is logged instead of sent.

use std::sync::Arc;

use apalis::prelude::Data;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::SmsMessageRepository;
use common::{AppError, SmsConfig};

/// SMS job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsJob {
    /// Stored message to update once delivery finishes
    pub sms_message_id: Uuid,
    pub recipient_mobile_number: String,
    pub content: String,
}

impl SmsJob {
    pub fn new(
        sms_message_id: Uuid,
        recipient_mobile_number: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sms_message_id,
            recipient_mobile_number: recipient_mobile_number.into(),
            content: content.into(),
        }
    }
}

/// State shared by every SMS job the worker runs
#[derive(Clone)]
pub struct SmsWorkerContext {
    pub messages: Arc<dyn SmsMessageRepository>,
    pub config: SmsConfig,
}

/// SMS job handler - delivers the message and records the result
pub async fn sms_job_handler(job: SmsJob, context: Data<SmsWorkerContext>) -> Result<(), AppError> {
    deliver(&job, &context).await
}

async fn deliver(job: &SmsJob, context: &SmsWorkerContext) -> Result<(), AppError> {
    let sender = context.config.sender_name.as_deref().unwrap_or("default");

    tracing::info!(
        sms_message_id = %job.sms_message_id,
        to = %job.recipient_mobile_number,
        sender = %sender,
        "Processing SMS job"
    );

    let error = match context.config.provider_url.as_deref() {
        None => {
            tracing::warn!("SMS provider not configured - logging message instead of sending");
            tracing::info!(
                "=== SMS (not sent) ===\n\
                 From: {}\n\
                 To: {}\n\
                 Body:\n{}\n\
                 ======================",
                sender,
                job.recipient_mobile_number,
                job.content
            );
            None
        }
        Some(provider_url) => {
            tracing::warn!(
                provider_url = %provider_url,
                "SMS provider is configured but no provider transport is installed"
            );
            Some(format!("No transport available for SMS provider {}", provider_url))
        }
    };

    let message = context.messages.mark_sent(job.sms_message_id, error).await?;
    tracing::info!(
        sms_message_id = %message.id,
        sent = message.sent,
        "SMS processed"
    );
    Ok(())
}
