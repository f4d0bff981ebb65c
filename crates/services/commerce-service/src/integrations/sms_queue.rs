//! Dispatch of SMS messages to the background worker.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;

use crate::jobs::SmsJob;
use common::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SmsQueue: Send + Sync {
    /// Enqueue the job; delivery and retries happen in the worker
    async fn dispatch(&self, job: SmsJob) -> AppResult<()>;
}

/// Queue backed by the apalis Postgres storage the `jobs work` worker polls.
#[derive(Clone)]
pub struct ApalisSmsQueue {
    storage: PostgresStorage<SmsJob>,
}

impl ApalisSmsQueue {
    pub fn new(storage: PostgresStorage<SmsJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl SmsQueue for ApalisSmsQueue {
    async fn dispatch(&self, job: SmsJob) -> AppResult<()> {
        let sms_message_id = job.sms_message_id;
        let mut storage = self.storage.clone();
        storage
            .push(job)
            .await
            .map_err(|e| AppError::queue(format!("Failed to enqueue SMS job: {}", e)))?;

        tracing::debug!(sms_message_id = %sms_message_id, "SMS job enqueued");
        Ok(())
    }
}
