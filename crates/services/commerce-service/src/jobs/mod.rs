//! Background jobs processed by the `jobs work` worker.

mod sms_job;

pub use sms_job::{sms_job_handler, SmsJob, SmsWorkerContext};

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;

use common::{AppError, AppResult};

/// Connect to the job database and make sure the apalis tables exist.
pub async fn sms_storage(database_url: &str) -> AppResult<PostgresStorage<SmsJob>> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to job database: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(PostgresStorage::new(pool))
}
