//! Commerce Service Library
//!
//! Resource repositories for the multi-tenant commerce platform: customers,
//! delivery addresses, friends, notifications, SMS messages, store quotas,
//! subscriptions, shortcodes, AI assistants and reviews. The binary exposes
//! the maintenance side (migrations, the SMS worker, shortcode upkeep); the
//! request side is consumed through [`Services`].

pub mod config;
pub mod infra;
pub mod integrations;
pub mod jobs;
pub mod repository;
pub mod service;

use std::sync::Arc;

use apalis::prelude::*;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::CommerceServiceConfig;
use crate::infra::Database;
use crate::integrations::{ApalisSmsQueue, DatabaseNotifier, RandomCodeGenerator, SmsQueue};
use crate::jobs::{sms_job_handler, sms_storage, SmsWorkerContext};
use crate::repository::{
    AiAssistantStore, CustomerStore, DeliveryAddressStore, FriendStore, NotificationStore,
    OwnerStore, ReviewStore, ShortcodeRepository, ShortcodeStore, SmsMessageStore, StoreLookup,
    StoreQuotaStore, SubscriptionStore,
};
use crate::service::{
    AiAssistantManager, AiAssistantService, CustomerManager, CustomerService,
    DeliveryAddressManager, DeliveryAddressService, FriendManager, FriendService,
    NotificationManager, NotificationService, ReviewManager, ReviewService, ShortcodeManager,
    ShortcodeService, SmsMessageManager, SmsMessageService, StoreQuotaManager, StoreQuotaService,
    SubscriptionManager, SubscriptionService,
};

/// Every resource repository, wired to one database connection.
#[derive(Clone)]
pub struct Services {
    pub customers: Arc<dyn CustomerService>,
    pub delivery_addresses: Arc<dyn DeliveryAddressService>,
    pub friends: Arc<dyn FriendService>,
    pub notifications: Arc<dyn NotificationService>,
    pub sms_messages: Arc<dyn SmsMessageService>,
    pub store_quotas: Arc<dyn StoreQuotaService>,
    pub subscriptions: Arc<dyn SubscriptionService>,
    pub shortcodes: Arc<dyn ShortcodeService>,
    pub ai_assistants: Arc<dyn AiAssistantService>,
    pub reviews: Arc<dyn ReviewService>,
}

impl Services {
    pub fn new(
        db: DatabaseConnection,
        config: &CommerceServiceConfig,
        sms_queue: Arc<dyn SmsQueue>,
    ) -> Self {
        let stores = Arc::new(StoreLookup::new(db.clone()));
        let quotas = Arc::new(StoreQuotaStore::new(db.clone()));
        let owners = Arc::new(OwnerStore::new(db.clone()));
        let notification_store = Arc::new(NotificationStore::new(db.clone()));
        let notifier = Arc::new(DatabaseNotifier::new(notification_store.clone()));
        let codes = Arc::new(RandomCodeGenerator::new(config.shortcodes.length));

        Self {
            customers: Arc::new(CustomerManager::new(
                Arc::new(CustomerStore::new(db.clone())),
                stores.clone(),
            )),
            delivery_addresses: Arc::new(DeliveryAddressManager::new(Arc::new(
                DeliveryAddressStore::new(db.clone()),
            ))),
            friends: Arc::new(FriendManager::new(Arc::new(FriendStore::new(db.clone())))),
            notifications: Arc::new(NotificationManager::new(notification_store)),
            sms_messages: Arc::new(SmsMessageManager::new(
                Arc::new(SmsMessageStore::new(db.clone())),
                stores.clone(),
                sms_queue,
            )),
            store_quotas: Arc::new(StoreQuotaManager::new(quotas, stores.clone())),
            subscriptions: Arc::new(SubscriptionManager::new(
                Arc::new(SubscriptionStore::new(db.clone())),
                owners.clone(),
                stores.clone(),
                notifier,
            )),
            shortcodes: Arc::new(ShortcodeManager::new(
                Arc::new(ShortcodeStore::new(db.clone(), codes)),
                owners,
                stores.clone(),
                config.shortcode_ttl(),
            )),
            ai_assistants: Arc::new(AiAssistantManager::new(Arc::new(AiAssistantStore::new(
                db.clone(),
            )))),
            reviews: Arc::new(ReviewManager::new(Arc::new(ReviewStore::new(db)), stores)),
        }
    }

    /// Connect, migrate and wire everything from the environment.
    pub async fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = CommerceServiceConfig::from_env();
        let db = Database::connect(&config.database).await?;
        let storage = sms_storage(&config.database.url).await?;
        let queue = Arc::new(ApalisSmsQueue::new(storage));

        Ok(Self::new(db.get_connection(), &config, queue))
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = CommerceServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Process queued SMS jobs until Ctrl+C.
pub async fn run_sms_worker() -> Result<(), Box<dyn std::error::Error>> {
    let config = CommerceServiceConfig::from_env();
    let db = Database::connect(&config.database).await?;
    let storage = sms_storage(&config.database.url).await?;

    let context = SmsWorkerContext {
        messages: Arc::new(SmsMessageStore::new(db.get_connection())),
        config: config.sms.clone(),
    };
    if context.config.provider_url.is_none() {
        info!("No SMS provider configured, messages will be logged only");
    }

    let worker = WorkerBuilder::new("sms-worker")
        .data(context)
        .backend(storage)
        .build_fn(sms_job_handler);
    let monitor = Monitor::new().register(worker);

    info!("SMS worker started. Press Ctrl+C to stop.");
    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(format!("SMS worker failed: {}", e).into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping worker...");
        }
    }

    info!("SMS worker stopped.");
    Ok(())
}

/// Release reservations on expired shortcodes so they can be recycled.
///
/// Expired codes themselves are kept: issuance reuses them before minting
/// new ones.
pub async fn purge_expired_shortcodes() -> Result<(), Box<dyn std::error::Error>> {
    let config = CommerceServiceConfig::from_env();
    let db = Database::connect(&config.database).await?;
    let codes = Arc::new(RandomCodeGenerator::new(config.shortcodes.length));
    let shortcodes = ShortcodeStore::new(db.get_connection(), codes);

    let now = Utc::now();
    let expired = shortcodes.count_expired(now).await?;
    let released = shortcodes.release_expired_reservations(now).await?;

    info!(expired, released, "Expired shortcodes swept");
    println!(
        "{} expired shortcode(s) available for reuse, {} reservation(s) released",
        expired, released
    );
    Ok(())
}
