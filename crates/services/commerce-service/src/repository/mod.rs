//! Repository layer for data access.
//!
//! Each `*Repository` trait is the seam the services depend on; the `*Store`
//! types implement it on top of SeaORM.

mod ai_assistant_repository;
mod base;
mod credits;
mod customer_repository;
mod delivery_address_repository;
pub mod entities;
mod friend_repository;
mod notification_repository;
mod owner_repository;
mod review_repository;
mod shortcode_repository;
mod sms_message_repository;
mod store_quota_repository;
mod store_repository;
mod subscription_repository;

pub use ai_assistant_repository::{AiAssistantRepository, AiAssistantStore};
pub use customer_repository::{CustomerRepository, CustomerStore};
pub use delivery_address_repository::{DeliveryAddressRepository, DeliveryAddressStore};
pub use friend_repository::{FriendRepository, FriendStore};
pub use notification_repository::{NotificationRepository, NotificationStore};
pub use owner_repository::{OwnerRepository, OwnerStore};
pub use review_repository::{ReviewRepository, ReviewStore};
pub use shortcode_repository::{ShortcodeRepository, ShortcodeStore};
pub use sms_message_repository::{SmsMessageRepository, SmsMessageStore};
pub use store_quota_repository::{StoreQuotaRepository, StoreQuotaStore};
pub use store_repository::{StoreLookup, StoreRepository};
pub use subscription_repository::{SubscriptionRepository, SubscriptionStore};

#[cfg(any(test, feature = "test-utils"))]
pub use ai_assistant_repository::MockAiAssistantRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use customer_repository::MockCustomerRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use delivery_address_repository::MockDeliveryAddressRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use friend_repository::MockFriendRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_repository::MockNotificationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use owner_repository::MockOwnerRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use review_repository::MockReviewRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use shortcode_repository::MockShortcodeRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use sms_message_repository::MockSmsMessageRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use store_quota_repository::MockStoreQuotaRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use store_repository::MockStoreRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use subscription_repository::MockSubscriptionRepository;
