//! Resource repositories.
//!
//! Each service wraps one entity: it runs the two-tier authorization check,
//! scopes list queries, calls the data-access store and reports the result
//! as a [`domain::Outcome`].

mod access;
mod ai_assistant_service;
mod customer_service;
mod delivery_address_service;
mod friend_service;
mod notification_service;
mod review_service;
mod shortcode_service;
mod sms_message_service;
mod store_quota_service;
mod subscription_service;
pub mod views;

#[cfg(test)]
mod test_support;

pub use ai_assistant_service::{AiAssistantManager, AiAssistantService};
pub use customer_service::{CustomerManager, CustomerService};
pub use delivery_address_service::{DeliveryAddressManager, DeliveryAddressService};
pub use friend_service::{FriendManager, FriendService};
pub use notification_service::{NotificationManager, NotificationService};
pub use review_service::{ReviewManager, ReviewService};
pub use shortcode_service::{ShortcodeManager, ShortcodeService};
pub use sms_message_service::{SmsMessageManager, SmsMessageService};
pub use store_quota_service::{StoreQuotaManager, StoreQuotaService};
pub use subscription_service::{SubscriptionManager, SubscriptionService};
pub use views::{ShortcodeView, SubscriptionView, WithStore};
