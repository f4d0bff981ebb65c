//! SeaORM entity definitions.
//!
//! These are database-specific entities separate from domain models.

pub mod ai_assistant;
pub mod customer;
pub mod delivery_address;
pub mod friend;
pub mod instant_cart;
pub mod notification;
pub mod review;
pub mod shortcode;
pub mod sms_alert;
pub mod sms_message;
pub mod store;
pub mod store_member;
pub mod store_quota;
pub mod subscription;
pub mod subscription_plan;
