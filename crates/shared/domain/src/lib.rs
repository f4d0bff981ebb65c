//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the request context, the resource outcome envelope, the query
//! description threaded through list operations, and the entity types of
//! the commerce platform together with their business rules (subscription
//! dates, shortcode issuance, review filters).

pub mod address;
pub mod assistant;
pub mod constants;
pub mod context;
pub mod customer;
pub mod error;
pub mod friend;
pub mod notification;
pub mod outcome;
pub mod owner;
pub mod pagination;
pub mod query;
pub mod resource;
pub mod review;
pub mod shortcode;
pub mod sms;
pub mod store;
pub mod subscription;
pub mod validation;

pub use address::{CreateDeliveryAddress, DeliveryAddress, UpdateDeliveryAddress};
pub use assistant::{AiAssistant, CreateAiAssistant, UpdateAiAssistant};
pub use constants::*;
pub use context::{AuthUser, RequestContext, UserRole};
pub use customer::{CreateCustomer, Customer, UpdateCustomer};
pub use error::{DomainError, DomainResult};
pub use friend::{CreateFriend, Friend, UpdateFriend};
pub use notification::{NewNotification, Notification};
pub use outcome::{Action, Outcome, Refusal, RefusalReason};
pub use owner::{OwnerKind, OwnerRef};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use query::{FilterParams, Includes, Listing, ResourceQuery, Restriction, Scope, SortOrder};
pub use resource::ResourceKind;
pub use review::{review_filters, CreateReview, Review, ReviewFilter, ReviewTally};
pub use shortcode::{
    plan_issuance, IssuancePlan, IssueShortcode, Shortcode, ShortcodeAction, ShortcodeOwner,
    ShortcodeOwnerPayload,
};
pub use sms::{CreateSmsMessage, SmsAlert, SmsMessage};
pub use store::{InstantCart, Store, StoreQuota, UpdateStoreQuota};
pub use subscription::{
    chained_start, end_date, CreateSubscription, Frequency, NewSubscription, PlanKind, PlanTerms,
    Subscription, SubscriptionPlan,
};
pub use validation::{ensure_mobile_number, validate_input};
