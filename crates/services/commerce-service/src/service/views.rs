//! Response shapes with optionally eager-loaded relations.
//!
//! Relations are attached only when the caller asked for them through
//! [`domain::Includes`]; loading them never touches persisted state.

use serde::Serialize;

use domain::{
    resource_kind, ResourceKind, Shortcode, ShortcodeOwner, Store, Subscription,
    SubscriptionPlan,
};

/// A store-scoped resource with its store attached on request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithStore<T> {
    #[serde(flatten)]
    pub resource: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<Store>,
}

impl<T> WithStore<T> {
    pub fn bare(resource: T) -> Self {
        Self {
            resource,
            store: None,
        }
    }
}

impl<T: ResourceKind> ResourceKind for WithStore<T> {
    const NAME: &'static str = T::NAME;
    const PLURAL: &'static str = T::PLURAL;
    const TITLE: &'static str = T::TITLE;
    const KEY: &'static str = T::KEY;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Subscription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_plan: Option<SubscriptionPlan>,
}

resource_kind!(SubscriptionView, "subscription", "subscriptions", "Subscription", "subscription");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortcodeView {
    #[serde(flatten)]
    pub shortcode: Shortcode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<ShortcodeOwner>,
}

resource_kind!(ShortcodeView, "shortcode", "shortcodes", "Shortcode", "shortcode");

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::Customer;
    use uuid::Uuid;

    #[test]
    fn store_is_omitted_unless_loaded() {
        let customer = Customer {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            mobile_number: "+15550100200".to_string(),
            total_orders: 0,
            total_spend: 0,
            last_order_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(WithStore::bare(customer)).unwrap();
        assert_eq!(json["first_name"], "Ann");
        assert!(json.get("store").is_none());
        assert_eq!(<WithStore<Customer> as ResourceKind>::TITLE, "Customer");
    }
}
