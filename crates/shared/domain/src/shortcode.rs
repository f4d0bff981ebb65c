//! Shortcodes: short, reusable codes bound to an owner and an action.
//!
//! At most one code exists per (owner, action). Issuing a code for a pair
//! that already has one extends it; otherwise an expired code from another
//! owner is recycled; only when neither exists is a new code generated.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assistant::AiAssistant;
use crate::error::DomainError;
use crate::owner::{OwnerKind, OwnerRef};
use crate::resource_kind;
use crate::sms::SmsAlert;
use crate::store::{InstantCart, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcodeAction {
    Pay,
    Visit,
}

impl ShortcodeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShortcodeAction::Pay => "pay",
            ShortcodeAction::Visit => "visit",
        }
    }
}

impl fmt::Display for ShortcodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShortcodeAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pay" => Ok(ShortcodeAction::Pay),
            "visit" => Ok(ShortcodeAction::Visit),
            other => Err(DomainError::corrupt("shortcodes.action", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcode {
    pub id: Uuid,
    pub code: String,
    pub action: ShortcodeAction,
    pub owner: OwnerRef,
    pub reserved_for_user_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(Shortcode, "shortcode", "shortcodes", "Shortcode", "shortcode");

impl Shortcode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// A reserved code may only be used by the user it was reserved for.
    pub fn is_usable_by(&self, user_id: Option<Uuid>) -> bool {
        match self.reserved_for_user_id {
            Some(reserved) => user_id == Some(reserved),
            None => true,
        }
    }
}

/// Request to bind a code to an owner and action
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueShortcode {
    pub owner: OwnerRef,
    pub action: ShortcodeAction,
    #[serde(default)]
    pub reserved_for_user_id: Option<Uuid>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl IssueShortcode {
    pub fn new(owner: OwnerRef, action: ShortcodeAction) -> Self {
        Self {
            owner,
            action,
            reserved_for_user_id: None,
            expires_at: None,
        }
    }

    pub fn reserved_for(mut self, user_id: Uuid) -> Self {
        self.reserved_for_user_id = Some(user_id);
        self
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Requested expiry, or `now + ttl`
    pub fn expiry(&self, now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
        self.expires_at.unwrap_or(now + ttl)
    }
}

/// How an issuance request will be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuancePlan {
    /// Same owner and action already hold a code: push its expiry
    Extend(Shortcode),
    /// Rebind an expired code that belonged to someone else
    Recycle(Shortcode),
    /// Nothing reusable: mint a new code
    Generate,
}

/// Decide between extend, recycle and generate.
///
/// `matching` is the code already held by the requested (owner, action), in
/// any expiry state. `recyclable` is an expired code of the same action held
/// by a different owner.
pub fn plan_issuance(matching: Option<Shortcode>, recyclable: Option<Shortcode>) -> IssuancePlan {
    match (matching, recyclable) {
        (Some(existing), _) => IssuancePlan::Extend(existing),
        (None, Some(expired)) => IssuancePlan::Recycle(expired),
        (None, None) => IssuancePlan::Generate,
    }
}

/// The resolved owner behind a shortcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ShortcodeOwner {
    Store(Store),
    AiAssistant(AiAssistant),
    SmsAlert(SmsAlert),
    InstantCart(InstantCart),
}

impl ShortcodeOwner {
    pub fn kind(&self) -> OwnerKind {
        match self {
            ShortcodeOwner::Store(_) => OwnerKind::Store,
            ShortcodeOwner::AiAssistant(_) => OwnerKind::AiAssistant,
            ShortcodeOwner::SmsAlert(_) => OwnerKind::SmsAlert,
            ShortcodeOwner::InstantCart(_) => OwnerKind::InstantCart,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ShortcodeOwner::Store(store) => store.id,
            ShortcodeOwner::AiAssistant(assistant) => assistant.id,
            ShortcodeOwner::SmsAlert(alert) => alert.id,
            ShortcodeOwner::InstantCart(cart) => cart.id,
        }
    }

    /// User who controls the owner, where the owner kind has one.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            ShortcodeOwner::Store(store) => Some(store.user_id),
            ShortcodeOwner::AiAssistant(assistant) => Some(assistant.user_id),
            ShortcodeOwner::SmsAlert(alert) => Some(alert.user_id),
            ShortcodeOwner::InstantCart(_) => None,
        }
    }
}

/// Hypermedia link attached to a resolved shortcode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub rel: &'static str,
    pub href: String,
}

impl Link {
    fn new(rel: &'static str, href: String) -> Self {
        Self { rel, href }
    }
}

/// Links offered for an owner, gated by the shortcode action.
pub fn owner_links(owner: &ShortcodeOwner, action: ShortcodeAction) -> Vec<Link> {
    match (owner, action) {
        (ShortcodeOwner::Store(store), ShortcodeAction::Pay) => vec![
            Link::new(
                "show_payment_methods",
                format!("/stores/{}/payment-methods", store.id),
            ),
            Link::new(
                "show_subscription_plans",
                "/subscription-plans?service=store".to_string(),
            ),
            Link::new(
                "create_subscription",
                format!("/stores/{}/subscriptions", store.id),
            ),
        ],
        (ShortcodeOwner::Store(store), ShortcodeAction::Visit) => vec![
            Link::new("show_store", format!("/stores/{}", store.id)),
            Link::new("show_products", format!("/stores/{}/products", store.id)),
        ],
        (ShortcodeOwner::AiAssistant(assistant), ShortcodeAction::Pay) => vec![
            Link::new(
                "show_payment_methods",
                format!("/ai-assistants/{}/payment-methods", assistant.id),
            ),
            Link::new(
                "show_subscription_plans",
                "/subscription-plans?service=ai_assistant".to_string(),
            ),
            Link::new(
                "create_subscription",
                format!("/ai-assistants/{}/subscriptions", assistant.id),
            ),
        ],
        (ShortcodeOwner::AiAssistant(assistant), ShortcodeAction::Visit) => vec![Link::new(
            "show_ai_assistant",
            format!("/ai-assistants/{}", assistant.id),
        )],
        (ShortcodeOwner::SmsAlert(alert), ShortcodeAction::Pay) => vec![
            Link::new(
                "show_payment_methods",
                format!("/sms-alerts/{}/payment-methods", alert.id),
            ),
            Link::new(
                "show_subscription_plans",
                "/subscription-plans?service=sms_alert".to_string(),
            ),
            Link::new(
                "create_subscription",
                format!("/sms-alerts/{}/subscriptions", alert.id),
            ),
        ],
        (ShortcodeOwner::SmsAlert(_), ShortcodeAction::Visit) => Vec::new(),
        (ShortcodeOwner::InstantCart(cart), ShortcodeAction::Pay) => vec![
            Link::new(
                "show_payment_methods",
                format!("/instant-carts/{}/payment-methods", cart.id),
            ),
            Link::new(
                "checkout",
                format!("/instant-carts/{}/checkout", cart.id),
            ),
        ],
        (ShortcodeOwner::InstantCart(cart), ShortcodeAction::Visit) => vec![Link::new(
            "show_instant_cart",
            format!("/instant-carts/{}", cart.id),
        )],
    }
}

/// Response payload for a shortcode lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortcodeOwnerPayload {
    pub code: String,
    pub action: ShortcodeAction,
    pub expires_at: DateTime<Utc>,
    pub owner_type: OwnerKind,
    pub owner: ShortcodeOwner,
    pub links: Vec<Link>,
}

impl ShortcodeOwnerPayload {
    pub fn new(shortcode: &Shortcode, owner: ShortcodeOwner) -> Self {
        let links = owner_links(&owner, shortcode.action);
        Self {
            code: shortcode.code.clone(),
            action: shortcode.action,
            expires_at: shortcode.expires_at,
            owner_type: owner.kind(),
            owner,
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcode(owner: OwnerRef, action: ShortcodeAction, expires_at: DateTime<Utc>) -> Shortcode {
        Shortcode {
            id: Uuid::new_v4(),
            code: "4821".to_string(),
            action,
            owner,
            reserved_for_user_id: None,
            expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn store() -> Store {
        Store {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Corner Shop".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn matching_code_is_extended_even_when_recyclable_exists() {
        let now = Utc::now();
        let mine = shortcode(OwnerRef::store(Uuid::new_v4()), ShortcodeAction::Pay, now);
        let other = shortcode(
            OwnerRef::store(Uuid::new_v4()),
            ShortcodeAction::Pay,
            now - Duration::hours(1),
        );

        assert_eq!(
            plan_issuance(Some(mine.clone()), Some(other)),
            IssuancePlan::Extend(mine)
        );
    }

    #[test]
    fn expired_code_of_other_owner_is_recycled() {
        let expired = shortcode(
            OwnerRef::ai_assistant(Uuid::new_v4()),
            ShortcodeAction::Visit,
            Utc::now() - Duration::days(2),
        );
        assert_eq!(
            plan_issuance(None, Some(expired.clone())),
            IssuancePlan::Recycle(expired)
        );
    }

    #[test]
    fn nothing_reusable_generates() {
        assert_eq!(plan_issuance(None, None), IssuancePlan::Generate);
    }

    #[test]
    fn expiry_falls_back_to_the_ttl() {
        let now = Utc::now();
        let request = IssueShortcode::new(OwnerRef::store(Uuid::new_v4()), ShortcodeAction::Pay);
        assert_eq!(request.expiry(now, Duration::hours(24)), now + Duration::hours(24));

        let explicit = now + Duration::hours(2);
        assert_eq!(
            request.expiring_at(explicit).expiry(now, Duration::hours(24)),
            explicit
        );
    }

    #[test]
    fn reservation_limits_usage() {
        let user = Uuid::new_v4();
        let mut code = shortcode(OwnerRef::store(Uuid::new_v4()), ShortcodeAction::Pay, Utc::now());
        assert!(code.is_usable_by(None));

        code.reserved_for_user_id = Some(user);
        assert!(code.is_usable_by(Some(user)));
        assert!(!code.is_usable_by(Some(Uuid::new_v4())));
        assert!(!code.is_usable_by(None));
    }

    #[test]
    fn store_links_depend_on_action() {
        let owner = ShortcodeOwner::Store(store());
        let pay: Vec<_> = owner_links(&owner, ShortcodeAction::Pay)
            .into_iter()
            .map(|l| l.rel)
            .collect();
        let visit: Vec<_> = owner_links(&owner, ShortcodeAction::Visit)
            .into_iter()
            .map(|l| l.rel)
            .collect();

        assert_eq!(
            pay,
            vec!["show_payment_methods", "show_subscription_plans", "create_subscription"]
        );
        assert_eq!(visit, vec!["show_store", "show_products"]);
    }

    #[test]
    fn sms_alert_has_nothing_to_visit() {
        let alert = ShortcodeOwner::SmsAlert(SmsAlert {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            sms_credits: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        assert!(owner_links(&alert, ShortcodeAction::Visit).is_empty());
        assert_eq!(owner_links(&alert, ShortcodeAction::Pay).len(), 3);
    }

    #[test]
    fn payload_reports_owner_type() {
        let store = store();
        let code = shortcode(OwnerRef::store(store.id), ShortcodeAction::Visit, Utc::now());
        let payload = ShortcodeOwnerPayload::new(&code, ShortcodeOwner::Store(store));

        assert_eq!(payload.owner_type, OwnerKind::Store);
        assert_eq!(payload.links.len(), 2);
        assert_eq!(payload.code, "4821");
    }
}
