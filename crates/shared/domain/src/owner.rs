//! Polymorphic owners of shortcodes and subscriptions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// The fixed set of entity types that can own a shortcode or subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Store,
    AiAssistant,
    SmsAlert,
    InstantCart,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Store => "store",
            OwnerKind::AiAssistant => "ai_assistant",
            OwnerKind::SmsAlert => "sms_alert",
            OwnerKind::InstantCart => "instant_cart",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(OwnerKind::Store),
            "ai_assistant" => Ok(OwnerKind::AiAssistant),
            "sms_alert" => Ok(OwnerKind::SmsAlert),
            "instant_cart" => Ok(OwnerKind::InstantCart),
            other => Err(DomainError::corrupt("owner_type", other)),
        }
    }
}

/// Reference to a concrete owner row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub kind: OwnerKind,
    pub id: Uuid,
}

impl OwnerRef {
    pub fn new(kind: OwnerKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn store(id: Uuid) -> Self {
        Self::new(OwnerKind::Store, id)
    }

    pub fn ai_assistant(id: Uuid) -> Self {
        Self::new(OwnerKind::AiAssistant, id)
    }

    pub fn sms_alert(id: Uuid) -> Self {
        Self::new(OwnerKind::SmsAlert, id)
    }

    pub fn instant_cart(id: Uuid) -> Self {
        Self::new(OwnerKind::InstantCart, id)
    }
}
