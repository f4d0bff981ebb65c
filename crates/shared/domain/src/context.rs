//! Request context: who is calling and with which platform role.
//!
//! The context is built once per inbound request by the caller and passed
//! explicitly into every repository operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ROLE_SUPER_ADMIN, ROLE_USER};

/// Platform roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "super admin")]
    SuperAdmin,
}

impl UserRole {
    /// Check if this role bypasses ownership checks
    pub fn is_super_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_SUPER_ADMIN => UserRole::SuperAdmin,
            _ => UserRole::User,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::SuperAdmin => write!(f, "{}", ROLE_SUPER_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// The authenticated user behind a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn new(id: Uuid, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}

/// Per-request context handed to every repository call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user: Option<AuthUser>,
}

impl RequestContext {
    /// Context for an authenticated user
    pub fn authenticated(user: AuthUser) -> Self {
        Self { user: Some(user) }
    }

    /// Context for an anonymous caller
    pub fn guest() -> Self {
        Self { user: None }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }

    /// First authorization tier: the global role flag.
    pub fn is_super_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_super_admin())
    }

    /// True when the caller is the given user.
    pub fn is(&self, user_id: Uuid) -> bool {
        self.user_id() == Some(user_id)
    }

    /// Super admin, or the given user themselves.
    pub fn is_self_or_super_admin(&self, user_id: Uuid) -> bool {
        self.is_super_admin() || self.is(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(UserRole::from("super admin"), UserRole::SuperAdmin);
        assert_eq!(UserRole::from("user"), UserRole::User);
        assert_eq!(UserRole::from("anything else"), UserRole::User);
        assert_eq!(String::from(UserRole::SuperAdmin), "super admin");
    }

    #[test]
    fn guest_is_never_authorized() {
        let ctx = RequestContext::guest();
        assert!(!ctx.is_super_admin());
        assert!(!ctx.is_self_or_super_admin(Uuid::new_v4()));
    }

    #[test]
    fn user_matches_only_themselves() {
        let id = Uuid::new_v4();
        let ctx = RequestContext::authenticated(AuthUser::new(id, "Tumi", UserRole::User));
        assert!(ctx.is(id));
        assert!(!ctx.is(Uuid::new_v4()));
        assert!(!ctx.is_super_admin());
    }
}
