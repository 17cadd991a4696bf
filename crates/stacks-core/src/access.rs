//! Route access policy.
//!
//! `decide` is a pure function of the current identity and a route's allowed
//! roles. It has no notion of "still loading": callers check
//! `SessionStore::is_loading()` first and show an interim state instead.

use crate::auth::{Identity, Role};

/// Outcome of evaluating a guarded route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Proceed,
    RedirectToLogin,
    RedirectToHome,
}

/// Access requirement attached to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// No check at all (the login page)
    Public,
    /// Any signed-in identity
    Authenticated,
    /// Signed in with one of these roles
    Roles(&'static [Role]),
}

impl AccessRule {
    pub fn is_public(&self) -> bool {
        matches!(self, AccessRule::Public)
    }

    /// Allowed-role set in the form `decide` takes, `None` meaning any role
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            AccessRule::Public | AccessRule::Authenticated => None,
            AccessRule::Roles(roles) => Some(roles),
        }
    }
}

pub fn decide(identity: Option<&Identity>, allowed_roles: Option<&[Role]>) -> AccessDecision {
    match (identity, allowed_roles) {
        (None, _) => AccessDecision::RedirectToLogin,
        (Some(_), None) => AccessDecision::Proceed,
        (Some(identity), Some(roles)) if roles.contains(&identity.role) => AccessDecision::Proceed,
        (Some(_), Some(_)) => AccessDecision::RedirectToHome,
    }
}
