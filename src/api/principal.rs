//! Caller identity extraction from request headers.
//!
//! The gateway trusts an upstream auth proxy to authenticate callers and
//! forward the result as `x-user-id` and `x-user-role` headers. The
//! [`Principal`] extractor rejects requests missing either header with 401;
//! role checks in handlers return 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::error::MarketError;

/// Header carrying the authenticated user's UUID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role attached to an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Publishes deals and receives rating notifications.
    Vendor,
    /// Claims and rates deals, subscribes to proximity notifications.
    Customer,
    /// Operational access, including the event log.
    Admin,
}

impl Role {
    /// Parses a role header value, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "vendor" => Some(Self::Vendor),
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Lowercase name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

/// Authenticated caller identity, extracted from request headers.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    /// The caller's user ID.
    pub user_id: UserId,
    /// The caller's role.
    pub role: Role,
}

impl Principal {
    /// Ensures the caller holds the given role.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Forbidden`] when the roles differ.
    pub fn require(&self, role: Role) -> Result<(), MarketError> {
        if self.role == role {
            Ok(())
        } else {
            Err(MarketError::Forbidden(role.as_str()))
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<uuid::Uuid>().ok())
            .ok_or(MarketError::Unauthenticated)?;
        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Role::parse)
            .ok_or(MarketError::Unauthenticated)?;

        Ok(Self {
            user_id: UserId::from_uuid(user_id),
            role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(Role::parse("VENDOR"), Some(Role::Vendor));
        assert_eq!(Role::parse("Customer"), Some(Role::Customer));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn require_enforces_exact_role() {
        let principal = Principal {
            user_id: UserId::new(),
            role: Role::Customer,
        };
        assert!(principal.require(Role::Customer).is_ok());

        let denied = principal.require(Role::Vendor);
        assert!(matches!(denied, Err(MarketError::Forbidden("vendor"))));
    }
}
