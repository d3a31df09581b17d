//! Authentication: password hashing, access tokens and the request
//! principal.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, IssuedToken, JwtKeys};
pub use password::{hash_password, verify_password};

use crate::domain::{Permission, Role, UserId};
use crate::error::TradeHubError;

/// The authenticated caller, decoded from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Caller's user id.
    pub user_id: UserId,
    /// Caller's email at token issuance.
    pub email: String,
    /// Caller's role at token issuance.
    pub role: Role,
}

impl Principal {
    /// Returns `true` if the caller's role grants `permission`.
    #[must_use]
    pub const fn can(&self, permission: Permission) -> bool {
        self.role.grants(permission)
    }

    /// Fails with [`TradeHubError::Forbidden`] unless the role grants
    /// `permission`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`].
    pub fn require(&self, permission: Permission) -> Result<(), TradeHubError> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user_id, ?permission, "permission denied");
            Err(TradeHubError::Forbidden(
                "insufficient privileges".to_string(),
            ))
        }
    }

    /// Passes if the caller is `owner` or holds `permission`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Forbidden`].
    pub fn require_self_or(
        &self,
        owner: UserId,
        permission: Permission,
    ) -> Result<(), TradeHubError> {
        if self.user_id == owner {
            Ok(())
        } else {
            self.require(permission)
        }
    }
}
