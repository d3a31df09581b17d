//! Users, roles and the permissions roles grant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;
use crate::error::TradeHubError;

/// Coarse role carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular marketplace participant.
    User,
    /// Operator with user management rights.
    Admin,
}

/// Capability checked by services before privileged operations.
///
/// Handlers and services never compare role names; they ask whether the
/// caller's [`Role`] grants a [`Permission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Create, inspect, re-role and delete user accounts.
    ManageUsers,
    /// Edit or remove items and offers owned by someone else.
    ModerateListings,
    /// Read trades and offers the caller does not take part in.
    ViewAllTrades,
}

impl Role {
    /// Returns `true` if this role grants `permission`.
    #[must_use]
    pub const fn grants(self, permission: Permission) -> bool {
        match self {
            Self::Admin => true,
            Self::User => match permission {
                Permission::ManageUsers
                | Permission::ModerateListings
                | Permission::ViewAllTrades => false,
            },
        }
    }

    /// Stable text form used in the store and in token claims.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TradeHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(TradeHubError::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Unique handle shown to other users.
    pub username: String,
    /// Unique login email, stored lowercase.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns `true` if the user's role grants `permission`.
    #[must_use]
    pub const fn can(&self, permission: Permission) -> bool {
        self.role.grants(permission)
    }
}

/// Insert payload for a new account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique handle.
    pub username: String,
    /// Login email, lowercase.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Initial role.
    pub role: Role,
}

/// Checks a username: 3–50 characters from `[A-Za-z0-9_.-]`.
///
/// # Errors
///
/// Returns [`TradeHubError::Validation`] when the username is rejected.
pub fn validate_username(username: &str) -> Result<(), TradeHubError> {
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(TradeHubError::Validation(
            "username must be between 3 and 50 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(TradeHubError::Validation(
            "username may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }
    Ok(())
}

/// Normalizes and checks an email address. Returns the lowercase form.
///
/// # Errors
///
/// Returns [`TradeHubError::Validation`] when the address is malformed.
pub fn normalize_email(email: &str) -> Result<String, TradeHubError> {
    let email = email.trim().to_lowercase();
    let invalid = || TradeHubError::Validation(format!("invalid email address: {email}"));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.len() > 254 {
        return Err(invalid());
    }
    let mut labels = domain.split('.');
    let dotted = domain.contains('.') && labels.all(|label| !label.is_empty());
    if !dotted {
        return Err(invalid());
    }
    Ok(email)
}

/// Checks password strength: at least 8 characters, at most 128.
///
/// # Errors
///
/// Returns [`TradeHubError::Validation`] when the password is rejected.
pub fn validate_password(password: &str) -> Result<(), TradeHubError> {
    let len = password.chars().count();
    if len < 8 {
        return Err(TradeHubError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    if len > 128 {
        return Err(TradeHubError::Validation(
            "password must be at most 128 characters".to_string(),
        ));
    }
    Ok(())
}
