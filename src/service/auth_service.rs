//! Registration, login and token verification.

use std::sync::Arc;

use crate::auth::{IssuedToken, JwtKeys, Principal, hash_password, verify_password};
use crate::domain::user::{normalize_email, validate_password, validate_username};
use crate::domain::{NewUser, Role, User};
use crate::error::TradeHubError;
use crate::persistence::UserRepository;

/// Raw account fields as submitted by a client.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Requested username.
    pub username: String,
    /// Email, any case.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Role to create the account with.
    pub role: Role,
}

/// Validates, hashes and stores a new account.
///
/// Shared by self-registration and admin-created accounts.
pub(crate) async fn create_account(
    users: &dyn UserRepository,
    account: NewAccount,
) -> Result<User, TradeHubError> {
    let username = account.username.trim().to_string();
    validate_username(&username)?;
    let email = normalize_email(&account.email)?;
    validate_password(&account.password)?;

    let password = account.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| TradeHubError::Internal(format!("hashing task failed: {e}")))??;

    let user = users
        .insert(NewUser {
            username,
            email,
            password_hash,
            role: account.role,
        })
        .await?;
    tracing::info!(user_id = %user.id, role = %user.role, "account created");
    Ok(user)
}

/// Authentication entry points.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: Arc<JwtKeys>,
}

impl AuthService {
    /// Creates a new `AuthService`.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, keys: Arc<JwtKeys>) -> Self {
        Self { users, keys }
    }

    /// Self-registration. The account always gets [`Role::User`].
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Validation`] on malformed input and
    /// [`TradeHubError::Conflict`] if the username or email is taken.
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, TradeHubError> {
        create_account(
            self.users.as_ref(),
            NewAccount {
                username,
                email,
                password,
                role: Role::User,
            },
        )
        .await
    }

    /// Checks credentials and issues an access token.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Unauthorized`] for an unknown email or a
    /// wrong password, without saying which.
    pub async fn login(
        &self,
        email: &str,
        password: String,
    ) -> Result<(User, IssuedToken), TradeHubError> {
        let email = email.trim().to_ascii_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::warn!(%email, "login for unknown email");
            return Err(invalid_credentials());
        };

        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| TradeHubError::Internal(format!("verification task failed: {e}")))??;
        if !matches {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(invalid_credentials());
        }

        let token = self.keys.issue(&user)?;
        tracing::info!(user_id = %user.id, "login succeeded");
        Ok((user, token))
    }

    /// Resolves a bearer token to the calling principal.
    ///
    /// The role comes from the stored account, not the token, so a role
    /// change applies to tokens already issued.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Unauthorized`] for an invalid token or an
    /// account deleted after the token was issued.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, TradeHubError> {
        let mut principal = self.keys.verify(token)?;
        let user = self.users.get(principal.user_id).await?.ok_or_else(|| {
            tracing::warn!(user_id = %principal.user_id, "token for deleted account");
            TradeHubError::Unauthorized("account no longer exists".to_string())
        })?;
        if user.role != principal.role {
            tracing::debug!(
                user_id = %user.id,
                token_role = %principal.role,
                role = %user.role,
                "role changed since token was issued"
            );
        }
        principal.role = user.role;
        principal.email = user.email;
        Ok(principal)
    }

    /// Loads the caller's own profile.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Unauthorized`] if the account was deleted
    /// after the token was issued.
    pub async fn me(&self, principal: &Principal) -> Result<User, TradeHubError> {
        self.users
            .get(principal.user_id)
            .await?
            .ok_or_else(|| TradeHubError::Unauthorized("account no longer exists".to_string()))
    }
}

fn invalid_credentials() -> TradeHubError {
    TradeHubError::Unauthorized("invalid email or password".to_string())
}
