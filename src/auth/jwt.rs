//! HS256 access tokens.
//!
//! Tokens carry the user id (`sub`), email and role. They are
//! self-contained: verification needs only the signing secret, never the
//! store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::Principal;
use crate::config::JwtSettings;
use crate::domain::{Role, User, UserId};
use crate::error::TradeHubError;

/// Claims written into every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id in decimal.
    pub sub: String,
    /// Login email.
    pub email: String,
    /// Role at issuance time.
    pub role: Role,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

/// A freshly signed token with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Signing and verification keys plus validation rules.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Derives keys from configuration.
    #[must_use]
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            ttl: Duration::minutes(settings.expiration_minutes),
        }
    }

    /// Signs a token for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Internal`] if signing fails.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TradeHubError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TradeHubError::Internal(format!("failed to sign token: {e}")))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies signature, issuer, audience and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`TradeHubError::Unauthorized`] for any invalid token.
    pub fn verify(&self, token: &str) -> Result<Principal, TradeHubError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    "token not for this service"
                }
                _ => "invalid token",
            };
            tracing::warn!(error = %e, "rejected access token");
            TradeHubError::Unauthorized(reason.to_string())
        })?;

        let user_id: UserId = data
            .claims
            .sub
            .parse()
            .map_err(|_| TradeHubError::Unauthorized("invalid token subject".to_string()))?;
        Ok(Principal {
            user_id,
            email: data.claims.email,
            role: data.claims.role,
        })
    }

    /// Signs arbitrary claims. Used to craft edge-case tokens in tests.
    #[cfg(test)]
    fn sign(&self, claims: &Claims) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn settings(secret: &str) -> JwtSettings {
        JwtSettings {
            secret: secret.to_string(),
            issuer: "tradehub".to_string(),
            audience: "tradehub-clients".to_string(),
            expiration_minutes: 60,
        }
    }

    fn user(role: Role) -> User {
        User {
            id: UserId::new(42),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let keys = JwtKeys::new(&settings("secret"));
        let Ok(issued) = keys.issue(&user(Role::Admin)) else {
            panic!("issue failed");
        };
        assert!(issued.expires_at > Utc::now());

        let Ok(principal) = keys.verify(&issued.token) else {
            panic!("verify failed");
        };
        assert_eq!(principal.user_id, UserId::new(42));
        assert_eq!(principal.email, "alice@example.com");
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn wrong_secret_rejected() {
        let Ok(issued) = JwtKeys::new(&settings("one")).issue(&user(Role::User)) else {
            panic!("issue failed");
        };
        let result = JwtKeys::new(&settings("two")).verify(&issued.token);
        assert!(matches!(result, Err(TradeHubError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_rejected() {
        let keys = JwtKeys::new(&settings("secret"));
        let past = Utc::now() - Duration::hours(2);
        let token = keys.sign(&Claims {
            sub: "42".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            iss: "tradehub".to_string(),
            aud: "tradehub-clients".to_string(),
            iat: past.timestamp(),
            exp: (past + Duration::minutes(5)).timestamp(),
        });
        let Err(TradeHubError::Unauthorized(reason)) = keys.verify(&token) else {
            panic!("expired token must be rejected");
        };
        assert_eq!(reason, "token expired");
    }

    #[test]
    fn foreign_audience_rejected() {
        let keys = JwtKeys::new(&settings("secret"));
        let now = Utc::now();
        let token = keys.sign(&Claims {
            sub: "42".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            iss: "tradehub".to_string(),
            aud: "someone-else".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
        });
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn garbage_rejected() {
        let keys = JwtKeys::new(&settings("secret"));
        assert!(keys.verify("not.a.jwt").is_err());
    }
}
