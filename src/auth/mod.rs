use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username given at login)
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, expiry_hours: u64) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::TokenGeneration(format!("token lifetime of {expiry_hours}h is out of range"))
            })?;

        Ok(Self {
            sub: subject.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

/// Caller identity established by the auth gate. Only presence matters to the
/// item operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredential,

    #[error("Authorization header must use Bearer token format")]
    MalformedCredential,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Error generating token: {0}")]
    TokenGeneration(String),
}

/// Auth gate: one decision per request, accept with an identity or reject.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credential: &str) -> Result<Identity, AuthError>;
}

/// HS256 JWT issuer and validator.
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expiry_hours)
    }

    /// Issues a signed token for `subject`.
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        let claims = Claims::new(subject, self.expiry_hours)?;
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, credential: &str) -> Result<Identity, AuthError> {
        let token_data = decode::<Claims>(credential, &self.decoding_key, &Validation::default())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(Identity::from(token_data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_authenticates() {
        let auth = JwtAuthenticator::new("test-secret", 1);
        let token = auth.issue("alice").unwrap();
        let identity = auth.authenticate(&token).unwrap();
        assert_eq!(identity.subject, "alice");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = JwtAuthenticator::new("secret-a", 1);
        let validator = JwtAuthenticator::new("secret-b", 1);
        let token = issuer.issue("alice").unwrap();
        assert!(matches!(
            validator.authenticate(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = JwtAuthenticator::new("test-secret", 1);
        let claims = Claims {
            sub: "alice".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
            iat: (Utc::now() - Duration::hours(3)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &auth.encoding_key).unwrap();
        assert!(auth.authenticate(&token).is_err());
    }

    #[test]
    fn out_of_range_lifetime_fails_without_panicking() {
        for hours in [u64::MAX, i64::MAX as u64] {
            let auth = JwtAuthenticator::new("test-secret", hours);
            assert!(matches!(auth.issue("alice"), Err(AuthError::TokenGeneration(_))));
        }
    }

    #[test]
    fn garbage_is_rejected() {
        let auth = JwtAuthenticator::new("test-secret", 1);
        assert!(auth.authenticate("not.a.jwt").is_err());
    }
}
