//! JWT access/refresh pairs.
//!
//! Both tokens are HS256-signed with the same secret and carry a `token_type`
//! claim, so an access token can never be replayed as a refresh token and vice
//! versa. Expiry is enforced with zero leeway.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_ACCESS_TTL_SECONDS: u64 = 5 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: TokenType,
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is invalid or expired")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("expected {expected:?} token, got {actual:?}")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },
    #[error("failed to sign token")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenConfig {
    secret: SecretString,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenConfig {
    /// Defaults: 5 minute access tokens, 1 day refresh tokens.
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            access_ttl: Duration::from_secs(DEFAULT_ACCESS_TTL_SECONDS),
            refresh_ttl: Duration::from_secs(DEFAULT_REFRESH_TTL_SECONDS),
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: u64) -> Self {
        self.access_ttl = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: u64) -> Self {
        self.refresh_ttl = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub const fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    #[must_use]
    pub const fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"***")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Signs and verifies tokens for one secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Issue a fresh access/refresh pair for `user_id`.
    ///
    /// # Errors
    /// Returns [`TokenError::Encode`] if signing fails.
    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            refresh: self.issue(user_id, TokenType::Refresh)?,
            access: self.issue(user_id, TokenType::Access)?,
        })
    }

    /// Issue a single token of the given type.
    ///
    /// # Errors
    /// Returns [`TokenError::Encode`] if signing fails.
    pub fn issue(&self, user_id: i64, token_type: TokenType) -> Result<String, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let iat = Utc::now().timestamp();
        let claims = Claims {
            token_type,
            user_id,
            iat,
            exp: iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
            jti: Uuid::new_v4().simple().to_string(),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(TokenError::Encode)
    }

    /// Verify signature, expiry, and token type.
    ///
    /// # Errors
    /// Returns [`TokenError::Invalid`] for bad or expired tokens and
    /// [`TokenError::WrongType`] when the `token_type` claim does not match.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Invalid)?
            .claims;

        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&TokenConfig::new(SecretString::from(secret.to_string())))
    }

    #[test]
    fn config_defaults() {
        let config = TokenConfig::new(SecretString::from("s".to_string()));
        assert_eq!(config.access_ttl(), Duration::from_secs(300));
        assert_eq!(config.refresh_ttl(), Duration::from_secs(86_400));
        assert!(!format!("{config:?}").contains("\"s\""));
    }

    #[test]
    fn pair_round_trip() {
        let issuer = issuer("test-secret");
        let pair = issuer.issue_pair(7).unwrap();

        let access = issuer.verify(&pair.access, TokenType::Access).unwrap();
        assert_eq!(access.user_id, 7);
        assert_eq!(access.exp - access.iat, 300);

        let refresh = issuer.verify(&pair.refresh, TokenType::Refresh).unwrap();
        assert_eq!(refresh.user_id, 7);
        assert_eq!(refresh.exp - refresh.iat, 86_400);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let issuer = issuer("test-secret");
        let pair = issuer.issue_pair(1).unwrap();

        assert!(matches!(
            issuer.verify(&pair.refresh, TokenType::Access),
            Err(TokenError::WrongType {
                expected: TokenType::Access,
                actual: TokenType::Refresh
            })
        ));
        assert!(matches!(
            issuer.verify(&pair.access, TokenType::Refresh),
            Err(TokenError::WrongType { .. })
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = issuer("test-secret");
        let now = Utc::now().timestamp();
        let token = issuer
            .sign(&Claims {
                token_type: TokenType::Access,
                user_id: 1,
                iat: now - 1000,
                exp: now - 10,
                jti: Uuid::new_v4().simple().to_string(),
            })
            .unwrap();

        assert!(matches!(
            issuer.verify(&token, TokenType::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = issuer("secret-a").issue(1, TokenType::Access).unwrap();
        assert!(matches!(
            issuer("secret-b").verify(&token, TokenType::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            issuer("test-secret").verify("not.a.jwt", TokenType::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn custom_ttls_apply() {
        let config = TokenConfig::new(SecretString::from("k".to_string()))
            .with_access_ttl_seconds(60)
            .with_refresh_ttl_seconds(120);
        let issuer = TokenIssuer::new(&config);
        let pair = issuer.issue_pair(3).unwrap();

        let access = issuer.verify(&pair.access, TokenType::Access).unwrap();
        assert_eq!(access.exp - access.iat, 60);
        let refresh = issuer.verify(&pair.refresh, TokenType::Refresh).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 120);
    }
}
