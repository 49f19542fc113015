//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the identity as `sub` together with
//! `iat`/`exp` timestamps. Only one identity is ever accepted, the one
//! configured at startup.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 300;
/// Ten years.
pub const MAX_TOKEN_LIFETIME_MINUTES: i64 = 10 * 365 * 24 * 60;
pub const BEARER_TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid Authentication Details")]
    UnknownIdentity,

    #[error("Could not validate credentials")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Could not sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Token expiry is out of the representable time range")]
    ExpiryOutOfRange,
}

/// The token lifetime for `minutes`, or `None` unless
/// `0 < minutes <= MAX_TOKEN_LIFETIME_MINUTES`.
pub fn token_lifetime(minutes: i64) -> Option<Duration> {
    if (1..=MAX_TOKEN_LIFETIME_MINUTES).contains(&minutes) {
        Duration::try_minutes(minutes)
    } else {
        None
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    expected_identity: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(expected_identity: impl Into<String>, secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        TokenIssuer {
            expected_identity: expected_identity.into(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// Mint a token for `identity` if it is the configured one.
    pub fn issue(&self, identity: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    fn issue_at(&self, identity: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        if identity != self.expected_identity {
            debug!("Refusing token for unknown identity {:?}", identity);
            return Err(AuthError::UnknownIdentity);
        }

        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or(AuthError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: identity.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)?;

        Ok(IssuedToken {
            token,
            token_type: BEARER_TOKEN_TYPE.to_string(),
        })
    }

    /// Check the signature and expiry of `token`, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }
}
