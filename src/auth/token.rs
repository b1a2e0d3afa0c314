//! Session Token Issuer/Verifier
//! Mission: Mint and validate the system's own signed bearer tokens

use crate::auth::models::{Claims, Identity};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;
use uuid::Uuid;

/// The one algorithm sessions are ever signed or verified with.
/// A token claiming anything else fails as BadSignature, never falls back.
const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a session token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Malformed,
    BadSignature,
}

/// Issues and verifies stateless session tokens.
///
/// Tokens carry only `{sub, iat, exp}`; validity is signature plus a
/// strict expiry comparison (zero leeway). Nothing is persisted and
/// nothing can be revoked before expiry.
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl SessionTokens {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Sign a session token for an identity, expiring TTL seconds from now.
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::seconds(self.ttl_secs))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: identity.id.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        debug!(
            "Issuing session token for {} ({}), ttl {}s",
            identity.email, identity.id, self.ttl_secs
        );

        encode(&Header::new(SESSION_ALGORITHM), &claims, &self.encoding_key)
            .context("Failed to sign session token")
    }

    /// Validate a session token and return its subject identity id.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(SESSION_ALGORITHM);
        validation.leeway = 0; // strict expiry, no skew tolerance

        let decoded = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;

        Uuid::parse_str(&decoded.claims.sub).map_err(|_| TokenError::Malformed)
    }
}
