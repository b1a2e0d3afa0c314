//! Authentication Models
//! Mission: Define identity and credential data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user, local or federated.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    /// Natural key. Stored trimmed and lowercased; unique.
    pub email: String,
    pub credential: Credential,
    pub created_at: String,
}

/// How an identity proves itself.
///
/// Federated identities structurally carry no password hash, so a
/// missing hash can never be confused with an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Local { password_hash: String },
    Google,
}

impl Credential {
    pub fn provider(&self) -> &'static str {
        match self {
            Credential::Local { .. } => "local",
            Credential::Google => "google",
        }
    }

    pub fn password_hash(&self) -> Option<&str> {
        match self {
            Credential::Local { password_hash } => Some(password_hash),
            Credential::Google => None,
        }
    }

    /// Rebuild from storage columns. A local row without a hash (or an
    /// unknown provider) is corrupt and yields `None`.
    pub fn from_columns(provider: &str, password_hash: Option<String>) -> Option<Self> {
        match (provider, password_hash) {
            ("local", Some(password_hash)) => Some(Credential::Local { password_hash }),
            ("google", _) => Some(Credential::Google),
            _ => None,
        }
    }
}

/// Session token claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (identity id)
    pub iat: usize,  // issued-at timestamp
    pub exp: usize,  // expiration timestamp
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Google login request body: a raw Google-issued identity token.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

/// Response for register/login/google-login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: IdentitySummary,
}

/// Identity summary (sanitized — never carries credential material)
#[derive(Debug, Serialize)]
pub struct IdentitySummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl IdentitySummary {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            name: identity.name.clone(),
            email: identity.email.clone(),
        }
    }
}
