//! Authentication API Endpoints
//! Mission: Issue session credentials for local and federated logins

use crate::auth::{
    google::GoogleVerifier,
    models::{
        AuthResponse, Credential, GoogleLoginRequest, Identity, IdentitySummary, LoginRequest,
        RegisterRequest,
    },
    password,
    store::{CreateIdentityError, IdentityStore},
    token::SessionTokens,
};
use crate::error::ApiError;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub identity_store: Arc<IdentityStore>,
    pub session_tokens: Arc<SessionTokens>,
    pub google_verifier: Arc<GoogleVerifier>,
}

/// Register endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim();
    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("All fields are required"));
    }

    let password_hash =
        password::hash_password(&payload.password).map_err(|_| ApiError::Internal)?;

    let identity = state
        .identity_store
        .create(name, email, Credential::Local { password_hash })
        .map_err(|e| match e {
            CreateIdentityError::EmailTaken => {
                warn!("Registration conflict: {}", email);
                ApiError::Conflict("Email already registered")
            }
            CreateIdentityError::Storage(err) => {
                warn!("Registration storage failure: {}", err);
                ApiError::Internal
            }
        })?;

    let response = issue_session(&state, &identity)?;
    info!("Registered: {}", identity.email);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let identity = state
        .identity_store
        .find_by_email(&payload.email)
        .map_err(|_| ApiError::Internal)?
        .ok_or_else(|| {
            warn!("Failed login attempt: unknown email");
            ApiError::Unauthorized
        })?;

    // Federated identities hold no password; a password login against one
    // is rejected outright rather than comparing against nothing.
    let valid = match &identity.credential {
        Credential::Local { password_hash } => {
            password::verify_password(&payload.password, password_hash)
        }
        Credential::Google => false,
    };

    if !valid {
        warn!("Failed login attempt: {}", identity.email);
        return Err(ApiError::Unauthorized);
    }

    let response = issue_session(&state, &identity)?;
    info!("Login successful: {}", identity.email);

    Ok(Json(response))
}

/// Google login endpoint - POST /api/auth/google
///
/// Exchanges a Google-issued identity token for one of ours, creating the
/// identity on first sight of the email.
pub async fn google_login(
    State(state): State<AuthState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.token.trim().is_empty() {
        return Err(ApiError::BadRequest("Token required"));
    }

    let profile = state
        .google_verifier
        .verify(&payload.token)
        .await
        .map_err(|e| {
            warn!("Federated login rejected: {}", e);
            ApiError::InvalidToken
        })?;

    let identity = match state
        .identity_store
        .find_by_email(&profile.email)
        .map_err(|_| ApiError::Internal)?
    {
        Some(existing) => existing,
        None => match state
            .identity_store
            .create(&profile.name, &profile.email, Credential::Google)
        {
            Ok(created) => created,
            // Lost a lookup-or-create race to a concurrent login with the
            // same email; the winner's row is the one to use.
            Err(CreateIdentityError::EmailTaken) => state
                .identity_store
                .find_by_email(&profile.email)
                .map_err(|_| ApiError::Internal)?
                .ok_or(ApiError::Internal)?,
            Err(CreateIdentityError::Storage(err)) => {
                warn!("Federated login storage failure: {}", err);
                return Err(ApiError::Internal);
            }
        },
    };

    let response = issue_session(&state, &identity)?;
    info!("Federated login successful: {}", identity.email);

    Ok(Json(response))
}

fn issue_session(state: &AuthState, identity: &Identity) -> Result<AuthResponse, ApiError> {
    let token = state
        .session_tokens
        .issue(identity)
        .map_err(|_| ApiError::Internal)?;

    Ok(AuthResponse {
        token,
        user: IdentitySummary::from_identity(identity),
    })
}
