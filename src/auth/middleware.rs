//! Identity Resolver (Auth Gate)
//! Mission: Turn a bearer token into a live Identity, or reject uniformly

use crate::auth::api::AuthState;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Middleware guarding every protected route.
///
/// Hard gates, first failure short-circuits with a uniform Unauthorized:
/// a `Bearer` authorization header must be present, the token must verify,
/// and the subject must still exist in the credential store (a token can
/// outlive its identity). The resolved `Identity` is attached to request
/// extensions for the downstream handler; nothing is cached across
/// requests.
pub async fn auth_gate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let subject = state.session_tokens.verify(&token).map_err(|e| {
        debug!("Rejected bearer token: {:?}", e);
        ApiError::Unauthorized
    })?;

    let identity = state
        .identity_store
        .find_by_id(&subject)
        .map_err(|_| ApiError::Internal)?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
