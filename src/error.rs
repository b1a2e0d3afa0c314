//! API Error Taxonomy
//! Mission: One error vocabulary for the whole request path

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Caller-visible failure kinds.
///
/// Every component fails fast with one of these; internal detail
/// (database or crypto error strings) stays in the logs.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or invalid fields in a request body.
    BadRequest(&'static str),
    /// Missing/invalid/expired bearer token, bad credentials, or the
    /// identity behind a valid token no longer exists.
    Unauthorized,
    /// Duplicate email on registration.
    Conflict(&'static str),
    /// Resource absent, or owned by someone else. Deliberately the same
    /// answer in both cases so non-owners learn nothing.
    NotFound(&'static str),
    /// Federated identity token failed claim or signature validation.
    InvalidToken,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid identity token"),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}
