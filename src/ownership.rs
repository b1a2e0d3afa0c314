//! Ownership Authorizer
//! Mission: Decide whether a resolved identity may touch a resource

use crate::auth::models::Identity;
use crate::error::ApiError;
use tracing::debug;
use uuid::Uuid;

/// Allow the request iff the identity owns the resource.
///
/// Denial is reported as NotFound with the same message a genuinely
/// missing resource produces, so a non-owner cannot confirm the resource
/// exists. For nested resources, call once per ownership level — task
/// handlers gate the parent project and the task independently; ownership
/// is never inherited.
pub fn authorize_owner(
    identity: &Identity,
    owner_id: Uuid,
    missing: &'static str,
) -> Result<(), ApiError> {
    if identity.id == owner_id {
        Ok(())
    } else {
        debug!(
            "Ownership denied: identity {} is not owner {}",
            identity.id, owner_id
        );
        Err(ApiError::NotFound(missing))
    }
}
