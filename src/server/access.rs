//! Access checks shared across resource handlers. These compose the role
//! and membership gates with the call-site policy: non-student roles bypass
//! the membership check, students must hold an active membership row.

use crate::auth::gates;
use crate::server::AppState;
use crate::server::response::{ApiError, StoreResultExt};
use crate::types::{Role, User};

/// Rejects with 403 unless the user's role is in the allowed set.
pub fn ensure_role(user: &User, allowed: &[Role]) -> Result<(), ApiError> {
    if gates::role_allowed(user.role, allowed) {
        return Ok(());
    }
    Err(ApiError::forbidden(format!(
        "Access denied. Required roles: {}",
        allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

/// Team access with the staff/lecturer bypass: students must be active
/// members, every other role passes.
pub fn ensure_team_access(state: &AppState, user: &User, team_id: i64) -> Result<(), ApiError> {
    if user.role != Role::Student {
        return Ok(());
    }

    let member = gates::is_active_member(state.store.as_ref(), team_id, &user.id)
        .api_err("Failed to check team membership")?;

    if member {
        Ok(())
    } else {
        Err(ApiError::forbidden("You are not a member of this team"))
    }
}

/// Membership check without any bypass, used for validating assignees.
pub fn is_active_member(state: &AppState, team_id: i64, user_id: &str) -> Result<bool, ApiError> {
    gates::is_active_member(state.store.as_ref(), team_id, user_id)
        .api_err("Failed to check team membership")
}
