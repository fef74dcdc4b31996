use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::{CurrentUser, verify_password};
use crate::server::AppState;
use crate::server::dto::{LoginRequest, LoginResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

/// Issues an access token for valid credentials. Unknown email and wrong
/// password produce the same 401; a deactivated account is 403.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user_by_email(&req.email)
        .api_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    let valid = verify_password(&req.password, &user.password_hash)
        .map_err(|_| ApiError::internal("Failed to verify password"))?;

    if !valid {
        return Err(ApiError::unauthorized("Incorrect email or password"));
    }

    if !user.is_active {
        return Err(ApiError::forbidden("User account is deactivated"));
    }

    let access_token = state
        .jwt
        .issue(&user.id)
        .map_err(|_| ApiError::internal("Failed to issue token"))?;

    Ok(Json(ApiResponse::success(LoginResponse {
        access_token,
        token_type: "bearer",
        user,
    })))
}

pub async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(ApiResponse::success(user))
}
