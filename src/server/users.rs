use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{CurrentUser, hash_password};
use crate::error::Error;
use crate::server::AppState;
use crate::server::access::ensure_role;
use crate::server::dto::{CreateUserRequest, PaginationParams, UpdateUserRequest};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, StoreOptionExt, StoreResultExt,
    paginate,
};
use crate::types::{Role, User};

pub async fn create_user(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Admin])?;

    let role = Role::parse(&req.role)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {}", req.role)))?;

    if let Some(dept_id) = req.dept_id {
        state
            .store
            .get_department(dept_id)
            .api_err("Failed to check department")?
            .or_not_found(format!("Department {dept_id} not found"))?;
    }

    let password_hash =
        hash_password(&req.password).map_err(|_| ApiError::internal("Failed to hash password"))?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email,
        full_name: req.full_name,
        password_hash,
        role,
        dept_id: req.dept_id,
        is_active: true,
        created_at: Utc::now(),
    };

    match state.store.create_user(&user) {
        Ok(()) => Ok((StatusCode::CREATED, Json(ApiResponse::success(user)))),
        Err(Error::AlreadyExists) => Err(ApiError::conflict("Email is already registered")),
        Err(_) => Err(ApiError::internal("Failed to create user")),
    }
}

pub async fn list_users(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Admin, Role::Staff])?;

    let cursor = params.cursor.as_deref().unwrap_or("");

    let users = state
        .store
        .list_users(cursor, DEFAULT_PAGE_SIZE + 1)
        .api_err("Failed to list users")?;

    let (users, next_cursor, has_more) =
        paginate(users, DEFAULT_PAGE_SIZE as usize, |u| u.id.clone());

    Ok::<_, ApiError>(Json(PaginatedResponse::new(users, next_cursor, has_more)))
}

pub async fn get_user(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Admin, Role::Staff])?;

    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn update_user(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Admin])?;

    let mut user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    if let Some(role) = &req.role {
        user.role = Role::parse(role)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown role: {role}")))?;
    }
    if let Some(full_name) = req.full_name {
        user.full_name = Some(full_name);
    }
    if let Some(dept_id) = req.dept_id {
        state
            .store
            .get_department(dept_id)
            .api_err("Failed to check department")?
            .or_not_found(format!("Department {dept_id} not found"))?;
        user.dept_id = Some(dept_id);
    }
    if let Some(is_active) = req.is_active {
        user.is_active = is_active;
    }

    state
        .store
        .update_user(&user)
        .api_err("Failed to update user")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}
