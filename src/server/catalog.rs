//! Department and class catalog. Both are flat lookup tables managed by
//! admin and staff.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::CurrentUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::access::ensure_role;
use crate::server::dto::{CreateClassRequest, CreateDepartmentRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::types::Role;

pub async fn create_department(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDepartmentRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Admin, Role::Staff])?;

    match state.store.create_department(&req.dept_name) {
        Ok(dept) => Ok((StatusCode::CREATED, Json(ApiResponse::success(dept)))),
        Err(Error::AlreadyExists) => Err(ApiError::conflict("Department already exists")),
        Err(_) => Err(ApiError::internal("Failed to create department")),
    }
}

pub async fn list_departments(
    CurrentUser(_actor): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let departments = state
        .store
        .list_departments()
        .api_err("Failed to list departments")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(departments)))
}

pub async fn create_class(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateClassRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Admin, Role::Staff])?;

    match state.store.create_class(&req.class_code) {
        Ok(class) => Ok((StatusCode::CREATED, Json(ApiResponse::success(class)))),
        Err(Error::AlreadyExists) => Err(ApiError::conflict("Class already exists")),
        Err(_) => Err(ApiError::internal("Failed to create class")),
    }
}

pub async fn list_classes(
    CurrentUser(_actor): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let classes = state.store.list_classes().api_err("Failed to list classes")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(classes)))
}
