//! Projects bind an approved topic to a class. Only lecturers may create
//! them, and only from topics that cleared approval.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::server::AppState;
use crate::server::access::ensure_role;
use crate::server::dto::{CreateProjectRequest, ListProjectsParams};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::{Project, ProjectStatus, Role, TopicStatus};

pub async fn create_project(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Lecturer])?;

    let topic = state
        .store
        .get_topic(req.topic_id)
        .api_err("Failed to get topic")?
        .or_not_found(format!("Topic {} not found", req.topic_id))?;

    if topic.status != TopicStatus::Approved {
        return Err(ApiError::bad_request(format!(
            "Can only create projects from approved topics. Current: {}",
            topic.status
        )));
    }

    state
        .store
        .get_class(req.class_id)
        .api_err("Failed to check class")?
        .or_not_found(format!("Class {} not found", req.class_id))?;

    let mut project = Project {
        id: 0,
        project_name: req.project_name,
        topic_id: req.topic_id,
        class_id: req.class_id,
        status: ProjectStatus::Active,
        created_at: Utc::now(),
    };

    project.id = state
        .store
        .create_project(&project)
        .api_err("Failed to create project")?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(project))))
}

pub async fn list_projects(
    CurrentUser(_actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProjectsParams>,
) -> impl IntoResponse {
    let projects = state
        .store
        .list_projects(params.class_id, params.topic_id)
        .api_err("Failed to list projects")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(projects)))
}

pub async fn get_project(
    CurrentUser(_actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let project = state
        .store
        .get_project(id)
        .api_err("Failed to get project")?
        .or_not_found("Project not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(project)))
}
