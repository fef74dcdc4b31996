//! Topic proposal and approval workflow. Lecturers draft topics for their
//! department; approval is reserved for department heads and admins.

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
use crate::server::dto::{CreateTopicRequest, ListTopicsParams, UpdateTopicRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::{Role, Topic, TopicStatus};

pub async fn create_topic(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTopicRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Lecturer, Role::HeadDept, Role::Admin])?;

    state
        .store
        .get_department(req.dept_id)
        .api_err("Failed to check department")?
        .or_not_found(format!("Department {} not found", req.dept_id))?;

    let mut topic = Topic {
        id: 0,
        title: req.title,
        description: req.description,
        dept_id: req.dept_id,
        creator_id: actor.id,
        status: TopicStatus::Draft,
        created_at: Utc::now(),
    };

    topic.id = state
        .store
        .create_topic(&topic)
        .api_err("Failed to create topic")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(topic))))
}

pub async fn list_topics(
    CurrentUser(_actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTopicsParams>,
) -> impl IntoResponse {
    let status = match params.status.as_deref() {
        Some(raw) => Some(TopicStatus::parse(raw).ok_or_else(|| {
            ApiError::bad_request("Invalid status. Must be: draft, pending, approved, rejected")
        })?),
        None => None,
    };

    let topics = state
        .store
        .list_topics(params.dept_id, status)
        .api_err("Failed to list topics")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(topics)))
}

pub async fn get_topic(
    CurrentUser(_actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let topic = state
        .store
        .get_topic(id)
        .api_err("Failed to get topic")?
        .or_not_found("Topic not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(topic)))
}

pub async fn update_topic(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTopicRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Lecturer, Role::HeadDept, Role::Admin])?;

    let mut topic = state
        .store
        .get_topic(id)
        .api_err("Failed to get topic")?
        .or_not_found("Topic not found")?;

    // Only the creator may edit content; heads and admins may always touch
    // the record because they drive the approval workflow.
    if topic.creator_id != actor.id {
        ensure_role(&actor, &[Role::HeadDept, Role::Admin])?;
    }

    if let Some(raw) = &req.status {
        let status = TopicStatus::parse(raw).ok_or_else(|| {
            ApiError::bad_request("Invalid status. Must be: draft, pending, approved, rejected")
        })?;

        // Approval and rejection are head/admin decisions.
        if matches!(status, TopicStatus::Approved | TopicStatus::Rejected) {
            ensure_role(&actor, &[Role::HeadDept, Role::Admin])?;
        }
        topic.status = status;
    }
    if let Some(title) = req.title {
        topic.title = title;
    }
    if let Some(description) = req.description {
        topic.description = Some(description);
    }

    state
        .store
        .update_topic(&topic)
        .api_err("Failed to update topic")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(topic)))
}
