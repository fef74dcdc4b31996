//! Sprint lifecycle. Sprints belong to a team and start out planned; status
//! moves freely between planned, active and completed.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::server::AppState;
use crate::server::access::{ensure_role, ensure_team_access};
use crate::server::dto::{CreateSprintRequest, SprintResponse, UpdateSprintRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::{Role, Sprint, SprintStatus};

pub async fn create_sprint(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSprintRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Student])?;

    state
        .store
        .get_team(req.team_id)
        .api_err("Failed to get team")?
        .or_not_found(format!("Team {} not found", req.team_id))?;

    ensure_team_access(&state, &actor, req.team_id)?;

    let mut sprint = Sprint {
        id: 0,
        team_id: req.team_id,
        title: req.title,
        start_date: req.start_date,
        end_date: req.end_date,
        status: SprintStatus::Planned,
        created_at: Utc::now(),
    };

    sprint.id = state
        .store
        .create_sprint(&sprint)
        .api_err("Failed to create sprint")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(SprintResponse {
            sprint,
            task_count: 0,
        })),
    ))
}

pub async fn list_team_sprints(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<i64>,
) -> impl IntoResponse {
    state
        .store
        .get_team(team_id)
        .api_err("Failed to get team")?
        .or_not_found("Team not found")?;

    ensure_team_access(&state, &actor, team_id)?;

    let sprints = state
        .store
        .list_team_sprints(team_id)
        .api_err("Failed to list sprints")?;

    let mut responses = Vec::with_capacity(sprints.len());
    for sprint in sprints {
        let task_count = state
            .store
            .count_sprint_tasks(sprint.id)
            .api_err("Failed to count tasks")?;
        responses.push(SprintResponse { sprint, task_count });
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn get_sprint(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let sprint = state
        .store
        .get_sprint(id)
        .api_err("Failed to get sprint")?
        .or_not_found("Sprint not found")?;

    ensure_team_access(&state, &actor, sprint.team_id)?;

    let task_count = state
        .store
        .count_sprint_tasks(sprint.id)
        .api_err("Failed to count tasks")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(SprintResponse {
        sprint,
        task_count,
    })))
}

pub async fn update_sprint(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSprintRequest>,
) -> impl IntoResponse {
    let mut sprint = state
        .store
        .get_sprint(id)
        .api_err("Failed to get sprint")?
        .or_not_found("Sprint not found")?;

    ensure_team_access(&state, &actor, sprint.team_id)?;

    if let Some(raw) = &req.status {
        sprint.status = SprintStatus::parse(raw).ok_or_else(|| {
            ApiError::bad_request("Invalid status. Must be: planned, active, completed")
        })?;
    }
    if let Some(title) = req.title {
        sprint.title = Some(title);
    }
    if let Some(start_date) = req.start_date {
        sprint.start_date = Some(start_date);
    }
    if let Some(end_date) = req.end_date {
        sprint.end_date = Some(end_date);
    }

    state
        .store
        .update_sprint(&sprint)
        .api_err("Failed to update sprint")?;

    let task_count = state
        .store
        .count_sprint_tasks(sprint.id)
        .api_err("Failed to count tasks")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(SprintResponse {
        sprint,
        task_count,
    })))
}

pub async fn delete_sprint(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let sprint = state
        .store
        .get_sprint(id)
        .api_err("Failed to get sprint")?
        .or_not_found("Sprint not found")?;

    // Deleting takes the sprint's tasks with it, so it is restricted to the
    // team leader and staff-level roles.
    if actor.role == Role::Student {
        let team = state
            .store
            .get_team(sprint.team_id)
            .api_err("Failed to get team")?
            .or_not_found("Team not found")?;
        if team.leader_id != actor.id {
            return Err(ApiError::forbidden(
                "Only the team leader can delete sprints",
            ));
        }
    }

    let deleted = state
        .store
        .delete_sprint(id)
        .api_err("Failed to delete sprint")?;
    if !deleted {
        return Err(ApiError::not_found("Sprint not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
