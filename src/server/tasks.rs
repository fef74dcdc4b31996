//! Task handlers: CRUD, the kanban board, and per-sprint statistics.
//!
//! Every task lives in a sprint, and every access is gated through the
//! sprint's team. Assignees must be active members of that team.

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
use crate::server::access::{self, ensure_role, ensure_team_access};
use crate::server::dto::{
    CreateTaskRequest, ListTasksParams, TaskBoardResponse, TaskResponse, TaskStatisticsResponse,
    TaskStatusUpdateRequest, UpdateTaskRequest,
};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::{Role, Sprint, Task, TaskPriority, TaskStatus};

/// Resolves the sprint a task belongs to, along with its team gate.
fn load_task_sprint(state: &AppState, task: &Task) -> Result<Option<Sprint>, ApiError> {
    match task.sprint_id {
        Some(sprint_id) => state.store.get_sprint(sprint_id).api_err("Failed to get sprint"),
        None => Ok(None),
    }
}

fn task_response(state: &AppState, task: Task) -> Result<TaskResponse, ApiError> {
    let assignee_name = match &task.assignee_id {
        Some(assignee_id) => state
            .store
            .get_user(assignee_id)
            .api_err("Failed to get assignee")?
            .and_then(|u| u.full_name),
        None => None,
    };
    let sprint_title = load_task_sprint(state, &task)?.and_then(|s| s.title);

    Ok(TaskResponse {
        task,
        assignee_name,
        sprint_title,
    })
}

fn parse_task_status(raw: &str) -> Result<TaskStatus, ApiError> {
    TaskStatus::parse(raw)
        .ok_or_else(|| ApiError::bad_request("Invalid status. Must be: todo, doing, done"))
}

fn parse_task_priority(raw: &str) -> Result<TaskPriority, ApiError> {
    TaskPriority::parse(raw)
        .ok_or_else(|| ApiError::bad_request("Invalid priority. Must be: low, medium, high"))
}

fn validate_assignee(state: &AppState, team_id: i64, assignee_id: &str) -> Result<(), ApiError> {
    if access::is_active_member(state, team_id, assignee_id)? {
        Ok(())
    } else {
        Err(ApiError::bad_request("Assignee is not a member of this team"))
    }
}

pub async fn create_task(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Student])?;

    let sprint_id = req
        .sprint_id
        .ok_or_else(|| ApiError::bad_request("sprint_id is required to create a task"))?;

    let sprint = state
        .store
        .get_sprint(sprint_id)
        .api_err("Failed to get sprint")?
        .or_not_found(format!("Sprint {sprint_id} not found"))?;

    ensure_team_access(&state, &actor, sprint.team_id)?;

    if let Some(assignee_id) = &req.assignee_id {
        validate_assignee(&state, sprint.team_id, assignee_id)?;
    }

    let priority = match req.priority.as_deref() {
        Some(raw) => parse_task_priority(raw)?,
        None => TaskPriority::Medium,
    };

    let mut task = Task {
        id: 0,
        sprint_id: Some(sprint_id),
        title: req.title,
        description: req.description,
        assignee_id: req.assignee_id,
        status: TaskStatus::Todo,
        priority,
        due_date: req.due_date,
        created_at: Utc::now(),
    };

    task.id = state
        .store
        .create_task(&task)
        .api_err("Failed to create task")?;

    let response = task_response(&state, task)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn list_sprint_tasks(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(sprint_id): Path<i64>,
    Query(params): Query<ListTasksParams>,
) -> impl IntoResponse {
    let sprint = state
        .store
        .get_sprint(sprint_id)
        .api_err("Failed to get sprint")?
        .or_not_found("Sprint not found")?;

    ensure_team_access(&state, &actor, sprint.team_id)?;

    let status = match params.status.as_deref() {
        Some(raw) => Some(parse_task_status(raw)?),
        None => None,
    };

    let tasks = state
        .store
        .list_sprint_tasks(sprint_id, status)
        .api_err("Failed to list tasks")?;

    let mut responses = Vec::with_capacity(tasks.len());
    for task in tasks {
        responses.push(task_response(&state, task)?);
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn get_task_board(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(sprint_id): Path<i64>,
) -> impl IntoResponse {
    let sprint = state
        .store
        .get_sprint(sprint_id)
        .api_err("Failed to get sprint")?
        .or_not_found("Sprint not found")?;

    ensure_team_access(&state, &actor, sprint.team_id)?;

    let tasks = state
        .store
        .list_sprint_tasks(sprint_id, None)
        .api_err("Failed to list tasks")?;

    let mut board = TaskBoardResponse::default();
    for task in tasks {
        let status = task.status;
        let in_sprint = task.sprint_id.is_some();
        let response = task_response(&state, task)?;
        if !in_sprint {
            board.backlog.push(response);
        } else {
            match status {
                TaskStatus::Todo => board.todo.push(response),
                TaskStatus::Doing => board.doing.push(response),
                TaskStatus::Done => board.done.push(response),
            }
        }
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(board)))
}

pub async fn get_sprint_statistics(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(sprint_id): Path<i64>,
) -> impl IntoResponse {
    let sprint = state
        .store
        .get_sprint(sprint_id)
        .api_err("Failed to get sprint")?
        .or_not_found("Sprint not found")?;

    ensure_team_access(&state, &actor, sprint.team_id)?;

    let counts = state
        .store
        .sprint_task_counts(sprint_id)
        .api_err("Failed to compute statistics")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        TaskStatisticsResponse::from_counts(&counts),
    )))
}

pub async fn get_task(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let task = state
        .store
        .get_task(id)
        .api_err("Failed to get task")?
        .or_not_found("Task not found")?;

    if let Some(sprint) = load_task_sprint(&state, &task)? {
        ensure_team_access(&state, &actor, sprint.team_id)?;
    }

    let response = task_response(&state, task)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}

pub async fn update_task(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> impl IntoResponse {
    let mut task = state
        .store
        .get_task(id)
        .api_err("Failed to get task")?
        .or_not_found("Task not found")?;

    let sprint = load_task_sprint(&state, &task)?;
    if let Some(sprint) = &sprint {
        ensure_team_access(&state, &actor, sprint.team_id)?;
    }

    if let Some(raw) = &req.status {
        task.status = parse_task_status(raw)?;
    }
    if let Some(raw) = &req.priority {
        task.priority = parse_task_priority(raw)?;
    }
    if let Some(assignee_id) = req.assignee_id {
        if let Some(sprint) = &sprint {
            validate_assignee(&state, sprint.team_id, &assignee_id)?;
        }
        task.assignee_id = Some(assignee_id);
    }
    if let Some(title) = req.title {
        task.title = title;
    }
    if let Some(description) = req.description {
        task.description = Some(description);
    }
    if let Some(due_date) = req.due_date {
        task.due_date = Some(due_date);
    }

    state
        .store
        .update_task(&task)
        .api_err("Failed to update task")?;

    let response = task_response(&state, task)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}

/// Status-only fast path for board drag-and-drop.
pub async fn update_task_status(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<TaskStatusUpdateRequest>,
) -> impl IntoResponse {
    let mut task = state
        .store
        .get_task(id)
        .api_err("Failed to get task")?
        .or_not_found("Task not found")?;

    if let Some(sprint) = load_task_sprint(&state, &task)? {
        ensure_team_access(&state, &actor, sprint.team_id)?;
    }

    task.status = parse_task_status(&req.status)?;

    state
        .store
        .update_task(&task)
        .api_err("Failed to update task")?;

    let response = task_response(&state, task)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}

pub async fn delete_task(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let task = state
        .store
        .get_task(id)
        .api_err("Failed to get task")?
        .or_not_found("Task not found")?;

    if let Some(sprint) = load_task_sprint(&state, &task)? {
        ensure_team_access(&state, &actor, sprint.team_id)?;
    }

    let deleted = state
        .store
        .delete_task(id)
        .api_err("Failed to delete task")?;
    if !deleted {
        return Err(ApiError::not_found("Task not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
