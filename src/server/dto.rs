use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Sprint, SprintTaskCounts, Task, Team, TeamMember, User};

// Auth

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

// Users

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Role name, matched case-insensitively.
    pub role: String,
    #[serde(default)]
    pub dept_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub dept_id: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<String>,
}

// Departments & classes

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub dept_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub class_code: String,
}

// Topics

#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub dept_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTopicRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// draft, pending, approved, rejected
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTopicsParams {
    #[serde(default)]
    pub dept_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

// Projects

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub project_name: String,
    pub topic_id: i64,
    pub class_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsParams {
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub topic_id: Option<i64>,
}

// Teams

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    #[serde(default)]
    pub team_name: Option<String>,
    pub class_id: i64,
    #[serde(default)]
    pub project_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub student_id: String,
    #[serde(default)]
    pub member_role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    #[serde(flatten)]
    pub team: Team,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_name: Option<String>,
    pub member_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TeamMemberResponse {
    #[serde(flatten)]
    pub member: TeamMember,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_email: Option<String>,
}

// Sprints

#[derive(Debug, Deserialize)]
pub struct CreateSprintRequest {
    pub team_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSprintRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// planned, active, completed
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SprintResponse {
    #[serde(flatten)]
    pub sprint: Sprint,
    pub task_count: i64,
}

// Tasks

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Required in the current design; backlog-only creation is rejected.
    #[serde(default)]
    pub sprint_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    /// low, medium, high; defaults to medium
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    /// low, medium, high
    #[serde(default)]
    pub priority: Option<String>,
    /// todo, doing, done
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Quick status update for drag-and-drop.
#[derive(Debug, Deserialize)]
pub struct TaskStatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksParams {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    #[serde(flatten)]
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint_title: Option<String>,
}

/// Kanban view grouped by status. The backlog bucket holds tasks without a
/// sprint and is kept for response-shape stability.
#[derive(Debug, Default, Serialize)]
pub struct TaskBoardResponse {
    pub todo: Vec<TaskResponse>,
    pub doing: Vec<TaskResponse>,
    pub done: Vec<TaskResponse>,
    pub backlog: Vec<TaskResponse>,
}

#[derive(Debug, Serialize)]
pub struct TaskStatisticsResponse {
    pub total_tasks: i64,
    pub todo_count: i64,
    pub doing_count: i64,
    pub done_count: i64,
    /// Percentage of done tasks, rounded to 2 decimals; 0.0 for an empty sprint.
    pub completion_rate: f64,
}

impl TaskStatisticsResponse {
    #[must_use]
    pub fn from_counts(counts: &SprintTaskCounts) -> Self {
        Self {
            total_tasks: counts.total,
            todo_count: counts.todo,
            doing_count: counts.doing,
            done_count: counts.done,
            completion_rate: completion_rate(counts.done, counts.total),
        }
    }
}

/// done/total*100, rounded to 2 decimals. Defined as 0.0 when total is 0.
#[must_use]
pub fn completion_rate(done: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = done as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
