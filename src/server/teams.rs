//! Team management. Students form teams within a class; the creator becomes
//! the leader and first active member. Join codes let classmates find the
//! team without an invite flow.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::auth::CurrentUser;
use crate::server::AppState;
use crate::server::access::{ensure_role, ensure_team_access};
use crate::server::dto::{AddMemberRequest, CreateTeamRequest, TeamMemberResponse, TeamResponse};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::{Role, Team, TeamMember, User};

fn generate_join_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

/// Leader or any non-student role may manage the roster.
fn ensure_roster_access(actor: &User, team: &Team) -> Result<(), ApiError> {
    if actor.role != Role::Student || team.leader_id == actor.id {
        return Ok(());
    }
    Err(ApiError::forbidden(
        "Only the team leader can manage members",
    ))
}

pub async fn create_team(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTeamRequest>,
) -> impl IntoResponse {
    ensure_role(&actor, &[Role::Student])?;

    state
        .store
        .get_class(req.class_id)
        .api_err("Failed to check class")?
        .or_not_found(format!("Class {} not found", req.class_id))?;

    if let Some(project_id) = req.project_id {
        state
            .store
            .get_project(project_id)
            .api_err("Failed to check project")?
            .or_not_found(format!("Project {project_id} not found"))?;
    }

    let mut team = Team {
        id: 0,
        team_name: req.team_name,
        class_id: req.class_id,
        leader_id: actor.id.clone(),
        project_id: req.project_id,
        join_code: generate_join_code(),
        created_at: Utc::now(),
    };

    team.id = state
        .store
        .create_team(&team)
        .api_err("Failed to create team")?;

    let member = TeamMember {
        team_id: team.id,
        student_id: actor.id,
        member_role: Some("leader".to_string()),
        is_active: true,
        joined_at: Utc::now(),
    };
    state
        .store
        .upsert_member(&member)
        .api_err("Failed to add team leader as member")?;

    let response = TeamResponse {
        leader_name: actor.full_name,
        member_count: 1,
        team,
    };

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn list_class_teams(
    CurrentUser(_actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(class_id): Path<i64>,
) -> impl IntoResponse {
    state
        .store
        .get_class(class_id)
        .api_err("Failed to check class")?
        .or_not_found("Class not found")?;

    let teams = state
        .store
        .list_class_teams(class_id)
        .api_err("Failed to list teams")?;

    let mut responses = Vec::with_capacity(teams.len());
    for team in teams {
        let leader_name = state
            .store
            .get_user(&team.leader_id)
            .api_err("Failed to get leader")?
            .and_then(|u| u.full_name);
        let member_count = state
            .store
            .list_team_members(team.id)
            .api_err("Failed to count members")?
            .iter()
            .filter(|m| m.is_active)
            .count() as i64;
        responses.push(TeamResponse {
            team,
            leader_name,
            member_count,
        });
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn get_team(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let team = state
        .store
        .get_team(id)
        .api_err("Failed to get team")?
        .or_not_found("Team not found")?;

    ensure_team_access(&state, &actor, team.id)?;

    let leader_name = state
        .store
        .get_user(&team.leader_id)
        .api_err("Failed to get leader")?
        .and_then(|u| u.full_name);

    let member_count = state
        .store
        .list_team_members(team.id)
        .api_err("Failed to count members")?
        .iter()
        .filter(|m| m.is_active)
        .count() as i64;

    Ok::<_, ApiError>(Json(ApiResponse::success(TeamResponse {
        team,
        leader_name,
        member_count,
    })))
}

pub async fn list_members(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state
        .store
        .get_team(id)
        .api_err("Failed to get team")?
        .or_not_found("Team not found")?;

    ensure_team_access(&state, &actor, id)?;

    let members = state
        .store
        .list_team_members(id)
        .api_err("Failed to list members")?;

    let mut responses = Vec::with_capacity(members.len());
    for member in members {
        let student = state
            .store
            .get_user(&member.student_id)
            .api_err("Failed to get member user")?;
        responses.push(TeamMemberResponse {
            student_name: student.as_ref().and_then(|u| u.full_name.clone()),
            student_email: student.map(|u| u.email),
            member,
        });
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn add_member(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<AddMemberRequest>,
) -> impl IntoResponse {
    let team = state
        .store
        .get_team(id)
        .api_err("Failed to get team")?
        .or_not_found("Team not found")?;

    ensure_roster_access(&actor, &team)?;

    let student = state
        .store
        .get_user(&req.student_id)
        .api_err("Failed to get student")?
        .or_not_found(format!("User {} not found", req.student_id))?;

    if student.role != Role::Student {
        return Err(ApiError::bad_request("Only students can join teams"));
    }

    let existing = state
        .store
        .get_member(id, &student.id)
        .api_err("Failed to check membership")?;
    if existing.is_some_and(|m| m.is_active) {
        return Err(ApiError::conflict("Student is already a team member"));
    }

    let member = TeamMember {
        team_id: id,
        student_id: student.id,
        member_role: req.member_role,
        is_active: true,
        joined_at: Utc::now(),
    };
    state
        .store
        .upsert_member(&member)
        .api_err("Failed to add member")?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(TeamMemberResponse {
            student_name: student.full_name,
            student_email: Some(student.email),
            member,
        })),
    ))
}

pub async fn remove_member(
    CurrentUser(actor): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((id, student_id)): Path<(i64, String)>,
) -> impl IntoResponse {
    let team = state
        .store
        .get_team(id)
        .api_err("Failed to get team")?
        .or_not_found("Team not found")?;

    ensure_roster_access(&actor, &team)?;

    if student_id == team.leader_id {
        return Err(ApiError::bad_request("The team leader cannot be removed"));
    }

    let member = state
        .store
        .get_member(id, &student_id)
        .api_err("Failed to check membership")?
        .or_not_found("Membership not found")?;

    if !member.is_active {
        return Err(ApiError::not_found("Membership not found"));
    }

    // Soft removal: the row stays for history, the active flag drops.
    state
        .store
        .set_member_active(id, &student_id, false)
        .api_err("Failed to remove member")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
