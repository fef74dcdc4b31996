//! Authorization gates shared by every resource handler.
//!
//! The gates only answer questions; whether a non-student role bypasses the
//! membership check is decided at each call site.

use crate::error::Result;
use crate::store::Store;
use crate::types::{Role, Task};

/// Role gate: is the principal's role in the allowed set?
#[must_use]
pub fn role_allowed(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

/// Membership gate: does an active membership row exist for this
/// (team, user) pair? One storage query, no policy.
pub fn is_active_member(store: &dyn Store, team_id: i64, user_id: &str) -> Result<bool> {
    store.is_active_member(team_id, user_id)
}

/// Resolves the team a sprint belongs to.
pub fn sprint_team_id(store: &dyn Store, sprint_id: i64) -> Result<Option<i64>> {
    Ok(store.get_sprint(sprint_id)?.map(|s| s.team_id))
}

/// Resolves the team a task belongs to, transitively via its sprint.
/// Backlog tasks have no team.
pub fn task_team_id(store: &dyn Store, task: &Task) -> Result<Option<i64>> {
    match task.sprint_id {
        Some(sprint_id) => sprint_team_id(store, sprint_id),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::store::SqliteStore;
    use crate::types::*;

    #[test]
    fn test_role_gate() {
        assert!(role_allowed(Role::Student, &[Role::Student]));
        assert!(role_allowed(Role::Admin, &[Role::Admin, Role::Staff]));
        assert!(!role_allowed(Role::Lecturer, &[Role::Student]));
        assert!(!role_allowed(Role::Student, &[]));
    }

    fn seeded() -> (TempDir, SqliteStore, i64) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        for id in ["leader", "member", "outsider"] {
            store
                .create_user(&User {
                    id: id.to_string(),
                    email: format!("{id}@test.edu"),
                    full_name: None,
                    password_hash: "hash".to_string(),
                    role: Role::Student,
                    dept_id: None,
                    is_active: true,
                    created_at: Utc::now(),
                })
                .unwrap();
        }

        let class = store.create_class("SE1701").unwrap();
        let team_id = store
            .create_team(&Team {
                id: 0,
                team_name: None,
                class_id: class.id,
                leader_id: "leader".to_string(),
                project_id: None,
                join_code: "ABC123".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();

        store
            .upsert_member(&TeamMember {
                team_id,
                student_id: "member".to_string(),
                member_role: None,
                is_active: true,
                joined_at: Utc::now(),
            })
            .unwrap();

        (temp, store, team_id)
    }

    #[test]
    fn test_membership_gate_requires_active_row() {
        let (_temp, store, team_id) = seeded();

        assert!(is_active_member(&store, team_id, "member").unwrap());
        assert!(!is_active_member(&store, team_id, "outsider").unwrap());

        store.set_member_active(team_id, "member", false).unwrap();
        assert!(!is_active_member(&store, team_id, "member").unwrap());
    }

    #[test]
    fn test_team_derivation_through_sprint() {
        let (_temp, store, team_id) = seeded();

        let sprint_id = store
            .create_sprint(&Sprint {
                id: 0,
                team_id,
                title: None,
                start_date: None,
                end_date: None,
                status: SprintStatus::Planned,
                created_at: Utc::now(),
            })
            .unwrap();

        assert_eq!(sprint_team_id(&store, sprint_id).unwrap(), Some(team_id));
        assert_eq!(sprint_team_id(&store, sprint_id + 99).unwrap(), None);

        let task = Task {
            id: 0,
            sprint_id: Some(sprint_id),
            title: "t".to_string(),
            description: None,
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: None,
            created_at: Utc::now(),
        };
        assert_eq!(task_team_id(&store, &task).unwrap(), Some(team_id));

        let backlog = Task {
            sprint_id: None,
            ..task
        };
        assert_eq!(task_team_id(&store, &backlog).unwrap(), None);
    }
}
