mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Entity tables use SQLite rowids, so `create_*` for those returns the
/// generated id; users carry caller-generated UUIDs.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn has_admin_user(&self) -> Result<bool>;

    // Department operations
    fn create_department(&self, dept_name: &str) -> Result<Department>;
    fn get_department(&self, id: i64) -> Result<Option<Department>>;
    fn list_departments(&self) -> Result<Vec<Department>>;

    // Class operations
    fn create_class(&self, class_code: &str) -> Result<Class>;
    fn get_class(&self, id: i64) -> Result<Option<Class>>;
    fn list_classes(&self) -> Result<Vec<Class>>;

    // Topic operations
    fn create_topic(&self, topic: &Topic) -> Result<i64>;
    fn get_topic(&self, id: i64) -> Result<Option<Topic>>;
    fn list_topics(
        &self,
        dept_id: Option<i64>,
        status: Option<TopicStatus>,
    ) -> Result<Vec<Topic>>;
    fn update_topic(&self, topic: &Topic) -> Result<()>;

    // Project operations
    fn create_project(&self, project: &Project) -> Result<i64>;
    fn get_project(&self, id: i64) -> Result<Option<Project>>;
    fn list_projects(
        &self,
        class_id: Option<i64>,
        topic_id: Option<i64>,
    ) -> Result<Vec<Project>>;

    // Team operations
    fn create_team(&self, team: &Team) -> Result<i64>;
    fn get_team(&self, id: i64) -> Result<Option<Team>>;
    fn list_class_teams(&self, class_id: i64) -> Result<Vec<Team>>;

    // Membership operations
    fn upsert_member(&self, member: &TeamMember) -> Result<()>;
    fn get_member(&self, team_id: i64, student_id: &str) -> Result<Option<TeamMember>>;
    fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>>;
    fn set_member_active(&self, team_id: i64, student_id: &str, active: bool) -> Result<()>;
    fn is_active_member(&self, team_id: i64, student_id: &str) -> Result<bool>;

    // Sprint operations
    fn create_sprint(&self, sprint: &Sprint) -> Result<i64>;
    fn get_sprint(&self, id: i64) -> Result<Option<Sprint>>;
    fn list_team_sprints(&self, team_id: i64) -> Result<Vec<Sprint>>;
    fn update_sprint(&self, sprint: &Sprint) -> Result<()>;
    /// Deletes the sprint and its tasks in a single transaction.
    fn delete_sprint(&self, id: i64) -> Result<bool>;
    fn count_sprint_tasks(&self, sprint_id: i64) -> Result<i64>;

    // Task operations
    fn create_task(&self, task: &Task) -> Result<i64>;
    fn get_task(&self, id: i64) -> Result<Option<Task>>;
    fn list_sprint_tasks(
        &self,
        sprint_id: i64,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>>;
    fn update_task(&self, task: &Task) -> Result<()>;
    fn delete_task(&self, id: i64) -> Result<bool>;
    fn sprint_task_counts(&self, sprint_id: i64) -> Result<SprintTaskCounts>;
}
