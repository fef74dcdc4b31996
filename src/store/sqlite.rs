use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| tracing::error!("Invalid date in database: '{}' - {}", s, e))
        .ok()
}

fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        dept_id: row.get(5)?,
        is_active: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        team_name: row.get(1)?,
        class_id: row.get(2)?,
        leader_id: row.get(3)?,
        project_id: row.get(4)?,
        join_code: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn sprint_from_row(row: &Row<'_>) -> rusqlite::Result<Sprint> {
    Ok(Sprint {
        id: row.get(0)?,
        team_id: row.get(1)?,
        title: row.get(2)?,
        start_date: row.get::<_, Option<String>>(3)?.and_then(|s| parse_date(&s)),
        end_date: row.get::<_, Option<String>>(4)?.and_then(|s| parse_date(&s)),
        status: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        sprint_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        assignee_id: row.get(4)?,
        status: row.get(5)?,
        priority: row.get(6)?,
        due_date: row.get::<_, Option<String>>(7)?.map(|s| parse_datetime(&s)),
        created_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

const USER_COLS: &str = "id, email, full_name, password_hash, role, dept_id, is_active, created_at";
const TEAM_COLS: &str = "id, team_name, class_id, leader_id, project_id, join_code, created_at";
const SPRINT_COLS: &str = "id, team_id, title, start_date, end_date, status, created_at";
const TASK_COLS: &str =
    "id, sprint_id, title, description, assignee_id, status, priority, due_date, created_at";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, email, full_name, password_hash, role, dept_id, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id,
                user.email,
                user.full_name,
                user.password_hash,
                user.role,
                user.dept_id,
                user.is_active,
                format_datetime(&user.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLS} FROM users WHERE id > ?1 ORDER BY id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET full_name = ?1, role = ?2, dept_id = ?3, is_active = ?4 WHERE id = ?5",
            params![user.full_name, user.role, user.dept_id, user.is_active, user.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn has_admin_user(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'ADMIN' AND is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Department operations

    fn create_department(&self, dept_name: &str) -> Result<Department> {
        let conn = self.conn();
        let now = Utc::now();
        let result = conn.execute(
            "INSERT INTO departments (dept_name, created_at) VALUES (?1, ?2)",
            params![dept_name, format_datetime(&now)],
        );

        match result {
            Ok(_) => Ok(Department {
                id: conn.last_insert_rowid(),
                dept_name: dept_name.to_string(),
                created_at: now,
            }),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_department(&self, id: i64) -> Result<Option<Department>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, dept_name, created_at FROM departments WHERE id = ?1",
            params![id],
            |row| {
                Ok(Department {
                    id: row.get(0)?,
                    dept_name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_departments(&self) -> Result<Vec<Department>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, dept_name, created_at FROM departments ORDER BY dept_name")?;

        let rows = stmt.query_map([], |row| {
            Ok(Department {
                id: row.get(0)?,
                dept_name: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Class operations

    fn create_class(&self, class_code: &str) -> Result<Class> {
        let conn = self.conn();
        let now = Utc::now();
        let result = conn.execute(
            "INSERT INTO classes (class_code, created_at) VALUES (?1, ?2)",
            params![class_code, format_datetime(&now)],
        );

        match result {
            Ok(_) => Ok(Class {
                id: conn.last_insert_rowid(),
                class_code: class_code.to_string(),
                created_at: now,
            }),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_class(&self, id: i64) -> Result<Option<Class>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, class_code, created_at FROM classes WHERE id = ?1",
            params![id],
            |row| {
                Ok(Class {
                    id: row.get(0)?,
                    class_code: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_classes(&self) -> Result<Vec<Class>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, class_code, created_at FROM classes ORDER BY class_code")?;

        let rows = stmt.query_map([], |row| {
            Ok(Class {
                id: row.get(0)?,
                class_code: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Topic operations

    fn create_topic(&self, topic: &Topic) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO topics (title, description, dept_id, creator_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                topic.title,
                topic.description,
                topic.dept_id,
                topic.creator_id,
                topic.status,
                format_datetime(&topic.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_topic(&self, id: i64) -> Result<Option<Topic>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, title, description, dept_id, creator_id, status, created_at
             FROM topics WHERE id = ?1",
            params![id],
            |row| {
                Ok(Topic {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    dept_id: row.get(3)?,
                    creator_id: row.get(4)?,
                    status: row.get(5)?,
                    created_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_topics(
        &self,
        dept_id: Option<i64>,
        status: Option<TopicStatus>,
    ) -> Result<Vec<Topic>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, dept_id, creator_id, status, created_at
             FROM topics
             WHERE (?1 IS NULL OR dept_id = ?1) AND (?2 IS NULL OR status = ?2)
             ORDER BY id",
        )?;

        let rows = stmt.query_map(params![dept_id, status], |row| {
            Ok(Topic {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                dept_id: row.get(3)?,
                creator_id: row.get(4)?,
                status: row.get(5)?,
                created_at: parse_datetime(&row.get::<_, String>(6)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_topic(&self, topic: &Topic) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE topics SET title = ?1, description = ?2, status = ?3 WHERE id = ?4",
            params![topic.title, topic.description, topic.status, topic.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Project operations

    fn create_project(&self, project: &Project) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO projects (project_name, topic_id, class_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.project_name,
                project.topic_id,
                project.class_id,
                project.status,
                format_datetime(&project.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, project_name, topic_id, class_id, status, created_at
             FROM projects WHERE id = ?1",
            params![id],
            |row| {
                Ok(Project {
                    id: row.get(0)?,
                    project_name: row.get(1)?,
                    topic_id: row.get(2)?,
                    class_id: row.get(3)?,
                    status: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_projects(
        &self,
        class_id: Option<i64>,
        topic_id: Option<i64>,
    ) -> Result<Vec<Project>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, project_name, topic_id, class_id, status, created_at
             FROM projects
             WHERE (?1 IS NULL OR class_id = ?1) AND (?2 IS NULL OR topic_id = ?2)
             ORDER BY id",
        )?;

        let rows = stmt.query_map(params![class_id, topic_id], |row| {
            Ok(Project {
                id: row.get(0)?,
                project_name: row.get(1)?,
                topic_id: row.get(2)?,
                class_id: row.get(3)?,
                status: row.get(4)?,
                created_at: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Team operations

    fn create_team(&self, team: &Team) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO teams (team_name, class_id, leader_id, project_id, join_code, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                team.team_name,
                team.class_id,
                team.leader_id,
                team.project_id,
                team.join_code,
                format_datetime(&team.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_team(&self, id: i64) -> Result<Option<Team>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TEAM_COLS} FROM teams WHERE id = ?1"),
            params![id],
            team_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_class_teams(&self, class_id: i64) -> Result<Vec<Team>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TEAM_COLS} FROM teams WHERE class_id = ?1 ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![class_id], team_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Membership operations

    fn upsert_member(&self, member: &TeamMember) -> Result<()> {
        self.conn().execute(
            "INSERT INTO team_members (team_id, student_id, member_role, is_active, joined_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (team_id, student_id) DO UPDATE SET
                member_role = excluded.member_role,
                is_active = excluded.is_active",
            params![
                member.team_id,
                member.student_id,
                member.member_role,
                member.is_active,
                format_datetime(&member.joined_at),
            ],
        )?;
        Ok(())
    }

    fn get_member(&self, team_id: i64, student_id: &str) -> Result<Option<TeamMember>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT team_id, student_id, member_role, is_active, joined_at
             FROM team_members WHERE team_id = ?1 AND student_id = ?2",
            params![team_id, student_id],
            |row| {
                Ok(TeamMember {
                    team_id: row.get(0)?,
                    student_id: row.get(1)?,
                    member_role: row.get(2)?,
                    is_active: row.get(3)?,
                    joined_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT team_id, student_id, member_role, is_active, joined_at
             FROM team_members WHERE team_id = ?1 ORDER BY joined_at",
        )?;

        let rows = stmt.query_map(params![team_id], |row| {
            Ok(TeamMember {
                team_id: row.get(0)?,
                student_id: row.get(1)?,
                member_role: row.get(2)?,
                is_active: row.get(3)?,
                joined_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn set_member_active(&self, team_id: i64, student_id: &str, active: bool) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE team_members SET is_active = ?1 WHERE team_id = ?2 AND student_id = ?3",
            params![active, team_id, student_id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn is_active_member(&self, team_id: i64, student_id: &str) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM team_members
             WHERE team_id = ?1 AND student_id = ?2 AND is_active = 1",
            params![team_id, student_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Sprint operations

    fn create_sprint(&self, sprint: &Sprint) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO sprints (team_id, title, start_date, end_date, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                sprint.team_id,
                sprint.title,
                sprint.start_date.as_ref().map(format_date),
                sprint.end_date.as_ref().map(format_date),
                sprint.status,
                format_datetime(&sprint.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_sprint(&self, id: i64) -> Result<Option<Sprint>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {SPRINT_COLS} FROM sprints WHERE id = ?1"),
            params![id],
            sprint_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_team_sprints(&self, team_id: i64) -> Result<Vec<Sprint>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SPRINT_COLS} FROM sprints WHERE team_id = ?1
             ORDER BY start_date DESC, id DESC"
        ))?;

        let rows = stmt.query_map(params![team_id], sprint_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_sprint(&self, sprint: &Sprint) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE sprints SET title = ?1, start_date = ?2, end_date = ?3, status = ?4
             WHERE id = ?5",
            params![
                sprint.title,
                sprint.start_date.as_ref().map(format_date),
                sprint.end_date.as_ref().map(format_date),
                sprint.status,
                sprint.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_sprint(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM tasks WHERE sprint_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM sprints WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    fn count_sprint_tasks(&self, sprint_id: i64) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE sprint_id = ?1",
            params![sprint_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // Task operations

    fn create_task(&self, task: &Task) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO tasks (sprint_id, title, description, assignee_id, status, priority, due_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.sprint_id,
                task.title,
                task.description,
                task.assignee_id,
                task.status,
                task.priority,
                task.due_date.as_ref().map(format_datetime),
                format_datetime(&task.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TASK_COLS} FROM tasks WHERE id = ?1"),
            params![id],
            task_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_sprint_tasks(
        &self,
        sprint_id: i64,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLS} FROM tasks
             WHERE sprint_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![sprint_id, status], task_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_task(&self, task: &Task) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE tasks SET sprint_id = ?1, title = ?2, description = ?3, assignee_id = ?4,
                    status = ?5, priority = ?6, due_date = ?7
             WHERE id = ?8",
            params![
                task.sprint_id,
                task.title,
                task.description,
                task.assignee_id,
                task.status,
                task.priority,
                task.due_date.as_ref().map(format_datetime),
                task.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_task(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn sprint_task_counts(&self, sprint_id: i64) -> Result<SprintTaskCounts> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(status = 'todo'), 0),
                    COALESCE(SUM(status = 'doing'), 0),
                    COALESCE(SUM(status = 'done'), 0)
             FROM tasks WHERE sprint_id = ?1",
            params![sprint_id],
            |row| {
                Ok(SprintTaskCounts {
                    total: row.get(0)?,
                    todo: row.get(1)?,
                    doing: row.get(2)?,
                    done: row.get(3)?,
                })
            },
        )
        .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn make_user(id: &str, email: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            full_name: None,
            password_hash: "hash".to_string(),
            role,
            dept_id: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn seed_team(store: &SqliteStore, leader: &str) -> i64 {
        store.create_user(&make_user(leader, &format!("{leader}@test.edu"), Role::Student))
            .unwrap();
        let class = store.create_class("SE1701").unwrap();
        let team = Team {
            id: 0,
            team_name: Some("Team Alpha".to_string()),
            class_id: class.id,
            leader_id: leader.to_string(),
            project_id: None,
            join_code: "JOIN01".to_string(),
            created_at: Utc::now(),
        };
        store.create_team(&team).unwrap()
    }

    #[test]
    fn test_initialize_creates_tables() {
        let (_temp, store) = test_store();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "users",
            "departments",
            "classes",
            "topics",
            "projects",
            "teams",
            "team_members",
            "sprints",
            "tasks",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_user_crud_and_email_uniqueness() {
        let (_temp, store) = test_store();

        store
            .create_user(&make_user("u1", "alice@test.edu", Role::Student))
            .unwrap();

        let fetched = store.get_user("u1").unwrap().unwrap();
        assert_eq!(fetched.role, Role::Student);
        assert!(fetched.is_active);

        let by_email = store.get_user_by_email("alice@test.edu").unwrap().unwrap();
        assert_eq!(by_email.id, "u1");

        let dup = store.create_user(&make_user("u2", "alice@test.edu", Role::Student));
        assert!(matches!(dup, Err(Error::AlreadyExists)));
    }

    #[test]
    fn test_has_admin_user_ignores_inactive() {
        let (_temp, store) = test_store();
        assert!(!store.has_admin_user().unwrap());

        let mut admin = make_user("a1", "admin@test.edu", Role::Admin);
        admin.is_active = false;
        store.create_user(&admin).unwrap();
        assert!(!store.has_admin_user().unwrap());

        admin.is_active = true;
        store.update_user(&admin).unwrap();
        assert!(store.has_admin_user().unwrap());
    }

    #[test]
    fn test_membership_gating_query() {
        let (_temp, store) = test_store();
        let team_id = seed_team(&store, "s1");

        store
            .create_user(&make_user("s2", "s2@test.edu", Role::Student))
            .unwrap();

        assert!(!store.is_active_member(team_id, "s2").unwrap());

        store
            .upsert_member(&TeamMember {
                team_id,
                student_id: "s2".to_string(),
                member_role: Some("Developer".to_string()),
                is_active: true,
                joined_at: Utc::now(),
            })
            .unwrap();
        assert!(store.is_active_member(team_id, "s2").unwrap());

        // A deactivated row no longer counts
        store.set_member_active(team_id, "s2", false).unwrap();
        assert!(!store.is_active_member(team_id, "s2").unwrap());
    }

    #[test]
    fn test_sprint_delete_removes_tasks() {
        let (_temp, store) = test_store();
        let team_id = seed_team(&store, "s1");

        let sprint_id = store
            .create_sprint(&Sprint {
                id: 0,
                team_id,
                title: Some("Sprint 1".to_string()),
                start_date: None,
                end_date: None,
                status: SprintStatus::Planned,
                created_at: Utc::now(),
            })
            .unwrap();

        for i in 0..3 {
            store
                .create_task(&Task {
                    id: 0,
                    sprint_id: Some(sprint_id),
                    title: format!("task {i}"),
                    description: None,
                    assignee_id: None,
                    status: TaskStatus::Todo,
                    priority: TaskPriority::Medium,
                    due_date: None,
                    created_at: Utc::now(),
                })
                .unwrap();
        }
        assert_eq!(store.count_sprint_tasks(sprint_id).unwrap(), 3);

        assert!(store.delete_sprint(sprint_id).unwrap());
        assert!(store.get_sprint(sprint_id).unwrap().is_none());

        let conn = store.conn();
        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_sprint_task_counts() {
        let (_temp, store) = test_store();
        let team_id = seed_team(&store, "s1");

        let sprint_id = store
            .create_sprint(&Sprint {
                id: 0,
                team_id,
                title: None,
                start_date: None,
                end_date: None,
                status: SprintStatus::Active,
                created_at: Utc::now(),
            })
            .unwrap();

        let statuses = [
            TaskStatus::Todo,
            TaskStatus::Todo,
            TaskStatus::Doing,
            TaskStatus::Done,
        ];
        for (i, status) in statuses.iter().enumerate() {
            store
                .create_task(&Task {
                    id: 0,
                    sprint_id: Some(sprint_id),
                    title: format!("task {i}"),
                    description: None,
                    assignee_id: None,
                    status: *status,
                    priority: TaskPriority::Low,
                    due_date: None,
                    created_at: Utc::now(),
                })
                .unwrap();
        }

        let counts = store.sprint_task_counts(sprint_id).unwrap();
        assert_eq!(counts.total, 4);
        assert_eq!(counts.todo, 2);
        assert_eq!(counts.doing, 1);
        assert_eq!(counts.done, 1);

        let empty = store.sprint_task_counts(sprint_id + 1).unwrap();
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn test_task_status_filter() {
        let (_temp, store) = test_store();
        let team_id = seed_team(&store, "s1");
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

        for status in [TaskStatus::Todo, TaskStatus::Done] {
            store
                .create_task(&Task {
                    id: 0,
                    sprint_id: Some(sprint_id),
                    title: status.to_string(),
                    description: None,
                    assignee_id: None,
                    status,
                    priority: TaskPriority::Medium,
                    due_date: None,
                    created_at: Utc::now(),
                })
                .unwrap();
        }

        let all = store.list_sprint_tasks(sprint_id, None).unwrap();
        assert_eq!(all.len(), 2);

        let done = store
            .list_sprint_tasks(sprint_id, Some(TaskStatus::Done))
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].status, TaskStatus::Done);
    }
}
