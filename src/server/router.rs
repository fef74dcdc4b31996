use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::auth::JwtKeys;
use crate::store::Store;

use super::{auth, catalog, projects, sprints, tasks, teams, topics, users};

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt: JwtKeys,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, jwt: JwtKeys) -> Self {
        Self { store, jwt }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Users (admin)
        .route("/users", post(users::create_user))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", patch(users::update_user))
        // Departments & classes
        .route("/departments", post(catalog::create_department))
        .route("/departments", get(catalog::list_departments))
        .route("/classes", post(catalog::create_class))
        .route("/classes", get(catalog::list_classes))
        .route("/classes/{id}/teams", get(teams::list_class_teams))
        // Topics
        .route("/topics", post(topics::create_topic))
        .route("/topics", get(topics::list_topics))
        .route("/topics/{id}", get(topics::get_topic))
        .route("/topics/{id}", patch(topics::update_topic))
        // Projects
        .route("/projects", post(projects::create_project))
        .route("/projects", get(projects::list_projects))
        .route("/projects/{id}", get(projects::get_project))
        // Teams
        .route("/teams", post(teams::create_team))
        .route("/teams/{id}", get(teams::get_team))
        .route("/teams/{id}/members", get(teams::list_members))
        .route("/teams/{id}/members", post(teams::add_member))
        .route(
            "/teams/{id}/members/{student_id}",
            delete(teams::remove_member),
        )
        .route("/teams/{id}/sprints", get(sprints::list_team_sprints))
        // Sprints
        .route("/sprints", post(sprints::create_sprint))
        .route("/sprints/{id}", get(sprints::get_sprint))
        .route("/sprints/{id}", patch(sprints::update_sprint))
        .route("/sprints/{id}", delete(sprints::delete_sprint))
        .route("/sprints/{id}/tasks", get(tasks::list_sprint_tasks))
        .route("/sprints/{id}/board", get(tasks::get_task_board))
        .route("/sprints/{id}/statistics", get(tasks::get_sprint_statistics))
        // Tasks
        .route("/tasks", post(tasks::create_task))
        .route("/tasks/{id}", get(tasks::get_task))
        .route("/tasks/{id}", patch(tasks::update_task))
        .route("/tasks/{id}/status", patch(tasks::update_task_status))
        .route("/tasks/{id}", delete(tasks::delete_task))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
