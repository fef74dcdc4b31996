//! # CollabSphere
//!
//! Backend for a project-based learning management system, usable both as a
//! standalone binary and as a library.
//!
//! Students organize into teams inside academic classes, run sprints over a
//! kanban-style task board, and work on projects that lecturers create from
//! approved topics. Every request is authenticated with a JWT bearer token
//! and authorized by a fixed role hierarchy (admin, staff, head of
//! department, lecturer, student) plus team-membership checks.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use collabsphere::auth::JwtKeys;
//! use collabsphere::server::{AppState, create_router};
//! use collabsphere::store::SqliteStore;
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/collabsphere.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     JwtKeys::new(b"change-me", chrono::Duration::hours(12)),
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI entry point. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
