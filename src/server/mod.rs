pub mod access;
mod auth;
mod catalog;
pub mod dto;
mod projects;
pub mod response;
mod router;
mod sprints;
mod tasks;
mod teams;
mod topics;
mod users;

pub use router::{AppState, create_router};
