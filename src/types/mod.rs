mod models;
mod role;
mod status;

pub use models::*;
pub use role::Role;
pub use status::{ProjectStatus, SprintStatus, TaskPriority, TaskStatus, TopicStatus};
