//! Core data structures for task management.

mod config;
mod task;

pub use config::{GlobalConfig, ModelSettings, TaskmasterConfig};
pub use task::{
    format_due_date, parse_due_date, Task, TaskDraft, TaskEffort, TaskStatus,
    MAX_DESCRIPTION_LEN, MAX_TITLE_LEN,
};
