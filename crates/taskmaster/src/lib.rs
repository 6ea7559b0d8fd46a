#![warn(clippy::pedantic)]
// Allow common pedantic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

//! # Taskmaster
//!
//! A session-scoped personal task manager with model-backed prioritization.
//!
//! This crate provides:
//! - Task create/edit/delete/toggle, filtering and search over an in-memory list
//! - The prioritization exchange: request/response schemas, prompt rendering,
//!   backend call and validation
//! - Merging suggestions back into the task list, with stale-result detection
//! - Anthropic and OpenAI backends behind one provider trait
//!
//! ## Example
//!
//! ```rust,ignore
//! use taskmaster::{PrioritizationService, TaskDraft, TasksDomain, TaskmasterConfig};
//!
//! let mut tasks = TasksDomain::in_memory();
//! tasks.add_task(TaskDraft::new("Ship release"))?;
//!
//! let service = PrioritizationService::from_config(&TaskmasterConfig::default())?;
//! let report = service.prioritize_tasks(&mut tasks).await?;
//! ```

// Core entities
pub mod entities;

// Error types
pub mod errors;

// Storage layer
pub mod storage;

// Domain facades
pub mod domain;

// Terminal UI helpers
pub mod ui;

// AI integration
pub mod ai;

// Re-export key types for convenience
pub use entities::{
    GlobalConfig, ModelSettings, Task, TaskDraft, TaskEffort, TaskStatus, TaskmasterConfig,
};
pub use errors::{TasksError, TasksResult};
pub use storage::{MemoryStorage, Storage};

pub use domain::{
    apply_suggestions, MergeReport, PrioritizationService, PrioritizationTicket, StatusFilter,
    TaskFilter, TasksDomain,
};

// Re-export AI types
pub use ai::{
    AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, PrioritizationRequest,
    PrioritizationResponse, PrioritizationSuggestion, PromptManager, PromptTemplate,
    ProviderRegistry, TaskSummary, TokenUsage,
};
