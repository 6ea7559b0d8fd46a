//! Domain facades for task management.
//!
//! These facades combine storage operations with the prioritization
//! exchange.

mod ai;
mod prioritize;
mod tasks;

pub use ai::PrioritizationService;
pub use prioritize::{apply_suggestions, MergeReport, PrioritizationTicket};
pub use tasks::{StatusFilter, TaskFilter, TasksDomain};
