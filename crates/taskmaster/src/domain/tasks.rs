//! Tasks domain facade.

use crate::ai::schemas::{PrioritizationRequest, PrioritizationSuggestion, TaskSummary};
use crate::entities::{Task, TaskDraft, TaskStatus};
use crate::errors::{TasksError, TasksResult};
use crate::storage::{MemoryStorage, Storage};

use super::prioritize::{merge_suggestions, MergeReport, PrioritizationTicket};

/// Status filter for listing tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(s) => s == status,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = TasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Filter applied by [`TasksDomain::list_tasks`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task.status)
            && self
                .search
                .as_deref()
                .map_or(true, |term| term.is_empty() || task.matches_search(term))
    }
}

/// Tasks domain facade providing high-level task operations.
///
/// Owns the session's storage. Prioritization results are written back
/// through [`begin_prioritization`](Self::begin_prioritization) /
/// [`apply_prioritization`](Self::apply_prioritization).
pub struct TasksDomain<S: Storage = MemoryStorage> {
    storage: S,
    /// Sequence number of the latest issued prioritization ticket
    latest_ticket: u64,
}

impl TasksDomain<MemoryStorage> {
    /// Create an empty in-memory session.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }
}

impl<S: Storage> TasksDomain<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            latest_ticket: 0,
        }
    }

    /// All tasks, newest first.
    pub fn tasks(&self) -> &[Task] {
        self.storage.tasks()
    }

    /// Get a specific task by ID
    pub fn get_task(&self, task_id: &str) -> TasksResult<&Task> {
        self.storage
            .task(task_id)
            .ok_or_else(|| TasksError::TaskNotFound {
                task_id: task_id.to_string(),
            })
    }

    /// List tasks matching a filter, in display order.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.storage
            .tasks()
            .iter()
            .filter(|t| filter.matches(t))
            .collect()
    }

    /// Add a new task from a form draft.
    pub fn add_task(&mut self, draft: TaskDraft) -> TasksResult<Task> {
        let task = Task::from_draft(draft)?;
        tracing::debug!(task_id = %task.id, "Adding task");
        self.storage.add_task(task.clone());
        Ok(task)
    }

    /// Update a task's editable fields.
    pub fn update_task(&mut self, task_id: &str, draft: TaskDraft) -> TasksResult<Task> {
        let mut task = self.get_task(task_id)?.clone();
        task.apply_draft(draft)?;
        self.storage.update_task(task_id, task.clone())?;
        Ok(task)
    }

    /// Remove a task
    pub fn delete_task(&mut self, task_id: &str) -> TasksResult<Task> {
        tracing::debug!(task_id, "Deleting task");
        self.storage.delete_task(task_id)
    }

    /// Flip a task between pending and completed, returning the new status.
    pub fn toggle_status(&mut self, task_id: &str) -> TasksResult<TaskStatus> {
        let task = self
            .storage
            .task_mut(task_id)
            .ok_or_else(|| TasksError::TaskNotFound {
                task_id: task_id.to_string(),
            })?;
        task.toggle_status();
        Ok(task.status)
    }

    /// Snapshot of every task in the shape sent to the model.
    pub fn summaries(&self) -> Vec<TaskSummary> {
        self.storage.tasks().iter().map(TaskSummary::from).collect()
    }

    /// Snapshot the task list for a prioritization call.
    ///
    /// Issuing a ticket makes every earlier ticket stale.
    pub fn begin_prioritization(&mut self) -> (PrioritizationTicket, PrioritizationRequest) {
        self.latest_ticket += 1;
        let ids = self.storage.tasks().iter().map(|t| t.id.clone()).collect();
        let ticket = PrioritizationTicket::new(self.latest_ticket, ids);
        (ticket, PrioritizationRequest::new(self.summaries()))
    }

    /// Write suggestions back by task id.
    ///
    /// A stale ticket changes nothing and returns `StaleResult`. Indices out
    /// of range for the snapshot, or naming a task deleted since, are dropped.
    pub fn apply_prioritization(
        &mut self,
        ticket: &PrioritizationTicket,
        suggestions: &[PrioritizationSuggestion],
    ) -> TasksResult<MergeReport> {
        if ticket.sequence() < self.latest_ticket {
            tracing::warn!(
                sequence = ticket.sequence(),
                latest = self.latest_ticket,
                "Discarding stale prioritization result"
            );
            return Err(TasksError::StaleResult {
                sequence: ticket.sequence(),
                latest: self.latest_ticket,
            });
        }

        let ids = ticket.task_ids();
        let storage = &mut self.storage;
        let report = merge_suggestions(ids.len(), suggestions, |i, reason| {
            let Some(task) = storage.task_mut(&ids[i]) else {
                return false;
            };
            task.prioritization_reason = Some(reason.to_string());
            true
        });

        tracing::info!(
            applied = report.applied.len(),
            dropped = report.dropped.len(),
            "Applied prioritization suggestions"
        );
        Ok(report)
    }
}

impl Default for TasksDomain<MemoryStorage> {
    fn default() -> Self {
        Self::in_memory()
    }
}
