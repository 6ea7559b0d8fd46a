//! In-memory storage implementation.
//!
//! Tasks live for the lifetime of the session and are never written out.

use super::traits::Storage;
use crate::entities::Task;
use crate::errors::{TasksError, TasksResult};

/// Session-scoped task list, newest first.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tasks: Vec<Task>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build storage from tasks already in display order.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    fn position(&self, task_id: &str) -> TasksResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| TasksError::TaskNotFound {
                task_id: task_id.to_string(),
            })
    }
}

impl Storage for MemoryStorage {
    fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    fn add_task(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    fn update_task(&mut self, task_id: &str, task: Task) -> TasksResult<()> {
        let idx = self.position(task_id)?;
        self.tasks[idx] = task;
        Ok(())
    }

    fn delete_task(&mut self, task_id: &str) -> TasksResult<Task> {
        let idx = self.position(task_id)?;
        Ok(self.tasks.remove(idx))
    }
}
