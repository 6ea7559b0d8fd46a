//! Storage trait definitions.

use crate::entities::Task;
use crate::errors::TasksResult;

/// Ordered task collection owned by the caller.
///
/// Order is significant: prioritization suggestions refer to tasks by their
/// position in an enumeration snapshot.
pub trait Storage: Send {
    /// All tasks, in display order
    fn tasks(&self) -> &[Task];

    /// Load a single task by ID
    fn task(&self, task_id: &str) -> Option<&Task>;

    /// Mutable access to a single task by ID
    fn task_mut(&mut self, task_id: &str) -> Option<&mut Task>;

    /// Insert a task at the front of the list
    fn add_task(&mut self, task: Task);

    /// Replace a task by ID
    fn update_task(&mut self, task_id: &str, task: Task) -> TasksResult<()>;

    /// Remove a task by ID, returning it
    fn delete_task(&mut self, task_id: &str) -> TasksResult<Task>;
}
