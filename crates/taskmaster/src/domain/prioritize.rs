//! Merging prioritization suggestions back into tasks.
//!
//! Suggestions come from a model and are not trusted: an index that does not
//! name a task is dropped, never an error. Suggestions apply in response
//! order, so a later duplicate overwrites an earlier one.

use crate::ai::schemas::PrioritizationSuggestion;
use crate::entities::Task;

/// Outcome of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Positions that received a reason, in application order
    pub applied: Vec<usize>,
    /// Indices that did not name a task
    pub dropped: Vec<i64>,
}

impl MergeReport {
    /// True when every suggestion named a task.
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Handle for one in-flight prioritization request.
///
/// Records the task ids in the order they were sent, so suggestions can be
/// written back by id even if the list changed while the request was out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritizationTicket {
    sequence: u64,
    task_ids: Vec<String>,
}

impl PrioritizationTicket {
    pub(crate) fn new(sequence: u64, task_ids: Vec<String>) -> Self {
        Self { sequence, task_ids }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Task ids in request order.
    pub fn task_ids(&self) -> &[String] {
        &self.task_ids
    }
}

/// Walk suggestions against a list of `len` tasks.
///
/// `apply` receives each in-range position with its reason and returns
/// false when no task is there any more. Out-of-range and unmatched
/// suggestions are logged and reported as dropped.
pub(crate) fn merge_suggestions<F>(
    len: usize,
    suggestions: &[PrioritizationSuggestion],
    mut apply: F,
) -> MergeReport
where
    F: FnMut(usize, &str) -> bool,
{
    let mut report = MergeReport::default();

    for suggestion in suggestions {
        match suggestion.position(len) {
            Some(i) if apply(i, &suggestion.reason) => report.applied.push(i),
            _ => {
                tracing::warn!(
                    task_index = suggestion.task_index,
                    task_count = len,
                    "Dropping prioritization suggestion with no matching task"
                );
                report.dropped.push(suggestion.task_index);
            }
        }
    }

    report
}

/// Apply suggestions to a task list by position.
pub fn apply_suggestions(tasks: &mut [Task], suggestions: &[PrioritizationSuggestion]) -> MergeReport {
    merge_suggestions(tasks.len(), suggestions, |i, reason| {
        tasks[i].prioritization_reason = Some(reason.to_string());
        true
    })
}
