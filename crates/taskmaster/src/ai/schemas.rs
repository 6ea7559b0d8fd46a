//! Request and response schemas for task prioritization.
//!
//! Wire shapes:
//! - request: `{ "tasks": [ { "title", "description"?, "dueDate"?, "estimatedEffort"? } ] }`
//! - response: `{ "prioritizationSuggestions": [ { "taskId", "reason" } ] }`
//!
//! Both sides are plain serde types with an explicit `validate()`. The
//! response JSON Schema handed to the backend is derived from the same types.

use std::fmt;

use schemars::JsonSchema;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::provider::{parse_ai_response, AIResponse};
use crate::entities::{format_due_date, parse_due_date, Task, TaskEffort};
use crate::errors::{TasksError, TasksResult};

/// One task as presented to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// The title of the task.
    pub title: String,

    /// A description of the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The due date of the task in ISO format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    /// The estimated effort to complete the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_effort: Option<TaskEffort>,
}

impl TaskSummary {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            estimated_effort: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_effort(mut self, effort: TaskEffort) -> Self {
        self.estimated_effort = Some(effort);
        self
    }

    fn validate(&self, index: usize) -> TasksResult<()> {
        if self.title.trim().is_empty() {
            return Err(TasksError::validation(format!(
                "tasks[{index}].title must not be empty"
            )));
        }
        if let Some(due) = &self.due_date {
            parse_due_date(due).map_err(|_| {
                TasksError::validation(format!(
                    "tasks[{index}].dueDate '{due}' is not an ISO-8601 date"
                ))
            })?;
        }
        Ok(())
    }
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.as_ref().map(format_due_date),
            estimated_effort: task.estimated_effort,
        }
    }
}

/// Ordered list of tasks to prioritize. Suggestions refer back by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrioritizationRequest {
    /// A list of tasks to prioritize.
    pub tasks: Vec<TaskSummary>,
}

impl PrioritizationRequest {
    pub fn new(tasks: Vec<TaskSummary>) -> Self {
        Self { tasks }
    }

    /// Parse and validate an untyped request body.
    pub fn from_value(value: serde_json::Value) -> TasksResult<Self> {
        let request: Self = serde_json::from_value(value)
            .map_err(|e| TasksError::validation(format!("malformed request: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    /// Check every task against the request schema.
    pub fn validate(&self) -> TasksResult<()> {
        self.tasks
            .iter()
            .enumerate()
            .try_for_each(|(i, task)| task.validate(i))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A model-generated reason attached to one task by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrioritizationSuggestion {
    /// The index of the task in the input array.
    #[serde(
        rename = "taskId",
        alias = "taskIndex",
        deserialize_with = "deserialize_task_index"
    )]
    pub task_index: i64,

    /// The reason for the task prioritization suggestion.
    pub reason: String,
}

impl PrioritizationSuggestion {
    pub fn new(task_index: i64, reason: impl Into<String>) -> Self {
        Self {
            task_index,
            reason: reason.into(),
        }
    }

    /// The index as a position into a list of `len` tasks, if it is one.
    pub fn position(&self, len: usize) -> Option<usize> {
        usize::try_from(self.task_index).ok().filter(|i| *i < len)
    }
}

/// Index value for a number that can never be a position.
const NOT_AN_INDEX: i64 = i64::MIN;

/// Accepts any JSON number as a task index.
///
/// Integers beyond `i64` saturate and integral floats (`1.0`) keep their
/// value. A fractional float becomes [`NOT_AN_INDEX`]. All of these fail
/// [`PrioritizationSuggestion::position`] unless they name a real task.
fn deserialize_task_index<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct IndexVisitor;

    impl Visitor<'_> for IndexVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a task index number")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
            Ok(i64::try_from(value).unwrap_or(i64::MAX))
        }

        #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
        fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
            if value.fract() == 0.0 {
                // `as` saturates at the i64 bounds
                Ok(value as i64)
            } else {
                Ok(NOT_AN_INDEX)
            }
        }
    }

    deserializer.deserialize_any(IndexVisitor)
}

/// Suggestions returned by the model, in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationResponse {
    /// A list of prioritization suggestions for the tasks.
    pub prioritization_suggestions: Vec<PrioritizationSuggestion>,
}

impl PrioritizationResponse {
    pub fn new(prioritization_suggestions: Vec<PrioritizationSuggestion>) -> Self {
        Self {
            prioritization_suggestions,
        }
    }

    /// Parse and validate raw model output.
    pub fn from_model_output(response: &AIResponse) -> TasksResult<Self> {
        let parsed: Self = parse_ai_response(response)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reasons must be non-empty. Indices are checked at merge time.
    pub fn validate(&self) -> TasksResult<()> {
        for (i, suggestion) in self.prioritization_suggestions.iter().enumerate() {
            if suggestion.reason.trim().is_empty() {
                return Err(TasksError::model_response(format!(
                    "prioritizationSuggestions[{i}].reason is empty"
                )));
            }
        }
        Ok(())
    }
}

/// JSON Schema for [`PrioritizationResponse`], as sent to the backend.
pub fn response_json_schema() -> TasksResult<serde_json::Value> {
    let schema = schemars::schema_for!(PrioritizationResponse);
    Ok(serde_json::to_value(schema)?)
}
