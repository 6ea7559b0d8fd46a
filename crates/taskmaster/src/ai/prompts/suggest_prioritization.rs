//! Suggest task prioritization prompt template.
//!
//! Enumerates every task with its zero-based index. Absent optional fields
//! are left out of the listing rather than rendered as placeholders.

use serde::Serialize;

use super::PromptTemplate;
use crate::ai::schemas::TaskSummary;

/// Template ID
pub const TEMPLATE_ID: &str = "suggest-task-prioritization";

/// Context for the suggest-task-prioritization prompt.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestPrioritizationContext<'a> {
    /// Tasks in request order
    pub tasks: &'a [TaskSummary],
    /// JSON Schema the answer must follow
    pub response_schema: serde_json::Value,
}

/// Get the suggest-task-prioritization template.
pub fn template() -> PromptTemplate {
    PromptTemplate::new(TEMPLATE_ID, SYSTEM_PROMPT, USER_PROMPT)
}

const SYSTEM_PROMPT: &str = r#"You are an AI assistant designed to provide intelligent suggestions for prioritizing a list of tasks. Consider the due date and estimated effort of each task.

For each task, provide the index of the task in the list you were given (the "Task Index", starting at 0) as "taskId", and a short reason why that task should be prioritized the way you suggest as "reason".

Respond with a single JSON object that conforms to this JSON Schema, with no surrounding prose:
{{{json response_schema}}}"#;

const USER_PROMPT: &str = r#"{{#if tasks}}Tasks:
{{#each tasks}}

Task Index: {{@index}}
Title: {{title}}
{{#if description}}Description: {{description}}
{{/if}}{{#if dueDate}}Due Date: {{dueDate}}
{{/if}}{{#if estimatedEffort}}Estimated Effort: {{estimatedEffort}}
{{/if}}{{/each}}{{else}}There are no tasks to prioritize. Return an empty "prioritizationSuggestions" array.{{/if}}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TaskEffort;
    use serde_json::json;

    fn render(tasks: &[TaskSummary]) -> (String, String) {
        let context = SuggestPrioritizationContext {
            tasks,
            response_schema: json!({"type": "object"}),
        };
        template().render(&context).unwrap()
    }

    #[test]
    fn test_enumerates_tasks_with_index() {
        let tasks = vec![
            TaskSummary::new("A").with_due_date("2024-01-01"),
            TaskSummary::new("B")
                .with_description("second")
                .with_effort(TaskEffort::High),
        ];
        let (system, user) = render(&tasks);

        assert!(system.contains("\"type\": \"object\""));
        assert!(user.contains("Task Index: 0\nTitle: A"));
        assert!(user.contains("Due Date: 2024-01-01"));
        assert!(user.contains("Task Index: 1\nTitle: B"));
        assert!(user.contains("Description: second"));
        assert!(user.contains("Estimated Effort: high"));
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let (_, user) = render(&[TaskSummary::new("Only a title")]);

        assert!(user.contains("Title: Only a title"));
        assert!(!user.contains("Description:"));
        assert!(!user.contains("Due Date:"));
        assert!(!user.contains("Estimated Effort:"));
        assert!(!user.contains("undefined"));
        assert!(!user.contains("null"));
    }

    #[test]
    fn test_empty_task_list() {
        let (_, user) = render(&[]);

        assert!(user.contains("There are no tasks to prioritize"));
        assert!(!user.contains("Task Index"));
    }

    #[test]
    fn test_no_html_escaping() {
        let (_, user) = render(&[TaskSummary::new("Fix <div> & \"quotes\"")]);
        assert!(user.contains("Title: Fix <div> & \"quotes\""));
    }
}
