//! Prompt template system for AI operations.
//!
//! This module provides:
//! - Handlebars-based prompt templates
//! - The task prioritization template
//! - Dynamic template rendering with context

use handlebars::Handlebars;
use serde::Serialize;
use std::collections::HashMap;

use crate::errors::{TasksError, TasksResult};

mod suggest_prioritization;

pub use suggest_prioritization::{SuggestPrioritizationContext, TEMPLATE_ID as SUGGEST_PRIORITIZATION};

/// A prompt template with system and user messages.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Template ID
    pub id: String,
    /// System prompt template
    pub system: String,
    /// User prompt template
    pub user: String,
}

impl PromptTemplate {
    /// Create a new prompt template.
    pub fn new(id: impl Into<String>, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            system: system.into(),
            user: user.into(),
        }
    }

    /// Render the template with the given context.
    pub fn render<T: Serialize>(&self, context: &T) -> TasksResult<(String, String)> {
        let mut handlebars = create_handlebars();

        handlebars
            .register_template_string("system", &self.system)
            .map_err(|e| TasksError::Template {
                reason: format!("invalid system template '{}': {e}", self.id),
            })?;

        handlebars
            .register_template_string("user", &self.user)
            .map_err(|e| TasksError::Template {
                reason: format!("invalid user template '{}': {e}", self.id),
            })?;

        let system = handlebars
            .render("system", context)
            .map_err(|e| TasksError::Template {
                reason: format!("failed to render system prompt: {e}"),
            })?;

        let user = handlebars
            .render("user", context)
            .map_err(|e| TasksError::Template {
                reason: format!("failed to render user prompt: {e}"),
            })?;

        Ok((system, user))
    }
}

/// Create a Handlebars instance with custom helpers.
fn create_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    // Helper: {{{json value}}}
    handlebars.register_helper(
        "json",
        Box::new(
            |h: &handlebars::Helper,
             _: &Handlebars,
             _: &handlebars::Context,
             _: &mut handlebars::RenderContext,
             out: &mut dyn handlebars::Output| {
                if let Some(param) = h.param(0) {
                    let json = serde_json::to_string_pretty(param.value())
                        .unwrap_or_else(|_| "null".to_string());
                    out.write(&json)?;
                }
                Ok(())
            },
        ),
    );

    handlebars
}

/// Prompt manager for loading and rendering templates.
pub struct PromptManager {
    templates: HashMap<String, PromptTemplate>,
}

impl PromptManager {
    /// Create a new prompt manager with default templates.
    pub fn new() -> Self {
        let mut manager = Self {
            templates: HashMap::new(),
        };
        manager.register(suggest_prioritization::template());
        manager
    }

    /// Register a template, replacing any with the same ID.
    pub fn register(&mut self, template: PromptTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn get(&self, id: &str) -> Option<&PromptTemplate> {
        self.templates.get(id)
    }

    /// Render a template with context.
    pub fn render<T: Serialize>(&self, id: &str, context: &T) -> TasksResult<(String, String)> {
        let template = self.get(id).ok_or_else(|| TasksError::Template {
            reason: format!("template '{id}' not found"),
        })?;
        template.render(context)
    }
}

impl Default for PromptManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_rendering() {
        let template = PromptTemplate::new(
            "test",
            "You are a {{role}}",
            "{{#if verbose}}Verbose: {{/if}}{{prompt}}",
        );

        let context = json!({
            "role": "helpful assistant",
            "verbose": true,
            "prompt": "Hello world"
        });

        let (system, user) = template.render(&context).unwrap();

        assert_eq!(system, "You are a helpful assistant");
        assert_eq!(user, "Verbose: Hello world");
    }

    #[test]
    fn test_json_helper() {
        let template = PromptTemplate::new("test", "System", "Tasks: {{{json tasks}}}");

        let context = json!({
            "tasks": [
                {"title": "Task 1"},
                {"title": "Task 2"}
            ]
        });

        let (_, user) = template.render(&context).unwrap();

        assert!(user.contains("\"title\": \"Task 1\""));
    }

    #[test]
    fn test_invalid_template() {
        let template = PromptTemplate::new("broken", "{{#if}}", "ok");
        let err = template.render(&json!({})).unwrap_err();
        assert!(matches!(err, TasksError::Template { .. }));
    }

    #[test]
    fn test_prompt_manager() {
        let manager = PromptManager::new();
        assert!(manager.get(SUGGEST_PRIORITIZATION).is_some());
        assert!(manager.render("missing", &json!({})).is_err());
    }
}
