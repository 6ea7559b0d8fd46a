//! Prioritization service.
//!
//! One validated request, one backend call, one validated response. No
//! retries and no caching; failures go straight back to the caller, whose
//! task list is untouched.

use std::sync::Arc;
use std::time::Duration;

use crate::ai::{
    prompts::{SuggestPrioritizationContext, SUGGEST_PRIORITIZATION},
    schemas::{
        response_json_schema, PrioritizationRequest, PrioritizationResponse,
        PrioritizationSuggestion, TaskSummary,
    },
    AIMessage, AIProvider, GenerateOptions, MessageBuilder, PromptManager, ProviderRegistry,
};
use crate::entities::TaskmasterConfig;
use crate::errors::{TasksError, TasksResult};
use crate::storage::Storage;

use super::prioritize::MergeReport;
use super::tasks::TasksDomain;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Asks a model backend for a prioritization reason per task.
///
/// Holds no mutable state, so concurrent calls on one service are independent.
pub struct PrioritizationService {
    provider: Arc<dyn AIProvider>,
    model: String,
    prompts: PromptManager,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl PrioritizationService {
    /// Create a service for a provider and model.
    pub fn new(provider: Arc<dyn AIProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            prompts: PromptManager::default(),
            temperature: None,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build from configuration, resolving the provider from the environment.
    pub fn from_config(config: &TaskmasterConfig) -> TasksResult<Self> {
        let registry = ProviderRegistry::for_settings(&config.model);
        Self::from_registry(&registry, config)
    }

    /// Build from configuration with an explicit registry.
    pub fn from_registry(registry: &ProviderRegistry, config: &TaskmasterConfig) -> TasksResult<Self> {
        let settings = &config.model;
        let provider = registry.require(&settings.provider)?;
        // Proxies and new releases serve models outside the built-in list
        if !provider.supports_model(&settings.model_id) {
            tracing::warn!(
                provider = provider.name(),
                model = %settings.model_id,
                "Model is not in the provider's known list; sending it as given"
            );
        }
        Ok(Self::new(provider, settings.model_id.clone())
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens)
            .with_timeout(Duration::from_secs(config.global.request_timeout_secs)))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Upper bound on the backend call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render the system and user messages for a task list.
    pub fn render_prompt(&self, tasks: &[TaskSummary]) -> TasksResult<Vec<AIMessage>> {
        let context = SuggestPrioritizationContext {
            tasks,
            response_schema: response_json_schema()?,
        };
        let (system, user) = self.prompts.render(SUGGEST_PRIORITIZATION, &context)?;
        tracing::debug!(
            system_len = system.len(),
            user_len = user.len(),
            "Rendered prioritization prompt"
        );
        Ok(MessageBuilder::new().system(system).user(user).build())
    }

    /// Suggest a prioritization reason for each task.
    pub async fn prioritize(
        &self,
        tasks: &[TaskSummary],
    ) -> TasksResult<Vec<PrioritizationSuggestion>> {
        let request = PrioritizationRequest::new(tasks.to_vec());
        let response = self.prioritize_request(&request).await?;
        Ok(response.prioritization_suggestions)
    }

    /// Validate an untyped request body, then prioritize it.
    pub async fn prioritize_value(
        &self,
        body: serde_json::Value,
    ) -> TasksResult<PrioritizationResponse> {
        let request = PrioritizationRequest::from_value(body)?;
        self.prioritize_request(&request).await
    }

    /// Prioritize a typed request.
    pub async fn prioritize_request(
        &self,
        request: &PrioritizationRequest,
    ) -> TasksResult<PrioritizationResponse> {
        request.validate()?;

        let messages = self.render_prompt(&request.tasks)?;
        let options = GenerateOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_mode: true,
            schema_name: Some("task_prioritization".to_string()),
            response_schema: Some(response_json_schema()?),
            ..Default::default()
        };

        tracing::info!(
            provider = self.provider.name(),
            model = %self.model,
            task_count = request.len(),
            "Requesting task prioritization"
        );

        let call = self.provider.generate_text(&self.model, &messages, &options);
        let output = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                TasksError::model_response(format!(
                    "model backend timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(|e| match e {
                TasksError::ModelResponse { .. } => e,
                other => TasksError::model_response(other.to_string()),
            })?;

        tracing::debug!(
            input_tokens = output.usage.input_tokens,
            output_tokens = output.usage.output_tokens,
            "Prioritization response received"
        );

        let response = PrioritizationResponse::from_model_output(&output)?;
        tracing::info!(
            suggestions = response.prioritization_suggestions.len(),
            "Prioritization complete"
        );
        Ok(response)
    }

    /// Prioritize the whole task list and merge the result into it.
    ///
    /// On failure the task list is left as it was.
    pub async fn prioritize_tasks<S: Storage>(
        &self,
        domain: &mut TasksDomain<S>,
    ) -> TasksResult<MergeReport> {
        let (ticket, request) = domain.begin_prioritization();
        let response = self.prioritize_request(&request).await?;
        domain.apply_prioritization(&ticket, &response.prioritization_suggestions)
    }
}
