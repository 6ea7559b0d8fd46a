//! Anthropic Messages API backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{TasksError, TasksResult};

use super::http::HttpBackend;
use super::provider::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, TokenUsage};

const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const KEY_VAR: &str = "ANTHROPIC_API_KEY";

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// The Messages API requires `max_tokens` on every request.
const DEFAULT_MAX_TOKENS: u32 = 4096;

const MODELS: &[&str] = &[
    "claude-opus-4-5-20251101",
    "claude-sonnet-4-5-20250929",
    "claude-opus-4-1-20250805",
    "claude-sonnet-4-20250514",
    "claude-3-5-haiku-20241022",
];

/// Short names accepted in config, with the model each one stands for.
const ALIASES: &[(&str, &str)] = &[
    ("opus", "claude-opus-4-5-20251101"),
    ("sonnet", "claude-sonnet-4-5-20250929"),
    ("haiku", "claude-3-5-haiku-20241022"),
];

fn resolve_model(model: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == model)
        .map_or(model, |(_, full)| *full)
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Turn<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Block {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    model: String,
    content: Vec<Block>,
    #[serde(default)]
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorDetail,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorReply>(body)
        .ok()
        .map(|reply| format!("{} - {}", reply.error.kind, reply.error.message))
}

/// The Messages API takes system text as a top-level field, not a turn.
fn split_system(messages: &[AIMessage]) -> (Option<String>, Vec<Turn<'_>>) {
    let mut system: Vec<&str> = Vec::new();
    let mut turns = Vec::with_capacity(messages.len());

    for message in messages {
        match message.role {
            AIRole::System => system.push(&message.content),
            AIRole::User => turns.push(Turn {
                role: "user",
                content: &message.content,
            }),
            AIRole::Assistant => turns.push(Turn {
                role: "assistant",
                content: &message.content,
            }),
        }
    }

    let system = (!system.is_empty()).then(|| system.join("\n\n"));
    (system, turns)
}

/// Claude via the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    http: HttpBackend,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: HttpBackend::new("Anthropic", KEY_VAR, ENDPOINT, Some(api_key.into())),
        }
    }

    /// Key from `ANTHROPIC_API_KEY`; unconfigured when unset.
    pub fn from_env() -> Self {
        Self {
            http: HttpBackend::from_env("Anthropic", KEY_VAR, ENDPOINT),
        }
    }

    /// Full URL of the messages endpoint, for proxies and tests.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.http.set_endpoint(url);
        self
    }
}

#[async_trait]
impl AIProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn api_key_env_var(&self) -> &'static str {
        KEY_VAR
    }

    fn is_configured(&self) -> bool {
        self.http.has_key()
    }

    fn supported_models(&self) -> Vec<&str> {
        MODELS
            .iter()
            .copied()
            .chain(ALIASES.iter().map(|(alias, _)| *alias))
            .collect()
    }

    async fn generate_text(
        &self,
        model: &str,
        messages: &[AIMessage],
        options: &GenerateOptions,
    ) -> TasksResult<AIResponse> {
        let key = self.http.key()?;
        let (system, turns) = split_system(messages);
        let request = MessagesRequest {
            model: resolve_model(model),
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            messages: turns,
            temperature: options.temperature,
        };

        tracing::info!(model = request.model, "Calling Anthropic Messages API");
        let reply: MessagesReply = self
            .http
            .post_json(
                &[("x-api-key", key), ("anthropic-version", API_VERSION)],
                &request,
                error_message,
            )
            .await?;

        if reply.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(model = %reply.model, "Reply was cut off at max_tokens");
        }

        let text: String = reply
            .content
            .into_iter()
            .filter_map(|block| match block {
                Block::Text { text } => Some(text),
                Block::Other => None,
            })
            .collect();
        if text.trim().is_empty() {
            return Err(TasksError::model_response("Anthropic reply contained no text"));
        }

        Ok(AIResponse {
            text,
            usage: TokenUsage {
                input_tokens: reply.usage.input_tokens,
                output_tokens: reply.usage.output_tokens,
                total_tokens: reply.usage.input_tokens + reply.usage.output_tokens,
            },
            model: reply.model,
            provider: self.name().to_string(),
        })
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Model used when the config names none.
pub fn default_model() -> &'static str {
    DEFAULT_MODEL
}
