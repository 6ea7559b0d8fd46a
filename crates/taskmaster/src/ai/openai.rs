//! OpenAI Chat Completions backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{TasksError, TasksResult};

use super::http::HttpBackend;
use super::provider::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, TokenUsage};

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const KEY_VAR: &str = "OPENAI_API_KEY";

const DEFAULT_MODEL: &str = "gpt-4o";

const MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4.1", "gpt-4.1-mini", "o3-mini"];

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a AIMessage> for ChatMessage<'a> {
    fn from(message: &'a AIMessage) -> Self {
        let role = match message.role {
            AIRole::System => "system",
            AIRole::User => "user",
            AIRole::Assistant => "assistant",
        };
        Self {
            role,
            content: &message.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct SchemaFormat<'a> {
    name: &'a str,
    schema: &'a serde_json::Value,
    strict: bool,
}

/// `response_format` of a chat request.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat<'a> {
    JsonSchema { json_schema: SchemaFormat<'a> },
    JsonObject,
}

impl<'a> ResponseFormat<'a> {
    /// Structured output when a schema is given, plain JSON mode otherwise.
    fn from_options(options: &'a GenerateOptions) -> Option<Self> {
        if let Some(schema) = &options.response_schema {
            return Some(Self::JsonSchema {
                json_schema: SchemaFormat {
                    name: options.schema_name.as_deref().unwrap_or("response"),
                    schema,
                    strict: false,
                },
            });
        }
        options.json_mode.then_some(Self::JsonObject)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    model: String,
    choices: Vec<Choice>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorDetail,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorReply>(body)
        .ok()
        .map(|reply| reply.error.message)
}

/// GPT models via the OpenAI Chat Completions API.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    http: HttpBackend,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: HttpBackend::new("OpenAI", KEY_VAR, ENDPOINT, Some(api_key.into())),
        }
    }

    /// Key from `OPENAI_API_KEY`; unconfigured when unset.
    pub fn from_env() -> Self {
        Self {
            http: HttpBackend::from_env("OpenAI", KEY_VAR, ENDPOINT),
        }
    }

    /// Full URL of the completions endpoint (Azure, proxies, local servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.http.set_endpoint(url);
        self
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn api_key_env_var(&self) -> &'static str {
        KEY_VAR
    }

    fn is_configured(&self) -> bool {
        self.http.has_key()
    }

    fn supported_models(&self) -> Vec<&str> {
        MODELS.to_vec()
    }

    async fn generate_text(
        &self,
        model: &str,
        messages: &[AIMessage],
        options: &GenerateOptions,
    ) -> TasksResult<AIResponse> {
        let bearer = format!("Bearer {}", self.http.key()?);
        let request = ChatRequest {
            model,
            messages: messages.iter().map(ChatMessage::from).collect(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            response_format: ResponseFormat::from_options(options),
        };

        tracing::info!(model, "Calling OpenAI Chat Completions API");
        let reply: ChatReply = self
            .http
            .post_json(&[("authorization", bearer.as_str())], &request, error_message)
            .await?;

        let message = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| TasksError::model_response("OpenAI reply had no choices"))?;

        if let Some(refusal) = message.refusal {
            return Err(TasksError::model_response(format!(
                "OpenAI refused the request: {refusal}"
            )));
        }
        let text = message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| TasksError::model_response("OpenAI reply contained no text"))?;

        Ok(AIResponse {
            text,
            usage: TokenUsage {
                input_tokens: reply.usage.prompt_tokens,
                output_tokens: reply.usage.completion_tokens,
                total_tokens: reply.usage.total_tokens,
            },
            model: reply.model,
            provider: self.name().to_string(),
        })
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Model used when switching to this provider without naming one.
pub fn default_model() -> &'static str {
    DEFAULT_MODEL
}
