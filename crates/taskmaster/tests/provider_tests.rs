//! Integration tests for the HTTP model backends.
//!
//! Each test stands up a local mock server in place of the vendor API.

use serde_json::{json, Value};
use taskmaster::ai::anthropic::AnthropicProvider;
use taskmaster::ai::openai::OpenAIProvider;
use taskmaster::{AIMessage, AIProvider, GenerateOptions, TasksError};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn messages() -> Vec<AIMessage> {
    vec![
        AIMessage::system("You are a helpful assistant."),
        AIMessage::user("Prioritize these tasks."),
    ]
}

fn anthropic_body(text: &str) -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-20250514",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 120, "output_tokens": 30 }
    })
}

fn openai_body(content: Value) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120 }
    })
}

mod anthropic {
    use super::*;

    fn provider(server: &MockServer) -> AnthropicProvider {
        AnthropicProvider::new("test-key").with_base_url(format!("{}/v1/messages", server.uri()))
    }

    #[tokio::test]
    async fn test_sends_system_separately_and_reads_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({
                "model": "claude-sonnet-4-20250514",
                "system": "You are a helpful assistant.",
                "messages": [{ "role": "user", "content": "Prioritize these tasks." }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_body("{\"ok\":true}")))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server)
            .generate_text("claude-sonnet-4-20250514", &messages(), &GenerateOptions::default())
            .await;
        let response = assert_ok!(response);

        assert_eq!(response.text, "{\"ok\":true}");
        assert_eq!(response.provider, "anthropic");
        assert_eq!(response.usage.total_tokens, 150);
    }

    #[tokio::test]
    async fn test_short_model_name_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "model": "claude-3-5-haiku-20241022" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_body("hi")))
            .expect(1)
            .mount(&server)
            .await;

        let result = provider(&server)
            .generate_text("haiku", &messages(), &GenerateOptions::default())
            .await;
        assert_ok!(result);
    }

    #[tokio::test]
    async fn test_api_error_body_becomes_model_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_json(json!({
                "type": "error",
                "error": { "type": "overloaded_error", "message": "Overloaded" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_text("sonnet", &messages(), &GenerateOptions::default())
            .await
            .unwrap_err();

        match err {
            TasksError::ModelResponse { reason } => {
                assert!(reason.contains("overloaded_error"));
                assert!(reason.contains("Overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_model_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = provider(&server)
            .generate_text("sonnet", &messages(), &GenerateOptions::default())
            .await;
        assert!(matches!(
            assert_err!(result),
            TasksError::ModelResponse { .. }
        ));
    }
}

mod openai {
    use super::*;

    fn provider(server: &MockServer) -> OpenAIProvider {
        OpenAIProvider::new("test-key")
            .with_base_url(format!("{}/v1/chat/completions", server.uri()))
    }

    #[tokio::test]
    async fn test_sends_bearer_and_schema_response_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "task_prioritization", "strict": false }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_body(json!("{}"))))
            .expect(1)
            .mount(&server)
            .await;

        let options = GenerateOptions {
            json_mode: true,
            schema_name: Some("task_prioritization".to_string()),
            response_schema: Some(json!({ "type": "object" })),
            ..Default::default()
        };
        let response = provider(&server)
            .generate_text("gpt-4o", &messages(), &options)
            .await;
        let response = assert_ok!(response);

        assert_eq!(response.text, "{}");
        assert_eq!(response.provider, "openai");
        assert_eq!(response.usage.total_tokens, 120);
    }

    #[tokio::test]
    async fn test_error_body_becomes_model_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate_text("gpt-4o", &messages(), &GenerateOptions::default())
            .await
            .unwrap_err();
        match err {
            TasksError::ModelResponse { reason } => {
                assert!(reason.contains("401"));
                assert!(reason.contains("Incorrect API key provided"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_choices_is_model_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o",
                "choices": [],
                "usage": { "prompt_tokens": 1, "completion_tokens": 0, "total_tokens": 1 }
            })))
            .mount(&server)
            .await;

        let result = provider(&server)
            .generate_text("gpt-4o", &messages(), &GenerateOptions::default())
            .await;
        assert!(matches!(
            assert_err!(result),
            TasksError::ModelResponse { .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_never_reaches_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        // Only meaningful when OPENAI_API_KEY is unset
        let provider = OpenAIProvider::from_env()
            .with_base_url(format!("{}/v1/chat/completions", server.uri()));
        if provider.is_configured() {
            return;
        }

        let result = provider
            .generate_text("gpt-4o", &messages(), &GenerateOptions::default())
            .await;
        assert!(matches!(
            assert_err!(result),
            TasksError::ProviderNotConfigured { .. }
        ));
    }
}
