#![cfg(feature = "openai")]

use aiconnect_model::openai::{OpenAIClient, OpenAIConfig};
use aiconnect_model::{GenerationConfig, Llm, LlmRequest, ModelError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 5,
            "total_tokens": 15
        }
    })
}

#[test]
fn test_client_rejects_empty_api_key() {
    let result = OpenAIClient::new(OpenAIConfig::new("", "gpt-4"));
    assert!(matches!(result, Err(ModelError::InvalidConfig(_))));
}

#[test]
fn test_client_name_is_model() {
    let client = OpenAIClient::new(OpenAIConfig::new("sk-test", "gpt-4")).unwrap();
    assert_eq!(client.name(), "gpt-4");
}

#[tokio::test]
async fn test_generate_sends_single_user_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4",
            "messages": [{ "role": "user", "content": "What is 5G?" }],
            "max_tokens": 500
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("  A mobile standard.  ")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        OpenAIClient::compatible("sk-test", mock_server.uri(), "gpt-4").expect("client builds");
    let request = LlmRequest::from_prompt("What is 5G?").with_config(GenerationConfig::default());
    let response = client.generate(request).await.expect("completion succeeds");

    assert_eq!(response.text, "  A mobile standard.  ");
    assert_eq!(response.model.as_deref(), Some("gpt-4"));
}

#[tokio::test]
async fn test_generate_maps_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "message": "context length exceeded",
                "type": "invalid_request_error",
                "param": null,
                "code": null
            }
        })))
        .mount(&mock_server)
        .await;

    let client = OpenAIClient::compatible("sk-test", mock_server.uri(), "gpt-4").unwrap();
    let err = client.generate(LlmRequest::from_prompt("hi")).await.unwrap_err();

    match err {
        ModelError::Api { provider, message } => {
            assert_eq!(provider, "OpenAI");
            assert!(message.contains("context length exceeded"), "unexpected message: {message}");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
