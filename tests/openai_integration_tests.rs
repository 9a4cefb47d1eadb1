//! OpenAI client and embedder tests against a mocked OpenAI-compatible API.

#![cfg(feature = "openai")]

use prashna::llm::LLMClient;
use prashna::llm::openai::OpenAIClient;
use prashna::rag::embeddings::{Embedder, OpenAIEmbedder};
use prashna::types::AppError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
    })
}

fn client_for(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new(
        "sk-test".to_string(),
        server.uri(),
        "gpt-3.5-turbo".to_string(),
        0.0,
    )
}

#[tokio::test]
async fn test_generate_with_system_returns_first_choice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "Answer from context"},
                {"role": "user", "content": "Capital of France?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion("Paris")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = client_for(&mock_server)
        .generate_with_system("Answer from context", "Capital of France?")
        .await
        .unwrap();

    assert_eq!(text, "Paris");
}

#[tokio::test]
async fn test_empty_choices_is_service_error() {
    let mock_server = MockServer::start().await;

    let mut body = mock_completion("");
    body["choices"] = json!([]);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).generate("Hello").await.unwrap_err();
    assert!(matches!(err, AppError::Service(_)));
}

#[tokio::test]
async fn test_rejected_request_is_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).generate("Hello").await.unwrap_err();
    assert!(matches!(err, AppError::Service(_)));
    assert!(err.to_string().contains("Incorrect API key"));
}

#[tokio::test]
async fn test_embeddings_are_returned_in_input_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(json!({
            "model": "text-embedding-ada-002",
            "input": ["first", "second"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "model": "text-embedding-ada-002",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ],
            "usage": {"prompt_tokens": 2, "total_tokens": 2}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let embedder = OpenAIEmbedder::new(
        "sk-test".to_string(),
        mock_server.uri(),
        "text-embedding-ada-002".to_string(),
    );
    let vectors = embedder
        .embed_batch(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}
