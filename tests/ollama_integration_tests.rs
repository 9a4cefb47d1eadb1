//! Ollama client and embedder tests against a mocked Ollama server.
//!
//! These tests use wiremock to stand in for the Ollama API and validate:
//! - Chat requests for answering (system + user) and translation (user only)
//! - Batch embedding through `/api/embed`
//! - Error mapping to service errors

#![cfg(feature = "ollama")]

use prashna::llm::LLMClient;
use prashna::llm::ollama::OllamaClient;
use prashna::rag::embeddings::{Embedder, OllamaEmbedder};
use prashna::types::AppError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

/// Create a mock Ollama chat completion response
fn mock_chat_response(content: &str) -> serde_json::Value {
    json!({
        "model": "llama3.2",
        "created_at": "2024-01-01T00:00:00Z",
        "message": {
            "role": "assistant",
            "content": content
        },
        "done": true
    })
}

async fn client_for(server: &MockServer) -> OllamaClient {
    OllamaClient::new(server.uri(), "llama3.2".to_string())
        .await
        .unwrap()
}

// ============= Chat Tests =============

#[tokio::test]
async fn test_generate_sends_single_user_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2",
            "messages": [{"role": "user", "content": "Translate this"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_chat_response("पॅरिस")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let text = client.generate("Translate this").await.unwrap();

    assert_eq!(text, "पॅरिस");
    assert_eq!(client.model_name(), "llama3.2");
}

#[tokio::test]
async fn test_generate_with_system_sends_both_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": "Answer from context"},
                {"role": "user", "content": "Capital of France?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_chat_response("Paris")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let text = client
        .generate_with_system("Answer from context", "Capital of France?")
        .await
        .unwrap();

    assert_eq!(text, "Paris");
}

#[tokio::test]
async fn test_chat_server_error_is_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.generate("Hello").await.unwrap_err();

    assert!(matches!(err, AppError::Service(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_server_is_service_error() {
    // Nothing listens on the discard port
    let client = OllamaClient::new("http://127.0.0.1:9".to_string(), "llama3.2".to_string())
        .await
        .unwrap();

    let err = client.generate("Hello").await.unwrap_err();
    assert!(matches!(err, AppError::Service(_)));
}

// ============= Embedding Tests =============

#[tokio::test]
async fn test_embed_batch_returns_one_vector_per_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({
            "model": "nomic-embed-text",
            "input": ["first chunk", "second chunk"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "nomic-embed-text",
            "embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let embedder = OllamaEmbedder::new(&mock_server.uri(), "nomic-embed-text".to_string());
    let vectors = embedder
        .embed_batch(&["first chunk".to_string(), "second chunk".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]);
    assert_eq!(embedder.model_name(), "nomic-embed-text");
}

#[tokio::test]
async fn test_embed_batch_count_mismatch_is_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "nomic-embed-text",
            "embeddings": [[0.1, 0.2, 0.3]]
        })))
        .mount(&mock_server)
        .await;

    let embedder = OllamaEmbedder::new(&mock_server.uri(), "nomic-embed-text".to_string());
    let result = embedder
        .embed_batch(&["one".to_string(), "two".to_string()])
        .await;

    assert!(matches!(result, Err(AppError::Service(_))));
}

#[tokio::test]
async fn test_embed_empty_batch_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let embedder = OllamaEmbedder::new(&mock_server.uri(), "nomic-embed-text".to_string());
    assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
}
