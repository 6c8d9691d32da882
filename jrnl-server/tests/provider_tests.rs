//! Provider backend tests against local mock HTTP servers

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use jrnl_common::AnalysisResult;
use jrnl_server::analysis::EMPTY_INSIGHT;
use jrnl_server::llm::{ChatPrompt, LlmProvider, OllamaProvider, OpenAiProvider, ProviderError};
use jrnl_server::JournalAnalyzer;
use serde_json::{json, Value};
use std::sync::Arc;

/// Serve `router` on an ephemeral port, returning its base URL
async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn prompt() -> ChatPrompt {
    ChatPrompt::new("You are a journaling assistant.", "Today was calm.")
}

// =============================================================================
// OpenAI-compatible chat completions
// =============================================================================

async fn openai_handler(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer test-key");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": {"message": "bad key"}})));
    }

    let reply = format!(
        "model={} system={} user={}",
        body["model"].as_str().unwrap_or_default(),
        body["messages"][0]["content"].as_str().unwrap_or_default(),
        body["messages"][1]["content"].as_str().unwrap_or_default(),
    );
    (
        StatusCode::OK,
        Json(json!({"choices": [{"message": {"role": "assistant", "content": reply}}]})),
    )
}

#[tokio::test]
async fn test_openai_invoke_sends_both_messages() {
    let base = spawn_mock(Router::new().route("/v1/chat/completions", post(openai_handler))).await;
    let provider = OpenAiProvider::new(
        reqwest::Client::new(),
        &format!("{}/v1/", base),
        "test-key".to_string(),
        "gpt-4o-mini",
        0.3,
    );

    let text = provider.invoke(&prompt()).await.unwrap();
    assert_eq!(
        text,
        "model=gpt-4o-mini system=You are a journaling assistant. user=Today was calm."
    );
    assert_eq!(provider.name(), "openai");
    assert_eq!(provider.model(), "gpt-4o-mini");
}

#[tokio::test]
async fn test_openai_http_error_surfaces_status() {
    let base = spawn_mock(Router::new().route("/v1/chat/completions", post(openai_handler))).await;
    let provider = OpenAiProvider::new(
        reqwest::Client::new(),
        &format!("{}/v1", base),
        "wrong-key".to_string(),
        "gpt-4o-mini",
        0.3,
    );

    match provider.invoke(&prompt()).await {
        Err(ProviderError::Api { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("bad key"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_blank_content_returned_as_text() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({"choices": [{"message": {"content": "   "}}]})) }),
    );
    let base = spawn_mock(router).await;
    let provider = OpenAiProvider::new(
        reqwest::Client::new(),
        &format!("{}/v1", base),
        "test-key".to_string(),
        "gpt-4o-mini",
        0.3,
    );

    assert_eq!(provider.invoke(&prompt()).await.unwrap(), "   ");
}

// =============================================================================
// Ollama
// =============================================================================

#[tokio::test]
async fn test_ollama_invoke_non_streaming() {
    let router = Router::new().route(
        "/api/chat",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["stream"], false);
            assert_eq!(body["model"], "llama3.2:latest");
            let temperature = body["options"]["temperature"].as_f64().unwrap();
            assert!((temperature - 0.3).abs() < 1e-6);

            Json(json!({
                "model": "llama3.2:latest",
                "done": true,
                "message": {"role": "assistant", "content": "```json\n{\"mood\": \"CALM\"}\n```"}
            }))
        }),
    );
    let base = spawn_mock(router).await;
    let provider = OllamaProvider::new(reqwest::Client::new(), &base, "llama3.2:latest", 0.3);

    let text = provider.invoke(&prompt()).await.unwrap();
    assert!(text.contains("\"CALM\""));
    assert_eq!(provider.name(), "ollama");
}

#[tokio::test]
async fn test_ollama_missing_message_is_parse_error() {
    let router = Router::new().route("/api/chat", post(|| async { Json(json!({"done": true})) }));
    let base = spawn_mock(router).await;
    let provider = OllamaProvider::new(reqwest::Client::new(), &base, "llama3.2:latest", 0.3);

    assert!(matches!(
        provider.invoke(&prompt()).await,
        Err(ProviderError::Parse(_))
    ));
}

#[tokio::test]
async fn test_ollama_unreachable_is_network_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let provider = OllamaProvider::new(reqwest::Client::new(), &base, "llama3.2:latest", 0.3);
    assert!(matches!(
        provider.invoke(&prompt()).await,
        Err(ProviderError::Network(_))
    ));
}

#[tokio::test]
async fn test_ollama_empty_reply_yields_default_insight() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            Json(json!({"done": true, "message": {"role": "assistant", "content": ""}}))
        }),
    );
    let base = spawn_mock(router).await;
    let provider = OllamaProvider::new(reqwest::Client::new(), &base, "llama3.2:latest", 0.3);
    let analyzer = JournalAnalyzer::new(Arc::new(provider));

    let insights = analyzer.insights(&[AnalysisResult::fallback()]).await;
    assert_eq!(insights, EMPTY_INSIGHT);

    // An empty reply is not a provider failure
    assert!(analyzer.last_failure().await.is_none());
}
