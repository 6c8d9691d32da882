//! Shared test fixtures: stub LLM provider, in-memory app, request builders
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use jrnl_common::db::connect_in_memory;
use jrnl_server::db::{upsert_user, UserProfile};
use jrnl_server::llm::{ChatPrompt, LlmProvider, ProviderError};
use jrnl_server::{build_router, AppState};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // for `oneshot`

pub const TEST_USER: &str = "user_ext_1";
pub const OTHER_USER: &str = "user_ext_2";

pub const HAPPY_RESPONSE: &str = r#"Sure! Here is the analysis:
```json
{
  "summary": "A relaxed day outdoors with friends.",
  "mood": "HAPPY",
  "negative": false,
  "moodScore": 88,
  "positivePercentage": 75,
  "neutralPercentage": 20,
  "negativePercentage": 5
}
```"#;

/// LLM provider double that counts calls and records the last prompt
pub struct StubProvider {
    reply: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<ChatPrompt>>,
}

impl StubProvider {
    /// Always answers with `text`
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    /// Always fails with a network error
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<ChatPrompt> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn invoke(&self, prompt: &ChatPrompt) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.clone());

        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(ProviderError::Network("connection refused".to_string())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub stub: Arc<StubProvider>,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// In-memory app with `TEST_USER` and `OTHER_USER` registered
pub async fn setup_app(stub: Arc<StubProvider>, shared_secret: i64) -> TestApp {
    let pool = connect_in_memory().await.unwrap();

    for (external_id, email) in [(TEST_USER, "one@example.com"), (OTHER_USER, "two@example.com")] {
        upsert_user(
            &pool,
            external_id,
            &UserProfile {
                email: email.to_string(),
                full_name: "Test User".to_string(),
                image_url: None,
            },
        )
        .await
        .unwrap();
    }

    let state = AppState::new(pool.clone(), shared_secret, stub.clone());
    TestApp {
        router: build_router(state),
        pool,
        stub,
    }
}

/// Request as `user`, with an optional JSON body
pub fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Extract JSON body from response
pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
