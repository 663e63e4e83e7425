#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use quizverse_backend::{config::Config, services::ai_service::TextGenerator, AppState};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tower::ServiceExt;

/// Replays canned replies in order, then errors.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        })
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("model unavailable"))
    }
}

pub fn test_config(database_url: &str) -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: database_url.into(),
        jwt_secret: "test_secret_key".into(),
        jwt_ttl_hours: 1,
        gemini_api_key: "test-key".into(),
        gemini_model: "gemini-1.5-flash".into(),
        gemini_api_base: "http://127.0.0.1:9".into(),
        ai_timeout_secs: 1,
        max_questions: 20,
        api_rps: 1000,
        uploads_dir: std::env::temp_dir()
            .join("quizverse-tests")
            .to_string_lossy()
            .into_owned(),
        max_upload_mb: 10,
    }
}

pub fn build_app(pool: PgPool, config: Config, model: Arc<dyn TextGenerator>) -> Router {
    let state = AppState::with_generator(pool, Arc::new(config), model);
    quizverse_backend::routes::router(state)
}

/// `None` when no database is configured; such tests return early.
pub async fn database_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = quizverse_backend::database::pool::create_pool(&test_config(&url))
        .await
        .expect("pool");
    quizverse_backend::database::pool::run_migrations(&pool)
        .await
        .expect("migrations");
    Some(pool)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &JsonValue) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(resp: Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 4 * 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}
