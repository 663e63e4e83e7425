pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod generation;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::Result;
use crate::generation::QuizGenerator;
use crate::services::{
    ai_service::{GeminiClient, TextGenerator},
    pdf_service::PdfService,
    quiz_service::QuizService,
    user_service::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub quiz_generator: QuizGenerator,
    pub quiz_service: QuizService,
    pub user_service: UserService,
    pub pdf_service: PdfService,
}

impl AppState {
    /// Production wiring: Gemini behind a client bounded by `AI_TIMEOUT_SECS`.
    pub fn new(pool: PgPool, config: Arc<Config>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()?;
        let gemini = GeminiClient::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_api_base.clone(),
            http_client,
        );
        Ok(Self::with_generator(pool, config, Arc::new(gemini)))
    }

    pub fn with_generator(
        pool: PgPool,
        config: Arc<Config>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            quiz_generator: QuizGenerator::new(generator),
            quiz_service: QuizService::new(pool.clone()),
            user_service: UserService::new(pool),
            pdf_service: PdfService::new(&config.uploads_dir),
            config,
        }
    }
}
