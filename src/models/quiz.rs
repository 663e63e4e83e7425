use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::question::{Difficulty, GeneratedQuestion, QuestionType};

pub const TOPIC_MAX_CHARS: usize = 250;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: i32,
    pub user_id: i32,
    pub topic: String,
    pub difficulty: String,
    pub question_type: String,
    pub description: Option<String>,
    pub source_type: String,
    pub source_file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn question_type(&self) -> QuestionType {
        self.question_type.parse().unwrap_or_default()
    }
}

/// Parameters of one generation request. `question_count` is a target; the
/// model may return a different number of questions.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSpec {
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: usize,
    pub source_text: Option<String>,
    pub question_type: QuestionType,
}

impl QuizSpec {
    pub fn new(
        topic: &str,
        difficulty: Difficulty,
        question_count: usize,
        question_type: QuestionType,
    ) -> Self {
        Self {
            topic: topic.trim().chars().take(TOPIC_MAX_CHARS).collect(),
            difficulty,
            question_count: question_count.max(1),
            source_text: None,
            question_type,
        }
    }

    pub fn with_source_text(mut self, text: impl Into<String>) -> Self {
        self.source_text = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizOrigin {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuiz {
    pub description: Option<String>,
    pub questions: Vec<GeneratedQuestion>,
    pub origin: QuizOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Topic,
    Pdf,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Topic => "topic",
            SourceType::Pdf => "pdf",
        }
    }
}
