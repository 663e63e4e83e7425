use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub id: i32,
    pub quiz_id: i32,
    pub user_id: i32,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub time_taken: Option<i32>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAnswer {
    pub id: i32,
    pub quiz_result_id: i32,
    pub question_id: i32,
    pub selected_option_id: Option<i32>,
    pub is_correct: bool,
    pub subjective_answer: Option<String>,
    pub subjective_score: Option<f64>,
    pub subjective_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryEntry {
    pub result_id: i32,
    pub quiz_id: i32,
    pub topic: String,
    pub difficulty: String,
    pub question_type: String,
    pub source_type: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub completed_at: DateTime<Utc>,
    pub time_taken: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TopicPerformance {
    pub topic: String,
    pub avg_score: f64,
    pub attempts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TopicCount {
    pub topic: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SourceCount {
    pub source_type: String,
    pub count: i64,
}
