use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::quiz_result::{HistoryEntry, SourceCount, TopicPerformance};

pub const DEFAULT_TOPIC_QUESTIONS: usize = 3;
pub const DEFAULT_PDF_QUESTIONS: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    #[serde(default)]
    pub topic: String,
    pub difficulty: Option<String>,
    pub num_questions: Option<i64>,
    pub question_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuizResponse {
    pub quiz_id: i32,
    pub topic: String,
    pub difficulty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub num_questions: usize,
    pub question_type: String,
    pub source: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub id: i32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: i32,
    pub question: String,
    pub options: Vec<OptionView>,
}

/// A stored quiz as shown to the taker: no answer keys.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizForTaking {
    pub id: i32,
    pub topic: String,
    pub difficulty: String,
    pub question_type: String,
    pub description: Option<String>,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i32,
    pub selected_option_id: Option<i32>,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
    #[validate(range(min = 0, message = "timeSpent cannot be negative"))]
    pub time_spent: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingEntry {
    pub question_id: i32,
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub quiz_id: i32,
    pub result_id: i32,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grading: Option<Vec<GradingEntry>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultOption {
    pub id: i32,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultQuestion {
    pub id: i32,
    pub question: String,
    pub explanation: Option<String>,
    pub options: Vec<ResultOption>,
    pub user_answer: Option<i32>,
    pub correct: Option<bool>,
    pub subjective_answer: Option<String>,
    pub subjective_score: Option<f64>,
    pub subjective_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultAnalysis {
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub time_taken: Option<i32>,
    pub strength: &'static str,
    pub feedback: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultsResponse {
    pub quiz_id: i32,
    pub result_id: i32,
    pub topic: String,
    pub difficulty: String,
    pub question_type: String,
    pub source_type: String,
    pub completed_at: DateTime<Utc>,
    pub questions: Vec<ResultQuestion>,
    pub analysis: ResultAnalysis,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStats {
    pub total_quizzes: i64,
    pub completed_quizzes: i64,
    pub average_score: f64,
    pub top_performing_topics: Vec<TopicPerformance>,
    pub recent_activity: Vec<HistoryEntry>,
    pub quiz_sources: Vec<SourceCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_accepts_partial_body() {
        let req: GenerateQuizRequest =
            serde_json::from_str(r#"{"topic": "Rust", "numQuestions": 4}"#).unwrap();
        assert_eq!(req.topic, "Rust");
        assert_eq!(req.num_questions, Some(4));
        assert!(req.difficulty.is_none());
        assert!(req.question_type.is_none());
    }

    #[test]
    fn submit_request_reads_camel_case() {
        let req: SubmitQuizRequest = serde_json::from_str(
            r#"{"answers": [{"questionId": 1, "selectedOptionId": 7}, {"questionId": 2, "answer": "x"}], "timeSpent": 30}"#,
        )
        .unwrap();
        assert_eq!(req.answers.len(), 2);
        assert_eq!(req.answers[0].selected_option_id, Some(7));
        assert_eq!(req.answers[1].answer.as_deref(), Some("x"));
        assert_eq!(req.time_spent, Some(30));
    }

    #[test]
    fn submit_response_omits_grading_for_multiple_choice() {
        let body = serde_json::to_value(SubmitQuizResponse {
            quiz_id: 1,
            result_id: 2,
            score: 3,
            total_questions: 4,
            percentage: 75.0,
            grading: None,
        })
        .unwrap();
        assert_eq!(body["totalQuestions"], 4);
        assert!(body.get("grading").is_none());
    }
}
