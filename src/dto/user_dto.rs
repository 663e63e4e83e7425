use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::quiz_result::TopicCount;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_quizzes: i64,
    pub completed_quizzes: i64,
    pub average_score: f64,
    pub top_topics: Vec<TopicCount>,
}
