use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::GenerationError;

pub const GRADING_FAILED_REASON: &str = "AI auto-grading failed. Please review manually.";

/// Score at or above which a subjective answer counts as correct.
pub const PASSING_SCORE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectiveGrade {
    pub score: f64,
    pub reason: String,
}

impl SubjectiveGrade {
    /// Result recorded when the model reply could not be used. A zero here
    /// means "not judged", not "certainly wrong".
    pub fn failed() -> Self {
        Self {
            score: 0.0,
            reason: GRADING_FAILED_REASON.to_string(),
        }
    }

    pub fn is_passing(&self) -> bool {
        self.score >= PASSING_SCORE
    }
}

/// Any numeric `score` is accepted as-is; there is no range check.
pub fn parse_grade(json: &str) -> Result<SubjectiveGrade, GenerationError> {
    let value: JsonValue = serde_json::from_str(json)?;
    let score = value
        .get("score")
        .and_then(JsonValue::as_f64)
        .ok_or_else(|| GenerationError::StructureInvalid("`score` must be a number".into()))?;
    let reason = value
        .get("reason")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(SubjectiveGrade { score, reason })
}
