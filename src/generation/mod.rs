//! Quiz generation and subjective grading on top of an external text model.
//!
//! Each stage (call, extract, validate) returns `Result<_, GenerationError>`.
//! [`QuizGenerator::generate`] and [`QuizGenerator::grade_answer`] are the
//! only entry points used by the request handlers, and both map every error
//! to deterministic fallback content: their return types carry no error.

pub mod extract;
pub mod fallback;
pub mod grading;
pub mod prompt;
pub mod validate;

use std::sync::Arc;

use crate::models::quiz::{GeneratedQuiz, QuizOrigin, QuizSpec};
use crate::services::ai_service::TextGenerator;
use extract::{extract_json, JsonShape};
use grading::SubjectiveGrade;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("external model call failed: {0}")]
    ExternalCallFailed(anyhow::Error),

    #[error("no JSON payload found in model reply")]
    NoJsonFound,

    #[error("model reply is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("model reply has an unexpected structure: {0}")]
    StructureInvalid(String),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::ExternalCallFailed(_) => "external_call_failed",
            GenerationError::NoJsonFound => "no_json_found",
            GenerationError::MalformedJson(_) => "malformed_json",
            GenerationError::StructureInvalid(_) => "structure_invalid",
        }
    }
}

#[derive(Clone)]
pub struct QuizGenerator {
    model: Arc<dyn TextGenerator>,
}

impl QuizGenerator {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { model }
    }

    /// Produces a quiz for `spec`, from the model when its reply is usable
    /// and from the built-in tables otherwise. The model is asked once.
    pub async fn generate(&self, spec: &QuizSpec) -> GeneratedQuiz {
        match self.try_generate(spec).await {
            Ok(quiz) => {
                if quiz.questions.len() != spec.question_count {
                    tracing::warn!(
                        requested = spec.question_count,
                        returned = quiz.questions.len(),
                        "model returned a different number of questions than requested"
                    );
                }
                tracing::info!(topic = %spec.topic, questions = quiz.questions.len(), "quiz generated by model");
                quiz
            }
            Err(err) => {
                tracing::warn!(
                    kind = err.kind(),
                    error = %err,
                    topic = %spec.topic,
                    "model output unusable, using fallback quiz"
                );
                match spec.source_text {
                    Some(_) => fallback::pdf_quiz(spec),
                    None => fallback::topic_quiz(spec),
                }
            }
        }
    }

    pub async fn try_generate(&self, spec: &QuizSpec) -> Result<GeneratedQuiz, GenerationError> {
        match spec.source_text {
            None => {
                let reply = self.request(&prompt::topic_prompt(spec)).await?;
                let json = extract_json(&reply, JsonShape::Array)?;
                let questions = validate::parse_question_list(json, spec.question_type)?;
                Ok(GeneratedQuiz {
                    description: None,
                    questions,
                    origin: QuizOrigin::Model,
                })
            }
            Some(_) => {
                let reply = self.request(&prompt::pdf_prompt(spec)).await?;
                let json = extract_json(&reply, JsonShape::Object)?;
                let parsed = validate::parse_pdf_quiz(json, spec.question_type)?;
                Ok(GeneratedQuiz {
                    description: parsed.description,
                    questions: parsed.questions,
                    origin: QuizOrigin::Model,
                })
            }
        }
    }

    /// Scores a free-text answer against the reference answer. Failures yield
    /// [`SubjectiveGrade::failed`].
    pub async fn grade_answer(&self, correct_answer: &str, user_answer: &str) -> SubjectiveGrade {
        match self.try_grade(correct_answer, user_answer).await {
            Ok(grade) => grade,
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "AI grading failed");
                SubjectiveGrade::failed()
            }
        }
    }

    async fn try_grade(
        &self,
        correct_answer: &str,
        user_answer: &str,
    ) -> Result<SubjectiveGrade, GenerationError> {
        let reply = self
            .request(&prompt::grading_prompt(correct_answer, user_answer))
            .await?;
        let json = extract_json(&reply, JsonShape::Object)?;
        grading::parse_grade(json)
    }

    async fn request(&self, prompt: &str) -> Result<String, GenerationError> {
        self.model
            .generate(prompt)
            .await
            .map_err(GenerationError::ExternalCallFailed)
    }
}
