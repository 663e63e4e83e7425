//! Structural validation of extracted model output.
//!
//! Length caps are enforced by silent truncation; only missing fields, wrong
//! types and an inconsistent answer key reject a reply.

use serde_json::Value as JsonValue;

use super::GenerationError;
use crate::models::question::{GeneratedQuestion, QuestionType};

pub const QUESTION_MAX_CHARS: usize = 500;
pub const OPTION_MAX_CHARS: usize = 255;
pub const EXPLANATION_MAX_CHARS: usize = 500;
pub const DESCRIPTION_MAX_CHARS: usize = 250;
pub const OPTION_COUNT: usize = 4;

const DEFAULT_EXPLANATION: &str = "No explanation provided.";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPdfQuiz {
    pub description: Option<String>,
    pub questions: Vec<GeneratedQuestion>,
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Validates a topic-flow reply: a non-empty JSON array of questions.
pub fn parse_question_list(
    json: &str,
    question_type: QuestionType,
) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    let value: JsonValue = serde_json::from_str(json)?;
    let items = value.as_array().ok_or_else(|| {
        GenerationError::StructureInvalid("expected a JSON array of questions".into())
    })?;
    validate_items(items, question_type)
}

/// Validates a PDF-flow reply: `{ "quiz": { "description"?, "questions": [...] } }`.
pub fn parse_pdf_quiz(
    json: &str,
    question_type: QuestionType,
) -> Result<ParsedPdfQuiz, GenerationError> {
    let value: JsonValue = serde_json::from_str(json)?;
    let quiz = value
        .get("quiz")
        .and_then(JsonValue::as_object)
        .ok_or_else(|| GenerationError::StructureInvalid("missing `quiz` object".into()))?;

    let items = quiz
        .get("questions")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| {
            GenerationError::StructureInvalid("`quiz.questions` must be an array".into())
        })?;

    let description = match quiz.get("description") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(text)) => Some(truncate_chars(text.trim(), DESCRIPTION_MAX_CHARS)),
        Some(_) => {
            return Err(GenerationError::StructureInvalid(
                "`quiz.description` must be a string".into(),
            ))
        }
    };

    Ok(ParsedPdfQuiz {
        description: description.filter(|d| !d.is_empty()),
        questions: validate_items(items, question_type)?,
    })
}

fn validate_items(
    items: &[JsonValue],
    question_type: QuestionType,
) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    if items.is_empty() {
        return Err(GenerationError::StructureInvalid(
            "question list is empty".into(),
        ));
    }
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| validate_question(idx, item, question_type))
        .collect()
}

fn validate_question(
    idx: usize,
    item: &JsonValue,
    question_type: QuestionType,
) -> Result<GeneratedQuestion, GenerationError> {
    let invalid = |reason: &str| GenerationError::StructureInvalid(format!("question {}: {}", idx + 1, reason));

    if !item.is_object() {
        return Err(invalid("not an object"));
    }

    let question_text = item
        .get("question")
        .and_then(JsonValue::as_str)
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| invalid("`question` must be a non-empty string"))?;
    let question_text = truncate_chars(question_text.trim(), QUESTION_MAX_CHARS);

    let explanation = match item.get("explanation") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(text)) if !text.trim().is_empty() => {
            Some(truncate_chars(text.trim(), EXPLANATION_MAX_CHARS))
        }
        Some(JsonValue::String(_)) => None,
        Some(_) => return Err(invalid("`explanation` must be a string")),
    };

    match question_type {
        QuestionType::Subjective => {
            let reference_explanation =
                explanation.ok_or_else(|| invalid("subjective questions need an `explanation`"))?;
            Ok(GeneratedQuestion::Subjective {
                question_text,
                reference_explanation,
            })
        }
        QuestionType::MultipleChoice => {
            let raw_options = item
                .get("options")
                .and_then(JsonValue::as_array)
                .ok_or_else(|| invalid("`options` must be an array"))?;
            if raw_options.len() != OPTION_COUNT {
                return Err(invalid(&format!(
                    "expected {} options, got {}",
                    OPTION_COUNT,
                    raw_options.len()
                )));
            }

            let mut options = Vec::with_capacity(OPTION_COUNT);
            for raw in raw_options {
                let text = raw
                    .as_str()
                    .filter(|o| !o.trim().is_empty())
                    .ok_or_else(|| invalid("every option must be a non-empty string"))?;
                options.push(text);
            }

            let correct_answer = item
                .get("correctAnswer")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| invalid("`correctAnswer` must be a string"))?;
            if !options.contains(&correct_answer) {
                return Err(invalid("`correctAnswer` is not one of the options"));
            }

            let options: Vec<String> = options
                .into_iter()
                .map(|o| truncate_chars(o, OPTION_MAX_CHARS))
                .collect();
            for (i, option) in options.iter().enumerate() {
                if options[..i].contains(option) {
                    return Err(invalid("options must be distinct"));
                }
            }

            Ok(GeneratedQuestion::MultipleChoice {
                question_text,
                options,
                correct_answer: truncate_chars(correct_answer, OPTION_MAX_CHARS),
                explanation: explanation.unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
            })
        }
    }
}
