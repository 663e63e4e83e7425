use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    Subjective,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "MultipleChoice",
            QuestionType::Subjective => "Subjective",
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "MultipleChoice" | "multiple_choice" | "mcq" => Ok(QuestionType::MultipleChoice),
            "Subjective" | "subjective" => Ok(QuestionType::Subjective),
            other => Err(format!("Unknown question type: {}", other)),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One question as produced by the model or the fallback table, before it
/// has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratedQuestion {
    MultipleChoice {
        question_text: String,
        options: Vec<String>,
        correct_answer: String,
        explanation: String,
    },
    Subjective {
        question_text: String,
        reference_explanation: String,
    },
}

impl GeneratedQuestion {
    pub fn question_text(&self) -> &str {
        match self {
            GeneratedQuestion::MultipleChoice { question_text, .. }
            | GeneratedQuestion::Subjective { question_text, .. } => question_text,
        }
    }

    /// Value stored in `questions.correct_answer`: the correct option text,
    /// or the reference explanation a subjective answer is graded against.
    pub fn answer_key(&self) -> &str {
        match self {
            GeneratedQuestion::MultipleChoice { correct_answer, .. } => correct_answer,
            GeneratedQuestion::Subjective {
                reference_explanation,
                ..
            } => reference_explanation,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            GeneratedQuestion::MultipleChoice { explanation, .. } => explanation,
            GeneratedQuestion::Subjective {
                reference_explanation,
                ..
            } => reference_explanation,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            GeneratedQuestion::MultipleChoice { options, .. } => options,
            GeneratedQuestion::Subjective { .. } => &[],
        }
    }

    pub fn into_subjective(self) -> Self {
        match self {
            GeneratedQuestion::MultipleChoice {
                question_text,
                explanation,
                ..
            } => GeneratedQuestion::Subjective {
                question_text,
                reference_explanation: explanation,
            },
            subjective => subjective,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i32,
    pub quiz_id: i32,
    pub position: i32,
    pub question_text: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionOption {
    pub id: i32,
    pub question_id: i32,
    pub position: i32,
    pub option_text: String,
    pub is_correct: bool,
}
