use crate::models::question::QuestionType;
use crate::models::quiz::QuizSpec;

pub const SOURCE_TEXT_MAX_CHARS: usize = 8000;
const TRUNCATION_MARKER: &str = "... (text truncated)";

const MULTIPLE_CHOICE_ITEM: &str = r#"{"question": "Question text", "options": ["Option1", "Option2", "Option3", "Option4"], "correctAnswer": "Correct option text", "explanation": "Clear explanation of why this is the correct answer"}"#;
const SUBJECTIVE_ITEM: &str = r#"{"question": "Question text", "explanation": "Model answer the student's response will be graded against"}"#;

/// Prompt for the topic flow. The model is asked for a bare JSON array.
pub fn topic_prompt(spec: &QuizSpec) -> String {
    match spec.question_type {
        QuestionType::MultipleChoice => format!(
            "Generate a {difficulty} quiz with {count} multiple choice questions about {topic}.\n\
             Each question should have 4 options with only one correct answer.\n\
             Also include a brief explanation for why the correct answer is right.\n\
             Format the response as a valid JSON array with this exact structure:\n\
             [{item}]\n\
             The value of \"correctAnswer\" must be copied exactly from \"options\".\n\
             Ensure the output is ONLY the JSON array, without any introductory text or markdown formatting.",
            difficulty = spec.difficulty,
            count = spec.question_count,
            topic = spec.topic,
            item = MULTIPLE_CHOICE_ITEM,
        ),
        QuestionType::Subjective => format!(
            "Generate a {difficulty} quiz with {count} open-ended (subjective) questions about {topic}.\n\
             For each question include a concise model answer in the \"explanation\" field.\n\
             Format the response as a valid JSON array with this exact structure:\n\
             [{item}]\n\
             Ensure the output is ONLY the JSON array, without any introductory text or markdown formatting.",
            difficulty = spec.difficulty,
            count = spec.question_count,
            topic = spec.topic,
            item = SUBJECTIVE_ITEM,
        ),
    }
}

/// Source text capped at [`SOURCE_TEXT_MAX_CHARS`], with a marker when cut.
pub fn bounded_source_text(text: &str) -> String {
    match text.char_indices().nth(SOURCE_TEXT_MAX_CHARS) {
        Some((cut, _)) => format!("{} {}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Prompt for the PDF flow. The model is asked for a `{"quiz": {...}}` object.
pub fn pdf_prompt(spec: &QuizSpec) -> String {
    let source = bounded_source_text(spec.source_text.as_deref().unwrap_or_default());
    let (kind, item, rule) = match spec.question_type {
        QuestionType::MultipleChoice => (
            "multiple choice",
            MULTIPLE_CHOICE_ITEM,
            "Each question must include an explanation for the correct answer, referring to content from the PDF, and \"correctAnswer\" must be copied exactly from \"options\".",
        ),
        QuestionType::Subjective => (
            "open-ended (subjective)",
            SUBJECTIVE_ITEM,
            "Each question must include an explanation of the expected answer, referring to content from the PDF.",
        ),
    };
    let topic_json = serde_json::Value::String(spec.topic.clone());

    format!(
        "Given the following text extracted from a PDF document, generate a {difficulty} level quiz about {topic_json} with {count} {kind} questions.\n\n\
         Text from PDF:\n{source}\n\n\
         Format the response as a valid JSON object with this exact structure:\n\
         {{\"quiz\": {{\"topic\": {topic_json}, \"description\": \"Brief description of the quiz based on the PDF content\", \"questions\": [{item}]}}}}\n\n\
         Ensure questions are directly related to the content in the PDF. {rule} The output should be ONLY the JSON object.",
        difficulty = spec.difficulty,
        count = spec.question_count,
    )
}

/// Prompt asking the model to score a free-text answer against a reference.
pub fn grading_prompt(correct_answer: &str, user_answer: &str) -> String {
    format!(
        r#"You are an advanced quiz grader. Your task is to compare the student's answer with the correct answer and provide a percentage score (0-100) indicating how correct the student's answer is. Also, provide a brief explanation, addressing the user as 'student', of why you assigned that score. Consider the following scoring guide:

- 100%: The student's answer is completely correct and matches the meaning of the correct answer perfectly.
- 75-99%: The student's answer is mostly correct but has minor flaws or omissions.
- 50-74%: The student's answer is partially correct but misses significant aspects of the correct answer.
- 25-49%: The student's answer contains some relevant information but is largely incorrect.
- 0-24%: The student's answer is completely incorrect or irrelevant.

Focus on the core meaning and key details. Provide the percentage and justification in the 'score' and 'reason' fields respectively. Address the user as 'student' in the 'reason' field.

Correct answer: """{correct_answer}"""
Student answer: """{user_answer}"""

Respond ONLY in valid JSON: {{ "score": <number>, "reason": "<string>" }}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;

    #[test]
    fn topic_prompt_names_count_difficulty_and_layout() {
        let spec = QuizSpec::new("Rust lifetimes", Difficulty::Hard, 4, QuestionType::MultipleChoice);
        let prompt = topic_prompt(&spec);
        assert!(prompt.contains("hard quiz with 4 multiple choice questions about Rust lifetimes"));
        assert!(prompt.contains("\"correctAnswer\""));
        assert!(prompt.contains("ONLY the JSON array"));
    }

    #[test]
    fn subjective_topic_prompt_omits_options() {
        let spec = QuizSpec::new("Ethics", Difficulty::Easy, 2, QuestionType::Subjective);
        let prompt = topic_prompt(&spec);
        assert!(prompt.contains("open-ended"));
        assert!(!prompt.contains("\"options\""));
    }

    #[test]
    fn prompts_are_deterministic() {
        let spec = QuizSpec::new("Ethics", Difficulty::Easy, 2, QuestionType::MultipleChoice)
            .with_source_text("some text");
        assert_eq!(topic_prompt(&spec), topic_prompt(&spec));
        assert_eq!(pdf_prompt(&spec), pdf_prompt(&spec));
    }

    #[test]
    fn long_source_text_is_cut_with_marker() {
        let source = "a".repeat(SOURCE_TEXT_MAX_CHARS + 10);
        let bounded = bounded_source_text(&source);
        assert!(bounded.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            bounded.chars().count(),
            SOURCE_TEXT_MAX_CHARS + 1 + TRUNCATION_MARKER.len()
        );

        let short = bounded_source_text("tiny");
        assert_eq!(short, "tiny");
    }

    #[test]
    fn pdf_prompt_requests_quiz_object() {
        let spec = QuizSpec::new("Cells", Difficulty::Medium, 5, QuestionType::MultipleChoice)
            .with_source_text("Mitochondria produce energy.");
        let prompt = pdf_prompt(&spec);
        assert!(prompt.contains("Mitochondria produce energy."));
        assert!(prompt.contains("{\"quiz\": {\"topic\": \"Cells\""));
        assert!(prompt.contains("ONLY the JSON object"));
    }

    #[test]
    fn grading_prompt_embeds_both_answers() {
        let prompt = grading_prompt("Water boils at 100C", "At 100 degrees");
        assert!(prompt.contains("Correct answer: \"\"\"Water boils at 100C\"\"\""));
        assert!(prompt.contains("Student answer: \"\"\"At 100 degrees\"\"\""));
        assert!(prompt.contains("{ \"score\": <number>, \"reason\": \"<string>\" }"));
    }
}
