//! Built-in quizzes used whenever the model cannot produce a usable one.
//! Nothing in here can fail.

use std::collections::HashMap;

use super::validate::{
    truncate_chars, DESCRIPTION_MAX_CHARS, EXPLANATION_MAX_CHARS, OPTION_MAX_CHARS,
};
use crate::models::question::{GeneratedQuestion, QuestionType};
use crate::models::quiz::{GeneratedQuiz, QuizOrigin, QuizSpec};

const KEYWORD_MIN_LEN: usize = 6;
const KEYWORD_LIMIT: usize = 20;

struct FallbackQuestion {
    question: &'static str,
    options: [&'static str; 4],
    correct_answer: &'static str,
    explanation: &'static str,
}

const JAVASCRIPT_SET: &[FallbackQuestion] = &[
    FallbackQuestion {
        question: "What is JavaScript primarily used for?",
        options: [
            "Server-side scripting only",
            "Client-side web development",
            "Database management",
            "Mobile app development only",
        ],
        correct_answer: "Client-side web development",
        explanation: "JavaScript was originally designed as a client-side scripting language to enhance web pages interactivity in browsers.",
    },
    FallbackQuestion {
        question: "Which of the following is NOT a JavaScript data type?",
        options: ["String", "Boolean", "Integer", "Object"],
        correct_answer: "Integer",
        explanation: "JavaScript has Number as a data type, not specifically Integer. It represents both integers and floating-point numbers.",
    },
    FallbackQuestion {
        question: "What will 'typeof null' return in JavaScript?",
        options: ["null", "undefined", "object", "number"],
        correct_answer: "object",
        explanation: "In JavaScript, typeof null returns 'object', which is a long-standing bug that's maintained for compatibility.",
    },
];

const PYTHON_SET: &[FallbackQuestion] = &[
    FallbackQuestion {
        question: "What is Python?",
        options: [
            "A compiled language",
            "An interpreted language",
            "A markup language",
            "An assembly language",
        ],
        correct_answer: "An interpreted language",
        explanation: "Python is an interpreted language, meaning the code is executed line by line rather than being compiled before execution.",
    },
    FallbackQuestion {
        question: "Which of the following is NOT a Python data type?",
        options: ["List", "Dictionary", "Tuple", "Array"],
        correct_answer: "Array",
        explanation: "Python doesn't have a native Array data type. It uses Lists for similar functionality, while Arrays are available through the NumPy library.",
    },
    FallbackQuestion {
        question: "How do you create a comment in Python?",
        options: ["/* Comment */", "// Comment", "# Comment", "-- Comment --"],
        correct_answer: "# Comment",
        explanation: "In Python, single-line comments are created using the hash symbol (#).",
    },
];

const GENERAL_SET: &[FallbackQuestion] = &[
    FallbackQuestion {
        question: "Which planet is known as the Red Planet?",
        options: ["Earth", "Mars", "Jupiter", "Venus"],
        correct_answer: "Mars",
        explanation: "Mars appears reddish due to iron oxide (rust) on its surface, earning it the nickname 'The Red Planet'.",
    },
    FallbackQuestion {
        question: "What is the chemical symbol for gold?",
        options: ["Ag", "Au", "Fe", "Pb"],
        correct_answer: "Au",
        explanation: "The chemical symbol Au comes from the Latin word for gold, 'aurum', meaning 'shining dawn'.",
    },
    FallbackQuestion {
        question: "Which gas do plants primarily use for photosynthesis?",
        options: ["Oxygen", "Nitrogen", "Carbon Dioxide", "Hydrogen"],
        correct_answer: "Carbon Dioxide",
        explanation: "Plants absorb carbon dioxide during photosynthesis to create glucose and oxygen as a byproduct.",
    },
];

/// Topic keywords checked in order; the first set with a matching keyword
/// wins. Matching is a lower-case substring test.
const KEYWORD_TABLE: &[(&[&str], &[FallbackQuestion])] = &[
    (&["javascript", "js"], JAVASCRIPT_SET),
    (&["python"], PYTHON_SET),
];

impl FallbackQuestion {
    fn to_generated(&self) -> GeneratedQuestion {
        GeneratedQuestion::MultipleChoice {
            question_text: self.question.to_string(),
            options: self.options.iter().map(|o| o.to_string()).collect(),
            correct_answer: self.correct_answer.to_string(),
            explanation: self.explanation.to_string(),
        }
    }
}

fn select_set(topic: &str) -> &'static [FallbackQuestion] {
    let topic = topic.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| topic.contains(k)))
        .map(|(_, set)| *set)
        .unwrap_or(GENERAL_SET)
}

fn shape_for(question: GeneratedQuestion, question_type: QuestionType) -> GeneratedQuestion {
    match question_type {
        QuestionType::MultipleChoice => question,
        QuestionType::Subjective => question.into_subjective(),
    }
}

/// Fallback for the topic flow: the first `question_count` questions of the
/// keyword-matched set.
pub fn topic_quiz(spec: &QuizSpec) -> GeneratedQuiz {
    let set = select_set(&spec.topic);
    let take = spec.question_count.clamp(1, set.len());

    GeneratedQuiz {
        description: None,
        questions: set[..take]
            .iter()
            .map(|q| shape_for(q.to_generated(), spec.question_type))
            .collect(),
        origin: QuizOrigin::Fallback,
    }
}

/// Most frequent words longer than five characters, ties broken by first
/// appearance. Words are cut to the option length first, so the results are
/// distinct option values.
pub fn keywords(text: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, raw) in text.split_whitespace().enumerate() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if word.chars().count() < KEYWORD_MIN_LEN {
            continue;
        }
        let entry = counts
            .entry(truncate_chars(word, OPTION_MAX_CHARS))
            .or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    ranked.into_iter().take(limit).map(|(word, _)| word).collect()
}

// Topics are at most 250 chars, so the topic-seeded options still differ
// after the cut.
fn option(text: String) -> String {
    truncate_chars(&text, OPTION_MAX_CHARS)
}

/// Fallback for the PDF flow. Generic questions seeded with the topic and,
/// when the text has enough long words, one keyword question.
pub fn pdf_quiz(spec: &QuizSpec) -> GeneratedQuiz {
    let topic = spec.topic.as_str();
    let source = spec.source_text.as_deref().unwrap_or_default();
    let keywords = keywords(source, KEYWORD_LIMIT);

    let mut questions = vec![GeneratedQuestion::MultipleChoice {
        question_text: format!("What is the main focus of this document related to {}?", topic),
        options: vec![
            option(format!("Learning {} concepts", topic)),
            option(format!("{} implementation details", topic)),
            option(format!("History of {}", topic)),
            option(format!("{} best practices", topic)),
        ],
        correct_answer: option(format!("{} implementation details", topic)),
        explanation: "Based on the overall content of the document, it appears to focus on implementation details of the topic rather than just concepts, history, or practices.".to_string(),
    }];

    if keywords.len() >= 3 {
        questions.push(GeneratedQuestion::MultipleChoice {
            question_text: format!("Which of the following terms is most relevant to {}?", topic),
            options: vec![
                keywords[0].clone(),
                keywords[1].clone(),
                keywords[2].clone(),
                "None of the above".to_string(),
            ],
            correct_answer: keywords[0].clone(),
            explanation: truncate_chars(
                &format!(
                    "{} appears prominently in the document and is closely related to {}.",
                    keywords[0], topic
                ),
                EXPLANATION_MAX_CHARS,
            ),
        });
    }

    questions.extend([
        GeneratedQuestion::MultipleChoice {
            question_text: format!("What is a common practice in {}?", topic),
            options: vec![
                "Documentation".into(),
                "Testing".into(),
                "Implementation".into(),
                "All of the above".into(),
            ],
            correct_answer: "All of the above".into(),
            explanation: "Documentation, testing, and implementation are all essential practices in any technical field, including this topic.".into(),
        },
        GeneratedQuestion::MultipleChoice {
            question_text: format!("Which statement best describes {}?", topic),
            options: vec![
                "A methodology for software development".into(),
                "A programming language feature".into(),
                "A design pattern".into(),
                "A software tool".into(),
            ],
            correct_answer: "A methodology for software development".into(),
            explanation: "Based on context clues in the document, the topic appears to be a methodology used in software development processes.".into(),
        },
        GeneratedQuestion::MultipleChoice {
            question_text: format!("What is important to consider when working with {}?", topic),
            options: vec![
                "Performance".into(),
                "Readability".into(),
                "Maintainability".into(),
                "All of these".into(),
            ],
            correct_answer: "All of these".into(),
            explanation: "Performance, readability, and maintainability are all critical considerations in any technical implementation.".into(),
        },
    ]);

    questions.truncate(spec.question_count.max(1));

    GeneratedQuiz {
        description: Some(truncate_chars(
            &format!(
                "A {} quiz about {} based on the provided PDF content.",
                spec.difficulty, topic
            ),
            DESCRIPTION_MAX_CHARS,
        )),
        questions: questions
            .into_iter()
            .map(|q| shape_for(q, spec.question_type))
            .collect(),
        origin: QuizOrigin::Fallback,
    }
}
