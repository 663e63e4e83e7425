use std::collections::HashSet;

use crate::dto::quiz_dto::SubmittedAnswer;
use crate::generation::grading::SubjectiveGrade;
use crate::models::question::{Question, QuestionOption};

/// One row destined for `user_answers`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedAnswer {
    pub question_id: i32,
    pub selected_option_id: Option<i32>,
    pub is_correct: bool,
    pub subjective_answer: Option<String>,
    pub subjective_score: Option<f64>,
    pub subjective_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeSummary {
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub answers: Vec<GradedAnswer>,
}

pub struct GradingService;

impl GradingService {
    /// Keeps answers that target a question of this quiz, first one per
    /// question, in submission order.
    pub fn relevant_answers<'a>(
        questions: &[Question],
        answers: &'a [SubmittedAnswer],
    ) -> Vec<&'a SubmittedAnswer> {
        let known: HashSet<i32> = questions.iter().map(|q| q.id).collect();
        let mut seen = HashSet::new();
        answers
            .iter()
            .filter(|a| known.contains(&a.question_id) && seen.insert(a.question_id))
            .collect()
    }

    /// An answer counts only when the selected option belongs to the answered
    /// question. Answers pointing elsewhere are dropped.
    pub fn grade_multiple_choice(
        questions: &[Question],
        options: &[QuestionOption],
        answers: &[SubmittedAnswer],
    ) -> GradeSummary {
        let mut graded = Vec::new();
        for answer in Self::relevant_answers(questions, answers) {
            let Some(selected) = answer.selected_option_id else {
                continue;
            };
            let Some(option) = options
                .iter()
                .find(|o| o.id == selected && o.question_id == answer.question_id)
            else {
                continue;
            };
            graded.push(GradedAnswer {
                question_id: answer.question_id,
                selected_option_id: Some(option.id),
                is_correct: option.is_correct,
                subjective_answer: None,
                subjective_score: None,
                subjective_reason: None,
            });
        }

        let score = graded.iter().filter(|a| a.is_correct).count() as i32;
        let total_questions = questions.len() as i32;
        GradeSummary {
            score,
            total_questions,
            percentage: Self::percentage(score, total_questions),
            answers: graded,
        }
    }

    /// Subjective results: the percentage is the mean score over all quiz
    /// questions (unanswered ones count as 0) and `score` is its rounding.
    pub fn summarize_subjective(
        total_questions: usize,
        grades: Vec<(i32, String, SubjectiveGrade)>,
    ) -> GradeSummary {
        let sum: f64 = grades.iter().map(|(_, _, grade)| grade.score).sum();
        let percentage = if total_questions == 0 {
            0.0
        } else {
            sum / total_questions as f64
        };

        let answers = grades
            .into_iter()
            .map(|(question_id, answer, grade)| GradedAnswer {
                question_id,
                selected_option_id: None,
                is_correct: grade.is_passing(),
                subjective_answer: Some(answer),
                subjective_score: Some(grade.score),
                subjective_reason: Some(grade.reason),
            })
            .collect();

        GradeSummary {
            score: percentage.round() as i32,
            total_questions: total_questions as i32,
            percentage,
            answers,
        }
    }

    pub fn percentage(score: i32, total_questions: i32) -> f64 {
        if total_questions <= 0 {
            0.0
        } else {
            score as f64 * 100.0 / total_questions as f64
        }
    }

    pub fn strength(percentage: f64) -> &'static str {
        if percentage >= 80.0 {
            "Excellent understanding of the topic!"
        } else if percentage >= 60.0 {
            "Good grasp of the material"
        } else {
            "More practice recommended"
        }
    }

    pub fn feedback(percentage: f64) -> &'static str {
        if percentage >= 70.0 {
            "Well done!"
        } else if percentage >= 50.0 {
            "Keep practicing to improve"
        } else {
            "Consider reviewing this topic more thoroughly"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i32) -> Question {
        Question {
            id,
            quiz_id: 1,
            position: id,
            question_text: format!("Q{}", id),
            correct_answer: "A".into(),
            explanation: None,
        }
    }

    fn option(id: i32, question_id: i32, is_correct: bool) -> QuestionOption {
        QuestionOption {
            id,
            question_id,
            position: id,
            option_text: format!("O{}", id),
            is_correct,
        }
    }

    fn mc(question_id: i32, selected: Option<i32>) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected_option_id: selected,
            answer: None,
        }
    }

    #[test]
    fn multiple_choice_counts_correct_options_over_all_questions() {
        let questions = vec![question(1), question(2), question(3), question(4)];
        let options = vec![
            option(10, 1, true),
            option(11, 1, false),
            option(20, 2, false),
            option(21, 2, true),
            option(30, 3, true),
        ];
        let answers = vec![mc(1, Some(10)), mc(2, Some(20)), mc(3, Some(30))];

        let summary = GradingService::grade_multiple_choice(&questions, &options, &answers);
        assert_eq!(summary.score, 2);
        assert_eq!(summary.total_questions, 4);
        assert_eq!(summary.percentage, 50.0);
        assert_eq!(summary.answers.len(), 3);
        assert!(!summary.answers[1].is_correct);
    }

    #[test]
    fn option_from_another_question_is_ignored() {
        let questions = vec![question(1), question(2)];
        let options = vec![option(10, 1, true), option(21, 2, true)];
        let answers = vec![mc(2, Some(10))];

        let summary = GradingService::grade_multiple_choice(&questions, &options, &answers);
        assert_eq!(summary.score, 0);
        assert!(summary.answers.is_empty());
    }

    #[test]
    fn duplicate_and_foreign_answers_are_dropped() {
        let questions = vec![question(1)];
        let options = vec![option(10, 1, true), option(11, 1, false)];
        let answers = vec![mc(1, Some(11)), mc(1, Some(10)), mc(99, Some(10))];

        let summary = GradingService::grade_multiple_choice(&questions, &options, &answers);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.answers.len(), 1);
        assert_eq!(summary.answers[0].selected_option_id, Some(11));
    }

    #[test]
    fn subjective_mean_and_pass_threshold() {
        let grades = vec![
            (1, "a".to_string(), SubjectiveGrade { score: 85.0, reason: "good".into() }),
            (2, "b".to_string(), SubjectiveGrade { score: 40.0, reason: "weak".into() }),
            (3, "c".to_string(), SubjectiveGrade { score: 50.0, reason: "ok".into() }),
        ];
        let summary = GradingService::summarize_subjective(3, grades);
        assert!((summary.percentage - 58.333).abs() < 0.01);
        assert_eq!(summary.score, 58);
        assert_eq!(summary.total_questions, 3);
        let passing: Vec<bool> = summary.answers.iter().map(|a| a.is_correct).collect();
        assert_eq!(passing, vec![true, false, true]);
        assert_eq!(summary.answers[1].subjective_reason.as_deref(), Some("weak"));
    }

    #[test]
    fn subjective_failure_scores_zero() {
        let grades = vec![(1, "x".to_string(), SubjectiveGrade::failed())];
        let summary = GradingService::summarize_subjective(1, grades);
        assert_eq!(summary.score, 0);
        assert!(!summary.answers[0].is_correct);
    }

    #[test]
    fn empty_quiz_has_zero_percentage() {
        assert_eq!(GradingService::percentage(0, 0), 0.0);
        assert_eq!(GradingService::summarize_subjective(0, Vec::new()).percentage, 0.0);
    }

    #[test]
    fn analysis_wording_follows_thresholds() {
        assert_eq!(GradingService::strength(80.0), "Excellent understanding of the topic!");
        assert_eq!(GradingService::strength(60.0), "Good grasp of the material");
        assert_eq!(GradingService::strength(59.9), "More practice recommended");
        assert_eq!(GradingService::feedback(70.0), "Well done!");
        assert_eq!(GradingService::feedback(50.0), "Keep practicing to improve");
        assert_eq!(
            GradingService::feedback(49.0),
            "Consider reviewing this topic more thoroughly"
        );
    }
}
