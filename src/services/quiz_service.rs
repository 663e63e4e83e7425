use sqlx::PgPool;

use crate::dto::quiz_dto::{
    GradingEntry, OptionView, QuestionView, QuizForTaking, QuizResultsResponse, QuizStats,
    ResultAnalysis, ResultOption, ResultQuestion, SubmitQuizRequest, SubmitQuizResponse,
};
use crate::error::{Error, Result};
use crate::generation::QuizGenerator;
use crate::models::question::{Question, QuestionOption, QuestionType};
use crate::models::quiz::{GeneratedQuiz, Quiz, QuizSpec, SourceType};
use crate::models::quiz_result::{
    HistoryEntry, QuizResult, SourceCount, TopicPerformance, UserAnswer,
};
use crate::services::grading_service::{GradeSummary, GradingService};

const RECENT_ACTIVITY_LIMIT: i64 = 5;
const TOP_TOPICS_LIMIT: i64 = 3;

/// Counts shared by the quiz and user statistics endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSummary {
    pub total_quizzes: i64,
    pub completed_quizzes: i64,
    pub average_score: f64,
}

pub async fn completion_summary(pool: &PgPool, user_id: i32) -> Result<CompletionSummary> {
    let total_quizzes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let completed_quizzes: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM quiz_results WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    let average: Option<f64> =
        sqlx::query_scalar("SELECT AVG(percentage) FROM quiz_results WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(CompletionSummary {
        total_quizzes,
        completed_quizzes,
        average_score: round2(average.unwrap_or(0.0)),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores the quiz with its questions and options in one transaction.
    pub async fn create_quiz(
        &self,
        user_id: i32,
        spec: &QuizSpec,
        quiz: &GeneratedQuiz,
        description: Option<&str>,
        source: SourceType,
        source_file_path: Option<&str>,
    ) -> Result<i32> {
        let mut tx = self.pool.begin().await?;

        let quiz_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO quizzes (user_id, topic, difficulty, question_type, description, source_type, source_file_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&spec.topic)
        .bind(spec.difficulty.as_str())
        .bind(spec.question_type.as_str())
        .bind(description)
        .bind(source.as_str())
        .bind(source_file_path)
        .fetch_one(&mut *tx)
        .await?;

        for (position, question) in quiz.questions.iter().enumerate() {
            let question_id: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO questions (quiz_id, position, question_text, correct_answer, explanation)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(quiz_id)
            .bind(position as i32)
            .bind(question.question_text())
            .bind(question.answer_key())
            .bind(question.explanation())
            .fetch_one(&mut *tx)
            .await?;

            // Subjective questions have no options.
            for (option_position, option) in question.options().iter().enumerate() {
                sqlx::query(
                    "INSERT INTO options (question_id, position, option_text, is_correct) VALUES ($1, $2, $3, $4)",
                )
                .bind(question_id)
                .bind(option_position as i32)
                .bind(option)
                .bind(option == question.answer_key())
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        tracing::info!(
            quiz_id,
            user_id,
            source = source.as_str(),
            origin = ?quiz.origin,
            questions = quiz.questions.len(),
            "quiz stored"
        );
        Ok(quiz_id)
    }

    pub async fn get_owned_quiz(&self, quiz_id: i32, user_id: i32) -> Result<Quiz> {
        sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1 AND user_id = $2")
            .bind(quiz_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz not found or unauthorized".to_string()))
    }

    async fn questions(&self, quiz_id: i32) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE quiz_id = $1 ORDER BY position, id",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn options(&self, quiz_id: i32) -> Result<Vec<QuestionOption>> {
        let rows = sqlx::query_as::<_, QuestionOption>(
            r#"
            SELECT o.* FROM options o
            JOIN questions q ON q.id = o.question_id
            WHERE q.quiz_id = $1
            ORDER BY o.question_id, o.position, o.id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_quiz_for_taking(&self, quiz_id: i32, user_id: i32) -> Result<QuizForTaking> {
        let quiz = self.get_owned_quiz(quiz_id, user_id).await?;
        let questions = self.questions(quiz_id).await?;
        let options = self.options(quiz_id).await?;

        let questions = questions
            .into_iter()
            .map(|q| QuestionView {
                options: options
                    .iter()
                    .filter(|o| o.question_id == q.id)
                    .map(|o| OptionView {
                        id: o.id,
                        text: o.option_text.clone(),
                    })
                    .collect(),
                id: q.id,
                question: q.question_text,
            })
            .collect();

        Ok(QuizForTaking {
            id: quiz.id,
            topic: quiz.topic,
            difficulty: quiz.difficulty,
            question_type: quiz.question_type,
            description: quiz.description,
            questions,
        })
    }

    /// Grades a submission by the quiz's stored question type and records it.
    /// Subjective answers are sent to the model one at a time.
    pub async fn submit(
        &self,
        generator: &QuizGenerator,
        quiz_id: i32,
        user_id: i32,
        payload: &SubmitQuizRequest,
    ) -> Result<SubmitQuizResponse> {
        let quiz = self.get_owned_quiz(quiz_id, user_id).await?;
        let questions = self.questions(quiz_id).await?;

        let (summary, grading) = match quiz.question_type() {
            QuestionType::MultipleChoice => {
                let options = self.options(quiz_id).await?;
                (
                    GradingService::grade_multiple_choice(&questions, &options, &payload.answers),
                    None,
                )
            }
            QuestionType::Subjective => {
                let mut grades = Vec::new();
                for answer in GradingService::relevant_answers(&questions, &payload.answers) {
                    let Some(question) = questions.iter().find(|q| q.id == answer.question_id)
                    else {
                        continue;
                    };
                    let text = answer.answer.clone().unwrap_or_default();
                    let grade = generator.grade_answer(&question.correct_answer, &text).await;
                    grades.push((answer.question_id, text, grade));
                }
                let summary = GradingService::summarize_subjective(questions.len(), grades);
                let entries = summary
                    .answers
                    .iter()
                    .map(|a| GradingEntry {
                        question_id: a.question_id,
                        score: a.subjective_score.unwrap_or_default(),
                        reason: a.subjective_reason.clone().unwrap_or_default(),
                    })
                    .collect();
                (summary, Some(entries))
            }
        };

        let result_id = self
            .record_result(quiz_id, user_id, &summary, payload.time_spent)
            .await?;
        tracing::info!(
            quiz_id,
            result_id,
            score = summary.score,
            total = summary.total_questions,
            "quiz submitted"
        );

        Ok(SubmitQuizResponse {
            quiz_id,
            result_id,
            score: summary.score,
            total_questions: summary.total_questions,
            percentage: summary.percentage,
            grading,
        })
    }

    async fn record_result(
        &self,
        quiz_id: i32,
        user_id: i32,
        summary: &GradeSummary,
        time_taken: Option<i32>,
    ) -> Result<i32> {
        let mut tx = self.pool.begin().await?;

        let result_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO quiz_results (quiz_id, user_id, score, total_questions, percentage, time_taken)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .bind(summary.score)
        .bind(summary.total_questions)
        .bind(summary.percentage)
        .bind(time_taken)
        .fetch_one(&mut *tx)
        .await?;

        for answer in &summary.answers {
            sqlx::query(
                r#"
                INSERT INTO user_answers (
                    quiz_result_id, question_id, selected_option_id, is_correct,
                    subjective_answer, subjective_score, subjective_reason
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(result_id)
            .bind(answer.question_id)
            .bind(answer.selected_option_id)
            .bind(answer.is_correct)
            .bind(answer.subjective_answer.as_deref())
            .bind(answer.subjective_score)
            .bind(answer.subjective_reason.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(result_id)
    }

    /// Details of the most recent attempt at this quiz by this user.
    pub async fn latest_result(&self, quiz_id: i32, user_id: i32) -> Result<QuizResultsResponse> {
        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT * FROM quiz_results
            WHERE quiz_id = $1 AND user_id = $2
            ORDER BY completed_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Quiz result not found".to_string()))?;

        let quiz = self.get_owned_quiz(quiz_id, user_id).await?;
        let questions = self.questions(quiz_id).await?;
        let options = self.options(quiz_id).await?;
        let answers = sqlx::query_as::<_, UserAnswer>(
            "SELECT * FROM user_answers WHERE quiz_result_id = $1",
        )
        .bind(result.id)
        .fetch_all(&self.pool)
        .await?;

        let questions = questions
            .into_iter()
            .map(|q| {
                let answer = answers.iter().find(|a| a.question_id == q.id);
                ResultQuestion {
                    options: options
                        .iter()
                        .filter(|o| o.question_id == q.id)
                        .map(|o| ResultOption {
                            id: o.id,
                            text: o.option_text.clone(),
                            is_correct: o.is_correct,
                        })
                        .collect(),
                    user_answer: answer.and_then(|a| a.selected_option_id),
                    correct: answer.map(|a| a.is_correct),
                    subjective_answer: answer.and_then(|a| a.subjective_answer.clone()),
                    subjective_score: answer.and_then(|a| a.subjective_score),
                    subjective_reason: answer.and_then(|a| a.subjective_reason.clone()),
                    id: q.id,
                    question: q.question_text,
                    explanation: q.explanation,
                }
            })
            .collect();

        Ok(QuizResultsResponse {
            quiz_id,
            result_id: result.id,
            topic: quiz.topic,
            difficulty: quiz.difficulty,
            question_type: quiz.question_type,
            source_type: quiz.source_type,
            completed_at: result.completed_at,
            questions,
            analysis: ResultAnalysis {
                score: result.score,
                total_questions: result.total_questions,
                percentage: result.percentage,
                time_taken: result.time_taken,
                strength: GradingService::strength(result.percentage),
                feedback: GradingService::feedback(result.percentage),
            },
        })
    }

    /// Newest first. `None` returns every row.
    pub async fn history(&self, user_id: i32, limit: Option<i64>) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT
                r.id AS result_id,
                r.quiz_id,
                q.topic,
                q.difficulty,
                q.question_type,
                q.source_type,
                r.score,
                r.total_questions,
                r.percentage,
                r.completed_at,
                r.time_taken
            FROM quiz_results r
            JOIN quizzes q ON r.quiz_id = q.id
            WHERE r.user_id = $1
            ORDER BY r.completed_at DESC, r.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn stats(&self, user_id: i32) -> Result<QuizStats> {
        let summary = completion_summary(&self.pool, user_id).await?;

        let top_performing_topics = sqlx::query_as::<_, TopicPerformance>(
            r#"
            SELECT q.topic, AVG(r.percentage) AS avg_score, COUNT(*) AS attempts
            FROM quizzes q
            JOIN quiz_results r ON q.id = r.quiz_id
            WHERE r.user_id = $1
            GROUP BY q.topic
            ORDER BY avg_score DESC, q.topic
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(TOP_TOPICS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let recent_activity = self.history(user_id, Some(RECENT_ACTIVITY_LIMIT)).await?;

        let quiz_sources = sqlx::query_as::<_, SourceCount>(
            r#"
            SELECT source_type, COUNT(*) AS count
            FROM quizzes
            WHERE user_id = $1
            GROUP BY source_type
            ORDER BY source_type
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(QuizStats {
            total_quizzes: summary.total_quizzes,
            completed_quizzes: summary.completed_quizzes,
            average_score: summary.average_score,
            top_performing_topics,
            recent_activity,
            quiz_sources,
        })
    }
}
