use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::dto::quiz_dto::{
    GenerateQuizRequest, GeneratedQuizResponse, SubmitQuizRequest, DEFAULT_PDF_QUESTIONS,
    DEFAULT_TOPIC_QUESTIONS,
};
use crate::dto::ApiResponse;
use crate::error::{Error, Result};
use crate::models::question::{Difficulty, QuestionType};
use crate::models::quiz::{QuizSpec, SourceType};
use crate::models::user::AuthUser;
use crate::services::pdf_service::{PDF_FAILURE_MESSAGE, PDF_FAILURE_SUGGESTION};
use crate::AppState;

const TOPIC_FAILURE_MESSAGE: &str = "Error generating quiz";
const TOPIC_FAILURE_SUGGESTION: &str =
    "Please try again later or contact support if the issue persists.";

/// Turns request fields into a spec. The count is clamped to
/// `1..=max_questions`.
fn build_spec(
    form: &GenerateQuizRequest,
    default_count: usize,
    max_questions: usize,
) -> Result<QuizSpec> {
    if form.topic.trim().is_empty() {
        return Err(Error::BadRequest("Topic is required".to_string()));
    }

    let difficulty = match form.difficulty.as_deref() {
        Some(raw) => raw
            .parse::<Difficulty>()
            .map_err(|_| Error::BadRequest(format!("Invalid difficulty: {}", raw)))?,
        None => Difficulty::default(),
    };
    let question_type = match form.question_type.as_deref() {
        Some(raw) => raw
            .parse::<QuestionType>()
            .map_err(|_| Error::BadRequest(format!("Invalid question type: {}", raw)))?,
        None => QuestionType::default(),
    };
    let count = form
        .num_questions
        .unwrap_or(default_count as i64)
        .clamp(1, max_questions.max(1) as i64) as usize;

    Ok(QuizSpec::new(&form.topic, difficulty, count, question_type))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse> {
    let spec = build_spec(&payload, DEFAULT_TOPIC_QUESTIONS, state.config.max_questions)?;
    tracing::info!(
        user_id = user.id,
        topic = %spec.topic,
        count = spec.question_count,
        question_type = %spec.question_type,
        "generating quiz from topic"
    );

    let quiz = state.quiz_generator.generate(&spec).await;
    let quiz_id = state
        .quiz_service
        .create_quiz(user.id, &spec, &quiz, None, SourceType::Topic, None)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to store generated quiz");
            Error::request_failed(TOPIC_FAILURE_MESSAGE, e, Some(TOPIC_FAILURE_SUGGESTION))
        })?;

    let body = GeneratedQuizResponse {
        quiz_id,
        topic: spec.topic.clone(),
        difficulty: spec.difficulty.to_string(),
        description: None,
        num_questions: quiz.questions.len(),
        question_type: spec.question_type.to_string(),
        source: SourceType::Topic.as_str(),
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::success(body))))
}

pub async fn generate_quiz_from_pdf(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut pdf: Option<bytes::Bytes> = None;
    let mut form = GenerateQuizRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "pdf" => {
                let data = field.bytes().await?;
                if !data.is_empty() {
                    pdf = Some(data);
                }
            }
            "topic" => form.topic = field.text().await?,
            "difficulty" => form.difficulty = non_blank(field.text().await?),
            "numQuestions" => {
                if let Some(raw) = non_blank(field.text().await?) {
                    let count = raw.parse::<i64>().map_err(|_| {
                        Error::BadRequest("numQuestions must be a number".to_string())
                    })?;
                    form.num_questions = Some(count);
                }
            }
            "questionType" => form.question_type = non_blank(field.text().await?),
            _ => {}
        }
    }

    let pdf = pdf.ok_or_else(|| Error::BadRequest("PDF file is required".to_string()))?;
    if form.topic.trim().is_empty() {
        return Err(Error::BadRequest("Topic is required".to_string()));
    }
    if form.question_type.is_none() {
        return Err(Error::BadRequest("Question Type is required".to_string()));
    }
    let spec = build_spec(&form, DEFAULT_PDF_QUESTIONS, state.config.max_questions)?;

    let prepared = state.pdf_service.prepare(&pdf).await?;
    let spec = spec.with_source_text(prepared.text);
    tracing::info!(
        user_id = user.id,
        topic = %spec.topic,
        count = spec.question_count,
        question_type = %spec.question_type,
        "generating quiz from PDF"
    );

    let quiz = state.quiz_generator.generate(&spec).await;
    let description = quiz
        .description
        .clone()
        .unwrap_or_else(|| format!("Quiz about {}", spec.topic));

    let stored = state
        .quiz_service
        .create_quiz(
            user.id,
            &spec,
            &quiz,
            Some(&description),
            SourceType::Pdf,
            Some(&prepared.file_name),
        )
        .await;
    let quiz_id = match stored {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "failed to store PDF quiz");
            state.pdf_service.remove(&prepared.path).await;
            return Err(Error::request_failed(
                PDF_FAILURE_MESSAGE,
                e,
                Some(PDF_FAILURE_SUGGESTION),
            ));
        }
    };

    let body = GeneratedQuizResponse {
        quiz_id,
        topic: spec.topic.clone(),
        difficulty: spec.difficulty.to_string(),
        description: Some(description),
        num_questions: quiz.questions.len(),
        question_type: spec.question_type.to_string(),
        source: SourceType::Pdf.as_str(),
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::success(body))))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get_quiz_for_taking(id, user.id).await?;
    Ok(Json(ApiResponse::success(quiz)))
}

pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let result = state
        .quiz_service
        .submit(&state.quiz_generator, id, user.id, &payload)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn quiz_results(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let results = state.quiz_service.latest_result(id, user.id).await?;
    Ok(Json(ApiResponse::success(results)))
}

pub async fn quiz_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let history = state.quiz_service.history(user.id, None).await?;
    Ok(Json(ApiResponse::success(history)))
}

pub async fn user_quiz_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let stats = state.quiz_service.stats(user.id).await?;
    Ok(Json(ApiResponse::success(stats)))
}
