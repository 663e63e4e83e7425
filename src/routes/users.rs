use axum::{extract::State, response::IntoResponse, Extension, Json};
use validator::Validate;

use crate::dto::{user_dto::UpdateProfileRequest, ApiResponse};
use crate::error::Result;
use crate::models::user::AuthUser;
use crate::AppState;

pub async fn get_profile(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    Json(ApiResponse::success(user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let updated = state
        .user_service
        .update_profile(user.id, payload.username.trim(), payload.email.trim())
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn user_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let stats = state.user_service.stats(user.id).await?;
    Ok(Json(ApiResponse::success(stats)))
}
