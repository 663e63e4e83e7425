use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::Result;
use crate::utils::token::issue_token;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .register(payload.username.trim(), payload.email.trim(), &payload.password)
        .await?;
    let token = issue_token(user.id, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(token, user))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .login(payload.email.trim(), &payload.password)
        .await?;
    let token = issue_token(user.id, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;
    Ok(Json(AuthResponse::new(token, user)))
}
