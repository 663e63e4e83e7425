use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::utils::token::decode_token;
use crate::AppState;

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "status": "error", "message": message })),
    )
        .into_response()
}

/// Resolves the bearer token to a live user and attaches it as
/// `Extension<AuthUser>`.
pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return unauthorized("No token, authorization denied");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return unauthorized("Token is not valid");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return unauthorized("No token, authorization denied");
    };

    let Some(user_id) = decode_token(token.trim(), &state.config.jwt_secret)
        .ok()
        .and_then(|claims| claims.user_id())
    else {
        return unauthorized("Token is not valid");
    };

    match state.user_service.find_auth_user(user_id).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => unauthorized("User not found"),
        Err(e) => {
            tracing::error!(error = %e, user_id, "auth lookup failed");
            unauthorized("Token is not valid")
        }
    }
}
