pub mod auth;
pub mod health;
pub mod quizzes;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth::require_bearer_auth,
    cors::permissive_cors,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_mb.max(1) * 1024 * 1024;
    let limiter = RateLimiter::new(state.config.api_rps);

    let public_api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected_api = Router::new()
        .route("/api/quizzes/generate", post(quizzes::generate_quiz))
        .route(
            "/api/quizzes/generate-from-pdf",
            post(quizzes::generate_quiz_from_pdf),
        )
        .route("/api/quizzes/history", get(quizzes::quiz_history))
        .route("/api/quizzes/user/stats", get(quizzes::user_quiz_stats))
        .route("/api/quizzes/:id", get(quizzes::get_quiz))
        .route("/api/quizzes/:id/submit", post(quizzes::submit_quiz))
        .route("/api/quizzes/:id/results", get(quizzes::quiz_results))
        .route(
            "/api/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/api/users/stats", get(users::user_stats))
        .route_layer(from_fn_with_state(state.clone(), require_bearer_auth));

    let api = public_api
        .merge(protected_api)
        .layer(from_fn_with_state(limiter, rps_middleware));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
}
