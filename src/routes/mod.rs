mod auth;
mod health;
mod quiz;
mod vocabulary;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/vocabulary",
            get(vocabulary::get_vocabulary).fallback(fallback_handler),
        )
        .route("/quiz", get(quiz::get_quiz).fallback(fallback_handler))
        .route(
            "/quiz_result",
            post(quiz::submit_quiz_result).fallback(fallback_handler),
        )
        .route(
            "/auth/register",
            post(auth::register).fallback(fallback_handler),
        )
        .route("/auth/verify", post(auth::verify).fallback(fallback_handler))
        .route("/auth/login", post(auth::login).fallback(fallback_handler))
        .route("/health", get(health::health).fallback(fallback_handler))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found").into_response()
}
