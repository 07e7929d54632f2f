use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::services::quiz;
use crate::state::AppState;

const DEFAULT_QUIZ_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    user_id: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct QuizResultRequest {
    user_id: Option<String>,
    wrong_word_ids: Option<Vec<String>>,
}

#[derive(Serialize)]
struct QuizResultResponse {
    message: &'static str,
    wrong_count: usize,
}

pub async fn get_quiz(
    State(state): State<AppState>,
    Query(query): Query<QuizQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = query.user_id.unwrap_or_else(|| "anonymous".to_string());
    let limit = query.limit.unwrap_or(DEFAULT_QUIZ_LIMIT);

    // Seeded per request; ThreadRng is not Send and cannot live across the
    // awaits inside build_quiz.
    let mut rng = StdRng::from_os_rng();
    let items = quiz::build_quiz(state.pool(), &user_id, limit, &mut rng).await?;

    Ok(Json(items))
}

/// Accepts the wrong answers from a finished quiz. The reported count is
/// the submitted count, before any ids are dropped for not resolving.
pub async fn submit_quiz_result(
    State(state): State<AppState>,
    Json(payload): Json<QuizResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = payload.user_id.unwrap_or_else(|| "anonymous".to_string());
    let wrong_word_ids = payload.wrong_word_ids.unwrap_or_default();

    quiz::record_wrong_answers(
        state.pool(),
        &user_id,
        &wrong_word_ids,
        Utc::now().naive_utc(),
    )
    .await?;

    Ok(Json(QuizResultResponse {
        message: "Quiz result recorded.",
        wrong_count: wrong_word_ids.len(),
    }))
}
