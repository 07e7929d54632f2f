use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::response::AppError;
use crate::services::study;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_STUDY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct VocabularyQuery {
    user_id: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

/// One endpoint, two modes: with `offset` this is a plain wrap-around
/// listing of the store; without it the per-user adaptive study list.
pub async fn get_vocabulary(
    State(state): State<AppState>,
    Query(query): Query<VocabularyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    if let Some(offset) = query.offset {
        let words = study::list_words(state.pool(), limit, offset).await?;
        return Ok(Json(words));
    }

    let user_id = query.user_id.unwrap_or_else(|| "anonymous".to_string());
    let limit = limit.clamp(1, MAX_STUDY_LIMIT);
    let words =
        study::build_study_list(state.pool(), &user_id, limit, Utc::now().naive_utc()).await?;

    Ok(Json(words))
}
