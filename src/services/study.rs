use std::collections::HashSet;

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::db::words::Word;
use crate::db::{learned, mistakes, words};
use crate::response::{db_error, AppError};
use crate::services::review;

/// Share of a study list reserved for due reviews.
const DUE_REVIEW_SHARE: f64 = 0.2;

/// Assembles a study list of up to `limit` words in three tiers: due
/// reviews (capped at roughly a fifth of the list), then words the user has
/// not been shown yet, then anything else. Every returned word is marked as
/// learned for the user.
pub async fn build_study_list(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    now: NaiveDateTime,
) -> Result<Vec<Word>, AppError> {
    let entries = mistakes::select_mistakes(pool, user_id)
        .await
        .map_err(db_error)?;
    let due_ids: Vec<String> = entries
        .into_iter()
        .filter(|entry| review::is_due(entry.count, entry.last_wrong, now))
        .map(|entry| entry.word_id)
        .collect();

    let mut result: Vec<Word> = Vec::new();
    let mut used: HashSet<String> = HashSet::new();

    let due_target = due_tier_target(limit, !due_ids.is_empty());
    if due_target > 0 {
        let selected: Vec<String> = due_ids.into_iter().take(due_target as usize).collect();
        let due_words = words::select_words_by_ids(pool, &selected)
            .await
            .map_err(db_error)?;
        for word in due_words.into_iter().take(due_target as usize) {
            used.insert(word.id.clone());
            result.push(word);
        }
    }

    if (result.len() as i64) < limit {
        let learned_ids = learned::select_learned_ids(pool, user_id)
            .await
            .map_err(db_error)?;
        let exclude: HashSet<String> = learned_ids.union(&used).cloned().collect();
        let fresh = words::select_words_excluding(pool, &exclude, limit - result.len() as i64)
            .await
            .map_err(db_error)?;
        for word in fresh {
            used.insert(word.id.clone());
            result.push(word);
        }
    }

    // Everything is learned or due at this point; pad with whatever is not
    // already in the response.
    if (result.len() as i64) < limit {
        let filler = words::select_words_excluding(pool, &used, limit - result.len() as i64)
            .await
            .map_err(db_error)?;
        for word in filler {
            used.insert(word.id.clone());
            result.push(word);
        }
    }

    let returned_ids: Vec<String> = result.iter().map(|word| word.id.clone()).collect();
    learned::mark_learned(pool, user_id, &returned_ids, now)
        .await
        .map_err(db_error)?;

    Ok(result)
}

/// Plain paginated listing in stored order. The offset wraps modulo the
/// store size, so any non-empty store yields exactly `limit` words.
pub async fn list_words(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Word>, AppError> {
    let total = words::count_words(pool).await.map_err(db_error)?;
    if total == 0 {
        return Ok(Vec::new());
    }

    let (limit, offset) = normalize_page(total, limit, offset);

    let first = (total - offset).min(limit);
    let mut result = words::select_words_page(pool, first, offset)
        .await
        .map_err(db_error)?;

    let remaining = limit - result.len() as i64;
    if remaining > 0 {
        let wrapped = words::select_words_page(pool, remaining, 0)
            .await
            .map_err(db_error)?;
        result.extend(wrapped);
    }

    Ok(result)
}

/// Number of slots the due tier may occupy. Zero when nothing is due,
/// otherwise at least one even for tiny limits.
pub fn due_tier_target(limit: i64, any_due: bool) -> i64 {
    if !any_due {
        return 0;
    }
    (((limit as f64) * DUE_REVIEW_SHARE).ceil() as i64).max(1)
}

/// Clamps the page size into `1..=total` and wraps the offset.
pub fn normalize_page(total: i64, limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, total), offset.rem_euclid(total))
}
