use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::{history, mistakes, words};
use crate::response::{db_error, AppError};

/// Wrong answers shown alongside the correct one, at most.
pub const MAX_DISTRACTORS: usize = 3;

#[derive(Debug, Serialize)]
pub struct QuizItem {
    pub id: String,
    pub source_term: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub is_review: bool,
}

/// Builds up to `limit` multiple-choice questions. The user's mistakes come
/// first, highest count then most recent; remaining slots are filled with
/// shuffled fresh words. Mistakes are not filtered by due-ness here: the
/// quiz prioritizes review, it does not schedule it.
pub async fn build_quiz<R: Rng>(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    rng: &mut R,
) -> Result<Vec<QuizItem>, AppError> {
    let total = words::count_words(pool).await.map_err(db_error)?;
    if total == 0 {
        return Err(AppError::not_found("No words available for quiz"));
    }

    let limit = limit.clamp(1, total) as usize;

    let entries = mistakes::select_mistakes_by_severity(pool, user_id)
        .await
        .map_err(db_error)?;
    let wrong_ids: Vec<String> = entries.into_iter().map(|entry| entry.word_id).collect();

    let all_ids = words::select_all_word_ids(pool).await.map_err(db_error)?;
    let candidate_ids = merge_candidate_ids(&wrong_ids, all_ids, limit, rng);

    let resolved = words::select_words_by_ids(pool, &candidate_ids)
        .await
        .map_err(db_error)?;
    let id_to_word: HashMap<String, words::Word> = resolved
        .into_iter()
        .map(|word| (word.id.clone(), word))
        .collect();

    let all_targets = words::select_all_target_terms(pool)
        .await
        .map_err(db_error)?;
    let wrong_set: HashSet<&String> = wrong_ids.iter().collect();

    let mut items = Vec::with_capacity(candidate_ids.len());
    for candidate in &candidate_ids {
        // A ledger entry may still point at a word that is gone; skip it
        // rather than failing the whole batch.
        let Some(word) = id_to_word.get(candidate) else {
            continue;
        };

        items.push(QuizItem {
            id: word.id.clone(),
            source_term: word.source_term.clone(),
            options: build_options(&word.target_term, &all_targets, rng),
            correct_answer: word.target_term.clone(),
            is_review: wrong_set.contains(candidate),
        });
    }

    Ok(items)
}

/// Records a quiz submission: ids that do not resolve are dropped silently,
/// each remaining word's ledger entry is bumped atomically, and one history
/// row is appended when anything valid was submitted.
pub async fn record_wrong_answers(
    pool: &SqlitePool,
    user_id: &str,
    submitted_ids: &[String],
    now: NaiveDateTime,
) -> Result<(), AppError> {
    let valid_ids = words::filter_existing_ids(pool, submitted_ids)
        .await
        .map_err(db_error)?;

    for word_id in &valid_ids {
        mistakes::record_wrong_word(pool, user_id, word_id, now)
            .await
            .map_err(db_error)?;
    }

    if !valid_ids.is_empty() {
        history::insert_quiz_history(pool, user_id, &valid_ids, now)
            .await
            .map_err(db_error)?;
    }

    Ok(())
}

/// Priority mistakes first (already sorted), then shuffled filler from the
/// rest of the pool, truncated to `limit`.
pub fn merge_candidate_ids<R: Rng>(
    wrong_ids: &[String],
    all_ids: Vec<String>,
    limit: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut candidates: Vec<String> = wrong_ids.iter().take(limit).cloned().collect();

    if candidates.len() < limit {
        let chosen: HashSet<String> = candidates.iter().cloned().collect();
        let mut rest: Vec<String> = all_ids
            .into_iter()
            .filter(|id| !chosen.contains(id))
            .collect();
        rest.shuffle(rng);

        let needed = limit - candidates.len();
        candidates.extend(rest.into_iter().take(needed));
    }

    candidates
}

/// The correct answer plus up to three distractors sampled without
/// replacement from the other answer values (deduplicated), shuffled.
pub fn build_options<R: Rng>(correct: &str, all_targets: &[String], rng: &mut R) -> Vec<String> {
    let mut seen = HashSet::new();
    let pool: Vec<&String> = all_targets
        .iter()
        .filter(|term| term.as_str() != correct && seen.insert(term.as_str()))
        .collect();

    let mut options: Vec<String> = pool
        .choose_multiple(rng, MAX_DISTRACTORS)
        .map(|term| (*term).clone())
        .collect();
    options.push(correct.to_string());
    options.shuffle(rng);

    options
}
