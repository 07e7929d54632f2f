use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::words::{self, Word};

const WORDS_JSON: &str = include_str!("../data/words.json");

#[derive(Debug, Deserialize)]
struct SeedWord {
    maori: String,
    english: String,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed dataset parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Fills an empty word store from the bundled dataset, keeping file order.
/// Runs before the listener binds; the store is read-only afterwards.
pub async fn seed_words_if_empty(pool: &SqlitePool) -> Result<(), SeedError> {
    let existing = words::count_words(pool).await?;
    if existing > 0 {
        tracing::debug!(count = existing, "word store already populated");
        return Ok(());
    }

    let dataset: Vec<SeedWord> = serde_json::from_str(WORDS_JSON)?;
    let now = Utc::now().naive_utc();
    let entries: Vec<Word> = dataset
        .into_iter()
        .map(|seed| Word {
            id: Uuid::new_v4().to_string(),
            source_term: seed.maori,
            target_term: seed.english,
        })
        .collect();

    words::insert_words(pool, &entries, now).await?;
    tracing::info!(count = entries.len(), "seeded word store");

    Ok(())
}
