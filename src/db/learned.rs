use std::collections::HashSet;

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

pub async fn select_learned_ids(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<HashSet<String>, sqlx::Error> {
    let ids: Vec<String> =
        sqlx::query_scalar(r#"SELECT "wordId" FROM "user_learned" WHERE "userId" = $1"#)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    Ok(ids.into_iter().collect())
}

/// Set-add: re-marking an already learned word is a no-op.
pub async fn mark_learned(
    pool: &SqlitePool,
    user_id: &str,
    word_ids: &[String],
    now: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    for word_id in word_ids {
        sqlx::query(
            r#"INSERT OR IGNORE INTO "user_learned" ("userId", "wordId", "createdAt")
               VALUES ($1, $2, $3)"#,
        )
        .bind(user_id)
        .bind(word_id)
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(())
}
