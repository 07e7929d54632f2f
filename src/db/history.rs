use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Append-only; one row per submission with the validated word ids.
pub async fn insert_quiz_history(
    pool: &SqlitePool,
    user_id: &str,
    word_ids: &[String],
    now: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    let encoded = serde_json::to_string(word_ids).unwrap_or_default();

    sqlx::query(
        r#"INSERT INTO "quiz_history" ("id", "userId", "wrongWordIds", "timestamp")
           VALUES ($1, $2, $3, $4)"#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(encoded)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn count_history_for_user(pool: &SqlitePool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT COUNT(*) FROM "quiz_history" WHERE "userId" = $1"#)
        .bind(user_id)
        .fetch_one(pool)
        .await
}
