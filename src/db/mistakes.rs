use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// One ledger row per (user, word). `count` only grows; `last_wrong` refreshes
/// on every wrong answer.
#[derive(Debug, Clone)]
pub struct MistakeEntry {
    pub word_id: String,
    pub count: i64,
    pub last_wrong: Option<NaiveDateTime>,
}

fn entry_from_row(row: &SqliteRow) -> Result<MistakeEntry, sqlx::Error> {
    Ok(MistakeEntry {
        word_id: row.try_get("wordId")?,
        count: row.try_get("count")?,
        last_wrong: row.try_get("lastWrong")?,
    })
}

/// Increment-or-insert as one statement; concurrent submissions for the same
/// (user, word) never lose an increment.
pub async fn record_wrong_word(
    pool: &SqlitePool,
    user_id: &str,
    word_id: &str,
    now: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO "user_mistakes" ("userId", "wordId", "count", "lastWrong", "createdAt")
           VALUES ($1, $2, 1, $3, $4)
           ON CONFLICT ("userId", "wordId") DO UPDATE SET
           "count" = "user_mistakes"."count" + 1,
           "lastWrong" = excluded."lastWrong""#,
    )
    .bind(user_id)
    .bind(word_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Ledger in creation order, for the due-review scan.
pub async fn select_mistakes(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<MistakeEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT "wordId", "count", "lastWrong" FROM "user_mistakes"
           WHERE "userId" = $1 ORDER BY rowid"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(entry_from_row).collect()
}

/// Highest-trouble, most-recent mistakes first. A NULL "lastWrong" sorts last
/// within its count group, same as treating the timestamp as oldest.
pub async fn select_mistakes_by_severity(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<MistakeEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT "wordId", "count", "lastWrong" FROM "user_mistakes"
           WHERE "userId" = $1 ORDER BY "count" DESC, "lastWrong" DESC"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(entry_from_row).collect()
}
