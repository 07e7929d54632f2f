use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};

/// A vocabulary entry. Immutable after seeding; `source_term` is the prompt
/// language (Māori), `target_term` the answer language (English).
#[derive(Debug, Clone, Serialize)]
pub struct Word {
    pub id: String,
    pub source_term: String,
    pub target_term: String,
}

const WORD_COLUMNS: &str = r#""id", "sourceTerm", "targetTerm""#;

fn word_from_row(row: &SqliteRow) -> Result<Word, sqlx::Error> {
    Ok(Word {
        id: row.try_get("id")?,
        source_term: row.try_get("sourceTerm")?,
        target_term: row.try_get("targetTerm")?,
    })
}

pub async fn count_words(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT COUNT(*) FROM "words""#)
        .fetch_one(pool)
        .await
}

/// Store-native order is insertion (rowid) order.
pub async fn select_words_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Word>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"SELECT {WORD_COLUMNS} FROM "words" ORDER BY rowid LIMIT $1 OFFSET $2"#
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(word_from_row).collect()
}

pub async fn select_all_word_ids(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT "id" FROM "words" ORDER BY rowid"#)
        .fetch_all(pool)
        .await
}

pub async fn select_all_target_terms(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(r#"SELECT "targetTerm" FROM "words" ORDER BY rowid"#)
        .fetch_all(pool)
        .await
}

pub async fn select_words_by_ids(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<Vec<Word>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<sqlx::Sqlite>::new(format!(
        r#"SELECT {WORD_COLUMNS} FROM "words" WHERE "id" IN ("#
    ));
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY rowid");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(word_from_row).collect()
}

/// Returns the subset of `ids` that exist, each once, in store order.
pub async fn filter_existing_ids(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<Vec<String>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb =
        QueryBuilder::<sqlx::Sqlite>::new(r#"SELECT "id" FROM "words" WHERE "id" IN ("#);
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY rowid");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(|row| row.try_get("id")).collect()
}

pub async fn select_words_excluding(
    pool: &SqlitePool,
    exclude: &HashSet<String>,
    limit: i64,
) -> Result<Vec<Word>, sqlx::Error> {
    if limit <= 0 {
        return Ok(Vec::new());
    }

    let rows = if exclude.is_empty() {
        sqlx::query(&format!(
            r#"SELECT {WORD_COLUMNS} FROM "words" ORDER BY rowid LIMIT $1"#
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?
    } else {
        let mut qb = QueryBuilder::<sqlx::Sqlite>::new(format!(
            r#"SELECT {WORD_COLUMNS} FROM "words" WHERE "id" NOT IN ("#
        ));
        let mut separated = qb.separated(", ");
        for id in exclude {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY rowid LIMIT ");
        qb.push_bind(limit);
        qb.build().fetch_all(pool).await?
    };

    rows.iter().map(word_from_row).collect()
}

pub async fn insert_words(
    pool: &SqlitePool,
    words: &[Word],
    now: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    for word in words {
        sqlx::query(
            r#"INSERT INTO "words" ("id", "sourceTerm", "targetTerm", "createdAt")
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(&word.id)
        .bind(&word.source_term)
        .bind(&word.target_term)
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(())
}
