#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use sqlx::SqlitePool;

use kupu_backend::db::{self, words::Word};
use kupu_backend::routes;
use kupu_backend::services::mailer::EmailService;
use kupu_backend::state::AppState;

pub async fn create_test_app() -> (Router, SqlitePool) {
    let pool = db::init_db_pool("sqlite::memory:")
        .await
        .expect("in-memory pool");

    let state = AppState::new(pool.clone(), Arc::new(EmailService::mock()), 10);

    (routes::router(state), pool)
}

/// Seeds `count` words with ids w1..wN and distinct answers, in order.
pub async fn seed_numbered_words(pool: &SqlitePool, count: usize) -> Vec<String> {
    let words: Vec<Word> = (1..=count)
        .map(|i| Word {
            id: format!("w{i}"),
            source_term: format!("kupu{i}"),
            target_term: format!("word{i}"),
        })
        .collect();

    db::words::insert_words(pool, &words, Utc::now().naive_utc())
        .await
        .expect("seed words");

    words.into_iter().map(|w| w.id).collect()
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn word_ids(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|word| word["id"].as_str().expect("word id").to_string())
        .collect()
}
