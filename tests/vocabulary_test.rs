use std::collections::HashSet;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use tower::ServiceExt;

use kupu_backend::db;

mod common;

#[tokio::test]
async fn listing_wraps_past_the_end_of_the_store() {
    let (app, pool) = common::create_test_app().await;
    let ids = common::seed_numbered_words(&pool, 12).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?limit=5&offset=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::read_json(response).await;
    let expected: Vec<String> = [10usize, 11, 0, 1, 2]
        .iter()
        .map(|&i| ids[i].clone())
        .collect();
    assert_eq!(common::word_ids(&body), expected);
}

#[tokio::test]
async fn listing_offset_wraps_modulo_store_size() {
    let (app, pool) = common::create_test_app().await;
    let ids = common::seed_numbered_words(&pool, 12).await;

    // 22 mod 12 == 10
    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?limit=3&offset=22")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::read_json(response).await;
    let expected: Vec<String> = [10usize, 11, 0].iter().map(|&i| ids[i].clone()).collect();
    assert_eq!(common::word_ids(&body), expected);
}

#[tokio::test]
async fn listing_limit_clamps_to_store_size() {
    let (app, pool) = common::create_test_app().await;
    let ids = common::seed_numbered_words(&pool, 12).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/vocabulary?limit=50&offset=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = common::read_json(response).await;
    assert_eq!(common::word_ids(&body), ids);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?limit=0&offset=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = common::read_json(response).await;
    assert_eq!(common::word_ids(&body), vec![ids[0].clone()]);
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let (app, _pool) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?limit=5&offset=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::read_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn study_list_reserves_the_due_tier() {
    let (app, pool) = common::create_test_app().await;
    let ids = common::seed_numbered_words(&pool, 10).await;

    // Missed two days ago with count 1, so all three are past the one-day
    // interval and due.
    let two_days_ago = Utc::now().naive_utc() - Duration::days(2);
    for id in &ids[7..10] {
        db::mistakes::record_wrong_word(&pool, "u1", id, two_days_ago)
            .await
            .unwrap();
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?user_id=u1&limit=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::read_json(response).await;
    let returned = common::word_ids(&body);

    // ceil(10 * 0.2) = 2 due slots in ledger order, then unseen words in
    // store order, never repeating an id.
    let expected = vec![
        "w8".to_string(),
        "w9".to_string(),
        "w1".to_string(),
        "w2".to_string(),
        "w3".to_string(),
        "w4".to_string(),
        "w5".to_string(),
        "w6".to_string(),
        "w7".to_string(),
        "w10".to_string(),
    ];
    assert_eq!(returned, expected);

    let learned = db::learned::select_learned_ids(&pool, "u1").await.unwrap();
    assert_eq!(learned.len(), 10);
}

#[tokio::test]
async fn due_tier_keeps_at_least_one_slot_for_small_limits() {
    let (app, pool) = common::create_test_app().await;
    let _ids = common::seed_numbered_words(&pool, 5).await;

    let two_days_ago = Utc::now().naive_utc() - Duration::days(2);
    db::mistakes::record_wrong_word(&pool, "u1", "w4", two_days_ago)
        .await
        .unwrap();
    db::mistakes::record_wrong_word(&pool, "u1", "w5", two_days_ago)
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?user_id=u1&limit=3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = common::read_json(response).await;

    // ceil(3 * 0.2) = 1 due slot
    assert_eq!(
        common::word_ids(&body),
        vec!["w4".to_string(), "w1".to_string(), "w2".to_string()]
    );
}

#[tokio::test]
async fn fresh_mistakes_are_not_served_as_reviews() {
    let (app, pool) = common::create_test_app().await;
    let ids = common::seed_numbered_words(&pool, 5).await;

    db::mistakes::record_wrong_word(&pool, "u1", "w5", Utc::now().naive_utc())
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?user_id=u1&limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = common::read_json(response).await;

    // Nothing is due yet, so the list is plain unseen words in store order.
    assert_eq!(common::word_ids(&body), ids);
}

#[tokio::test]
async fn study_list_skips_words_already_learned() {
    let (app, pool) = common::create_test_app().await;
    common::seed_numbered_words(&pool, 6).await;

    db::learned::mark_learned(
        &pool,
        "u1",
        &["w1".to_string(), "w2".to_string()],
        Utc::now().naive_utc(),
    )
    .await
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?user_id=u1&limit=3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = common::read_json(response).await;

    assert_eq!(
        common::word_ids(&body),
        vec!["w3".to_string(), "w4".to_string(), "w5".to_string()]
    );
}

#[tokio::test]
async fn study_list_falls_back_when_everything_is_learned() {
    let (app, pool) = common::create_test_app().await;
    let ids = common::seed_numbered_words(&pool, 5).await;

    db::learned::mark_learned(&pool, "u1", &ids, Utc::now().naive_utc())
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?user_id=u1&limit=4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = common::read_json(response).await;
    let returned = common::word_ids(&body);

    assert_eq!(returned.len(), 4);
    let unique: HashSet<&String> = returned.iter().collect();
    assert_eq!(unique.len(), 4);
}

#[tokio::test]
async fn study_list_marking_is_idempotent() {
    let (app, pool) = common::create_test_app().await;
    common::seed_numbered_words(&pool, 4).await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/vocabulary?user_id=u1&limit=4")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = common::read_json(response).await;
        assert_eq!(common::word_ids(&body).len(), 4);
    }

    let learned = db::learned::select_learned_ids(&pool, "u1").await.unwrap();
    assert_eq!(learned.len(), 4);
}

#[tokio::test]
async fn study_lists_are_per_user() {
    let (app, pool) = common::create_test_app().await;
    common::seed_numbered_words(&pool, 4).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/vocabulary?user_id=u1&limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = common::read_json(response).await;
    assert_eq!(
        common::word_ids(&body),
        vec!["w1".to_string(), "w2".to_string()]
    );

    // A different user starts from the top of the store.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/vocabulary?user_id=u2&limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = common::read_json(response).await;
    assert_eq!(
        common::word_ids(&body),
        vec!["w1".to_string(), "w2".to_string()]
    );

    assert_eq!(
        db::learned::select_learned_ids(&pool, "u1")
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        db::learned::select_learned_ids(&pool, "u2")
            .await
            .unwrap()
            .len(),
        2
    );
}
