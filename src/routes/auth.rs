use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, NaiveDateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::response::{db_error, json_error, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    email: String,
    code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    username: Option<String>,
    password: String,
}

#[derive(Serialize)]
struct DetailResponse {
    detail: &'static str,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();

    if identity_taken(pool, &payload.username, &payload.email)
        .await
        .map_err(db_error)?
    {
        return Err(conflict_error());
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST).map_err(|err| {
        tracing::warn!(error = %err, "password hashing failed");
        AppError::internal("password hashing failed")
    })?;

    let now = Utc::now().naive_utc();
    let user_id = Uuid::new_v4().to_string();
    insert_user(
        pool,
        &user_id,
        &payload.username,
        &payload.email,
        &password_hash,
        now,
    )
    .await
    .map_err(|err| {
        // Two concurrent registrations can both pass the existence check;
        // the unique index settles it.
        if is_unique_violation(&err) {
            conflict_error()
        } else {
            db_error(err)
        }
    })?;

    let code = generate_verification_code();
    let expires_at = now + Duration::minutes(state.code_ttl_minutes());
    insert_verification_code(pool, &user_id, &payload.email, &code, expires_at, now)
        .await
        .map_err(db_error)?;

    let mailer = state.mailer().clone();
    let ttl_minutes = state.code_ttl_minutes();
    let email = payload.email.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send_verification_code(&email, &code, ttl_minutes).await {
            tracing::warn!(error = %err, %email, "verification email send failed");
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(DetailResponse {
            detail: "Verification code sent to your email",
        }),
    ))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();

    let Some(record) = select_verification_code(pool, &payload.email, &payload.code)
        .await
        .map_err(db_error)?
    else {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_CODE",
            "Invalid code",
        ));
    };

    if record.expires_at < Utc::now().naive_utc() {
        delete_verification_code(pool, &record.id)
            .await
            .map_err(db_error)?;
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "CODE_EXPIRED",
            "Code has expired",
        ));
    }

    mark_email_verified(pool, &record.user_id)
        .await
        .map_err(db_error)?;
    delete_verification_code(pool, &record.id)
        .await
        .map_err(db_error)?;

    Ok(Json(DetailResponse {
        detail: "Email verified successfully",
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();

    // Email wins when both identifiers are present.
    let user = if let Some(email) = payload.email.as_deref().filter(|v| !v.is_empty()) {
        select_user_by_email(pool, email).await.map_err(db_error)?
    } else if let Some(username) = payload.username.as_deref().filter(|v| !v.is_empty()) {
        select_user_by_username(pool, username)
            .await
            .map_err(db_error)?
    } else {
        return Err(AppError::validation("email or username is required"));
    };

    let Some(user) = user else {
        return Err(invalid_credentials());
    };

    // The verification gate answers before the password is even checked.
    if !user.email_verified {
        return Err(json_error(
            StatusCode::FORBIDDEN,
            "EMAIL_NOT_VERIFIED",
            "Email not verified",
        ));
    }

    let password_ok = bcrypt::verify(&payload.password, &user.password_hash).unwrap_or(false);
    if !password_ok {
        return Err(invalid_credentials());
    }

    Ok(Json(DetailResponse {
        detail: "Login successful",
    }))
}

/// Six lowercase hex characters, enough for a short-lived one-shot code.
fn generate_verification_code() -> String {
    let bytes: [u8; 3] = rand::rng().random();
    hex::encode(bytes)
}

fn conflict_error() -> AppError {
    json_error(
        StatusCode::BAD_REQUEST,
        "CONFLICT",
        "Username or email already exists",
    )
}

fn invalid_credentials() -> AppError {
    json_error(
        StatusCode::UNAUTHORIZED,
        "INVALID_CREDENTIALS",
        "Invalid email or password",
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}

struct StoredUser {
    password_hash: String,
    email_verified: bool,
}

struct StoredCode {
    id: String,
    user_id: String,
    expires_at: NaiveDateTime,
}

async fn identity_taken(
    pool: &SqlitePool,
    username: &str,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(r#"SELECT "id" FROM "users" WHERE "username" = $1 OR "email" = $2 LIMIT 1"#)
        .bind(username)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

async fn insert_user(
    pool: &SqlitePool,
    id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
    now: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "users" ("id", "username", "email", "passwordHash", "emailVerified", "createdAt")
        VALUES ($1, $2, $3, $4, 0, $5)
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

async fn insert_verification_code(
    pool: &SqlitePool,
    user_id: &str,
    email: &str,
    code: &str,
    expires_at: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "verification_codes" ("id", "userId", "email", "code", "expiresAt", "createdAt")
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(email)
    .bind(code)
    .bind(expires_at)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

async fn select_verification_code(
    pool: &SqlitePool,
    email: &str,
    code: &str,
) -> Result<Option<StoredCode>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT "id", "userId", "expiresAt"
        FROM "verification_codes"
        WHERE "email" = $1 AND "code" = $2
        LIMIT 1
        "#,
    )
    .bind(email)
    .bind(code)
    .fetch_optional(pool)
    .await?;

    row.map(|row| {
        Ok(StoredCode {
            id: row.try_get("id")?,
            user_id: row.try_get("userId")?,
            expires_at: row.try_get("expiresAt")?,
        })
    })
    .transpose()
}

async fn delete_verification_code(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM "verification_codes" WHERE "id" = $1"#)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn mark_email_verified(pool: &SqlitePool, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"UPDATE "users" SET "emailVerified" = 1 WHERE "id" = $1"#)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn select_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<StoredUser>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "passwordHash", "emailVerified" FROM "users" WHERE "email" = $1 LIMIT 1"#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    row.map(user_from_row).transpose()
}

async fn select_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<StoredUser>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "passwordHash", "emailVerified" FROM "users" WHERE "username" = $1 LIMIT 1"#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    row.map(user_from_row).transpose()
}

fn user_from_row(row: sqlx::sqlite::SqliteRow) -> Result<StoredUser, sqlx::Error> {
    Ok(StoredUser {
        password_hash: row.try_get("passwordHash")?,
        email_verified: row.try_get("emailVerified")?,
    })
}
