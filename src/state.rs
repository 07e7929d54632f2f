use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::mailer::EmailService;

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    mailer: Arc<EmailService>,
    code_ttl_minutes: i64,
}

impl AppState {
    pub fn new(pool: SqlitePool, mailer: Arc<EmailService>, code_ttl_minutes: i64) -> Self {
        Self {
            pool,
            mailer,
            code_ttl_minutes,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn mailer(&self) -> &Arc<EmailService> {
        &self.mailer
    }

    pub fn code_ttl_minutes(&self) -> i64 {
        self.code_ttl_minutes
    }
}
