use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use kupu_backend::config::Config;
use kupu_backend::services::mailer::EmailService;
use kupu_backend::state::AppState;
use kupu_backend::{db, logging, routes, seed};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let pool = match db::init_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "database init failed");
            return;
        }
    };

    // No requests before the word store is populated.
    if let Err(err) = seed::seed_words_if_empty(&pool).await {
        tracing::error!(error = %err, "word seeding failed");
        return;
    }

    let mailer = EmailService::from_env();
    if mailer.is_available() {
        tracing::info!(provider = ?mailer.provider_type(), "email provider ready");
    } else {
        tracing::warn!("email provider not configured, verification codes will not be delivered");
    }

    let state = AppState::new(
        pool,
        Arc::new(mailer),
        config.verification_code_ttl_minutes,
    );

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    tracing::info!(%addr, "kupu-backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
