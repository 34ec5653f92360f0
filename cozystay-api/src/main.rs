use anyhow::Context;
use cozystay_api::{app, AppState, HttpConfig, SessionAuthenticator};
use cozystay_store::{
    app_config::Config, DbClient, InMemoryStore, PgBookingRepository, PgReviewRepository,
    PgRoomRepository,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cozystay_api=debug,cozystay_booking=info,cozystay_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting CozyStay API on port {}", config.server.port);

    let sessions = SessionAuthenticator::new(
        &config.auth.jwt_secret,
        config.auth.jwt_expiration_seconds,
        config.auth.cookie_name.clone(),
    );
    let http = HttpConfig {
        allowed_origins: config.server.allowed_origins.clone(),
        request_timeout: Duration::from_secs(config.server.request_timeout_seconds),
    };

    // Postgres pool, or the non-durable store for local runs
    let db = if config.database.is_memory() {
        tracing::warn!("Using in-memory store; data is lost on exit");
        None
    } else {
        let db = DbClient::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        db.migrate().await.context("Failed to run migrations")?;
        Some(db)
    };

    let app_state = match &db {
        Some(db) => AppState::new(
            Arc::new(PgRoomRepository::new(db.pool.clone())),
            Arc::new(PgBookingRepository::new(db.pool.clone())),
            Arc::new(PgReviewRepository::new(db.pool.clone())),
            sessions,
            http,
        ),
        None => AppState::from_store(Arc::new(InMemoryStore::new()), sessions, http),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(db) = db {
        db.close().await;
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
