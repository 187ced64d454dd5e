use std::{sync::Arc, time::Duration};

use axum::{extract::DefaultBodyLimit, Extension, Router};
use catalog_storage::book::BookStore;
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::routes;
use crate::sessions::BoundedMemoryStore;
use crate::types::{AppConfig, MAX_UPLOAD_BYTES};

/// Idle time after which a session is dropped
const SESSION_IDLE_HOURS: i64 = 12;

/// Builds the application with every layer, ready to be served
///
/// Sessions live in process memory and travel in a signed cookie.
pub fn router(config: Arc<AppConfig>, store: Arc<dyn BookStore>) -> Router {
    router_with_sessions(config, store, BoundedMemoryStore::default())
}

/// Same as [`router`], keeping sessions in the given store
pub fn router_with_sessions(
    config: Arc<AppConfig>,
    store: Arc<dyn BookStore>,
    sessions: BoundedMemoryStore,
) -> Router {
    let sessions = SessionManagerLayer::new(sessions)
        .with_signed(config.session_key())
        .with_secure(config.environment.secure_cookies())
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            SESSION_IDLE_HOURS,
        )));

    routes::handler()
        .layer(Extension(config))
        .layer(Extension(store))
        .layer(sessions)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

/// Starts the server with the given configuration and book store
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(config: Arc<AppConfig>, store: Arc<dyn BookStore>) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let environment = config.environment;
    let router = router(config, store);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(?environment, "📚 Biblioteca started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
