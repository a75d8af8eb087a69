//! Wiring: storage backends, the router, and the listener.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use loan_core::ReportRepository;
use loan_core::db::{DbConfig, RepositoryRegistry};
use loan_db_sqlite::SqliteRepositoryFactory;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::routes::api_router;
use crate::state::AppState;

/// Every storage backend this binary can open.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Opens the configured backend, running its migrations.
pub async fn open_repository(config: &DbConfig) -> Result<Arc<dyn ReportRepository>> {
    let repo = build_registry()
        .create(config)
        .await
        .with_context(|| {
            format!(
                "cannot open {} database '{}'",
                config.backend, config.connection_string
            )
        })?;
    Ok(Arc::from(repo))
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves the API until the process is stopped.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let repo = open_repository(&config.database).await?;
    let state = AppState::new(repo, &config.wizard);

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.listen_addr()))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    info!(%addr, jump_policy = ?config.wizard.jump_policy(), "listening");

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
