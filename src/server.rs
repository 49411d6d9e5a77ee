//! MCP server lifecycle for stdio and HTTP transports.
//!
//! [`serve`] builds the memory backend once, before any client can connect, injects it
//! into every [`MemoryTools`] instance, runs the selected transport, and closes the
//! backend when the transport stops. A backend that cannot be built aborts startup.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::ServiceExt;

use crate::config::{ScopedMemoryConfig, Transport};
use crate::db;
use crate::embedding;
use crate::identity::middleware::user_id_middleware;
use crate::memory::{MemoryBackend, SqliteMemoryEngine};
use crate::tools::{MemoryService, MemoryTools};

/// Open the database and embedding provider and wrap them in the shared backend.
///
/// Blocking: loads model files and touches disk.
pub fn setup_backend(config: &ScopedMemoryConfig) -> Result<Arc<dyn MemoryBackend>> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let provider = embedding::create_provider(&config.embedding)?;
    let provider: Arc<dyn embedding::EmbeddingProvider> = Arc::from(provider);
    tracing::info!(provider = %config.embedding.provider, model = %provider.model_name(), "embedding provider ready");

    let engine = SqliteMemoryEngine::new(conn, provider, config.storage.dedup_threshold)?;
    Ok(Arc::new(engine))
}

/// Run the server on `transport` until the client disconnects (stdio) or ctrl-c (HTTP).
pub async fn serve(config: ScopedMemoryConfig, transport: Transport) -> Result<()> {
    config.validate()?;
    let default_user = config.default_user_id()?;
    let bind_addr = config.bind_addr();

    let backend = tokio::task::spawn_blocking(move || setup_backend(&config))
        .await
        .context("backend setup task failed")??;

    let service = MemoryService::new(Arc::clone(&backend), default_user.clone());
    tracing::info!(default_user = %default_user, transport = %transport, "memory service ready");

    let outcome = match transport {
        Transport::Stdio => serve_stdio(service).await,
        Transport::Sse | Transport::StreamableHttp => {
            serve_http(service, transport, &bind_addr).await
        }
    };

    release_backend(backend).await;
    outcome
}

async fn serve_stdio(service: MemoryService) -> Result<()> {
    tracing::info!("starting MCP server on stdio (single-user mode)");

    let server = MemoryTools::new(service)
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP server over stdio")?;
    tracing::info!("MCP server running — waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");
    Ok(())
}

async fn serve_http(service: MemoryService, transport: Transport, bind_addr: &str) -> Result<()> {
    let router = build_router(service, transport);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(
        addr = %bind_addr,
        transport = %transport,
        "MCP server listening at http://{bind_addr}/mcp (multi-user mode)"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// HTTP routes: the MCP endpoint at `/mcp` and `/health`, all behind the identity
/// header middleware.
///
/// `Transport::Sse` keeps stateful sessions with a server event stream;
/// `Transport::StreamableHttp` answers each POST statelessly.
pub fn build_router(service: MemoryService, transport: Transport) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(MemoryTools::new(service.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: transport == Transport::Sse,
            ..Default::default()
        },
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", mcp)
        .layer(axum::middleware::from_fn(user_id_middleware))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down HTTP server");
}

/// Close the backend on the blocking pool; the last handle is dropped there too.
async fn release_backend(backend: Arc<dyn MemoryBackend>) {
    let closed = tokio::task::spawn_blocking(move || backend.close()).await;
    match closed {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "failed to close memory store cleanly"),
        Err(e) => tracing::warn!(error = %e, "memory store close task failed"),
    }
}
