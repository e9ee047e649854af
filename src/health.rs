//! Health check endpoint for platforms that require an HTTP probe.
//!
//! Both routes always answer `200 OK`. The body carries a fresh course count
//! so an unreadable catalog shows up as `courses=0` without failing the probe.

use anyhow::Result;
use axum::{extract::State, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::CatalogLoader;

/// Build the health router
pub fn router(loader: Arc<CatalogLoader>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .with_state(loader)
}

/// Liveness probe with a catalog count diagnostic
async fn health(State(loader): State<Arc<CatalogLoader>>) -> String {
    let count = loader.snapshot().await.len();
    debug!(courses = count, "Health probe");
    format!("ok | courses={count}")
}

/// Serve the health router until the listener fails
pub async fn serve(port: u16, loader: Arc<CatalogLoader>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("HTTP health endpoint listening on {}", addr);

    axum::serve(listener, router(loader)).await?;
    Ok(())
}
