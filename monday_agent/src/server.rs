//! HTTP endpoint. Every path and method answers with a fresh snapshot.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::metrics::collect;
use crate::state::AppState;
use crate::types::Snapshot;

pub fn router(state: AppState) -> Router {
    Router::new().fallback(stats_handler).with_state(state)
}

async fn stats_handler(State(state): State<AppState>) -> Response {
    let AppState { source, top_n } = state;
    // sysinfo scans block; keep them off the async workers.
    let snapshot = match tokio::task::spawn_blocking(move || collect(source.as_ref(), top_n)).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("collection task failed: {e}");
            Snapshot::unavailable()
        }
    };
    Json(snapshot).into_response()
}

/// Serve on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

/// Bind `0.0.0.0:port` and serve host metrics from sysinfo.
pub async fn run(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("monday agent listening on http://{}", listener.local_addr()?);
    serve(listener, AppState::default()).await?;
    Ok(())
}
