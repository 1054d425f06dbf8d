//! HTTP server for nocd

use crate::routes;
use anyhow::Result;
use axum::Router;
use noc_common::catalog::RuleCatalog;
use noc_common::work_order::WorkOrderStore;
use noc_common::DiagnosisEngine;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers. Everything inside is
/// read-only or internally synchronized, so handlers never lock.
pub struct AppState {
    pub engine: Arc<DiagnosisEngine>,
    pub store: Arc<dyn WorkOrderStore>,
    pub catalog: Arc<RuleCatalog>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        engine: Arc<DiagnosisEngine>,
        store: Arc<dyn WorkOrderStore>,
        catalog: Arc<RuleCatalog>,
    ) -> Self {
        Self {
            engine,
            store,
            catalog,
            start_time: Instant::now(),
        }
    }
}

/// Run the HTTP server until the process is stopped.
pub async fn run(state: AppState, listen_addr: &str) -> Result<()> {
    let state = Arc::new(state);

    let app = Router::new()
        .merge(routes::diagnose_routes())
        .merge(routes::work_order_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("listening on http://{}", listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
