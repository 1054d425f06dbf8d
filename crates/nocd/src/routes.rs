//! API routes for nocd
//!
//! The diagnose endpoint wraps every outcome in the success/error
//! envelope - internal failures become a structured failure response,
//! never a crash. The listing endpoint validates paging at the edge.

use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use noc_common::{DiagnoseResponse, HealthResponse, WorkOrderDetail, WorkOrderPage};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

type AppStateArc = Arc<AppState>;

/// Largest allowed page size.
const MAX_PAGE_SIZE: u64 = 100;

// ============================================================================
// Diagnose
// ============================================================================

pub fn diagnose_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/diagnose", get(diagnose))
}

#[derive(Debug, Deserialize)]
struct DiagnoseParams {
    /// Work order id, e.g. CMCC-GD-GZCL-20250628-000781
    work_order_id: String,
    /// Step at which the simulated failure is injected
    target_step: i64,
    /// Severity index applied at the target step
    error_index: i32,
}

async fn diagnose(
    State(state): State<AppStateArc>,
    Query(params): Query<DiagnoseParams>,
) -> Json<DiagnoseResponse> {
    info!(
        "diagnose {} step {} error {}",
        params.work_order_id, params.target_step, params.error_index
    );

    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || {
        engine.diagnose(&params.work_order_id, params.target_step, params.error_index)
    })
    .await;

    match outcome {
        Ok(Ok(inferences)) => Json(DiagnoseResponse::ok(inferences)),
        Ok(Err(err)) => {
            error!("diagnosis failed: {}", err);
            Json(DiagnoseResponse::failed(err.to_string()))
        }
        Err(err) => {
            error!("diagnosis task failed: {}", err);
            Json(DiagnoseResponse::failed("internal error".to_string()))
        }
    }
}

// ============================================================================
// Work Orders
// ============================================================================

pub fn work_order_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/work-orders", get(list_work_orders))
        .route("/v1/work-orders/:work_order_id", get(show_work_order))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
    #[serde(default)]
    keyword: String,
}

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    10
}

fn validate_paging(page: u64, size: u64) -> Result<(), (StatusCode, String)> {
    if page < 1 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "page must be at least 1".to_string(),
        ));
    }
    if size < 1 || size > MAX_PAGE_SIZE {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("size must be within 1..={}", MAX_PAGE_SIZE),
        ));
    }
    Ok(())
}

/// Row offset for a page, rejecting pages whose offset does not fit
/// in u64 (the multiply must never wrap or panic on absurd input).
fn listing_offset(page: u64, size: u64) -> Result<u64, (StatusCode, String)> {
    page.saturating_sub(1).checked_mul(size).ok_or_else(|| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            "page is out of range".to_string(),
        )
    })
}

async fn list_work_orders(
    State(state): State<AppStateArc>,
    Query(params): Query<ListParams>,
) -> Result<Json<WorkOrderPage>, (StatusCode, String)> {
    validate_paging(params.page, params.size)?;

    let store = Arc::clone(&state.store);
    let ListParams { page, size, keyword } = params;
    let offset = listing_offset(page, size)?;

    let (total, items) = tokio::task::spawn_blocking(move || store.list(&keyword, offset, size))
        .await
        .map_err(|err| {
            error!("listing task failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        })?
        .map_err(|err| {
            error!("work order listing failed: {:#}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        })?;

    Ok(Json(WorkOrderPage {
        total,
        page,
        size,
        total_pages: total.div_ceil(size),
        items,
    }))
}

async fn show_work_order(
    State(state): State<AppStateArc>,
    Path(work_order_id): Path<String>,
) -> Result<Json<WorkOrderDetail>, (StatusCode, String)> {
    let store = Arc::clone(&state.store);
    let id = work_order_id.clone();

    let order = tokio::task::spawn_blocking(move || store.fetch(&id))
        .await
        .map_err(|err| {
            error!("detail task failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        })?
        .map_err(|err| {
            error!("work order fetch failed: {:#}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        })?;

    let Some(order) = order else {
        return Err((
            StatusCode::NOT_FOUND,
            format!("work order '{}' not found", work_order_id),
        ));
    };

    let parsed_details = order.parsed_details();
    Ok(Json(WorkOrderDetail { order, parsed_details }))
}

// ============================================================================
// Health
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health))
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let mut rule_sets: Vec<String> = state
        .catalog
        .rule_set_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    rule_sets.sort();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        rule_sets,
    })
}
