//! Wire schemas shared between the daemon and the CLI client

use crate::diagnosis::Inference;
use crate::work_order::WorkOrder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope for `/v1/diagnose`. Unexpected internal failures surface
/// here as `success = false` with the message; the daemon never turns
/// them into a crash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnoseResponse {
    pub success: bool,
    pub error: String,
    pub data: Vec<Inference>,
}

impl DiagnoseResponse {
    pub fn ok(data: Vec<Inference>) -> Self {
        Self {
            success: true,
            error: String::new(),
            data,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            error,
            data: Vec::new(),
        }
    }
}

/// One page of the work-order listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderPage {
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub total_pages: u64,
    pub items: Vec<WorkOrder>,
}

/// One work order with its details blob expanded, for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderDetail {
    pub order: WorkOrder,
    /// Structured details; `None` when the blob has no structure
    pub parsed_details: Option<Map<String, Value>>,
}

/// Daemon health snapshot for `/v1/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub rule_sets: Vec<String>,
}
