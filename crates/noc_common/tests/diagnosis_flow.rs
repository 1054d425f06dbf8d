//! End-to-end replay against synthetic collaborators
//!
//! Covers the full path: classification, template resolution with
//! structured lookups, measurement evaluation (including a catalog
//! that wires the live optical measurement into a rule set), and
//! solution document resolution.

use noc_common::catalog::{
    MeasurementKind, MeasurementRef, RuleCatalog, RuleCatalogConfig, OPTICAL_POWER, RULE_SET_CELL,
};
use noc_common::measurement::{OpticalPortReading, OpticalReadingSource};
use noc_common::placeholder::StructuredLookup;
use noc_common::solution::SolutionStore;
use noc_common::work_order::{WorkOrder, WorkOrderStore};
use noc_common::DiagnosisEngine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

struct MemoryStore(HashMap<String, WorkOrder>);

impl WorkOrderStore for MemoryStore {
    fn fetch(&self, work_order_id: &str) -> anyhow::Result<Option<WorkOrder>> {
        Ok(self.0.get(work_order_id).cloned())
    }

    fn list(&self, _: &str, _: u64, _: u64) -> anyhow::Result<(u64, Vec<WorkOrder>)> {
        Ok((0, Vec::new()))
    }
}

struct ReadingTable(HashMap<String, Vec<OpticalPortReading>>);

impl OpticalReadingSource for ReadingTable {
    fn fetch_readings(&self, ne_name: &str) -> anyhow::Result<Vec<OpticalPortReading>> {
        Ok(self.0.get(ne_name).cloned().unwrap_or_default())
    }
}

struct LookupTable(HashMap<String, Value>);

impl StructuredLookup for LookupTable {
    fn fetch(&self, token: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.0.get(token).cloned())
    }
}

struct DocTable(HashMap<String, String>);

impl SolutionStore for DocTable {
    fn fetch_document(&self, code: &str) -> anyhow::Result<Option<String>> {
        Ok(self.0.get(code).cloned())
    }
}

fn cell_order() -> WorkOrder {
    WorkOrder {
        work_order_id: "CMCC-GD-GZCL-20250429-009158".to_string(),
        gj00008: Some("小区退服".to_string()),
        gj00010: Some("南头机房".to_string()),
        gj00011: Some("中兴".to_string()),
        gj00014: Some("南头站宏站NT-01".to_string()),
        ne_name: Some("南头站宏站NT-01".to_string()),
        ..Default::default()
    }
}

/// Default catalog, except the cell rule set's last step consults the
/// live optical measurement instead of the static table.
fn catalog_with_optical_step() -> RuleCatalog {
    let mut config = RuleCatalogConfig::default();
    let cell = config
        .rule_sets
        .iter_mut()
        .find(|rs| rs.name == RULE_SET_CELL)
        .unwrap();
    cell.steps.last_mut().unwrap().measurement = MeasurementRef {
        kind: MeasurementKind::Numeric,
        name: OPTICAL_POWER.to_string(),
    };
    RuleCatalog::from_config(config).unwrap()
}

fn engine(
    catalog: RuleCatalog,
    readings: HashMap<String, Vec<OpticalPortReading>>,
    docs: HashMap<String, String>,
) -> DiagnosisEngine {
    let mut lookups = HashMap::new();
    lookups.insert(
        "JT00012".to_string(),
        json!({"room_id": "002017032644148100001082", "room_name": "南头机房"}),
    );
    lookups.insert(
        "JT00013".to_string(),
        json!({"station_id": "440106040010002750", "station_name": "南头站"}),
    );

    DiagnosisEngine::new(
        Arc::new(catalog),
        Arc::new(MemoryStore(
            [(cell_order().work_order_id.clone(), cell_order())]
                .into_iter()
                .collect(),
        )),
        Arc::new(ReadingTable(readings)),
        Arc::new(LookupTable(lookups)),
        Arc::new(DocTable(docs)),
    )
}

#[test]
fn optical_step_with_clean_readings_points_at_rru() {
    let engine = engine(catalog_with_optical_step(), HashMap::new(), HashMap::new());
    let result = engine
        .diagnose("CMCC-GD-GZCL-20250429-009158", 5, 1)
        .unwrap();

    assert_eq!(result.len(), 5);
    let target = &result[4];
    assert_eq!(target.conclusion, "RRU端故障");
    assert_eq!(target.solution_code, "FA00007");
}

#[test]
fn optical_step_with_anomalous_reading_reports_port_details() {
    let mut readings = HashMap::new();
    readings.insert(
        "南头站宏站NT-01".to_string(),
        vec![OpticalPortReading {
            ne_name: "南头站宏站NT-01".to_string(),
            port: "0".to_string(),
            board_name: "MRRU".to_string(),
            slot_id: "60".to_string(),
            input_power: "-42.3".to_string(),
            output_power: "-3.1".to_string(),
        }],
    );

    let mut docs = HashMap::new();
    docs.insert(
        "FA00001".to_string(),
        "检查尾纤连接，必要时更换光模块".to_string(),
    );

    let engine = engine(catalog_with_optical_step(), readings, docs);
    let result = engine
        .diagnose("CMCC-GD-GZCL-20250429-009158", 5, 1)
        .unwrap();

    let target = &result[4];
    assert!(target.conclusion.starts_with("光模块、尾纤、传输故障("));
    assert!(target.conclusion.contains("端口0（板卡MRRU，槽位60）"));
    assert_eq!(target.solution_code, "FA00001");
    assert_eq!(target.solution_content, "检查尾纤连接，必要时更换光模块");
}

#[test]
fn default_catalog_cell_scenario_with_solution_documents() {
    let mut docs = HashMap::new();
    docs.insert("FA00001".to_string(), "安排代维上站排查RRU".to_string());

    let engine = engine(RuleCatalog::with_defaults(), HashMap::new(), docs);
    let result = engine
        .diagnose("CMCC-GD-GZCL-20250429-009158", 5, 5)
        .unwrap();

    assert_eq!(result.len(), 5);
    let target = &result[4];
    assert_eq!(target.conclusion, "RRU端故障");
    assert_eq!(target.solution_code, "FA00001");
    assert_eq!(target.solution_content, "安排代维上站排查RRU");

    // Pre-target steps read normal, and their solution text stays empty
    for inference in &result[..4] {
        assert!(inference.conclusion.is_empty());
        assert!(inference.solution_content.is_empty());
    }
}

#[test]
fn structured_lookup_flows_into_templates() {
    let engine = engine(RuleCatalog::with_defaults(), HashMap::new(), HashMap::new());
    let result = engine
        .diagnose("CMCC-GD-GZCL-20250429-009158", 5, 0)
        .unwrap();

    // Step descriptions resolved GJ fields; no bare tokens remain for
    // fields present on the order
    assert!(result[0].description.contains("南头站宏站NT-01"));
    assert!(!result[0].description.contains("GJ00014"));
}

#[test]
fn target_beyond_length_clamps_and_fully_populates() {
    let engine = engine(RuleCatalog::with_defaults(), HashMap::new(), HashMap::new());
    let result = engine
        .diagnose("CMCC-GD-GZCL-20250429-009158", 40, 2)
        .unwrap();

    assert_eq!(result.len(), 5);
    // Step 5 is the clamped target; RRU_LINK index 2
    assert_eq!(result[4].conclusion, "光模块、尾纤、传输故障");
    assert_eq!(result[4].solution_code, "FA00007");
    for inference in &result[..4] {
        assert!(!inference.description.is_empty());
    }
}
