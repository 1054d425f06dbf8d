//! Measurement Evaluator - turns an error index into a verdict
//!
//! Enumerated measurements index into a static content table with
//! clamping; the live optical-power measurement instead consults
//! per-port readings for the work order's network element. Error index
//! 0 is always "normal"; -1 skips the optical evaluation entirely.

use crate::catalog::{MeasurementKind, MeasurementRef, RuleCatalog, OPTICAL_POWER};
use crate::error::CatalogError;
use crate::work_order::WorkOrder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Error index sentinel: skip the optical evaluation.
pub const SKIP_SENTINEL: i32 = -1;

/// Received (input) optical power floor, dBm. Readings below point to
/// the fiber/optics side. Threshold direction carried over from the
/// deployed configuration.
pub const INPUT_POWER_FLOOR_DBM: f64 = -35.0;

/// Transmitted (output) optical power floor, dBm.
pub const OUTPUT_POWER_FLOOR_DBM: f64 = -15.0;

/// Conclusion when any port reading violates a floor.
pub const CONCLUSION_OPTICAL_FAULT: &str = "光模块、尾纤、传输故障";
/// Solution family for fiber/optics/transport faults.
pub const SOLUTION_OPTICAL_FAULT: &str = "FA00001";

/// Conclusion when no reading is anomalous: the fault sits on the RRU
/// side, not the measured link.
pub const CONCLUSION_RRU_FAULT: &str = "RRU端故障";
/// Solution family for RRU-side faults.
pub const SOLUTION_RRU_FAULT: &str = "FA00007";

/// One per-port optical reading for a network element. Power values
/// arrive as raw strings and are parsed best effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpticalPortReading {
    pub ne_name: String,
    pub port: String,
    pub board_name: String,
    pub slot_id: String,
    pub input_power: String,
    pub output_power: String,
}

/// Live optical-reading collaborator, queried per network element.
pub trait OpticalReadingSource: Send + Sync {
    /// Possibly-empty reading list; unknown elements yield `Ok(vec![])`.
    fn fetch_readings(&self, ne_name: &str) -> anyhow::Result<Vec<OpticalPortReading>>;
}

/// Conclusion/solution pair for one evaluated step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub conclusion: String,
    pub solution_code: String,
}

impl Verdict {
    /// The explicit "no fault / nothing to report" verdict.
    pub fn normal() -> Self {
        Self {
            conclusion: String::new(),
            solution_code: String::new(),
        }
    }
}

/// Evaluates measurement references against the catalog and the live
/// reading source. Stateless between calls.
pub struct MeasurementEvaluator {
    catalog: Arc<RuleCatalog>,
    readings: Arc<dyn OpticalReadingSource>,
}

impl MeasurementEvaluator {
    pub fn new(catalog: Arc<RuleCatalog>, readings: Arc<dyn OpticalReadingSource>) -> Self {
        Self { catalog, readings }
    }

    /// Evaluate one measurement at the applied error index.
    ///
    /// Catalog misses propagate (configuration error); reading-source
    /// I/O failures degrade to "no readings" with a warning.
    pub fn evaluate(
        &self,
        measurement: &MeasurementRef,
        error_index: i32,
        order: &WorkOrder,
    ) -> Result<Verdict, CatalogError> {
        match measurement.kind {
            MeasurementKind::Enumerated => self.evaluate_enumerated(&measurement.name, error_index),
            MeasurementKind::Numeric if measurement.name == OPTICAL_POWER => {
                Ok(self.evaluate_optical(error_index, order))
            }
            MeasurementKind::Numeric => self.evaluate_numeric(&measurement.name, error_index),
        }
    }

    /// Enumerated: 0 is the normal sentinel and never touches the
    /// table; any other index clamps into [1, len] and picks the
    /// content at that 1-based position. Out-of-range severities
    /// degrade to the nearest defined one instead of erroring - this
    /// is an operator aid, not a validator.
    fn evaluate_enumerated(&self, name: &str, error_index: i32) -> Result<Verdict, CatalogError> {
        if error_index == 0 {
            return Ok(Verdict::normal());
        }

        let entry = self.catalog.enumerated(name)?;
        // contents validated non-empty at catalog load
        let len = entry.contents.len() as i32;
        let index = error_index.clamp(1, len);
        let content = &entry.contents[(index - 1) as usize];

        Ok(Verdict {
            conclusion: content.conclusion.clone(),
            solution_code: content.solution_code.clone(),
        })
    }

    /// Live optical-power check: collect per-port floor violations for
    /// the order's network element. Any anomaly points to the
    /// fiber/optics side; a clean (or empty) reading list points to
    /// the RRU side - absence of anomalies is a conclusion, not
    /// missing data.
    fn evaluate_optical(&self, error_index: i32, order: &WorkOrder) -> Verdict {
        if error_index == SKIP_SENTINEL {
            return Verdict::normal();
        }

        let ne_name = order.ne_name.as_deref().unwrap_or("");
        let readings = match self.readings.fetch_readings(ne_name) {
            Ok(readings) => readings,
            Err(err) => {
                warn!("optical readings for '{}' unavailable: {:#}", ne_name, err);
                Vec::new()
            }
        };

        let mut anomalies = Vec::new();
        for reading in &readings {
            if let Some(power) = parse_power(&reading.input_power) {
                if power < INPUT_POWER_FLOOR_DBM {
                    anomalies.push(format!(
                        "端口{}（板卡{}，槽位{}）收光功率低于下限：{}dBm",
                        reading.port, reading.board_name, reading.slot_id, power
                    ));
                }
            }
            if let Some(power) = parse_power(&reading.output_power) {
                if power < OUTPUT_POWER_FLOOR_DBM {
                    anomalies.push(format!(
                        "端口{}（板卡{}，槽位{}）发光功率低于下限：{}dBm",
                        reading.port, reading.board_name, reading.slot_id, power
                    ));
                }
            }
            // unparsable values are skipped, other readings still count
        }

        if anomalies.is_empty() {
            Verdict {
                conclusion: CONCLUSION_RRU_FAULT.to_string(),
                solution_code: SOLUTION_RRU_FAULT.to_string(),
            }
        } else {
            Verdict {
                conclusion: format!("{}({})", CONCLUSION_OPTICAL_FAULT, anomalies.join("；")),
                solution_code: SOLUTION_OPTICAL_FAULT.to_string(),
            }
        }
    }

    /// Static numeric descriptors: the index is compared against the
    /// descriptor's bounds; in-bounds reads as the normal label. These
    /// carry no solution code of their own. The descriptor must exist
    /// even for the normal sentinel; a missing one is a catalog gap,
    /// not a normal reading.
    fn evaluate_numeric(&self, name: &str, error_index: i32) -> Result<Verdict, CatalogError> {
        let entry = self.catalog.numeric(name)?;
        if error_index == 0 {
            return Ok(Verdict::normal());
        }
        let label = if error_index >= entry.low && error_index <= entry.high {
            &entry.normal_label
        } else {
            &entry.error_label
        };

        Ok(Verdict {
            conclusion: label.clone(),
            solution_code: String::new(),
        })
    }
}

/// Parse a raw power value ("-36.5", "-36.5dBm", " -12 dBm "). `None`
/// is the explicit "unparsable, skip this value" signal.
fn parse_power(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_end_matches("dBm").trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RuleCatalog;

    struct NoReadings;

    impl OpticalReadingSource for NoReadings {
        fn fetch_readings(&self, _ne_name: &str) -> anyhow::Result<Vec<OpticalPortReading>> {
            Ok(Vec::new())
        }
    }

    struct FixedReadings(Vec<OpticalPortReading>);

    impl OpticalReadingSource for FixedReadings {
        fn fetch_readings(&self, _ne_name: &str) -> anyhow::Result<Vec<OpticalPortReading>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenReadings;

    impl OpticalReadingSource for BrokenReadings {
        fn fetch_readings(&self, _ne_name: &str) -> anyhow::Result<Vec<OpticalPortReading>> {
            anyhow::bail!("reading service down")
        }
    }

    fn evaluator(readings: Arc<dyn OpticalReadingSource>) -> MeasurementEvaluator {
        MeasurementEvaluator::new(Arc::new(RuleCatalog::with_defaults()), readings)
    }

    fn enumerated(name: &str) -> MeasurementRef {
        MeasurementRef {
            kind: MeasurementKind::Enumerated,
            name: name.to_string(),
        }
    }

    fn optical() -> MeasurementRef {
        MeasurementRef {
            kind: MeasurementKind::Numeric,
            name: OPTICAL_POWER.to_string(),
        }
    }

    fn reading(port: &str, input: &str, output: &str) -> OpticalPortReading {
        OpticalPortReading {
            ne_name: "NE-1".to_string(),
            port: port.to_string(),
            board_name: "MRRU".to_string(),
            slot_id: "2".to_string(),
            input_power: input.to_string(),
            output_power: output.to_string(),
        }
    }

    #[test]
    fn test_enumerated_zero_is_normal_sentinel() {
        let eval = evaluator(Arc::new(NoReadings));
        let verdict = eval
            .evaluate(&enumerated("RRU_LINK"), 0, &WorkOrder::default())
            .unwrap();
        assert_eq!(verdict, Verdict::normal());
    }

    #[test]
    fn test_enumerated_picks_one_based_position() {
        let eval = evaluator(Arc::new(NoReadings));
        let verdict = eval
            .evaluate(&enumerated("RRU_LINK"), 2, &WorkOrder::default())
            .unwrap();
        assert_eq!(verdict.conclusion, "光模块、尾纤、传输故障");
        assert_eq!(verdict.solution_code, "FA00007");
    }

    #[test]
    fn test_enumerated_clamps_low_and_high() {
        let eval = evaluator(Arc::new(NoReadings));
        let order = WorkOrder::default();

        let low = eval.evaluate(&enumerated("RRU_LINK"), -3, &order).unwrap();
        let first = eval.evaluate(&enumerated("RRU_LINK"), 1, &order).unwrap();
        assert_eq!(low, first);

        let high = eval.evaluate(&enumerated("RRU_LINK"), 42, &order).unwrap();
        let last = eval.evaluate(&enumerated("RRU_LINK"), 5, &order).unwrap();
        assert_eq!(high, last);
        assert_eq!(last.conclusion, "RRU端故障");
        assert_eq!(last.solution_code, "FA00001");
    }

    #[test]
    fn test_enumerated_unknown_table_is_catalog_error() {
        let eval = evaluator(Arc::new(NoReadings));
        let result = eval.evaluate(&enumerated("MISSING"), 1, &WorkOrder::default());
        assert!(matches!(result, Err(CatalogError::MeasurementNotFound(_))));
    }

    #[test]
    fn test_optical_skip_sentinel() {
        let eval = evaluator(Arc::new(FixedReadings(vec![reading("0", "-40.0", "-20.0")])));
        let verdict = eval
            .evaluate(&optical(), SKIP_SENTINEL, &WorkOrder::default())
            .unwrap();
        assert_eq!(verdict, Verdict::normal());
    }

    #[test]
    fn test_optical_no_anomalies_points_at_rru() {
        let eval = evaluator(Arc::new(NoReadings));
        let verdict = eval.evaluate(&optical(), 1, &WorkOrder::default()).unwrap();
        assert_eq!(verdict.conclusion, CONCLUSION_RRU_FAULT);
        assert_eq!(verdict.solution_code, SOLUTION_RRU_FAULT);
    }

    #[test]
    fn test_optical_healthy_readings_point_at_rru() {
        let eval = evaluator(Arc::new(FixedReadings(vec![reading("0", "-20.1", "-3.2")])));
        let verdict = eval.evaluate(&optical(), 1, &WorkOrder::default()).unwrap();
        assert_eq!(verdict.conclusion, CONCLUSION_RRU_FAULT);
    }

    #[test]
    fn test_optical_anomaly_formats_port_details() {
        let eval = evaluator(Arc::new(FixedReadings(vec![
            reading("0", "-41.5", "-3.0"),
            reading("1", "-20.0", "-18.0"),
        ])));
        let verdict = eval.evaluate(&optical(), 2, &WorkOrder::default()).unwrap();

        assert!(verdict.conclusion.starts_with("光模块、尾纤、传输故障("));
        assert!(verdict.conclusion.contains("端口0（板卡MRRU，槽位2）收光功率低于下限：-41.5dBm"));
        assert!(verdict.conclusion.contains("端口1（板卡MRRU，槽位2）发光功率低于下限：-18dBm"));
        assert_eq!(verdict.solution_code, SOLUTION_OPTICAL_FAULT);
    }

    #[test]
    fn test_optical_unparsable_reading_skipped() {
        let eval = evaluator(Arc::new(FixedReadings(vec![
            reading("0", "n/a", "--"),
            reading("1", "-50.0dBm", "-3.0"),
        ])));
        let verdict = eval.evaluate(&optical(), 1, &WorkOrder::default()).unwrap();

        // The broken reading is ignored; the parsable anomaly still counts
        assert!(verdict.conclusion.contains("端口1"));
        assert!(!verdict.conclusion.contains("端口0"));
    }

    #[test]
    fn test_optical_source_failure_degrades_to_rru() {
        let eval = evaluator(Arc::new(BrokenReadings));
        let verdict = eval.evaluate(&optical(), 1, &WorkOrder::default()).unwrap();
        assert_eq!(verdict.conclusion, CONCLUSION_RRU_FAULT);
    }

    #[test]
    fn test_numeric_descriptor_bounds() {
        let eval = evaluator(Arc::new(NoReadings));
        let vswr = MeasurementRef {
            kind: MeasurementKind::Numeric,
            name: "VSWR".to_string(),
        };
        let order = WorkOrder::default();

        let normal = eval.evaluate(&vswr, 12, &order).unwrap();
        assert_eq!(normal.conclusion, "驻波比正常");

        let abnormal = eval.evaluate(&vswr, 30, &order).unwrap();
        assert_eq!(abnormal.conclusion, "天馈驻波比异常");
        assert!(abnormal.solution_code.is_empty());
    }

    #[test]
    fn test_numeric_unknown_descriptor_is_catalog_error() {
        let eval = evaluator(Arc::new(NoReadings));
        let missing = MeasurementRef {
            kind: MeasurementKind::Numeric,
            name: "TEMPERATURE".to_string(),
        };
        let result = eval.evaluate(&missing, 1, &WorkOrder::default());
        assert!(matches!(result, Err(CatalogError::MeasurementNotFound(_))));
    }

    #[test]
    fn test_numeric_unknown_descriptor_errors_even_at_normal_sentinel() {
        let eval = evaluator(Arc::new(NoReadings));
        let missing = MeasurementRef {
            kind: MeasurementKind::Numeric,
            name: "TEMPERATURE".to_string(),
        };
        // Index 0 must not mask the missing descriptor as "normal"
        let result = eval.evaluate(&missing, 0, &WorkOrder::default());
        assert!(matches!(result, Err(CatalogError::MeasurementNotFound(_))));
    }

    #[test]
    fn test_parse_power_variants() {
        assert_eq!(parse_power("-36.5"), Some(-36.5));
        assert_eq!(parse_power("-36.5dBm"), Some(-36.5));
        assert_eq!(parse_power(" -12 dBm "), Some(-12.0));
        assert_eq!(parse_power(""), None);
        assert_eq!(parse_power("n/a"), None);
    }
}
