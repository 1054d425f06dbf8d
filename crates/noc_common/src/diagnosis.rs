//! Diagnosis Orchestrator - deterministic rule-set replay
//!
//! One `diagnose` call fetches the work order, classifies it into a
//! rule set, clamps the target step, and replays the steps in order.
//! Every step strictly before the target runs with error index 0; the
//! target step runs with the caller-supplied index. Each replay is a
//! fresh, side-effect-free pass over read-only state, so concurrent
//! callers need no locking.

use crate::catalog::{RuleCatalog, RULE_SET_BASE_STATION, RULE_SET_CELL};
use crate::error::DiagnosisError;
use crate::measurement::{MeasurementEvaluator, OpticalReadingSource};
use crate::placeholder::{resolve_template, StructuredLookup};
use crate::solution::{resolve_solution, SolutionStore};
use crate::work_order::{WorkOrder, WorkOrderStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// One replayed step's result. Output only, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inference {
    /// Resolved step description (问题描述)
    pub description: String,
    /// Fault conclusion (故障名称); empty when the step read normal
    pub conclusion: String,
    /// Remediation reference code
    pub solution_code: String,
    /// Resolved remediation document text; empty when unavailable
    pub solution_content: String,
    /// Resolved current-state lines
    pub current_states: Vec<String>,
}

/// Classify a work order into a rule set by keyword presence in the
/// alarm standard name. The cell keyword wins when both appear (a cell
/// outage on a live station is diagnosed as a cell problem).
///
/// The keyword set mirrors the deployed classification rule; see
/// DESIGN.md for the open question around it.
pub fn classify(order: &WorkOrder) -> Option<&'static str> {
    let alarm_name = order.gj00008.as_deref()?;
    if alarm_name.contains("小区") {
        Some(RULE_SET_CELL)
    } else if alarm_name.contains("基站") {
        Some(RULE_SET_BASE_STATION)
    } else {
        None
    }
}

/// The diagnosis engine. Holds the immutable catalog plus the four
/// external collaborators; safe to share behind an `Arc` and invoke
/// from many callers at once.
pub struct DiagnosisEngine {
    catalog: Arc<RuleCatalog>,
    work_orders: Arc<dyn WorkOrderStore>,
    lookup: Arc<dyn StructuredLookup>,
    solutions: Arc<dyn SolutionStore>,
    evaluator: MeasurementEvaluator,
}

impl DiagnosisEngine {
    pub fn new(
        catalog: Arc<RuleCatalog>,
        work_orders: Arc<dyn WorkOrderStore>,
        readings: Arc<dyn OpticalReadingSource>,
        lookup: Arc<dyn StructuredLookup>,
        solutions: Arc<dyn SolutionStore>,
    ) -> Self {
        let evaluator = MeasurementEvaluator::new(Arc::clone(&catalog), readings);
        Self {
            catalog,
            work_orders,
            lookup,
            solutions,
            evaluator,
        }
    }

    /// Replay the applicable rule set up to `target_step`, injecting
    /// `error_index` at exactly that step.
    ///
    /// Returns one inference per visited step; the length always
    /// equals the clamped target step. An unknown work order and an
    /// unclassifiable one both yield an empty list - neither is an
    /// error from the engine's point of view.
    pub fn diagnose(
        &self,
        work_order_id: &str,
        target_step: i64,
        error_index: i32,
    ) -> Result<Vec<Inference>, DiagnosisError> {
        let Some(order) = self
            .work_orders
            .fetch(work_order_id)
            .map_err(DiagnosisError::Store)?
        else {
            debug!("work order '{}' not found", work_order_id);
            return Ok(Vec::new());
        };

        let Some(rule_set_name) = classify(&order) else {
            debug!(
                "work order '{}' does not classify into any rule set",
                work_order_id
            );
            return Ok(Vec::new());
        };

        let rule_set = self.catalog.rule_set(rule_set_name)?;
        let target = target_step.clamp(1, rule_set.steps.len() as i64) as u32;
        info!(
            "diagnosing '{}' with {} up to step {} (error index {})",
            work_order_id, rule_set_name, target, error_index
        );

        let mut inferences = Vec::with_capacity(target as usize);
        for step in &rule_set.steps {
            if step.id > target {
                break;
            }

            // The simulated failure applies only at the target step
            let applied_index = if step.id == target { error_index } else { 0 };

            let description = resolve_template(&step.description, &order, self.lookup.as_ref());
            let current_states = step
                .current_states
                .iter()
                .map(|template| resolve_template(template, &order, self.lookup.as_ref()))
                .collect();

            let verdict = self.evaluator.evaluate(&step.measurement, applied_index, &order)?;
            let solution_content = resolve_solution(&verdict.solution_code, self.solutions.as_ref());

            inferences.push(Inference {
                description,
                conclusion: verdict.conclusion,
                solution_code: verdict.solution_code,
                solution_content,
                current_states,
            });
        }

        Ok(inferences)
    }
}
